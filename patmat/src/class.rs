use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::PatternError;
use crate::symbol::PropertyKey;
use crate::value::{Object, Value};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// A runtime class reference with single inheritance.
///
/// Classes compare by identity. Objects created through [`Class::instantiate`]
/// remember their class, which is what instance-of and tag-of patterns test.
#[derive(Clone)]
pub struct Class(Arc<ClassInner>);

struct ClassInner {
    id: u64,
    name: String,
    parent: Option<Class>,
    is_abstract: bool,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), None, false)
    }

    pub fn extending(name: impl Into<String>, parent: &Class) -> Self {
        Self::build(name.into(), Some(parent.clone()), false)
    }

    /// An abstract class: only subclasses may be instantiated.
    pub fn new_abstract(name: impl Into<String>, parent: Option<&Class>) -> Self {
        Self::build(name.into(), parent.cloned(), true)
    }

    fn build(name: String, parent: Option<Class>, is_abstract: bool) -> Self {
        Class(Arc::new(ClassInner {
            id: NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed),
            name,
            parent,
            is_abstract,
        }))
    }

    /// The marker base shared by every union created with [`crate::Union`].
    pub fn union_base() -> Class {
        static UNION_BASE: OnceLock<Class> = OnceLock::new();
        UNION_BASE
            .get_or_init(|| Class::new_abstract("UnionBase", None))
            .clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    pub fn is_abstract(&self) -> bool {
        self.0.is_abstract
    }

    /// True if `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Create an object of this class with the given own properties.
    pub fn instantiate<K, I>(&self, properties: I) -> Result<Value, PatternError>
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        if self.is_abstract() {
            return Err(PatternError::AbstractInstantiation {
                class: self.name().to_string(),
            });
        }
        let object = properties
            .into_iter()
            .fold(Object::new(), |object, (key, value)| object.with(key, value))
            .with_class(self.clone());
        Ok(Value::Object(Arc::new(object)))
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.0.name)
    }
}
