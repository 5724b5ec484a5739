use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::class::Class;
use crate::error::PatternError;
use crate::value::{Object, Value};

/// Property under which a variant instance stores its payload.
pub(crate) const PAYLOAD_KEY: &str = "value";

/// How a variant constructor packages its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    /// Wraps the first argument.
    Value,
    /// Wraps all arguments as a sequence.
    Array,
}

impl FromStr for VariantKind {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "value" => Ok(VariantKind::Value),
            "array" => Ok(VariantKind::Array),
            other => Err(PatternError::InvalidVariantKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A tagged union: an abstract marker class plus one constructor per variant.
///
/// ```
/// use patmat::{Union, VariantKind, Value};
/// let option = Union::new("Option", [("Some", VariantKind::Value), ("None", VariantKind::Array)]);
/// let some = option.variant("Some").unwrap().of(Value::from(1));
/// assert!(some.is_instance_of(option.base()));
/// ```
#[derive(Clone)]
pub struct Union {
    base: Class,
    variants: Vec<Variant>,
}

impl Union {
    pub fn new<N, I>(name: impl Into<String>, variants: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, VariantKind)>,
    {
        let base = Class::new_abstract(name, Some(&Class::union_base()));
        let variants = variants
            .into_iter()
            .map(|(variant, kind)| Variant {
                class: Class::extending(variant, &base),
                kind,
            })
            .collect();
        Union { base, variants }
    }

    /// Like [`Union::new`], with kinds spelled `"value"` or `"array"`.
    pub fn parse<'a, I>(name: impl Into<String>, variants: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let variants = variants
            .into_iter()
            .map(|(variant, kind)| kind.parse::<VariantKind>().map(|kind| (variant, kind)))
            .collect::<Result<Vec<_>, PatternError>>()?;
        Ok(Union::new(name, variants))
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// The abstract marker class every variant extends.
    pub fn base(&self) -> &Class {
        &self.base
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name() == name)
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

impl fmt::Debug for Union {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Union")
            .field("name", &self.name())
            .field("variants", &self.variants)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Variant {
    class: Class,
    kind: VariantKind,
}

impl Variant {
    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    /// Construct an instance from constructor arguments.
    pub fn construct(&self, args: Vec<Value>) -> Value {
        let payload = match self.kind {
            VariantKind::Value => args.into_iter().next().unwrap_or(Value::Undefined),
            VariantKind::Array => Value::from(args),
        };
        let object = Object::new()
            .with(PAYLOAD_KEY, payload)
            .with_class(self.class.clone());
        Value::Object(Arc::new(object))
    }

    /// Shorthand for a single-argument construction.
    pub fn of(&self, value: impl Into<Value>) -> Value {
        self.construct(vec![value.into()])
    }
}
