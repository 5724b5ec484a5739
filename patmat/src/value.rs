use std::fmt;
use std::sync::Arc;

use crate::class::Class;
use crate::classify;
use crate::keyed_map::KeyedMap;
use crate::symbol::{PropertyKey, Symbol};

/// A runtime value that patterns are matched against.
///
/// Composite payloads live behind `Arc`, so cloning a value is cheap and
/// clones share identity with the original.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Arc<str>),
    Symbol(Symbol),
    Sequence(Arc<Vec<Value>>),
    /// Key-ordered mapping with arbitrary value keys.
    Map(Arc<KeyedMap>),
    /// Structured object: own properties, an optional class and prototype.
    Object(Arc<Object>),
    Function(Function),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Sequence(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// A plain object (no class, no prototype) with the given own properties.
    pub fn object<K, V, I>(properties: I) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let object = properties
            .into_iter()
            .fold(Object::new(), |object, (key, value)| object.with(key, value));
        Value::Object(Arc::new(object))
    }

    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn function(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Value::Function(Function::new(f))
    }

    /// The dynamic type tag tested by type patterns.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn is_primitive(&self) -> bool {
        classify::is_primitive(self)
    }

    /// Strict identity: primitives by value, composites by reference.
    ///
    /// NaN is identical to itself. This is the comparison used by equality,
    /// capture and bind patterns; `==` on `Value` is deep structural equality.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn is_instance_of(&self, class: &Class) -> bool {
        match self {
            Value::Object(object) => object
                .class()
                .is_some_and(|own| own.is_subclass_of(class)),
            _ => false,
        }
    }

    /// Look up a property, including inherited ones.
    pub fn get_property(&self, key: &PropertyKey) -> Option<Value> {
        match self {
            Value::Object(object) => object.get(key).cloned(),
            Value::Sequence(items) => match key.as_name()? {
                "length" => Some(Value::Number(items.len() as f64)),
                name => parse_index(name).and_then(|i| items.get(i).cloned()),
            },
            Value::Map(map) => match key.as_name()? {
                "size" => Some(Value::Number(map.len() as f64)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn has_property(&self, key: &PropertyKey) -> bool {
        match self {
            Value::Object(object) => object.has(key),
            _ => self.get_property(key).is_some(),
        }
    }

    /// Own (non-inherited) property keys in declaration order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        match self {
            Value::Object(object) => object.own_keys().cloned().collect(),
            Value::Sequence(items) => (0..items.len())
                .map(|i| PropertyKey::from(i.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&KeyedMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// Canonical decimal index: `"0"`, `"12"`, never `"01"` or `"+1"`.
fn parse_index(name: &str) -> Option<usize> {
    let index = name.parse::<usize>().ok()?;
    (index.to_string() == name).then_some(index)
}

/// An opaque callable value, compared by identity.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl Function {
    pub fn new(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Function(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Arc::as_ptr(&self.0))
    }
}

/// A structured object.
#[derive(Debug, Clone, Default)]
pub struct Object {
    class: Option<Class>,
    properties: Vec<(PropertyKey, Value)>,
    /// Properties of the prototype are visible through `get`/`has` but are
    /// not own keys.
    prototype: Option<Arc<Object>>,
}

impl Object {
    pub fn new() -> Self {
        Object::default()
    }

    /// Set an own property, replacing an existing one in place.
    pub fn with(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((key, value)),
        }
        self
    }

    pub fn with_class(mut self, class: Class) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_prototype(mut self, prototype: Arc<Object>) -> Self {
        self.prototype = Some(prototype);
        self
    }

    pub fn class(&self) -> Option<&Class> {
        self.class.as_ref()
    }

    pub fn prototype(&self) -> Option<&Arc<Object>> {
        self.prototype.as_ref()
    }

    pub fn own_keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.properties.iter().map(|(k, _)| k)
    }

    pub fn own_properties(&self) -> &[(PropertyKey, Value)] {
        &self.properties
    }

    pub fn get_own(&self, key: &PropertyKey) -> Option<&Value> {
        self.properties
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Look up a property along the prototype chain.
    pub fn get(&self, key: &PropertyKey) -> Option<&Value> {
        let mut current = Some(self);
        while let Some(object) = current {
            if let Some(value) = object.get_own(key) {
                return Some(value);
            }
            current = object.prototype.as_deref();
        }
        None
    }

    pub fn has(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PartialEq for Object {
    /// Same class, same prototype, same own properties in any order.
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.prototype == other.prototype
            && self.properties.len() == other.properties.len()
            && self
                .properties
                .iter()
                .all(|(k, v)| other.get_own(k) == Some(v))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b, // NaN != NaN per IEEE 754
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(Arc::new(items))
    }
}

impl From<KeyedMap> for Value {
    fn from(map: KeyedMap) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(Arc::new(object))
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_finite() && *n == n.floor() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "#{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", key, value)?;
                }
                if !map.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "}}")
            }
            Value::Object(object) => {
                if let Some(class) = object.class() {
                    write!(f, "{} ", class.name())?;
                }
                write!(f, "{{")?;
                for (i, (key, value)) in object.own_properties().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    match key {
                        PropertyKey::Name(name) if is_identifier(name) => {
                            write!(f, " {}: {}", name, value)?
                        }
                        PropertyKey::Name(name) => write!(f, " {:?}: {}", name, value)?,
                        PropertyKey::Symbol(_) => write!(f, " {}: {}", key, value)?,
                    }
                }
                if !object.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "}}")
            }
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}
