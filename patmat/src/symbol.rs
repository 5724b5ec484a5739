use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique, identity-compared token.
///
/// Two symbols are equal only if they were produced by the same call to
/// [`Symbol::new`]; the description is for display only.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolInner>);

struct SymbolInner {
    id: u64,
    description: String,
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Symbol(Arc::new(SymbolInner {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }))
    }

    /// The reserved rest marker.
    ///
    /// Used as the tag of a `[rest, pattern]` tuple inside a sequence, as a map
    /// key, or as an object property key. Never a legitimate user key.
    pub fn rest() -> Symbol {
        static REST: OnceLock<Symbol> = OnceLock::new();
        REST.get_or_init(|| Symbol::new("rest")).clone()
    }

    pub fn is_rest(&self) -> bool {
        *self == Symbol::rest()
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Symbol {}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.0.description, self.0.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0.description)
    }
}

/// A property key of a structured object: a plain name or a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    Name(Arc<str>),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn is_rest(&self) -> bool {
        matches!(self, PropertyKey::Symbol(s) if s.is_rest())
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Name(name) => Some(name),
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.into())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name.into())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => write!(f, "{}", name),
            PropertyKey::Symbol(symbol) => write!(f, "[{}]", symbol),
        }
    }
}
