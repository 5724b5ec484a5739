mod extract;
mod normalize;

use std::fmt;
use std::sync::Arc;

use crate::bindings::Bindings;
use crate::class::Class;
use crate::error::PatternError;
use crate::symbol::PropertyKey;
use crate::template::Template;
use crate::value::Value;

/// Test applied to the raw subject before matching.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
/// Test applied to the bindings after matching.
pub type Guard = Arc<dyn Fn(&Bindings) -> bool + Send + Sync>;
/// Function whose result is matched in place of the subject.
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Outcome of one extraction.
///
/// `Ok(None)` is an ordinary non-match; `Ok(Some(bindings))` carries exactly
/// the bindings introduced by the pattern; `Err` is a consistency error.
pub type Extraction = Result<Option<Bindings>, PatternError>;

/// A user-defined pattern kind.
///
/// Implementations must not retain state between calls and must honour the
/// extraction contract: return only the bindings they introduce, and report
/// a non-match as `Ok(None)`.
pub trait Extractor: Send + Sync {
    fn extract(&self, subject: &Value, context: &Bindings) -> Extraction;

    /// Ignored patterns are skipped by sequence, map and object patterns.
    fn is_ignored(&self) -> bool {
        false
    }
}

/// The kinds of pattern the engine knows how to evaluate.
pub enum PatternKind {
    /// Capture the subject under a name.
    Id(String),
    /// Match anything, bind nothing.
    Ignore,
    Equal(Value),
    /// First alternative that matches wins.
    OneOf(Vec<Pattern>),
    /// Numeric range; the lower bound is always inclusive.
    Range {
        lower: f64,
        upper: f64,
        exclusive: bool,
    },
    Type {
        type_name: String,
        pattern: Pattern,
    },
    Instance {
        class: Class,
        pattern: Pattern,
    },
    /// Instance of a union variant; `pattern` is matched against the payload.
    Tag {
        variant: Class,
        pattern: Pattern,
    },
    Preguarded {
        predicate: Predicate,
        pattern: Pattern,
    },
    Guarded {
        pattern: Pattern,
        guard: Guard,
    },
    Sequence {
        patterns: Vec<Pattern>,
        rest: Option<Pattern>,
    },
    Map {
        entries: Vec<(Value, Pattern)>,
        rest: Option<Pattern>,
    },
    Object {
        entries: Vec<(PropertyKey, Pattern)>,
        rest: Option<Pattern>,
    },
    /// String starting with `prefix`; `pattern` is matched against the suffix.
    String {
        prefix: String,
        pattern: Pattern,
    },
    View {
        transform: Transform,
        pattern: Pattern,
    },
    Bind {
        pattern: Pattern,
        name: String,
    },
    Custom(Arc<dyn Extractor>),
}

/// An immutable, shareable pattern.
///
/// Cloning is cheap and clones are the same pattern (see [`Pattern::ptr_eq`]).
#[derive(Clone)]
pub struct Pattern(Arc<PatternKind>);

impl Pattern {
    pub fn new(kind: PatternKind) -> Self {
        Pattern(Arc::new(kind))
    }

    /// Normalize any template into a pattern. Patterns come back unchanged.
    pub fn of(template: impl Into<Template>) -> Pattern {
        normalize::normalize(template.into())
    }

    pub fn kind(&self) -> &PatternKind {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Pattern) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_ignored(&self) -> bool {
        match self.kind() {
            PatternKind::Ignore => true,
            PatternKind::Custom(extractor) => extractor.is_ignored(),
            _ => false,
        }
    }

    pub fn test(&self, value: &Value) -> Result<bool, PatternError> {
        Ok(self.extract(value, &Bindings::new())?.is_some())
    }

    /// Match against a fresh context. `Ok(None)` on non-match.
    pub fn match_value(&self, value: &Value) -> Result<Option<Bindings>, PatternError> {
        self.extract(value, &Bindings::new())
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn id(name: impl Into<String>) -> Pattern {
        Pattern::new(PatternKind::Id(name.into()))
    }

    pub fn ignore() -> Pattern {
        Pattern::new(PatternKind::Ignore)
    }

    pub fn equal(value: impl Into<Value>) -> Pattern {
        Pattern::new(PatternKind::Equal(value.into()))
    }

    pub fn one_of<I>(alternatives: I) -> Pattern
    where
        I: IntoIterator,
        I::Item: Into<Template>,
    {
        Pattern::new(PatternKind::OneOf(
            alternatives.into_iter().map(Pattern::of).collect(),
        ))
    }

    pub fn range(lower: f64, upper: f64, exclusive: bool) -> Pattern {
        Pattern::new(PatternKind::Range {
            lower,
            upper,
            exclusive,
        })
    }

    pub fn type_of(type_name: impl Into<String>, pattern: impl Into<Template>) -> Pattern {
        Pattern::new(PatternKind::Type {
            type_name: type_name.into(),
            pattern: Pattern::of(pattern),
        })
    }

    pub fn instance(class: &Class, pattern: impl Into<Template>) -> Pattern {
        Pattern::new(PatternKind::Instance {
            class: class.clone(),
            pattern: Pattern::of(pattern),
        })
    }

    pub fn tag(variant: &Class, pattern: impl Into<Template>) -> Pattern {
        Pattern::new(PatternKind::Tag {
            variant: variant.clone(),
            pattern: Pattern::of(pattern),
        })
    }

    pub fn preguarded(
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        pattern: impl Into<Template>,
    ) -> Pattern {
        Pattern::new(PatternKind::Preguarded {
            predicate: Arc::new(predicate),
            pattern: Pattern::of(pattern),
        })
    }

    pub fn guarded(
        pattern: impl Into<Template>,
        guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
    ) -> Pattern {
        Pattern::new(PatternKind::Guarded {
            pattern: Pattern::of(pattern),
            guard: Arc::new(guard),
        })
    }

    /// Sequence pattern from a sequence template.
    ///
    /// Rest markers inside the template are honoured; an explicit `rest`
    /// takes precedence over a marker.
    pub fn sequence(
        template: impl Into<Template>,
        rest: Option<Template>,
    ) -> Result<Pattern, PatternError> {
        let items = normalize::sequence_items(template.into())?;
        Ok(Pattern::sequence_of(items, rest))
    }

    pub(crate) fn sequence_of(items: Vec<Template>, rest: Option<Template>) -> Pattern {
        let (patterns, marker) = normalize::split_sequence(items);
        Pattern::new(PatternKind::Sequence {
            patterns,
            rest: rest.map(Pattern::of).or(marker),
        })
    }

    /// Map pattern from a keyed map template.
    pub fn map(
        template: impl Into<Template>,
        rest: Option<Template>,
    ) -> Result<Pattern, PatternError> {
        let template = template.into();
        let entries = normalize::map_entries(template)?;
        let (entries, marker) = normalize::split_map(entries);
        Ok(Pattern::new(PatternKind::Map {
            entries,
            rest: rest.map(Pattern::of).or(marker),
        }))
    }

    /// Structural object pattern from an object template.
    pub fn object(
        template: impl Into<Template>,
        rest: Option<Template>,
    ) -> Result<Pattern, PatternError> {
        let template = template.into();
        let entries = normalize::object_entries(template)?;
        let (entries, marker) = normalize::split_object(entries);
        Ok(Pattern::new(PatternKind::Object {
            entries,
            rest: rest.map(Pattern::of).or(marker),
        }))
    }

    pub fn string(prefix: impl Into<String>, pattern: impl Into<Template>) -> Pattern {
        Pattern::new(PatternKind::String {
            prefix: prefix.into(),
            pattern: Pattern::of(pattern),
        })
    }

    pub fn view(
        transform: impl Fn(&Value) -> Value + Send + Sync + 'static,
        pattern: impl Into<Template>,
    ) -> Pattern {
        Pattern::new(PatternKind::View {
            transform: Arc::new(transform),
            pattern: Pattern::of(pattern),
        })
    }

    pub fn bind(pattern: impl Into<Template>, name: impl Into<String>) -> Pattern {
        Pattern::new(PatternKind::Bind {
            pattern: Pattern::of(pattern),
            name: name.into(),
        })
    }

    pub fn custom(extractor: impl Extractor + 'static) -> Pattern {
        Pattern::new(PatternKind::Custom(Arc::new(extractor)))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

impl fmt::Debug for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Id(name) => f.debug_tuple("Id").field(name).finish(),
            PatternKind::Ignore => write!(f, "Ignore"),
            PatternKind::Equal(value) => f.debug_tuple("Equal").field(value).finish(),
            PatternKind::OneOf(alternatives) => {
                f.debug_tuple("OneOf").field(alternatives).finish()
            }
            PatternKind::Range {
                lower,
                upper,
                exclusive,
            } => f
                .debug_struct("Range")
                .field("lower", lower)
                .field("upper", upper)
                .field("exclusive", exclusive)
                .finish(),
            PatternKind::Type { type_name, pattern } => f
                .debug_struct("Type")
                .field("type_name", type_name)
                .field("pattern", pattern)
                .finish(),
            PatternKind::Instance { class, pattern } => f
                .debug_struct("Instance")
                .field("class", class)
                .field("pattern", pattern)
                .finish(),
            PatternKind::Tag { variant, pattern } => f
                .debug_struct("Tag")
                .field("variant", variant)
                .field("pattern", pattern)
                .finish(),
            PatternKind::Preguarded { pattern, .. } => f
                .debug_struct("Preguarded")
                .field("pattern", pattern)
                .finish_non_exhaustive(),
            PatternKind::Guarded { pattern, .. } => f
                .debug_struct("Guarded")
                .field("pattern", pattern)
                .finish_non_exhaustive(),
            PatternKind::Sequence { patterns, rest } => f
                .debug_struct("Sequence")
                .field("patterns", patterns)
                .field("rest", rest)
                .finish(),
            PatternKind::Map { entries, rest } => f
                .debug_struct("Map")
                .field("entries", entries)
                .field("rest", rest)
                .finish(),
            PatternKind::Object { entries, rest } => f
                .debug_struct("Object")
                .field("entries", entries)
                .field("rest", rest)
                .finish(),
            PatternKind::String { prefix, pattern } => f
                .debug_struct("String")
                .field("prefix", prefix)
                .field("pattern", pattern)
                .finish(),
            PatternKind::View { pattern, .. } => f
                .debug_struct("View")
                .field("pattern", pattern)
                .finish_non_exhaustive(),
            PatternKind::Bind { pattern, name } => f
                .debug_struct("Bind")
                .field("pattern", pattern)
                .field("name", name)
                .finish(),
            PatternKind::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
