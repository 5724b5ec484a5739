//! Short constructor aliases for building patterns inline.
//!
//! ```
//! use patmat::is::{bind, id, ignore, in_range, rest};
//! use patmat::{record, seq, Pattern, Value};
//!
//! let pattern = Pattern::of(record! {
//!     "pos" => seq![id("x"), ignore(), rest(id("more"))],
//!     "hp" => bind(in_range(0.0, 100.0), "hp"),
//! });
//! # let _ = pattern;
//! ```

use crate::bindings::Bindings;
use crate::class::Class;
use crate::error::PatternError;
use crate::pattern::{Extractor, Pattern};
use crate::template::Template;
use crate::union::Variant;
use crate::value::Value;

/// Capture the subject under `name`.
pub fn id(name: impl Into<String>) -> Pattern {
    Pattern::id(name)
}

/// Match anything without binding.
pub fn ignore() -> Pattern {
    Pattern::ignore()
}

pub fn equal(value: impl Into<Value>) -> Pattern {
    Pattern::equal(value)
}

pub fn one_of<I>(alternatives: I) -> Pattern
where
    I: IntoIterator,
    I::Item: Into<Template>,
{
    Pattern::one_of(alternatives)
}

/// `lower <= n < upper`.
pub fn in_range(lower: f64, upper: f64) -> Pattern {
    Pattern::range(lower, upper, true)
}

/// `lower <= n <= upper`.
pub fn in_range_inclusive(lower: f64, upper: f64) -> Pattern {
    Pattern::range(lower, upper, false)
}

pub fn type_of(type_name: impl Into<String>, pattern: impl Into<Template>) -> Pattern {
    Pattern::type_of(type_name, pattern)
}

pub fn instance(class: &Class, pattern: impl Into<Template>) -> Pattern {
    Pattern::instance(class, pattern)
}

/// Match a union variant and recurse into its payload.
pub fn tag(variant: &Variant, pattern: impl Into<Template>) -> Pattern {
    Pattern::tag(variant.class(), pattern)
}

pub fn preguarded(
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    pattern: impl Into<Template>,
) -> Pattern {
    Pattern::preguarded(predicate, pattern)
}

pub fn guarded(
    pattern: impl Into<Template>,
    guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
) -> Pattern {
    Pattern::guarded(pattern, guard)
}

pub fn array(
    items: impl Into<Template>,
    rest: Option<Template>,
) -> Result<Pattern, PatternError> {
    Pattern::sequence(items, rest)
}

pub fn object(
    properties: impl Into<Template>,
    rest: Option<Template>,
) -> Result<Pattern, PatternError> {
    Pattern::object(properties, rest)
}

pub fn map(entries: impl Into<Template>, rest: Option<Template>) -> Result<Pattern, PatternError> {
    Pattern::map(entries, rest)
}

pub fn string(prefix: impl Into<String>, pattern: impl Into<Template>) -> Pattern {
    Pattern::string(prefix, pattern)
}

pub fn view(
    transform: impl Fn(&Value) -> Value + Send + Sync + 'static,
    pattern: impl Into<Template>,
) -> Pattern {
    Pattern::view(transform, pattern)
}

pub fn bind(pattern: impl Into<Template>, name: impl Into<String>) -> Pattern {
    Pattern::bind(pattern, name)
}

pub fn custom(extractor: impl Extractor + 'static) -> Pattern {
    Pattern::custom(extractor)
}

/// Rest marker for sequence templates: `seq![id("head"), rest(id("tail"))]`.
pub fn rest(pattern: impl Into<Template>) -> Template {
    Template::rest(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq;

    #[test]
    fn range_aliases_pick_the_upper_bound() {
        let half_open = in_range(0.0, 10.0);
        let closed = in_range_inclusive(0.0, 10.0);

        assert!(!half_open.test(&Value::from(10)).unwrap());
        assert!(closed.test(&Value::from(10)).unwrap());
        assert!(half_open.test(&Value::from(0)).unwrap());
    }

    #[test]
    fn array_accepts_an_explicit_rest() {
        let pattern = array(seq![id("head")], Some(id("tail").into())).unwrap();
        let bindings = pattern
            .match_value(&Value::sequence([1, 2, 3]))
            .unwrap()
            .unwrap();

        assert_eq!(bindings["head"], Value::from(1));
        assert_eq!(bindings["tail"], Value::sequence([2, 3]));
    }

    #[test]
    fn array_rejects_non_sequences() {
        assert_eq!(
            array("abc", None).unwrap_err(),
            PatternError::NotASequence { got: "string" }
        );
    }
}
