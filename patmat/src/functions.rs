use crate::bindings::Bindings;
use crate::error::PatternError;
use crate::pattern::Pattern;
use crate::template::Template;
use crate::value::Value;

/// Whether `value` matches `template`.
pub fn test(template: impl Into<Template>, value: &Value) -> Result<bool, PatternError> {
    Pattern::of(template).test(value)
}

/// The bindings produced by matching `value` against `template`, or `None`.
pub fn match_pattern(
    template: impl Into<Template>,
    value: &Value,
) -> Result<Option<Bindings>, PatternError> {
    Pattern::of(template).match_value(value)
}

/// Normalize once, test many times.
pub fn tester(template: impl Into<Template>) -> impl Fn(&Value) -> Result<bool, PatternError> {
    let pattern = Pattern::of(template);
    move |value: &Value| pattern.test(value)
}

pub fn matcher(
    template: impl Into<Template>,
) -> impl Fn(&Value) -> Result<Option<Bindings>, PatternError> {
    let pattern = Pattern::of(template);
    move |value: &Value| pattern.match_value(value)
}
