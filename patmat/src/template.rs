use crate::pattern::Pattern;
use crate::symbol::{PropertyKey, Symbol};
use crate::value::Value;

/// A raw structural literal describing a pattern.
///
/// Templates are what callers write; [`Pattern::of`] turns them into
/// patterns. A template may mix plain values with ready-made patterns at any
/// depth, e.g. a sequence whose second element is a capture.
#[derive(Debug, Clone)]
pub enum Template {
    /// Already a pattern; normalization returns it unchanged.
    Pattern(Pattern),
    /// A runtime value used as a literal shape.
    Value(Value),
    Sequence(Vec<Template>),
    Map(Vec<(Value, Template)>),
    Object(Vec<(PropertyKey, Template)>),
}

impl Template {
    /// The `[rest, pattern]` marker tuple for use inside a sequence template.
    pub fn rest(pattern: impl Into<Template>) -> Template {
        Template::Sequence(vec![
            Template::Value(Value::Symbol(Symbol::rest())),
            pattern.into(),
        ])
    }

    /// Split a rest marker tuple into its pattern, or hand the template back.
    pub(crate) fn into_rest_marker(self) -> Result<Template, Template> {
        match self {
            Template::Sequence(mut items) if items.len() == 2 && is_rest_tag(&items[0]) => {
                Ok(items.remove(1))
            }
            Template::Value(Value::Sequence(items))
                if items.len() == 2 && matches!(&items[0], Value::Symbol(s) if s.is_rest()) =>
            {
                Ok(Template::Value(items[1].clone()))
            }
            other => Err(other),
        }
    }

    /// Dynamic type tag of the value this template would match structurally.
    pub(crate) fn shape_name(&self) -> &'static str {
        match self {
            Template::Pattern(_) => "pattern",
            Template::Value(value) => value.type_name(),
            Template::Sequence(_) => "sequence",
            Template::Map(_) => "map",
            Template::Object(_) => "object",
        }
    }
}

fn is_rest_tag(template: &Template) -> bool {
    matches!(template, Template::Value(Value::Symbol(s)) if s.is_rest())
}

impl From<Pattern> for Template {
    fn from(pattern: Pattern) -> Self {
        Template::Pattern(pattern)
    }
}

impl From<Value> for Template {
    fn from(value: Value) -> Self {
        Template::Value(value)
    }
}

impl From<Vec<Template>> for Template {
    fn from(items: Vec<Template>) -> Self {
        Template::Sequence(items)
    }
}

macro_rules! template_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Template {
                fn from(value: $ty) -> Self {
                    Template::Value(Value::from(value))
                }
            }
        )*
    };
}

template_from_value!(bool, f64, i32, i64, usize, &str, String, Symbol);

/// Build a sequence template from heterogeneous items.
///
/// ```
/// use patmat::{seq, is::{id, ignore, rest}};
/// let template = seq![ignore(), id("x"), rest(id("xs"))];
/// ```
#[macro_export]
macro_rules! seq {
    ($($item:expr),* $(,)?) => {
        $crate::Template::Sequence(vec![$($crate::Template::from($item)),*])
    };
}

/// Build a structural object template: `record! { "x" => id("x") }`.
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::Template::Object(vec![
            $(($crate::PropertyKey::from($key), $crate::Template::from($value))),*
        ])
    };
}

/// Build a keyed map template: `keyed! { "x" => 1, 2 => id("two") }`.
#[macro_export]
macro_rules! keyed {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::Template::Map(vec![
            $(($crate::Value::from($key), $crate::Template::from($value))),*
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_marker_round_trip() {
        let marker = Template::rest(1);
        let inner = marker.into_rest_marker().unwrap();
        assert!(matches!(inner, Template::Value(Value::Number(n)) if n == 1.0));

        let value_marker = Template::Value(Value::sequence([
            Value::Symbol(Symbol::rest()),
            Value::from("xs"),
        ]));
        assert!(value_marker.into_rest_marker().is_ok());
    }

    #[test]
    fn ordinary_pairs_are_not_rest_markers() {
        let pair = Template::Sequence(vec![Template::from(1), Template::from(2)]);
        assert!(pair.into_rest_marker().is_err());

        let lookalike = Template::Sequence(vec![
            Template::from(Symbol::new("rest")),
            Template::from(2),
        ]);
        assert!(lookalike.into_rest_marker().is_err());
    }
}
