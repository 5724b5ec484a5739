use crate::error::PatternError;
use crate::pattern::{Pattern, PatternKind};
use crate::symbol::PropertyKey;
use crate::template::Template;
use crate::value::Value;

/// Turn a template into a pattern, eagerly normalizing every sub-template.
pub(super) fn normalize(template: Template) -> Pattern {
    match template {
        Template::Pattern(pattern) => pattern,
        Template::Sequence(items) => sequence_pattern(items),
        Template::Map(entries) => map_pattern(entries),
        Template::Object(entries) => object_pattern(entries),
        Template::Value(Value::Sequence(items)) => sequence_pattern(value_items(&items)),
        Template::Value(Value::Map(map)) => map_pattern(
            map.iter()
                .map(|(k, v)| (k.clone(), Template::Value(v.clone())))
                .collect(),
        ),
        Template::Value(Value::Object(object)) => object_pattern(
            object
                .own_properties()
                .iter()
                .map(|(k, v)| (k.clone(), Template::Value(v.clone())))
                .collect(),
        ),
        // Primitives, and functions, which are opaque rather than structured.
        Template::Value(value) => Pattern::new(PatternKind::Equal(value)),
    }
}

fn sequence_pattern(items: Vec<Template>) -> Pattern {
    let (patterns, rest) = split_sequence(items);
    Pattern::new(PatternKind::Sequence { patterns, rest })
}

fn map_pattern(entries: Vec<(Value, Template)>) -> Pattern {
    let (entries, rest) = split_map(entries);
    Pattern::new(PatternKind::Map { entries, rest })
}

fn object_pattern(entries: Vec<(PropertyKey, Template)>) -> Pattern {
    let (entries, rest) = split_object(entries);
    Pattern::new(PatternKind::Object { entries, rest })
}

fn value_items(items: &[Value]) -> Vec<Template> {
    items.iter().cloned().map(Template::Value).collect()
}

pub(super) fn sequence_items(template: Template) -> Result<Vec<Template>, PatternError> {
    match template {
        Template::Sequence(items) => Ok(items),
        Template::Value(Value::Sequence(items)) => Ok(value_items(&items)),
        other => Err(PatternError::NotASequence {
            got: other.shape_name(),
        }),
    }
}

pub(super) fn map_entries(template: Template) -> Result<Vec<(Value, Template)>, PatternError> {
    match template {
        Template::Map(entries) => Ok(entries),
        Template::Value(Value::Map(map)) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), Template::Value(v.clone())))
            .collect()),
        other => Err(PatternError::NotAKeyedMap {
            got: other.shape_name(),
        }),
    }
}

pub(super) fn object_entries(
    template: Template,
) -> Result<Vec<(PropertyKey, Template)>, PatternError> {
    match template {
        Template::Object(entries) => Ok(entries),
        Template::Value(Value::Object(object)) => Ok(object
            .own_properties()
            .iter()
            .map(|(k, v)| (k.clone(), Template::Value(v.clone())))
            .collect()),
        other => Err(PatternError::NotAnObject {
            got: other.shape_name(),
        }),
    }
}

/// Normalize positional items, excising the first rest marker tuple found.
pub(super) fn split_sequence(items: Vec<Template>) -> (Vec<Pattern>, Option<Pattern>) {
    let mut patterns = Vec::with_capacity(items.len());
    let mut rest = None;
    for item in items {
        if rest.is_some() {
            patterns.push(normalize(item));
            continue;
        }
        match item.into_rest_marker() {
            Ok(marked) => rest = Some(normalize(marked)),
            Err(item) => patterns.push(normalize(item)),
        }
    }
    (patterns, rest)
}

pub(super) fn split_map(
    entries: Vec<(Value, Template)>,
) -> (Vec<(Value, Pattern)>, Option<Pattern>) {
    let mut normalized = Vec::with_capacity(entries.len());
    let mut rest = None;
    for (key, template) in entries {
        match &key {
            Value::Symbol(symbol) if symbol.is_rest() && rest.is_none() => {
                rest = Some(normalize(template));
            }
            _ => normalized.push((key, normalize(template))),
        }
    }
    (normalized, rest)
}

pub(super) fn split_object(
    entries: Vec<(PropertyKey, Template)>,
) -> (Vec<(PropertyKey, Pattern)>, Option<Pattern>) {
    let mut normalized = Vec::with_capacity(entries.len());
    let mut rest = None;
    for (key, template) in entries {
        if key.is_rest() && rest.is_none() {
            rest = Some(normalize(template));
        } else {
            normalized.push((key, normalize(template)));
        }
    }
    (normalized, rest)
}
