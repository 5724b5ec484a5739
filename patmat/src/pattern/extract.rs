use crate::bindings::Bindings;
use crate::error::PatternError;
use crate::pattern::{Extraction, Pattern, PatternKind};
use crate::symbol::PropertyKey;
use crate::union::PAYLOAD_KEY;
use crate::value::{Object, Value};

impl Pattern {
    /// Test `subject` against this pattern.
    ///
    /// `context` holds the bindings established earlier in the same match
    /// attempt and is never modified. On success the result holds only the
    /// bindings this pattern introduced; the caller merges them.
    pub fn extract(&self, subject: &Value, context: &Bindings) -> Extraction {
        match self.kind() {
            PatternKind::Id(name) => Ok(extract_id(name, subject, context)),
            PatternKind::Ignore => Ok(Some(Bindings::new())),
            PatternKind::Equal(expected) => Ok(subject.identical(expected).then(Bindings::new)),
            PatternKind::OneOf(alternatives) => {
                for alternative in alternatives {
                    if let Some(extracted) = alternative.extract(subject, context)? {
                        return Ok(Some(extracted));
                    }
                }
                Ok(None)
            }
            PatternKind::Range {
                lower,
                upper,
                exclusive,
            } => Ok(in_range(subject, *lower, *upper, *exclusive).then(Bindings::new)),
            PatternKind::Type { type_name, pattern } => {
                if subject.type_name() != type_name {
                    return Ok(None);
                }
                pattern.extract(subject, context)
            }
            PatternKind::Instance { class, pattern } => {
                if !subject.is_instance_of(class) {
                    return Ok(None);
                }
                pattern.extract(subject, context)
            }
            PatternKind::Tag { variant, pattern } => {
                if !subject.is_instance_of(variant) {
                    return Ok(None);
                }
                let payload = subject
                    .get_property(&PropertyKey::from(PAYLOAD_KEY))
                    .unwrap_or(Value::Undefined);
                pattern.extract(&payload, context)
            }
            PatternKind::Preguarded { predicate, pattern } => {
                if !predicate(subject) {
                    return Ok(None);
                }
                pattern.extract(subject, context)
            }
            PatternKind::Guarded { pattern, guard } => {
                let Some(extracted) = pattern.extract(subject, context)? else {
                    return Ok(None);
                };
                Ok(guard(&context.merge(&extracted)).then_some(extracted))
            }
            PatternKind::Sequence { patterns, rest } => {
                extract_sequence(patterns, rest.as_ref(), subject, context)
            }
            PatternKind::Map { entries, rest } => {
                extract_map(entries, rest.as_ref(), subject, context)
            }
            PatternKind::Object { entries, rest } => {
                extract_object(entries, rest.as_ref(), subject, context)
            }
            PatternKind::String { prefix, pattern } => {
                let Some(suffix) = subject.as_str().and_then(|s| s.strip_prefix(prefix.as_str()))
                else {
                    return Ok(None);
                };
                pattern.extract(&Value::from(suffix), context)
            }
            PatternKind::View { transform, pattern } => {
                pattern.extract(&transform(subject), context)
            }
            PatternKind::Bind { pattern, name } => extract_bind(pattern, name, subject, context),
            PatternKind::Custom(extractor) => extractor.extract(subject, context),
        }
    }
}

fn extract_id(name: &str, subject: &Value, context: &Bindings) -> Option<Bindings> {
    if context
        .get(name)
        .is_some_and(|bound| !bound.identical(subject))
    {
        return None;
    }
    Some(Bindings::new().set(name, subject.clone()))
}

fn in_range(subject: &Value, lower: f64, upper: f64, exclusive: bool) -> bool {
    let Some(n) = subject.as_number() else {
        return false;
    };
    n >= lower && if exclusive { n < upper } else { n <= upper }
}

fn extract_bind(pattern: &Pattern, name: &str, subject: &Value, context: &Bindings) -> Extraction {
    let Some(mut extracted) = pattern.extract(subject, context)? else {
        return Ok(None);
    };
    if extracted.contains(name) {
        tracing::debug!(name, "bind pattern collides with a capture of its own pattern");
        return Err(PatternError::BindingCollision {
            name: name.to_string(),
        });
    }
    if context
        .get(name)
        .is_some_and(|bound| !bound.identical(subject))
    {
        return Ok(None);
    }
    extracted.insert(name, subject.clone());
    Ok(Some(extracted))
}

/// Bindings introduced so far by the children of one composite pattern.
///
/// `scope` is the caller's context plus `introduced`; both grow in place,
/// one child at a time.
struct Accumulator {
    scope: Bindings,
    introduced: Bindings,
}

impl Accumulator {
    fn new(context: &Bindings) -> Self {
        Accumulator {
            scope: context.clone(),
            introduced: Bindings::new(),
        }
    }

    /// Match one child, letting it see everything bound before it.
    /// Returns false on a non-match or a conflicting re-binding.
    fn step(&mut self, pattern: &Pattern, subject: &Value) -> Result<bool, PatternError> {
        if pattern.is_ignored() {
            return Ok(true);
        }
        let Some(extracted) = pattern.extract(subject, &self.scope)? else {
            return Ok(false);
        };
        if !self.scope.is_consistent_with(&extracted) {
            return Ok(false);
        }
        self.scope.absorb(&extracted);
        self.introduced.absorb(&extracted);
        Ok(true)
    }

    fn finish(self) -> Option<Bindings> {
        Some(self.introduced)
    }
}

fn extract_sequence(
    patterns: &[Pattern],
    rest: Option<&Pattern>,
    subject: &Value,
    context: &Bindings,
) -> Extraction {
    let Some(items) = subject.as_sequence() else {
        return Ok(None);
    };
    let arity_matches = match rest {
        Some(_) => items.len() >= patterns.len(),
        None => items.len() == patterns.len(),
    };
    if !arity_matches {
        tracing::trace!(
            expected = patterns.len(),
            found = items.len(),
            "sequence length mismatch"
        );
        return Ok(None);
    }

    let mut accumulator = Accumulator::new(context);
    for (pattern, item) in patterns.iter().zip(items) {
        if !accumulator.step(pattern, item)? {
            return Ok(None);
        }
    }

    if let Some(rest) = rest.filter(|rest| !rest.is_ignored()) {
        let remaining = Value::sequence(items[patterns.len()..].iter().cloned());
        if !accumulator.step(rest, &remaining)? {
            return Ok(None);
        }
    }

    Ok(accumulator.finish())
}

fn extract_map(
    entries: &[(Value, Pattern)],
    rest: Option<&Pattern>,
    subject: &Value,
    context: &Bindings,
) -> Extraction {
    let Some(map) = subject.as_map() else {
        return Ok(None);
    };

    let mut accumulator = Accumulator::new(context);
    for (key, pattern) in entries {
        let Some(value) = map.get(key) else {
            tracing::trace!(%key, "map pattern key missing from subject");
            return Ok(None);
        };
        if !accumulator.step(pattern, value)? {
            return Ok(None);
        }
    }

    if let Some(rest) = rest.filter(|rest| !rest.is_ignored()) {
        let residual = map.delete(entries.iter().map(|(key, _)| key));
        if !accumulator.step(rest, &Value::from(residual))? {
            return Ok(None);
        }
    }

    Ok(accumulator.finish())
}

fn extract_object(
    entries: &[(PropertyKey, Pattern)],
    rest: Option<&Pattern>,
    subject: &Value,
    context: &Bindings,
) -> Extraction {
    if subject.is_primitive() {
        return Ok(None);
    }

    let mut accumulator = Accumulator::new(context);
    for (key, pattern) in entries {
        let Some(value) = subject.get_property(key) else {
            tracing::trace!(%key, "object pattern key missing from subject");
            return Ok(None);
        };
        if !accumulator.step(pattern, &value)? {
            return Ok(None);
        }
    }

    if let Some(rest) = rest.filter(|rest| !rest.is_ignored()) {
        let residual = subject
            .own_keys()
            .into_iter()
            .filter(|key| !entries.iter().any(|(k, _)| k == key))
            .fold(Object::new(), |object, key| {
                let value = subject.get_property(&key).unwrap_or(Value::Undefined);
                object.with(key, value)
            });
        if !accumulator.step(rest, &Value::from(residual))? {
            return Ok(None);
        }
    }

    Ok(accumulator.finish())
}
