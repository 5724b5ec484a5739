use crate::value::Value;

/// Primitive values are matched by equality when used as a raw pattern.
/// Everything else is a container or an opaque reference.
pub fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Symbol(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    #[test]
    fn primitives() {
        for value in [
            Value::Undefined,
            Value::Null,
            Value::from(true),
            Value::from(1),
            Value::from("s"),
            Value::from(Symbol::new("s")),
        ] {
            assert!(is_primitive(&value), "{} should be primitive", value);
        }
    }

    #[test]
    fn non_primitives() {
        for value in [
            Value::sequence(Vec::<Value>::new()),
            Value::map(Vec::<(Value, Value)>::new()),
            Value::object([("x", 1)]),
            Value::function(|_| Value::Undefined),
        ] {
            assert!(!is_primitive(&value), "{} should not be primitive", value);
        }
    }
}
