use std::collections::HashMap;
use std::ops::Range;

use patmat::{Pattern, PropertyKey, Symbol, Template, Value};

use crate::ast::{Entry, Field, Item, Literal, Node, NodeKind};
use crate::error::ParseError;

/// Turns parsed nodes into engine templates and values.
pub struct Lowerer {
    file_id: usize,
}

impl Lowerer {
    pub fn new(file_id: usize) -> Self {
        Lowerer { file_id }
    }

    fn error(&self, msg: impl Into<String>, span: &Range<usize>) -> ParseError {
        ParseError::error(msg, span.clone(), self.file_id)
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    pub fn pattern(&self, node: &Node) -> Result<Template, ParseError> {
        let template = match &node.kind {
            NodeKind::Ignore => Pattern::ignore().into(),
            NodeKind::Capture(name) => Pattern::id(name.as_str()).into(),
            NodeKind::Bind { name, pattern } => {
                Pattern::bind(self.pattern(pattern)?, name.as_str()).into()
            }
            NodeKind::Type { type_name, pattern } => {
                Pattern::type_of(type_name.as_str(), self.pattern(pattern)?).into()
            }
            NodeKind::Range {
                lower,
                upper,
                inclusive,
            } => {
                let (Literal::Number(lower), Literal::Number(upper)) = (lower, upper) else {
                    return Err(self.error("range bounds must be numbers", &node.span));
                };
                Pattern::range(*lower, *upper, !inclusive).into()
            }
            NodeKind::Prefix { prefix, pattern } => {
                Pattern::string(prefix.as_str(), self.pattern(pattern)?).into()
            }
            NodeKind::Literal(literal) => Template::Value(literal_value(literal)),
            NodeKind::Sequence(items) => {
                self.check_single_spread(
                    items.iter().filter_map(|item| match item {
                        Item::Spread(node) => Some(node),
                        Item::Element(_) => None,
                    }),
                )?;
                self.check_trailing_spread(items)?;
                let items = items
                    .iter()
                    .map(|item| match item {
                        Item::Element(node) => self.pattern(node),
                        Item::Spread(node) => Ok(Template::rest(self.pattern(node)?)),
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Template::Sequence(items)
            }
            NodeKind::Object(fields) => {
                self.check_fields(fields)?;
                let fields = fields
                    .iter()
                    .map(|field| match field {
                        Field::Property(key, node) => {
                            Ok((PropertyKey::from(key.as_str()), self.pattern(node)?))
                        }
                        Field::Spread(node) => {
                            Ok((PropertyKey::from(Symbol::rest()), self.pattern(node)?))
                        }
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Template::Object(fields)
            }
            NodeKind::Map(entries) => {
                self.check_single_spread(entries.iter().filter_map(|entry| match entry {
                    Entry::Spread(node) => Some(node),
                    Entry::Pair(..) => None,
                }))?;
                let entries = entries
                    .iter()
                    .map(|entry| match entry {
                        Entry::Pair(key, node) => Ok((literal_value(key), self.pattern(node)?)),
                        Entry::Spread(node) => {
                            Ok((Value::Symbol(Symbol::rest()), self.pattern(node)?))
                        }
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Template::Map(entries)
            }
            NodeKind::OneOf(alternatives) => {
                let alternatives = alternatives
                    .iter()
                    .map(|node| self.pattern(node))
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Pattern::one_of(alternatives).into()
            }
        };
        Ok(template)
    }

    fn check_single_spread<'a>(
        &self,
        mut spreads: impl Iterator<Item = &'a Node>,
    ) -> Result<(), ParseError> {
        if let (Some(first), Some(second)) = (spreads.next(), spreads.next()) {
            return Err(self
                .error("only one spread is allowed here", &second.span)
                .with_related(first.span.clone(), "first spread here")
                .with_note("the first spread already collects the remaining elements"));
        }
        Ok(())
    }

    fn check_trailing_spread(&self, items: &[Item]) -> Result<(), ParseError> {
        let Some((_, init)) = items.split_last() else {
            return Ok(());
        };
        match init.iter().find_map(|item| match item {
            Item::Spread(node) => Some(node),
            Item::Element(_) => None,
        }) {
            Some(spread) => Err(self
                .error("a spread must be the last element of a sequence", &spread.span)
                .with_note("the spread collects every element after the preceding patterns")),
            None => Ok(()),
        }
    }

    fn check_fields(&self, fields: &[Field]) -> Result<(), ParseError> {
        self.check_single_spread(fields.iter().filter_map(|field| match field {
            Field::Spread(node) => Some(node),
            Field::Property(..) => None,
        }))?;
        let mut seen = HashMap::new();
        for field in fields {
            let Field::Property(key, node) = field else {
                continue;
            };
            if let Some(first) = seen.insert(key.as_str(), &node.span) {
                return Err(self
                    .error(format!("duplicate property `{}`", key), &node.span)
                    .with_related(first.clone(), "first defined here"));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    pub fn value(&self, node: &Node) -> Result<Value, ParseError> {
        match &node.kind {
            NodeKind::Literal(literal) => Ok(literal_value(literal)),
            NodeKind::Sequence(items) => {
                let items = items
                    .iter()
                    .map(|item| match item {
                        Item::Element(node) => self.value(node),
                        Item::Spread(node) => Err(self.not_a_value("a spread", node)),
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Ok(Value::from(items))
            }
            NodeKind::Object(fields) => {
                self.check_fields(fields)?;
                let properties = fields
                    .iter()
                    .map(|field| match field {
                        Field::Property(key, node) => Ok((key.as_str(), self.value(node)?)),
                        Field::Spread(node) => Err(self.not_a_value("a spread", node)),
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Ok(Value::object(properties))
            }
            NodeKind::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|entry| match entry {
                        Entry::Pair(key, node) => Ok((literal_value(key), self.value(node)?)),
                        Entry::Spread(node) => Err(self.not_a_value("a spread", node)),
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Ok(Value::map(entries))
            }
            NodeKind::Ignore => Err(self.not_a_value("`_`", node)),
            NodeKind::Capture(name) => Err(self.not_a_value(&format!("capture `{}`", name), node)),
            NodeKind::Bind { .. } => Err(self.not_a_value("a bind pattern", node)),
            NodeKind::Type { .. } => Err(self.not_a_value("a type guard", node)),
            NodeKind::Range { .. } => Err(self.not_a_value("a range", node)),
            NodeKind::Prefix { .. } => Err(self.not_a_value("a string prefix", node)),
            NodeKind::OneOf(_) => Err(self.not_a_value("an alternation", node)),
        }
    }

    fn not_a_value(&self, what: &str, node: &Node) -> ParseError {
        self.error(format!("{} is not allowed in a value", what), &node.span)
            .with_note("values are literals, sequences, objects and maps")
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::from(s.as_str()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
        Literal::Undefined => Value::Undefined,
    }
}
