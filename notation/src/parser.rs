use std::ops::Range;

use crate::ast::{Entry, Field, Item, Literal, Node, NodeKind};
use crate::error::ParseError;
use crate::lexer::{Spanned, Token};

/// Type tags accepted in `type(pattern)` guards.
const TYPE_NAMES: &[&str] = &[
    "boolean", "number", "string", "symbol", "sequence", "map", "object", "function",
];

pub struct NotationParser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Byte length of the source, used to point at the end of input.
    end: usize,
    file_id: usize,
}

impl NotationParser {
    pub fn new(tokens: Vec<Spanned>, end: usize, file_id: usize) -> Self {
        NotationParser {
            tokens,
            pos: 0,
            end,
            file_id,
        }
    }

    /// Parse one complete pattern; trailing tokens are an error.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        let node = self.parse_alt()?;
        if let Some(extra) = self.tokens.get(self.pos) {
            return Err(ParseError::error(
                format!("unexpected {} after pattern", extra.token.describe()),
                extra.span.clone(),
                self.file_id,
            ));
        }
        Ok(node)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> Option<Range<usize>> {
        if self.peek() == Some(expected) {
            self.advance().map(|s| s.span)
        } else {
            None
        }
    }

    fn error_here(&self, msg: impl Into<String>) -> ParseError {
        let span = match self.tokens.get(self.pos) {
            Some(spanned) => spanned.span.clone(),
            None => self.end..self.end,
        };
        ParseError::error(msg, span, self.file_id)
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => token.describe(),
            None => "end of input".to_string(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Range<usize>, ParseError> {
        match self.eat(&expected) {
            Some(span) => Ok(span),
            None => Err(self.error_here(format!(
                "expected {}, found {}",
                expected.describe(),
                self.found()
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    fn parse_alt(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_unary()?;
        if self.peek() != Some(&Token::Pipe) {
            return Ok(first);
        }
        let mut alternatives = vec![first];
        while self.eat(&Token::Pipe).is_some() {
            alternatives.push(self.parse_unary()?);
        }
        let span = alternatives[0].span.start..alternatives[alternatives.len() - 1].span.end;
        Ok(Node {
            kind: NodeKind::OneOf(alternatives),
            span,
        })
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        if let (Some(Token::Ident(_)), Some(Token::At)) = (self.peek(), self.peek_second()) {
            let Some(Spanned {
                token: Token::Ident(name),
                span,
            }) = self.advance()
            else {
                return Err(self.error_here("expected a binding name"));
            };
            self.advance();
            let pattern = self.parse_unary()?;
            let span = span.start..pattern.span.end;
            return Ok(Node {
                kind: NodeKind::Bind {
                    name,
                    pattern: Box::new(pattern),
                },
                span,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let Some(Spanned { token, span }) = self.advance() else {
            return Err(self.error_here("expected a pattern, found end of input"));
        };

        match token {
            Token::Underscore => Ok(Node {
                kind: NodeKind::Ignore,
                span,
            }),

            Token::Ident(name) => {
                if self.peek() != Some(&Token::LParen) {
                    return Ok(Node {
                        kind: NodeKind::Capture(name),
                        span,
                    });
                }
                if !TYPE_NAMES.contains(&name.as_str()) {
                    return Err(ParseError::error(
                        format!("unknown type `{}`", name),
                        span,
                        self.file_id,
                    )
                    .with_note(format!("known types: {}", TYPE_NAMES.join(", "))));
                }
                self.advance();
                let pattern = self.parse_alt()?;
                let close = self.expect(Token::RParen)?;
                Ok(Node {
                    kind: NodeKind::Type {
                        type_name: name,
                        pattern: Box::new(pattern),
                    },
                    span: span.start..close.end,
                })
            }

            Token::LParen => {
                let inner = self.parse_alt()?;
                let close = self.expect(Token::RParen)?;
                Ok(Node {
                    kind: inner.kind,
                    span: span.start..close.end,
                })
            }

            Token::LBracket => self.parse_sequence(span.start),
            Token::LBrace => self.parse_object(span.start),
            Token::HashBrace => self.parse_map(span.start),

            Token::Number(_)
            | Token::StringLit(_)
            | Token::True
            | Token::False
            | Token::Null
            | Token::Undefined
            | Token::Minus => {
                let (literal, span) = self.literal_from(token, span)?;
                self.parse_after_literal(literal, span)
            }

            other => Err(ParseError::error(
                format!("expected a pattern, found {}", other.describe()),
                span,
                self.file_id,
            )),
        }
    }

    /// Ranges and string prefixes start with a literal.
    fn parse_after_literal(
        &mut self,
        literal: Literal,
        span: Range<usize>,
    ) -> Result<Node, ParseError> {
        let inclusive = match self.peek() {
            Some(Token::DotDot) => false,
            Some(Token::DotDotEq) => true,
            Some(Token::PlusPlus) => {
                let Literal::String(prefix) = literal else {
                    return Err(self.error_here("`++` must follow a string prefix"));
                };
                self.advance();
                let pattern = self.parse_unary()?;
                let span = span.start..pattern.span.end;
                return Ok(Node {
                    kind: NodeKind::Prefix {
                        prefix,
                        pattern: Box::new(pattern),
                    },
                    span,
                });
            }
            _ => {
                return Ok(Node {
                    kind: NodeKind::Literal(literal),
                    span,
                });
            }
        };
        self.advance();
        let (upper, upper_span) = self.parse_literal()?;
        Ok(Node {
            kind: NodeKind::Range {
                lower: literal,
                upper,
                inclusive,
            },
            span: span.start..upper_span.end,
        })
    }

    fn parse_literal(&mut self) -> Result<(Literal, Range<usize>), ParseError> {
        let Some(Spanned { token, span }) = self.advance() else {
            return Err(self.error_here("expected a literal, found end of input"));
        };
        self.literal_from(token, span)
    }

    fn literal_from(
        &mut self,
        token: Token,
        span: Range<usize>,
    ) -> Result<(Literal, Range<usize>), ParseError> {
        let literal = match token {
            Token::Number(n) => Literal::Number(n),
            Token::StringLit(s) => Literal::String(s),
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::Null => Literal::Null,
            Token::Undefined => Literal::Undefined,
            Token::Minus => match self.advance() {
                Some(Spanned {
                    token: Token::Number(n),
                    span: number,
                }) => return Ok((Literal::Number(-n), span.start..number.end)),
                _ => {
                    return Err(ParseError::error(
                        "expected a number after `-`",
                        span,
                        self.file_id,
                    ));
                }
            },
            other => {
                return Err(ParseError::error(
                    format!("expected a literal, found {}", other.describe()),
                    span,
                    self.file_id,
                ));
            }
        };
        Ok((literal, span))
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    /// Runs `item` for each comma-separated element until `close`.
    fn parse_delimited<T>(
        &mut self,
        close: Token,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(Vec<T>, usize), ParseError> {
        let mut items = Vec::new();
        loop {
            if let Some(span) = self.eat(&close) {
                return Ok((items, span.end));
            }
            items.push(item(self)?);
            if self.eat(&Token::Comma).is_none() {
                let span = self.expect(close)?;
                return Ok((items, span.end));
            }
        }
    }

    fn parse_sequence(&mut self, start: usize) -> Result<Node, ParseError> {
        let (items, end) = self.parse_delimited(Token::RBracket, |p| {
            if p.eat(&Token::Ellipsis).is_some() {
                Ok(Item::Spread(p.parse_unary()?))
            } else {
                Ok(Item::Element(p.parse_alt()?))
            }
        })?;
        Ok(Node {
            kind: NodeKind::Sequence(items),
            span: start..end,
        })
    }

    fn parse_object(&mut self, start: usize) -> Result<Node, ParseError> {
        let (fields, end) = self.parse_delimited(Token::RBrace, |p| {
            if p.eat(&Token::Ellipsis).is_some() {
                return Ok(Field::Spread(p.parse_unary()?));
            }
            let key = match p.peek() {
                Some(Token::Ident(name) | Token::StringLit(name)) => name.clone(),
                _ => {
                    return Err(
                        p.error_here(format!("expected a property name, found {}", p.found()))
                    );
                }
            };
            p.advance();
            p.expect(Token::Colon)?;
            Ok(Field::Property(key, p.parse_alt()?))
        })?;
        Ok(Node {
            kind: NodeKind::Object(fields),
            span: start..end,
        })
    }

    fn parse_map(&mut self, start: usize) -> Result<Node, ParseError> {
        let (entries, end) = self.parse_delimited(Token::RBrace, |p| {
            if p.eat(&Token::Ellipsis).is_some() {
                return Ok(Entry::Spread(p.parse_unary()?));
            }
            let (key, _) = p.parse_literal()?;
            p.expect(Token::Colon)?;
            Ok(Entry::Pair(key, p.parse_alt()?))
        })?;
        Ok(Node {
            kind: NodeKind::Map(entries),
            span: start..end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Node, ParseError> {
        NotationParser::new(tokenize(source, 0)?, source.len(), 0).parse()
    }

    #[test]
    fn bind_is_right_associative() {
        let node = parse("a @ b @ 1").unwrap();
        let NodeKind::Bind { name, pattern } = node.kind else {
            panic!("expected bind");
        };
        assert_eq!(name, "a");
        assert!(matches!(pattern.kind, NodeKind::Bind { ref name, .. } if name == "b"));
        assert_eq!(node.span, 0..9);
    }

    #[test]
    fn alternation_spans_every_branch() {
        let node = parse("1 | 2 | x").unwrap();
        assert!(matches!(&node.kind, NodeKind::OneOf(alts) if alts.len() == 3));
        assert_eq!(node.span, 0..9);
    }

    #[test]
    fn ranges_and_negative_bounds() {
        let node = parse("-5..=5").unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Range {
                lower: Literal::Number(-5.0),
                upper: Literal::Number(5.0),
                inclusive: true,
            }
        );
    }

    #[test]
    fn containers_with_spreads() {
        let node = parse("[x, ...xs]").unwrap();
        let NodeKind::Sequence(items) = node.kind else {
            panic!("expected sequence");
        };
        assert!(matches!(items[1], Item::Spread(_)));

        let node = parse(r#"{x: 1, "y z": _, ...rest}"#).unwrap();
        assert!(matches!(&node.kind, NodeKind::Object(fields) if fields.len() == 3));

        let node = parse("#{1: a, ...rest,}").unwrap();
        assert!(matches!(&node.kind, NodeKind::Map(entries) if entries.len() == 2));
    }

    #[test]
    fn type_guards_need_a_known_type() {
        let node = parse("string(s)").unwrap();
        assert!(matches!(node.kind, NodeKind::Type { ref type_name, .. } if type_name == "string"));

        let err = parse("strng(s)").unwrap_err();
        assert_eq!(err.message, "unknown type `strng`");
        assert_eq!(err.span, 0..5);
        assert_eq!(err.notes.len(), 1);
    }

    #[test]
    fn errors_point_at_the_problem() {
        let err = parse("[1, 2").unwrap_err();
        assert_eq!(err.message, "expected `]`, found end of input");
        assert_eq!(err.span, 5..5);

        let err = parse("x y").unwrap_err();
        assert_eq!(err.message, "unexpected identifier `y` after pattern");
        assert_eq!(err.span, 2..3);

        let err = parse("{1: x}").unwrap_err();
        assert_eq!(err.message, "expected a property name, found number `1`");

        let err = parse("1 ++ x").unwrap_err();
        assert_eq!(err.message, "`++` must follow a string prefix");
    }
}
