//! A small text notation for patterns and values.
//!
//! ```
//! let template = notation::parse_pattern("{name: string(n), tags: [first, ...rest]}", 0).unwrap();
//! let subject = notation::parse_value(r#"{name: "ada", tags: ["a", "b"]}"#, 0).unwrap();
//! let bindings = patmat::match_pattern(template, &subject).unwrap().unwrap();
//! assert_eq!(bindings["n"], patmat::Value::from("ada"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod lower;
pub mod parser;

pub use error::ParseError;

use patmat::{Template, Value};

use crate::ast::Node;
use crate::lower::Lowerer;
use crate::parser::NotationParser;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: impl Into<String>, file_id: usize) -> Self {
        Parser {
            source: source.into(),
            file_id,
        }
    }

    /// Parse the source into a syntax tree.
    pub fn parse(&self) -> Result<Node, ParseError> {
        let tokens = lexer::tokenize(&self.source, self.file_id)?;
        NotationParser::new(tokens, self.source.len(), self.file_id).parse()
    }

    pub fn parse_pattern(&self) -> Result<Template, ParseError> {
        Lowerer::new(self.file_id).pattern(&self.parse()?)
    }

    pub fn parse_value(&self) -> Result<Value, ParseError> {
        Lowerer::new(self.file_id).value(&self.parse()?)
    }
}

pub fn parse_pattern(source: &str, file_id: usize) -> Result<Template, ParseError> {
    Parser::new(source, file_id).parse_pattern()
}

pub fn parse_value(source: &str, file_id: usize) -> Result<Value, ParseError> {
    Parser::new(source, file_id).parse_value()
}
