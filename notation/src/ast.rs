use std::ops::Range;

/// A parsed pattern or value, before lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `_`
    Ignore,
    /// `name`
    Capture(String),
    /// `name @ pattern`
    Bind { name: String, pattern: Box<Node> },
    /// `number(pattern)`
    Type { type_name: String, pattern: Box<Node> },
    /// `lo..hi` or `lo..=hi`
    Range {
        lower: Literal,
        upper: Literal,
        inclusive: bool,
    },
    /// `"prefix" ++ pattern`
    Prefix { prefix: String, pattern: Box<Node> },
    Literal(Literal),
    /// `[a, b, ...rest]`
    Sequence(Vec<Item>),
    /// `{key: pattern, ...rest}`
    Object(Vec<Field>),
    /// `#{literal: pattern, ...rest}`
    Map(Vec<Entry>),
    /// `a | b | c`
    OneOf(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Element(Node),
    Spread(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Property(String, Node),
    Spread(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Pair(Literal, Node),
    Spread(Node),
}
