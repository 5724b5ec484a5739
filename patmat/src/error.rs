use thiserror::Error;

/// Programmer and consistency errors.
///
/// A pattern that simply does not match is not an error: extraction reports
/// it as `Ok(None)`. These variants mean a pattern, registry or union was
/// used in a way that can never be correct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("sequence pattern requires a sequence of patterns, got {got}")]
    NotASequence { got: &'static str },

    #[error("map pattern requires a keyed map of patterns, got {got}")]
    NotAKeyedMap { got: &'static str },

    #[error("object pattern requires an object of patterns, got {got}")]
    NotAnObject { got: &'static str },

    #[error(
        "cannot bind `{name}`: the contained pattern already binds a name `{name}`"
    )]
    BindingCollision { name: String },

    #[error("no case matched the given value")]
    NoCaseMatched,

    #[error("no clause matched the given arguments")]
    NoClauseMatched,

    #[error("class `{class}` may not be instantiated")]
    AbstractInstantiation { class: String },

    #[error("variant kind must be one of \"value\" or \"array\", got \"{kind}\"")]
    InvalidVariantKind { kind: String },
}
