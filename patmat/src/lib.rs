//! Structural pattern matching over dynamic values.
//!
//! A [`Template`] describes the expected shape of a [`Value`]; [`Pattern::of`]
//! normalizes it into a [`Pattern`], and [`Pattern::extract`] decides whether
//! a value conforms and which sub-values are bound to which names.

pub mod bindings;
pub mod class;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod functions;
pub mod is;
pub mod keyed_map;
pub mod pattern;
pub mod symbol;
pub mod template;
pub mod union;
pub mod value;

pub use bindings::Bindings;
pub use class::Class;
pub use classify::is_primitive;
pub use dispatch::{Cases, Clauses, case, case_guarded, clause, clause_guarded};
pub use error::PatternError;
pub use functions::{match_pattern, matcher, test, tester};
pub use keyed_map::KeyedMap;
pub use pattern::{Extraction, Extractor, Guard, Pattern, PatternKind, Predicate, Transform};
pub use symbol::{PropertyKey, Symbol};
pub use template::Template;
pub use union::{Union, Variant, VariantKind};
pub use value::{Function, Object, Value};
