use std::fmt;

use crate::bindings::Bindings;
use crate::error::PatternError;
use crate::pattern::Pattern;
use crate::template::Template;
use crate::value::Value;

type Handler<R> = Box<dyn Fn(Bindings) -> R + Send + Sync>;

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

/// Single-value dispatch: the first registered pattern that matches picks
/// the handler.
///
/// ```
/// use patmat::{Cases, Value};
/// use patmat::is::{id, ignore};
///
/// let describe = Cases::new()
///     .case(0, |_| "zero".to_string())
///     .case(id("n"), |b| format!("number {}", b["n"]))
///     .case(ignore(), |_| "other".to_string());
///
/// assert_eq!(describe.dispatch(&Value::from(0)).unwrap(), "zero");
/// assert_eq!(describe.dispatch(&Value::from(7)).unwrap(), "number 7");
/// ```
pub struct Cases<R> {
    cases: Vec<(Pattern, Handler<R>)>,
}

impl<R> Cases<R> {
    pub fn new() -> Self {
        Cases { cases: Vec::new() }
    }

    pub fn case(
        mut self,
        template: impl Into<Template>,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self {
        self.cases.push((Pattern::of(template), Box::new(handler)));
        self
    }

    /// Like [`Cases::case`], but the handler only runs when `guard` accepts
    /// the bindings.
    pub fn case_guarded(
        mut self,
        template: impl Into<Template>,
        guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self {
        self.cases
            .push((Pattern::guarded(template, guard), Box::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    #[tracing::instrument(level = "trace", skip_all, fields(value = %value))]
    pub fn dispatch(&self, value: &Value) -> Result<R, PatternError> {
        for (index, (pattern, handler)) in self.cases.iter().enumerate() {
            if let Some(bindings) = pattern.match_value(value)? {
                tracing::trace!(case = index, "case matched");
                return Ok(handler(bindings));
            }
        }
        Err(PatternError::NoCaseMatched)
    }

    /// Turn the registry into a plain function.
    pub fn into_fn(self) -> impl Fn(&Value) -> Result<R, PatternError> {
        move |value: &Value| self.dispatch(value)
    }
}

impl<R> Default for Cases<R> {
    fn default() -> Self {
        Cases::new()
    }
}

impl<R> fmt::Debug for Cases<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cases")
            .field("patterns", &self.cases.iter().map(|(p, _)| p).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

/// Multi-argument dispatch: each clause is a list of patterns matched
/// positionally against the argument list.
pub struct Clauses<R> {
    clauses: Vec<(Pattern, Handler<R>)>,
}

impl<R> Clauses<R> {
    pub fn new() -> Self {
        Clauses {
            clauses: Vec::new(),
        }
    }

    /// Register a clause. Rest markers inside `patterns` collect trailing
    /// arguments.
    pub fn clause<I>(
        self,
        patterns: I,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Template>,
    {
        let pattern = arguments(patterns, None);
        self.push(pattern, handler)
    }

    /// Register a clause whose trailing arguments are matched by `rest`.
    pub fn clause_with_rest<I>(
        self,
        patterns: I,
        rest: impl Into<Template>,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Template>,
    {
        let pattern = arguments(patterns, Some(rest.into()));
        self.push(pattern, handler)
    }

    pub fn clause_guarded<I>(
        self,
        patterns: I,
        guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Template>,
    {
        let pattern = Pattern::guarded(arguments(patterns, None), guard);
        self.push(pattern, handler)
    }

    pub fn clause_guarded_with_rest<I>(
        self,
        patterns: I,
        rest: impl Into<Template>,
        guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Template>,
    {
        let pattern = Pattern::guarded(arguments(patterns, Some(rest.into())), guard);
        self.push(pattern, handler)
    }

    fn push(
        mut self,
        pattern: Pattern,
        handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
    ) -> Self {
        self.clauses.push((pattern, Box::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[tracing::instrument(level = "trace", skip_all, fields(arity = args.len()))]
    pub fn call(&self, args: &[Value]) -> Result<R, PatternError> {
        let subject = Value::sequence(args.iter().cloned());
        for (index, (pattern, handler)) in self.clauses.iter().enumerate() {
            if let Some(bindings) = pattern.match_value(&subject)? {
                tracing::trace!(clause = index, "clause matched");
                return Ok(handler(bindings));
            }
        }
        Err(PatternError::NoClauseMatched)
    }

    pub fn into_fn(self) -> impl Fn(&[Value]) -> Result<R, PatternError> {
        move |args: &[Value]| self.call(args)
    }
}

fn arguments<I>(patterns: I, rest: Option<Template>) -> Pattern
where
    I: IntoIterator,
    I::Item: Into<Template>,
{
    let items = patterns.into_iter().map(Into::into).collect();
    Pattern::sequence_of(items, rest)
}

impl<R> Default for Clauses<R> {
    fn default() -> Self {
        Clauses::new()
    }
}

impl<R> fmt::Debug for Clauses<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clauses")
            .field(
                "patterns",
                &self.clauses.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

/// Start a [`Cases`] registry with one case.
pub fn case<R>(
    template: impl Into<Template>,
    handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
) -> Cases<R> {
    Cases::new().case(template, handler)
}

pub fn case_guarded<R>(
    template: impl Into<Template>,
    guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
    handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
) -> Cases<R> {
    Cases::new().case_guarded(template, guard, handler)
}

/// Start a [`Clauses`] registry with one clause.
pub fn clause<R, I>(
    patterns: I,
    handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
) -> Clauses<R>
where
    I: IntoIterator,
    I::Item: Into<Template>,
{
    Clauses::new().clause(patterns, handler)
}

pub fn clause_guarded<R, I>(
    patterns: I,
    guard: impl Fn(&Bindings) -> bool + Send + Sync + 'static,
    handler: impl Fn(Bindings) -> R + Send + Sync + 'static,
) -> Clauses<R>
where
    I: IntoIterator,
    I::Item: Into<Template>,
{
    Clauses::new().clause_guarded(patterns, guard, handler)
}
