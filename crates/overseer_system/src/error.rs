//! Error types for the factory registry, dynamic invoker, specialization, and
//! the aggregator fan-out operations build on.

use std::fmt;

/// Errors raised by [`crate::registry::FactoryRegistry`] lookups.
///
/// No side effects accompany either variant — a failed lookup never mutates
/// the registry.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// No factory has ever been registered under this kind.
    #[error("unknown component kind: {0}")]
    UnknownKind(crate::kind::ComponentKind),

    /// The kind is known but no factory is registered under this name.
    #[error("unknown factory name '{name}' for kind {kind}")]
    UnknownName {
        /// The kind that was looked up.
        kind: crate::kind::ComponentKind,
        /// The name that was not found.
        name: String,
    },

    /// A factory's construction required an input the caller's
    /// [`crate::registry::InjectedArgs`] did not satisfy, by neither type nor
    /// name (`# 4.B`'s `ArgumentUnsatisfied`, surfaced at the factory seam).
    #[error(transparent)]
    MissingArgument(#[from] crate::error::InvokerError),
}

/// Errors raised while the [`crate::invoker::DynamicInvoker`] assembles and
/// dispatches a call.
#[derive(Debug, thiserror::Error)]
pub enum InvokerError {
    /// A declared input had no matching entry in the supplied args, by
    /// neither type nor name.
    #[error("argument unsatisfied: {0}")]
    ArgumentUnsatisfied(String),

    /// The callee's return value did not match the type the caller asserted.
    #[error("return value does not match the expected type")]
    ReturnTypeMismatch,

    /// The underlying plugin call itself failed; the wrapped error is the
    /// invocation failure, bubbled verbatim.
    #[error(transparent)]
    Invocation(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Raised by [`crate::instance::specialize`] when the target value does not
/// expose the metadata-setting capability.
#[derive(Debug, thiserror::Error)]
#[error("plugin value is not specializable")]
pub struct NotSpecializable;

/// An immutable, flattening collection of errors produced by fan-out
/// operations (`close`, `save_full`).
///
/// `append` is the only way to build one up; a `None` accumulator appended
/// with an error is that error's aggregate of one, and appending an
/// aggregate into an aggregate flattens rather than nesting, so
/// `Display`/`iter` never show aggregate-of-aggregate structure.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<Box<dyn std::error::Error + Send + Sync>>,
}

impl AggregateError {
    /// Returns an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Returns `true` if no error has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of flattened errors recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Appends a single error.
    pub fn push(&mut self, err: impl std::error::Error + Send + Sync + 'static) {
        self.errors.push(Box::new(err));
    }

    /// Appends another aggregate's errors, flattened, consuming it.
    pub fn extend(&mut self, other: AggregateError) {
        self.errors.extend(other.errors);
    }

    /// Returns `self` as `Some` if non-empty, `None` otherwise — the shape
    /// callers that "never raise, only report" return from `close`/`save_full`.
    #[must_use]
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// Iterates the flattened errors in append order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn std::error::Error + Send + Sync)> {
        self.errors.iter().map(AsRef::as_ref)
    }
}

/// Appends `err` (if any) onto `agg`, returning the (possibly newly created)
/// aggregate. A `None` input is identity; a single-element aggregate behaves
/// like the raw error for `Display` purposes.
pub fn append(
    agg: Option<AggregateError>,
    err: Option<impl std::error::Error + Send + Sync + 'static>,
) -> Option<AggregateError> {
    let Some(err) = err else { return agg };
    let mut agg = agg.unwrap_or_default();
    agg.push(err);
    Some(agg)
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            return write!(f, "{}", self.errors[0]);
        }
        write!(f, "{} errors occurred:", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom {0}")]
    struct Boom(u32);

    #[test]
    fn append_identity_on_none() {
        let agg = append(None::<AggregateError>, None::<Boom>);
        assert!(agg.is_none());
    }

    #[test]
    fn single_element_reads_like_raw_error() {
        let agg = append(None, Some(Boom(1))).unwrap();
        assert_eq!(agg.to_string(), "boom 1");
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn extend_flattens_nested_aggregates() {
        let mut a = AggregateError::new();
        a.push(Boom(1));
        let mut b = AggregateError::new();
        b.push(Boom(2));
        b.push(Boom(3));

        a.extend(b);
        assert_eq!(a.len(), 3);
        assert!(a.to_string().contains("3 errors occurred"));
    }

    #[test]
    fn into_option_is_none_when_empty() {
        let agg = AggregateError::new();
        assert!(agg.into_option().is_none());
    }
}
