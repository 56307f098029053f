//! Error taxonomy for Basis/Project construction, dispatch, and shutdown.

use overseer_system::{FactoryError, InvokerError, NotSpecializable};
use thiserror::Error;

/// Errors raised while applying Basis/Project options (`# 4.E` step 1).
#[derive(Debug, Error)]
pub enum OptionError {
    /// The name option was empty or all-whitespace.
    #[error("name must not be empty")]
    EmptyName,

    /// Two mappers were registered under the same name.
    #[error("duplicate mapper name: {0}")]
    DuplicateMapper(String),
}

/// Fatal construction errors (`# 4.E` step 3: "each missing is a distinct
/// fatal").
#[derive(Debug, Error)]
pub enum ConstructError {
    /// Option application failed; see the wrapped aggregate for every
    /// misuse, not just the first.
    #[error(transparent)]
    Options(#[from] overseer_system::AggregateError),

    /// Neither an existing resource id nor an unresolved-but-named record
    /// was supplied, and the Persistence Client could not be reached to
    /// mint one.
    #[error("basis record could not be resolved: {0}")]
    MissingRecord(String),

    /// No Persistence Client was supplied.
    #[error("no persistence client configured")]
    MissingClient,

    /// No factory registry was supplied.
    #[error("no factory registry configured")]
    MissingFactories,

    /// No data directory was supplied and none could be derived.
    #[error("no data directory configured")]
    MissingDataDir,
}

/// Errors from `Basis`/`Project` dispatch and shutdown operations.
#[derive(Debug, Error)]
pub enum BasisError {
    /// The scope has already been closed; save/run/load are undefined past
    /// that point and this core reports rather than silently proceeding.
    #[error("basis is closed")]
    Closed,

    /// No factory matched the requested command.
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// The resolved plugin value does not expose the `CommandPlugin`
    /// capability.
    #[error("component '{0}' is not a command plugin")]
    NotCommand(String),

    /// Specialization failed before dispatch.
    #[error(transparent)]
    Specialize(#[from] NotSpecializable),

    /// The Dynamic Invoker failed to assemble or dispatch the call.
    #[error(transparent)]
    Invoke(#[from] InvokerError),

    /// The task's plugin ran but returned a non-zero result.
    #[error("task failed with status {0}")]
    TaskFailed(i64),

    /// The Persistence Client reported an error.
    #[error(transparent)]
    Persistence(#[from] overseer_system::PersistenceError),

    /// Option validation failed while constructing a child project.
    #[error(transparent)]
    InvalidOptions(#[from] overseer_system::AggregateError),
}
