//! Errors the Warden's dispatch loop can raise.

use std::error::Error as StdError;

/// Raised by [`crate::warden::Warden::call`].
///
/// There is no `InvalidStage` variant: unlike the source, which finalizes
/// raw descriptors at runtime, `overseer_warden` finalizes at construction
/// over a typed [`crate::stage::StageDescriptor`] enum, so an invalid
/// descriptor is a compile error rather than a runtime one.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// `env.interrupted` was observed set at a checkpoint.
    #[error("warden interrupted")]
    Interrupt,

    /// A stage's `call` failed; the wrapped error is the middleware's own.
    #[error("stage failed: {0}")]
    Stage(#[source] Box<dyn StdError + Send + Sync>),
}
