//! Closers: deferred actions registered with a scope and run exactly once
//! during `close()` (GLOSSARY: Closer).

use std::error::Error as StdError;

use async_trait::async_trait;

/// A deferred action run once during a Basis/Project's `close()`.
#[async_trait]
pub trait Closer: Send + Sync {
    /// Runs the close action.
    async fn close(&self) -> Result<(), Box<dyn StdError + Send + Sync>>;
}
