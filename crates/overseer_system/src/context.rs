//! The outbound `Context`: carries cancellation and a tracing span parent
//! through Persistence Client calls and Dynamic Invoker dispatch.

use tokio_util::sync::CancellationToken;

/// Cancellation-and-tracing handle threaded through remote calls.
///
/// `# 5` names the context as one of the two places cancellation is
/// observed (the other being the Warden env's `interrupted` flag).
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
}

impl Context {
    /// Returns a fresh, non-cancelled context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a child context: cancelling the parent cancels the child,
    /// but cancelling the child does not affect the parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
        }
    }

    /// Requests cancellation of this context and all its children.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_not_cancelled() {
        assert!(!Context::new().is_cancelled());
    }

    #[test]
    fn cancelling_parent_cancels_child() {
        let parent = Context::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn cancelling_child_does_not_cancel_parent() {
        let parent = Context::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }
}
