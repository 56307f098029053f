//! The `Ui` capability Basis/Project default when none is supplied
//! (`# 4.E` step 4), plus the RAII status-indicator guard the Dynamic
//! Invoker relies on to guarantee closure on every return path (`# 4.B`).

/// User-facing output surface a Basis/Project/command dispatch writes
/// through. Terminal rendering proper is out of scope; this is the seam a
/// real CLI layer would implement against.
pub trait Ui: Send + Sync {
    /// Writes an informational line.
    fn say(&self, message: &str);

    /// Writes a warning line.
    fn warn(&self, message: &str);

    /// Begins showing a status indicator with `message`.
    fn begin_status(&self, message: &str);

    /// Clears the current status indicator, if any.
    fn clear_status(&self);
}

/// RAII guard returned by [`status`]: clears the status indicator when
/// dropped, on every return path including an early return or an unwind.
pub struct StatusGuard<'a> {
    ui: &'a dyn Ui,
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.ui.clear_status();
    }
}

/// Opens a status indicator on `ui` and returns a guard that closes it.
#[must_use]
pub fn status<'a>(ui: &'a dyn Ui, message: &str) -> StatusGuard<'a> {
    ui.begin_status(message);
    StatusGuard { ui }
}

/// A scope-derived logging handle: wraps the `tracing` target namespace a
/// Basis/Project picked at construction (`# 4.E` step 2 — trace vs
/// non-trace roots derive different namespaces) and hands it to every
/// Dynamic Invoker call as a default-injected arg (`# 4.B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    target: &'static str,
}

impl Logger {
    /// Wraps `target`, the `tracing` target this logger writes under.
    #[must_use]
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }

    /// The wrapped `tracing` target.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Writes a debug-level line tagged with the wrapped namespace.
    pub fn debug(&self, message: &str) {
        tracing::debug!(target: "overseer::scope", namespace = self.target, "{message}");
    }
}

/// A [`Ui`] that writes through `tracing`, used as the Basis/Project default
/// when the caller supplies none (`# 4.E` step 4).
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleUi;

impl Ui for ConsoleUi {
    fn say(&self, message: &str) {
        tracing::info!(target: "overseer::ui", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "overseer::ui", "{message}");
    }

    fn begin_status(&self, message: &str) {
        tracing::debug!(target: "overseer::ui::status", "begin: {message}");
    }

    fn clear_status(&self) {
        tracing::debug!(target: "overseer::ui::status", "clear");
    }
}
