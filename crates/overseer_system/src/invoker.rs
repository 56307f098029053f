//! Dynamic Invoker: the small dependency-injection layer `# 9 DESIGN NOTES`
//! calls for in place of the source's reflective method lookup — a
//! deterministic resolver over a typed arg vector ([`InjectedArgs`]),
//! plus the UI-status and return-type-assertion behavior `# 4.B` specifies.

use std::any::Any;
use std::error::Error as StdError;
use std::future::Future;

use crate::error::InvokerError;
use crate::registry::InjectedArgs;
use crate::ui::{Ui, status};

/// Resolves declared inputs from an [`InjectedArgs`] bag and dispatches a
/// call, closing the UI status indicator on every return path.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicInvoker;

impl DynamicInvoker {
    /// Returns a new invoker. Stateless — kept as a type for call-site
    /// symmetry with the Factory Registry and for future cross-cutting
    /// concerns (e.g. call metrics) without changing call sites.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves a single declared input of type `T` from `args`, trying the
    /// type table first and `name` second. Fails with
    /// [`InvokerError::ArgumentUnsatisfied`] if neither matches.
    pub fn resolve<'a, T: Any + Send + Sync>(
        &self,
        args: &'a InjectedArgs,
        name: &str,
    ) -> Result<&'a T, InvokerError> {
        args.resolve::<T>(name)
            .ok_or_else(|| InvokerError::ArgumentUnsatisfied(name.to_string()))
    }

    /// Invokes `call`, opening a UI status indicator for its duration and
    /// guaranteeing it closes on every return path (success, error, or
    /// unwind), per `# 4.B`. The return type is whatever `call` returns —
    /// no dynamic assertion is performed.
    pub async fn invoke<F, Fut, T>(&self, ui: &dyn Ui, status_message: &str, call: F) -> Result<T, InvokerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Box<dyn StdError + Send + Sync>>>,
    {
        let _guard = status(ui, status_message);
        call().await.map_err(InvokerError::Invocation)
    }

    /// Invokes `call` and asserts the dynamically-typed return value is
    /// assignable to `T` (the "expected return type sentinel" of `# 4.B`),
    /// failing with [`InvokerError::ReturnTypeMismatch`] otherwise.
    pub async fn invoke_typed<F, Fut, T: Any>(
        &self,
        ui: &dyn Ui,
        status_message: &str,
        call: F,
    ) -> Result<T, InvokerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Box<dyn Any + Send>, Box<dyn StdError + Send + Sync>>>,
    {
        let _guard = status(ui, status_message);
        let raw = call().await.map_err(InvokerError::Invocation)?;
        raw.downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| InvokerError::ReturnTypeMismatch)
    }
}
