//! Finalized pipeline stages: the constructed-middleware case and the
//! bare-callable adapter case (`# 3`'s Middleware Stage, `# 4.G`'s finalize
//! rules).

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::env::WardenEnv;
use crate::error::WardenError;

/// A finalized entry in a Warden's pipeline. Both the constructed-middleware
/// wrapper and the bare-callable adapter implement this, as does [`crate::warden::Warden`]
/// itself so a nested Warden can sit in an outer one's pipeline like any
/// other stage.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable name used for trace logging and trigger lookup.
    fn name(&self) -> &str;

    /// Runs this stage's forward action.
    async fn call(&self, env: &WardenEnv) -> Result<(), Arc<WardenError>>;

    /// Runs this stage's recovery action, if it has one. Default: no-op.
    async fn recover(&self, _env: &WardenEnv) {}
}

/// A user-supplied middleware: the "constructible middleware class" of
/// `# 4.G`'s finalize rules, already instantiated with its positional args
/// baked in by the caller (Rust has no runtime varargs constructor).
#[async_trait]
pub trait Middleware: Send + Sync {
    /// The stable name triggers and recover-stack logging key on.
    fn stable_name(&self) -> &str;

    /// Forward action.
    async fn call(&self, env: &WardenEnv) -> Result<(), Box<dyn StdError + Send + Sync>>;

    /// Recovery action, run in LIFO order on failure. Default: no-op.
    async fn recover(&self, _env: &WardenEnv) {}
}

/// Wraps a [`Middleware`] as a bare [`Stage`] (the Before/After triggers are
/// placed around this by [`crate::warden::Warden::new`], not by this type).
pub(crate) struct MiddlewareStage(pub Arc<dyn Middleware>);

#[async_trait]
impl Stage for MiddlewareStage {
    fn name(&self) -> &str {
        self.0.stable_name()
    }

    async fn call(&self, env: &WardenEnv) -> Result<(), Arc<WardenError>> {
        self.0
            .call(env)
            .await
            .map_err(|err| Arc::new(WardenError::Stage(err)))
    }

    async fn recover(&self, env: &WardenEnv) {
        self.0.recover(env).await;
    }
}

/// A bare callable's boxed-future signature, the adapter case of `# 4.G`'s
/// finalize rules.
pub type CallableFn = Arc<
    dyn for<'a> Fn(&'a WardenEnv) -> Pin<Box<dyn Future<Output = Result<(), Box<dyn StdError + Send + Sync>>> + Send + 'a>>
        + Send
        + Sync,
>;

/// Adapts a bare callable into a [`Stage`]. Has no recovery: the source
/// note for the callable case only describes "invoke then forward", with no
/// recover hook.
pub(crate) struct CallableStage {
    pub name: String,
    pub f: CallableFn,
}

#[async_trait]
impl Stage for CallableStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, env: &WardenEnv) -> Result<(), Arc<WardenError>> {
        (self.f)(env)
            .await
            .map_err(|err| Arc::new(WardenError::Stage(err)))
    }
}

/// A raw stage descriptor before finalization (`# 3`'s Middleware Stage
/// triple, reduced to what Rust's type system needs: which case it is).
pub enum StageDescriptor {
    /// A constructible middleware, to be surrounded by trigger stages.
    Middleware(Arc<dyn Middleware>),
    /// A bare callable, wrapped in a single adapter stage.
    Callable {
        /// Stable name for logging; callables have no `stable_name()`.
        name: String,
        /// The callable itself.
        f: CallableFn,
    },
    /// An already-finalized stage dropped in as-is — the shape a nested
    /// Warden takes in its parent's pipeline (`# 8` scenario 3). Unlike the
    /// `Middleware` case, this is not surrounded by trigger stages: a
    /// nested Warden wraps its own inner middlewares already.
    Nested(Arc<dyn Stage>),
}
