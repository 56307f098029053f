//! Trigger Wrappers: Before/After hook stages run around each finalized
//! middleware (`# 4.H`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::env::WardenEnv;
use crate::error::WardenError;
use crate::stage::Stage;

/// Consumed collaborator surface (`# 3`'s TriggerSpec): pre/post hooks keyed
/// by a middleware's stable name.
#[async_trait]
pub trait TriggerSpec: Send + Sync {
    /// Runs before the named middleware's `call`.
    async fn pre(&self, middleware_name: &str, env: &WardenEnv);

    /// Runs after the named middleware's `call` returns successfully.
    async fn post(&self, middleware_name: &str, env: &WardenEnv);
}

/// A [`TriggerSpec`] with no hooks registered for any name — every
/// Before/AfterTrigger stage becomes a pass-through, matching `# 4.H`'s
/// "absent hooks produce a pass-through".
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTriggers;

#[async_trait]
impl TriggerSpec for NoTriggers {
    async fn pre(&self, _middleware_name: &str, _env: &WardenEnv) {}
    async fn post(&self, _middleware_name: &str, _env: &WardenEnv) {}
}

/// Runs the named middleware's `pre` hook, then lets the Warden's own
/// dispatch loop proceed to the wrapped middleware stage next in the
/// pending queue. Never implements `recover` (`# 4.H`).
pub(crate) struct BeforeTrigger {
    label: String,
    middleware_name: String,
    triggers: Arc<dyn TriggerSpec>,
}

impl BeforeTrigger {
    pub fn new(middleware_name: String, triggers: Arc<dyn TriggerSpec>) -> Self {
        Self {
            label: format!("before:{middleware_name}"),
            middleware_name,
            triggers,
        }
    }
}

#[async_trait]
impl Stage for BeforeTrigger {
    fn name(&self) -> &str {
        &self.label
    }

    async fn call(&self, env: &WardenEnv) -> Result<(), Arc<WardenError>> {
        self.triggers.pre(&self.middleware_name, env).await;
        Ok(())
    }
}

/// Runs the named middleware's `post` hook after the middleware stage that
/// precedes it in the pending queue has returned. Never implements
/// `recover` (`# 4.H`).
pub(crate) struct AfterTrigger {
    label: String,
    middleware_name: String,
    triggers: Arc<dyn TriggerSpec>,
}

impl AfterTrigger {
    pub fn new(middleware_name: String, triggers: Arc<dyn TriggerSpec>) -> Self {
        Self {
            label: format!("after:{middleware_name}"),
            middleware_name,
            triggers,
        }
    }
}

#[async_trait]
impl Stage for AfterTrigger {
    fn name(&self) -> &str {
        &self.label
    }

    async fn call(&self, env: &WardenEnv) -> Result<(), Arc<WardenError>> {
        self.triggers.post(&self.middleware_name, env).await;
        Ok(())
    }
}
