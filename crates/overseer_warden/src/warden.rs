//! The Action Warden: a middleware pipeline executor with two-phase
//! forward/recover semantics, trigger injection, and interrupt-safe
//! teardown (`# 4.G`).

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::env::WardenEnv;
use crate::error::WardenError;
use crate::stage::{CallableStage, MiddlewareStage, Stage, StageDescriptor};
use crate::trigger::{AfterTrigger, BeforeTrigger, NoTriggers, TriggerSpec};

/// Executes a finalized pipeline of [`Stage`]s.
///
/// Re-entrant by design: a `Warden` itself implements [`Stage`], so it can
/// sit inside another `Warden`'s pipeline, and the two share the same
/// [`WardenEnv`] across the nesting boundary rather than each getting a
/// private copy — this is what lets a propagated error be recognized as
/// "the same object already recorded" two levels up (`# 4.G`).
pub struct Warden {
    name: String,
    pending: Mutex<VecDeque<Arc<dyn Stage>>>,
    recover_stack: Mutex<VecDeque<Arc<dyn Stage>>>,
}

impl Warden {
    /// Finalizes `descriptors` into a pipeline driven by `triggers` (use
    /// [`NoTriggers`] if no hooks are configured).
    #[must_use]
    pub fn new(name: impl Into<String>, descriptors: Vec<StageDescriptor>, triggers: Arc<dyn TriggerSpec>) -> Self {
        let pending = descriptors
            .into_iter()
            .flat_map(|descriptor| finalize(descriptor, &triggers))
            .collect();
        Self {
            name: name.into(),
            pending: Mutex::new(pending),
            recover_stack: Mutex::new(VecDeque::new()),
        }
    }

    /// Finalizes `descriptors` with no trigger hooks configured.
    #[must_use]
    pub fn without_triggers(name: impl Into<String>, descriptors: Vec<StageDescriptor>) -> Self {
        Self::new(name, descriptors, Arc::new(NoTriggers))
    }

    /// Returns whether the pipeline has any undispatched stages left.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    async fn recover_internal(&self, env: &WardenEnv) {
        let stages: Vec<Arc<dyn Stage>> = self.recover_stack.lock().drain(..).collect();
        for stage in stages {
            tracing::warn!(stage = stage.name(), warden = %self.name, "recover");
            stage.recover(env).await;
        }
    }

    async fn fail(&self, env: &WardenEnv, err: Arc<WardenError>) -> Arc<WardenError> {
        if env.record_if_new(&err) {
            tracing::warn!(warden = %self.name, error = %err, "warden failure");
        }
        self.recover_internal(env).await;
        err
    }
}

#[async_trait]
impl Stage for Warden {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, env: &WardenEnv) -> Result<(), Arc<WardenError>> {
        loop {
            if env.is_interrupted() {
                return Err(self.fail(env, Arc::new(WardenError::Interrupt)).await);
            }

            let stage = {
                let mut pending = self.pending.lock();
                match pending.pop_front() {
                    Some(stage) => stage,
                    None => break,
                }
            };

            self.recover_stack.lock().push_front(stage.clone());
            tracing::debug!(stage = stage.name(), warden = %self.name, "IN");

            if let Err(err) = stage.call(env).await {
                return Err(self.fail(env, err).await);
            }

            if env.is_interrupted() {
                return Err(self.fail(env, Arc::new(WardenError::Interrupt)).await);
            }

            tracing::debug!(stage = stage.name(), warden = %self.name, "OUT");
        }
        Ok(())
    }

    /// Re-running recover on an already-failed Warden is a no-op: its
    /// internal recover stack was drained by `call`'s own failure handling
    /// (`# 4.G`'s "clear the recover stack so a parent Warden recovering
    /// this nested one does not re-invoke the same stages").
    async fn recover(&self, env: &WardenEnv) {
        self.recover_internal(env).await;
    }
}

fn finalize(descriptor: StageDescriptor, triggers: &Arc<dyn TriggerSpec>) -> Vec<Arc<dyn Stage>> {
    match descriptor {
        StageDescriptor::Middleware(middleware) => {
            let name = middleware.stable_name().to_string();
            vec![
                Arc::new(BeforeTrigger::new(name.clone(), triggers.clone())) as Arc<dyn Stage>,
                Arc::new(MiddlewareStage(middleware)) as Arc<dyn Stage>,
                Arc::new(AfterTrigger::new(name, triggers.clone())) as Arc<dyn Stage>,
            ]
        }
        StageDescriptor::Callable { name, f } => {
            vec![Arc::new(CallableStage { name, f }) as Arc<dyn Stage>]
        }
        StageDescriptor::Nested(stage) => vec![stage],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct RecordingMiddleware {
        name: &'static str,
        fails: bool,
        log: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl crate::stage::Middleware for RecordingMiddleware {
        fn stable_name(&self) -> &str {
            self.name
        }

        async fn call(&self, _env: &WardenEnv) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.log.lock().unwrap().push(format!("call:{}", self.name));
            if self.fails {
                return Err("boom".into());
            }
            Ok(())
        }

        async fn recover(&self, _env: &WardenEnv) {
            self.log.lock().unwrap().push(format!("recover:{}", self.name));
        }
    }

    fn stage(name: &'static str, fails: bool, log: Arc<StdMutex<Vec<String>>>) -> StageDescriptor {
        StageDescriptor::Middleware(Arc::new(RecordingMiddleware { name, fails, log }))
    }

    #[tokio::test]
    async fn linear_success_runs_no_recover() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let warden = Warden::without_triggers(
            "w",
            vec![
                stage("a", false, log.clone()),
                stage("b", false, log.clone()),
                stage("c", false, log.clone()),
            ],
        );
        let env = WardenEnv::new();
        warden.call(&env).await.unwrap();
        let calls = log.lock().unwrap();
        assert_eq!(*calls, vec!["call:a", "call:b", "call:c"]);
        assert!(env.error().is_none());
    }

    #[tokio::test]
    async fn mid_pipeline_failure_recovers_lifo() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let warden = Warden::without_triggers(
            "w",
            vec![
                stage("a", false, log.clone()),
                stage("b", true, log.clone()),
                stage("c", false, log.clone()),
            ],
        );
        let env = WardenEnv::new();
        let err = warden.call(&env).await.unwrap_err();
        let calls = log.lock().unwrap();
        assert_eq!(*calls, vec!["call:a", "call:b", "recover:b", "recover:a"]);
        assert!(!calls.contains(&"call:c".to_string()));
        assert!(Arc::ptr_eq(&err, &env.error().unwrap()));
    }

    #[tokio::test]
    async fn nested_warden_recovers_inner_then_outer() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let inner = Warden::without_triggers(
            "inner",
            vec![stage("x", false, log.clone()), stage("y", true, log.clone())],
        );
        let inner_stage: Arc<dyn Stage> = Arc::new(inner);

        let outer_log = log.clone();
        let outer = Warden::without_triggers(
            "outer",
            vec![
                stage("a", false, outer_log.clone()),
                StageDescriptor::Nested(inner_stage),
                stage("c", false, outer_log),
            ],
        );

        let env = WardenEnv::new();
        outer.call(&env).await.unwrap_err();
        let calls = log.lock().unwrap();
        assert_eq!(
            *calls,
            vec!["call:a", "call:x", "call:y", "recover:y", "recover:x", "recover:a"]
        );
        assert!(!calls.contains(&"call:c".to_string()));
    }

    #[tokio::test]
    async fn interrupt_before_checkpoint_stops_pipeline() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let env = WardenEnv::new();
        let env_for_b = env.clone();
        let a = stage("a", false, log.clone());
        let b = StageDescriptor::Callable {
            name: "b".into(),
            f: Arc::new(move |_env: &WardenEnv| {
                env_for_b.set_interrupted(true);
                Box::pin(async { Ok(()) })
            }),
        };
        let c = stage("c", false, log.clone());

        let warden = Warden::without_triggers("w", vec![a, b, c]);
        let result = warden.call(&env).await;
        assert!(matches!(result, Err(ref e) if matches!(**e, WardenError::Interrupt)));
        let calls = log.lock().unwrap();
        assert_eq!(*calls, vec!["call:a", "recover:a"]);
    }
}
