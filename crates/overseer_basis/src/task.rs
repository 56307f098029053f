//! The dispatch request shape `Basis::run`/`Project::run` consume, and the
//! `JobInfo` attribute supplemented by SPEC_FULL C.2.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use overseer_system::Ui;

/// A single command dispatch: which component to resolve and the words to
/// execute it with (`# 4.E`'s `run(task)`).
#[derive(Debug, Clone)]
pub struct Task {
    /// The command component's name, normalized to its root token before
    /// factory lookup (`# 4.C`).
    pub component_name: String,
    /// The full command line, including the component name.
    pub words: Vec<String>,
}

impl Task {
    /// Builds a task from a command line; the first word is the component
    /// name.
    #[must_use]
    pub fn new(words: Vec<String>) -> Self {
        let component_name = words.first().cloned().unwrap_or_default();
        Self { component_name, words }
    }
}

/// Per-task progress-reporting handle (SPEC_FULL C.2): the minimal fields a
/// downstream command needs to report progress and observe cancellation
/// through the same source the enclosing Warden does.
#[derive(Clone)]
pub struct JobInfo {
    /// A client-assigned id identifying this job in logs.
    pub id: String,
    /// The UI this job reports progress through.
    pub ui: Arc<dyn Ui>,
    /// Mirrors the enclosing Warden env's `interrupted` flag so a
    /// long-running command and its Warden observe the same source.
    cancelled: Arc<AtomicBool>,
}

impl JobInfo {
    /// Builds a job info handle with a fresh, non-cancelled flag.
    #[must_use]
    pub fn new(id: impl Into<String>, ui: Arc<dyn Ui>) -> Self {
        Self {
            id: id.into(),
            ui,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns the shared cancellation flag so a Warden env can mirror it.
    #[must_use]
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_system::ConsoleUi;

    #[test]
    fn task_component_name_is_first_word() {
        let task = Task::new(vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(task.component_name, "foo");
    }

    #[test]
    fn job_info_cancel_is_observable_through_shared_flag() {
        let job = JobInfo::new("job-1", Arc::new(ConsoleUi));
        let flag = job.cancellation_flag();
        job.cancel();
        assert!(flag.load(Ordering::SeqCst));
        assert!(job.is_cancelled());
    }
}
