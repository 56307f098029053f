//! Project: a child scope of a Basis, structurally parallel to it
//! (`# 4.F`).

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use overseer_system::{AggregateError, Context, FactoryRegistry, PersistenceClient, Ui, append};
use parking_lot::{Mutex, RwLock};

use crate::basis::Basis;
use crate::closer::Closer;
use crate::error::BasisError;
use crate::options::{ArgMapper, ProjectOptions, validate_project_options};
use crate::target::Target;

enum State {
    Ready,
    Closed(Option<Arc<AggregateError>>),
}

/// A child scope of a [`Basis`]: same lifecycle shape, plus targets.
/// Cannot exist without a parent Basis; its closers run as part of
/// `Basis::close`, not independently.
pub struct Project {
    name: String,
    resource_id: RwLock<String>,
    data_dir: RwLock<PathBuf>,
    basis: Weak<Basis>,
    ui: Arc<dyn Ui>,
    factories: Arc<FactoryRegistry>,
    mappers: Vec<Arc<dyn ArgMapper>>,
    client: Arc<dyn PersistenceClient>,
    context: Context,
    targets: Mutex<indexmap::IndexMap<String, Target>>,
    closers: Mutex<Vec<Arc<dyn Closer>>>,
    state: Mutex<State>,
}

struct ProjectSelfSaveCloser {
    project: Weak<Project>,
}

#[async_trait::async_trait]
impl Closer for ProjectSelfSaveCloser {
    async fn close(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(project) = self.project.upgrade() {
            project.save().await.map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)?;
        }
        Ok(())
    }
}

impl Project {
    /// Constructs a project owned by `basis`, inheriting its factories,
    /// mappers, client, and context by reference.
    pub(crate) fn construct(basis: &Arc<Basis>, options: ProjectOptions) -> Result<Arc<Self>, AggregateError> {
        validate_project_options(&options)?;

        let data_dir = options.data_dir.unwrap_or_else(|| basis.data_dir());

        let project = Arc::new_cyclic(|weak: &Weak<Project>| Self {
            name: options.name.unwrap_or_default(),
            resource_id: RwLock::new(options.resource_id.unwrap_or_default()),
            data_dir: RwLock::new(data_dir),
            basis: Arc::downgrade(basis),
            ui: basis.ui(),
            factories: basis.factories(),
            mappers: basis.mappers(),
            client: basis.client(),
            context: basis.context().child(),
            targets: Mutex::new(indexmap::IndexMap::new()),
            closers: Mutex::new(vec![Arc::new(ProjectSelfSaveCloser { project: weak.clone() }) as Arc<dyn Closer>]),
            state: Mutex::new(State::Ready),
        });
        Ok(project)
    }

    /// The project's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The project's resource id, empty until resolved.
    #[must_use]
    pub fn resource_id(&self) -> String {
        self.resource_id.read().clone()
    }

    /// The project's UI handle (inherited from its Basis).
    #[must_use]
    pub fn ui(&self) -> Arc<dyn Ui> {
        self.ui.clone()
    }

    /// The project's factory registry (inherited from its Basis).
    #[must_use]
    pub fn factories(&self) -> Arc<FactoryRegistry> {
        self.factories.clone()
    }

    /// The project's outbound context.
    #[must_use]
    pub fn context(&self) -> Context {
        self.context.clone()
    }

    /// Returns a strong reference to the owning Basis, if it still exists.
    #[must_use]
    pub fn basis(&self) -> Option<Arc<Basis>> {
        self.basis.upgrade()
    }

    /// Registers a closer to run once during `close()`, in addition to the
    /// implicit self-save closer every project starts with.
    pub fn register_closer(&self, closer: Arc<dyn Closer>) {
        self.closers.lock().push(closer);
    }

    /// Registers a target under this project.
    pub fn add_target(&self, target: Target) {
        self.targets.lock().insert(target.resource_id.clone(), target);
    }

    /// Returns the currently-registered targets.
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.targets.lock().values().cloned().collect()
    }

    /// Saves the project's record through the Persistence Client,
    /// resolving its resource id if it did not already have one.
    pub async fn save(&self) -> Result<(), BasisError> {
        if matches!(*self.state.lock(), State::Closed(_)) {
            return Err(BasisError::Closed);
        }
        let record = overseer_system::ProjectRecord {
            name: self.name.clone(),
            resource_id: self.resource_id(),
            path: self.data_dir.read().display().to_string(),
            targets: self.targets.lock().keys().cloned().collect(),
        };
        let saved = self.client.upsert_project(&self.context, record).await?;
        *self.resource_id.write() = saved.resource_id;
        Ok(())
    }

    /// Invokes `save_full` on targets (none, currently — targets have no
    /// independent persistence call beyond what `save` already includes)
    /// then `save` on this project, aggregating errors.
    pub async fn save_full(&self) -> Result<(), AggregateError> {
        let mut agg: Option<AggregateError> = None;
        agg = append(agg, self.save().await.err());
        agg.map_or(Ok(()), Err)
    }

    /// Closes the project: idempotent, aggregates closer failures, never
    /// raises. A second call returns the same aggregate the first call
    /// produced (or `None`) rather than re-running any closer.
    pub async fn close(&self) -> Option<Arc<AggregateError>> {
        {
            let mut state = self.state.lock();
            if let State::Closed(prior) = &*state {
                return prior.clone();
            }
            *state = State::Closed(None);
        }

        let closers = self.closers.lock().drain(..).collect::<Vec<_>>();
        let mut agg: Option<AggregateError> = None;
        for closer in closers {
            agg = append(agg, closer.close().await.err());
        }
        let agg = agg.map(Arc::new);
        *self.state.lock() = State::Closed(agg.clone());
        agg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::Basis;
    use crate::options::BasisOptions;
    use overseer_persistence::InMemoryClient;
    use overseer_system::FactoryRegistry;

    fn basis_options(name: &str, client: Arc<dyn PersistenceClient>) -> BasisOptions {
        BasisOptions {
            name: Some(name.to_string()),
            data_dir: Some(PathBuf::from("/tmp/overseer-test")),
            client: Some(client),
            factories: Some(Arc::new(FactoryRegistry::new())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn project_close_is_idempotent() {
        let client: Arc<dyn PersistenceClient> = Arc::new(InMemoryClient::new());
        let basis = Basis::construct(basis_options("demo", client)).await.unwrap();
        let project = Project::construct(
            &basis,
            ProjectOptions {
                name: Some("proj".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let first = project.close().await;
        let second = project.close().await;
        match (&first, &second) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("close result changed between calls"),
        }
    }
}
