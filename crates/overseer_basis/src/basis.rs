//! Basis: the root scope owning factories, the persistence client, and every
//! Project beneath it (`# 3`, `# 4.E`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use overseer_system::{
    AggregateError, BasisRecord, CommandRecord, ComponentKind, ConsoleUi, Context, DynamicInvoker, FactoryRegistry,
    FlagMapper, IdentityFlagMapper, InjectedArgs, Logger, PersistenceClient, Ui, flatten_with, normalize_command_name,
    specialize,
};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::closer::Closer;
use crate::config::Config;
use crate::error::{BasisError, ConstructError};
use crate::options::{ArgMapper, BasisOptions, ProjectOptions, default_mappers, validate_basis_options};
use crate::project::Project;
use crate::task::{JobInfo, Task};

enum State {
    Ready,
    Closed(Option<Arc<AggregateError>>),
}

/// The root scope of a running overseer instance: one Factory Registry, one
/// Persistence Client, one Context, and every Project constructed beneath it
/// (`# 3`).
pub struct Basis {
    name: String,
    resource_id: RwLock<String>,
    data_dir: RwLock<PathBuf>,
    ui: Arc<dyn Ui>,
    factories: Arc<FactoryRegistry>,
    mappers: Vec<Arc<dyn ArgMapper>>,
    flag_mapper: Arc<dyn FlagMapper>,
    client: Arc<dyn PersistenceClient>,
    config: Config,
    context: Context,
    logger: Logger,
    invoker: DynamicInvoker,
    projects_by_id: Mutex<IndexMap<String, Arc<Project>>>,
    projects_by_name: Mutex<HashMap<String, String>>,
    closers: Mutex<Vec<Arc<dyn Closer>>>,
    state: Mutex<State>,
}

struct SelfSaveCloser {
    basis: Weak<Basis>,
}

#[async_trait::async_trait]
impl Closer for SelfSaveCloser {
    async fn close(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(basis) = self.basis.upgrade() {
            basis
                .save()
                .await
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("project '{name}' close failed: {message}")]
struct ProjectCloseError {
    name: String,
    message: String,
}

impl Basis {
    /// Applies `# 4.E`'s construction steps in order: validate options,
    /// require a client and factory registry, default the UI and mappers,
    /// load config non-fatally, then resolve the canonical record through
    /// the Persistence Client (minting a resource id if none was supplied).
    pub async fn construct(options: BasisOptions) -> Result<Arc<Self>, ConstructError> {
        validate_basis_options(&options)?;

        let client = options.client.ok_or(ConstructError::MissingClient)?;
        let factories = options.factories.ok_or(ConstructError::MissingFactories)?;
        let data_dir = options.data_dir.ok_or(ConstructError::MissingDataDir)?;

        let ui: Arc<dyn Ui> = options.ui.unwrap_or_else(|| Arc::new(ConsoleUi));
        let mappers = options
            .mappers
            .filter(|m| !m.is_empty())
            .unwrap_or_else(default_mappers);
        let flag_mapper: Arc<dyn FlagMapper> = options.flag_mapper.unwrap_or_else(|| Arc::new(IdentityFlagMapper));
        let context = options.context.unwrap_or_default();
        let config = Config::load_or_default(options.config_path.as_deref());
        let name = options.name.unwrap_or_default();

        let logger = Logger::new(if options.trace_root {
            "overseer::basis::trace"
        } else {
            "overseer::basis"
        });
        logger.debug(&format!("constructing basis '{name}'"));

        let record = BasisRecord {
            name: name.clone(),
            resource_id: options.resource_id.unwrap_or_default(),
            path: data_dir.display().to_string(),
            targets: Vec::new(),
        };
        let saved = client
            .upsert_basis(&context, record)
            .await
            .map_err(|err| ConstructError::MissingRecord(err.to_string()))?;

        Ok(Arc::new_cyclic(|weak: &Weak<Basis>| Self {
            name,
            resource_id: RwLock::new(saved.resource_id),
            data_dir: RwLock::new(data_dir),
            ui,
            factories,
            mappers,
            flag_mapper,
            client,
            config,
            context,
            logger,
            invoker: DynamicInvoker::new(),
            projects_by_id: Mutex::new(IndexMap::new()),
            projects_by_name: Mutex::new(HashMap::new()),
            closers: Mutex::new(vec![
                Arc::new(SelfSaveCloser { basis: weak.clone() }) as Arc<dyn Closer>
            ]),
            state: Mutex::new(State::Ready),
        }))
    }

    /// The basis's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The basis's resource id, assigned during construction.
    #[must_use]
    pub fn resource_id(&self) -> String {
        self.resource_id.read().clone()
    }

    pub(crate) fn data_dir(&self) -> PathBuf {
        self.data_dir.read().clone()
    }

    pub(crate) fn ui(&self) -> Arc<dyn Ui> {
        self.ui.clone()
    }

    pub(crate) fn factories(&self) -> Arc<FactoryRegistry> {
        self.factories.clone()
    }

    pub(crate) fn mappers(&self) -> Vec<Arc<dyn ArgMapper>> {
        self.mappers.clone()
    }

    pub(crate) fn client(&self) -> Arc<dyn PersistenceClient> {
        self.client.clone()
    }

    /// The basis's outbound context.
    #[must_use]
    pub fn context(&self) -> Context {
        self.context.clone()
    }

    /// The basis's derived logger (`# 4.E` step 2).
    #[must_use]
    pub fn logger(&self) -> Logger {
        self.logger
    }

    fn is_closed(&self) -> bool {
        matches!(*self.state.lock(), State::Closed(_))
    }

    /// Builds the default-injected args every Dynamic Invoker call gets from
    /// its owning scope (`# 4.B`): the scope itself (typed and named
    /// `"basis"`), its UI, the context, and a derived logger.
    fn default_args(self: &Arc<Self>) -> InjectedArgs {
        InjectedArgs::new()
            .with_typed(self.clone())
            .with_named("basis", self.clone())
            .with_typed(self.context())
            .with_typed(self.ui.clone())
            .with_typed(self.logger)
            .with_named("basis_resource_id", self.resource_id())
    }

    /// Enumerates every registered command plugin's flattened command tree
    /// (`# 4.A`): constructs each transiently, reads its `command_info`, then
    /// closes it again.
    pub async fn init(self: &Arc<Self>) -> Result<Vec<CommandRecord>, BasisError> {
        if self.is_closed() {
            return Err(BasisError::Closed);
        }
        let mut records = Vec::new();
        for name in self.factories.names(ComponentKind::Command) {
            let factory = self.factories.lookup(ComponentKind::Command, name)?;
            let args = self.default_args();
            let instance = factory.construct(&args).await?;
            let Some(command) = instance.value().as_command() else {
                return Err(BasisError::NotCommand(name.to_string()));
            };
            records.extend(flatten_with(&command.command_info(), self.flag_mapper.as_ref()));
            if let Err(err) = instance.close() {
                self.ui.warn(&format!("command '{name}' close failed during init: {err}"));
            }
        }
        Ok(records)
    }

    /// Resolves, specializes, and dispatches `task` to its command plugin
    /// (`# 4.B`, `# 4.C`): a non-zero execute result is reported as
    /// [`BasisError::TaskFailed`] rather than silently swallowed.
    pub async fn run(self: &Arc<Self>, task: Task, job: JobInfo) -> Result<i64, BasisError> {
        if self.is_closed() {
            return Err(BasisError::Closed);
        }

        let root = normalize_command_name(&task.component_name).to_string();
        let factory = self.factories.lookup(ComponentKind::Command, &root)?;

        let mapped: HashMap<String, String> = self.mappers.iter().flat_map(|m| m.map(&task.words)).collect();
        let args = self
            .default_args()
            .with_typed(job)
            .with_named("mapped_args", mapped);

        let instance = factory.construct(&args).await?;
        specialize(&instance, &self.resource_id(), &self.config.service_endpoint)?;
        let Some(command) = instance.value().as_command() else {
            return Err(BasisError::NotCommand(root));
        };

        let status_message = format!("running {}", task.component_name);
        let outcome = self
            .invoker
            .invoke(self.ui.as_ref(), &status_message, || async move { command.execute(&task.words).await })
            .await;

        if let Err(err) = instance.close() {
            self.ui.warn(&format!("command '{root}' close failed: {err}"));
        }

        let code = outcome?;
        if code != 0 {
            return Err(BasisError::TaskFailed(code));
        }
        Ok(code)
    }

    /// Constructs and registers a child project, saving it once to mint its
    /// resource id before it is reachable by either index.
    ///
    /// Idempotent by resource id (`# 4.E`): if `options.resource_id` already
    /// names a loaded project, that instance is returned unchanged rather
    /// than constructing and upserting a new one over it.
    pub async fn load_project(self: &Arc<Self>, options: ProjectOptions) -> Result<Arc<Project>, BasisError> {
        if self.is_closed() {
            return Err(BasisError::Closed);
        }
        if let Some(id) = options.resource_id.as_deref() {
            if let Some(existing) = self.projects_by_id.lock().get(id).cloned() {
                return Ok(existing);
            }
        }

        let project = Project::construct(self, options).map_err(BasisError::InvalidOptions)?;
        project.save().await?;

        let id = project.resource_id();
        self.projects_by_id.lock().insert(id.clone(), project.clone());
        self.projects_by_name.lock().insert(project.name().to_string(), id);
        Ok(project)
    }

    /// Looks a project up by resource id first, then by name.
    #[must_use]
    pub fn project(&self, key: &str) -> Option<Arc<Project>> {
        if let Some(project) = self.projects_by_id.lock().get(key).cloned() {
            return Some(project);
        }
        let id = self.projects_by_name.lock().get(key).cloned()?;
        self.projects_by_id.lock().get(&id).cloned()
    }

    /// Saves the basis's own record through the Persistence Client.
    pub async fn save(&self) -> Result<(), BasisError> {
        if self.is_closed() {
            return Err(BasisError::Closed);
        }
        let record = BasisRecord {
            name: self.name.clone(),
            resource_id: self.resource_id(),
            path: self.data_dir.read().display().to_string(),
            targets: Vec::new(),
        };
        let saved = self.client.upsert_basis(&self.context, record).await?;
        *self.resource_id.write() = saved.resource_id;
        Ok(())
    }

    /// Saves every project beneath this basis, then the basis itself,
    /// aggregating every failure rather than stopping at the first.
    pub async fn save_full(&self) -> Result<(), AggregateError> {
        let mut agg = AggregateError::new();
        let projects: Vec<Arc<Project>> = self.projects_by_id.lock().values().cloned().collect();
        for project in projects {
            if let Err(err) = project.save_full().await {
                agg.extend(err);
            }
        }
        if let Err(err) = self.save().await {
            agg.push(err);
        }
        agg.into_option().map_or(Ok(()), Err)
    }

    /// Closes every project, then every basis-level closer. Idempotent: a
    /// second call returns the same aggregate (or `None`) the first call
    /// produced, without re-running anything.
    pub async fn close(&self) -> Option<Arc<AggregateError>> {
        {
            let mut state = self.state.lock();
            if let State::Closed(prior) = &*state {
                return prior.clone();
            }
            *state = State::Closed(None);
        }

        let mut agg = AggregateError::new();

        let projects: Vec<Arc<Project>> = self.projects_by_id.lock().drain(..).map(|(_, p)| p).collect();
        self.projects_by_name.lock().clear();
        for project in projects {
            let name = project.name().to_string();
            if let Some(err) = project.close().await {
                agg.push(ProjectCloseError {
                    name,
                    message: err.to_string(),
                });
            }
        }

        let closers = self.closers.lock().drain(..).collect::<Vec<_>>();
        for closer in closers {
            if let Err(err) = closer.close().await {
                agg.push(err);
            }
        }

        let result = agg.into_option().map(Arc::new);
        *self.state.lock() = State::Closed(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_persistence::InMemoryClient;

    fn basis_options(name: &str) -> BasisOptions {
        BasisOptions {
            name: Some(name.to_string()),
            data_dir: Some(PathBuf::from("/tmp/overseer-test")),
            client: Some(Arc::new(InMemoryClient::new())),
            factories: Some(Arc::new(FactoryRegistry::new())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn construct_resolves_resource_id() {
        let basis = Basis::construct(basis_options("demo")).await.unwrap();
        assert!(!basis.resource_id().is_empty());
    }

    #[tokio::test]
    async fn construct_without_client_is_fatal() {
        let mut options = basis_options("demo");
        options.client = None;
        assert!(matches!(
            Basis::construct(options).await,
            Err(ConstructError::MissingClient)
        ));
    }

    #[tokio::test]
    async fn load_project_is_reachable_by_name_and_id() {
        let basis = Basis::construct(basis_options("demo")).await.unwrap();
        let project = basis
            .load_project(ProjectOptions {
                name: Some("proj".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let by_id = basis.project(&project.resource_id()).unwrap();
        let by_name = basis.project("proj").unwrap();
        assert!(Arc::ptr_eq(&by_id, &project));
        assert!(Arc::ptr_eq(&by_name, &project));
    }

    #[tokio::test]
    async fn load_project_is_idempotent_by_resource_id() {
        let basis = Basis::construct(basis_options("demo")).await.unwrap();
        let first = basis
            .load_project(ProjectOptions {
                name: Some("proj".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let second = basis
            .load_project(ProjectOptions {
                resource_id: Some(first.resource_id()),
                name: Some("ignored".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name(), "proj");
    }

    #[tokio::test]
    async fn run_unknown_command_fails_with_factory_error() {
        let basis = Basis::construct(basis_options("demo")).await.unwrap();
        let job = JobInfo::new("job-1", basis.ui());
        let result = basis.run(Task::new(vec!["missing".to_string()]), job).await;
        assert!(matches!(result, Err(BasisError::Factory(_))));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let basis = Basis::construct(basis_options("demo")).await.unwrap();
        let first = basis.close().await;
        let second = basis.close().await;
        match (&first, &second) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("close result changed between calls"),
        }
    }

    #[tokio::test]
    async fn close_aggregates_failures_from_multiple_projects() {
        struct FailingCloser;
        #[async_trait::async_trait]
        impl Closer for FailingCloser {
            async fn close(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                Err("boom".into())
            }
        }

        let basis = Basis::construct(basis_options("demo")).await.unwrap();
        for n in 0..2 {
            let project = basis
                .load_project(ProjectOptions {
                    name: Some(format!("proj-{n}")),
                    ..Default::default()
                })
                .await
                .unwrap();
            project.register_closer(Arc::new(FailingCloser));
        }

        let agg = basis.close().await.expect("both projects should fail to close");
        assert_eq!(agg.len(), 2);

        let second = basis.close().await.expect("cached aggregate");
        assert!(Arc::ptr_eq(&agg, &second));
    }

    #[tokio::test]
    async fn init_enumerates_and_flattens_every_command_plugin() {
        use overseer_system::{CommandNode, CommandPlugin, Factory, FactoryError, PluginInstance, PluginValue};

        struct NestedCommand;
        impl PluginValue for NestedCommand {
            fn as_command(&self) -> Option<&dyn CommandPlugin> {
                Some(self)
            }
        }
        #[async_trait::async_trait]
        impl CommandPlugin for NestedCommand {
            fn command_info(&self) -> CommandNode {
                CommandNode {
                    name: "alpha".into(),
                    children: vec![CommandNode {
                        name: "child".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }
            }
            async fn execute(&self, _words: &[String]) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
                Ok(0)
            }
        }

        struct LeafCommand;
        impl PluginValue for LeafCommand {
            fn as_command(&self) -> Option<&dyn CommandPlugin> {
                Some(self)
            }
        }
        #[async_trait::async_trait]
        impl CommandPlugin for LeafCommand {
            fn command_info(&self) -> CommandNode {
                CommandNode {
                    name: "zeta".into(),
                    ..Default::default()
                }
            }
            async fn execute(&self, _words: &[String]) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
                Ok(0)
            }
        }

        struct NestedFactory;
        #[async_trait::async_trait]
        impl Factory for NestedFactory {
            async fn construct(&self, _args: &InjectedArgs) -> Result<PluginInstance, FactoryError> {
                Ok(PluginInstance::new(NestedCommand))
            }
        }
        struct LeafFactory;
        #[async_trait::async_trait]
        impl Factory for LeafFactory {
            async fn construct(&self, _args: &InjectedArgs) -> Result<PluginInstance, FactoryError> {
                Ok(PluginInstance::new(LeafCommand))
            }
        }

        let mut registry = FactoryRegistry::new();
        registry.register(ComponentKind::Command, "alpha", Arc::new(NestedFactory));
        registry.register(ComponentKind::Command, "zeta", Arc::new(LeafFactory));

        let mut options = basis_options("demo");
        options.factories = Some(Arc::new(registry));
        let basis = Basis::construct(options).await.unwrap();

        let records = basis.init().await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "alpha child", "zeta"]);
    }
}
