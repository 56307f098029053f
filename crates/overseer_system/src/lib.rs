//! Core types shared by the Basis/Project lifecycle and the Action Warden:
//! component kinds, the factory registry, plugin instances and
//! specialization, the dynamic invoker, the persistence client contract,
//! error aggregation, and the outbound context.

pub mod context;
pub mod error;
pub mod instance;
pub mod invoker;
pub mod kind;
pub mod persistence;
pub mod registry;
pub mod ui;

pub use context::Context;
pub use error::{AggregateError, FactoryError, InvokerError, NotSpecializable, append};
pub use instance::{
    CommandFlag, CommandNode, CommandPlugin, CommandRecord, FlagMapper, HostPlugin, IdentityFlagMapper,
    PluginInstance, PluginValue, Specializable, flatten, flatten_with, normalize_command_name, specialize,
};
pub use invoker::DynamicInvoker;
pub use kind::ComponentKind;
pub use persistence::{BasisRecord, PersistenceClient, PersistenceError, ProjectRecord, TargetRecord};
pub use registry::{Factory, FactoryRegistry, InjectedArgs};
pub use ui::{ConsoleUi, Logger, StatusGuard, Ui, status};
