//! Demo plugins exercising the Basis/Project plugin surface: concrete
//! `CommandPlugin`/`HostPlugin` implementations plus their factories. The
//! capability traits themselves live in `overseer_system`.

pub mod echo;
pub mod host;
pub mod version;

pub use echo::{EchoFactory, EchoPlugin};
pub use host::{EnvHostFactory, EnvHostPlugin};
pub use version::{VersionFactory, VersionPlugin};

use std::sync::Arc;

use overseer_system::{ComponentKind, FactoryRegistry};

/// Registers every demo plugin under its conventional name, for use by the
/// demo binary and by tests exercising `Basis::init`/`Basis::run` end to end.
pub fn register_demo_plugins(registry: &mut FactoryRegistry) {
    registry.register(ComponentKind::Command, "echo", Arc::new(EchoFactory));
    registry.register(ComponentKind::Command, "version", Arc::new(VersionFactory::new(env!("CARGO_PKG_VERSION"))));
    registry.register(ComponentKind::Host, "local", Arc::new(EnvHostFactory::new("HOME")));
}
