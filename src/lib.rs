//! Overseer: a VM/workload orchestrator core.
//!
//! Re-exports the public surface of its member crates — the Action Warden
//! (`overseer_warden`), the Basis/Project lifecycle (`overseer_basis`), the
//! shared component system (`overseer_system`), the demo plugin set
//! (`overseer_plugins`), and the in-memory persistence client
//! (`overseer_persistence`) — for downstream consumers that want a single
//! dependency.

pub use overseer_basis as basis;
pub use overseer_persistence as persistence;
pub use overseer_plugins as plugins;
pub use overseer_system as system;
pub use overseer_warden as warden;
