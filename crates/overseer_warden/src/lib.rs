//! The Action Warden: a middleware pipeline executor with two-phase
//! forward/recover semantics, trigger injection around each stage, nested
//! pipeline awareness, and interrupt-safe teardown.

pub mod env;
pub mod error;
pub mod stage;
pub mod trigger;
pub mod warden;

pub use env::WardenEnv;
pub use error::WardenError;
pub use stage::{CallableFn, Middleware, Stage, StageDescriptor};
pub use trigger::{NoTriggers, TriggerSpec};
pub use warden::Warden;
