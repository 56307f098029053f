//! Basis/Project lifecycle core: plugin factory ownership, dynamic command
//! dispatch, init enumeration, and cascading close.

pub mod basis;
pub mod closer;
pub mod config;
pub mod error;
pub mod options;
pub mod project;
pub mod target;
pub mod task;

pub use basis::Basis;
pub use closer::Closer;
pub use config::Config;
pub use error::{BasisError, ConstructError, OptionError};
pub use options::{ArgMapper, BasisOptions, CliArgsMapper, ProjectOptions, ProtoMapper, default_mappers};
pub use project::Project;
pub use target::Target;
pub use task::{JobInfo, Task};
