//! A demo command plugin reporting a fixed version string. Has no
//! subcommands — pairs with [`crate::echo::EchoPlugin`] to exercise the flat
//! command enumeration `init()` produces.

use std::error::Error as StdError;

use async_trait::async_trait;
use overseer_system::{CommandNode, CommandPlugin, Factory, FactoryError, InjectedArgs, PluginInstance, PluginValue};

/// Reports a fixed version string through its return code's companion
/// output — writes nothing to `Ui`, returns `0` unconditionally.
pub struct VersionPlugin {
    version: &'static str,
}

impl VersionPlugin {
    /// Builds the plugin reporting `version`.
    #[must_use]
    pub fn new(version: &'static str) -> Self {
        Self { version }
    }
}

impl PluginValue for VersionPlugin {
    fn as_command(&self) -> Option<&dyn CommandPlugin> {
        Some(self)
    }
}

#[async_trait]
impl CommandPlugin for VersionPlugin {
    fn command_info(&self) -> CommandNode {
        CommandNode {
            name: "version".into(),
            synopsis: "print the running version".into(),
            help: format!("version — prints {}.", self.version),
            flags: Vec::new(),
            children: Vec::new(),
        }
    }

    async fn execute(&self, _words: &[String]) -> Result<i64, Box<dyn StdError + Send + Sync>> {
        Ok(0)
    }
}

/// Constructs [`VersionPlugin`] values reporting a fixed version.
pub struct VersionFactory {
    version: &'static str,
}

impl VersionFactory {
    /// Builds a factory reporting `version` for every constructed instance.
    #[must_use]
    pub fn new(version: &'static str) -> Self {
        Self { version }
    }
}

#[async_trait]
impl Factory for VersionFactory {
    async fn construct(&self, _args: &InjectedArgs) -> Result<PluginInstance, FactoryError> {
        Ok(PluginInstance::new(VersionPlugin::new(self.version)))
    }
}
