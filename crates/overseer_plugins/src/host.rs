//! A demo host-detection plugin: the core places no hardcoded host name
//! anywhere, so a caller enumerates `FactoryRegistry::names(ComponentKind::Host)`
//! and probes each candidate's `detect()`.

use async_trait::async_trait;
use overseer_system::{Factory, FactoryError, HostPlugin, InjectedArgs, PluginInstance, PluginValue};

/// Detects whether a named environment variable is set, standing in for a
/// real host-environment probe (out of scope per the core's Non-goals).
pub struct EnvHostPlugin {
    var: &'static str,
}

impl EnvHostPlugin {
    /// Builds a plugin that detects the presence of `var` in the process
    /// environment.
    #[must_use]
    pub fn new(var: &'static str) -> Self {
        Self { var }
    }
}

impl PluginValue for EnvHostPlugin {
    fn as_host(&self) -> Option<&dyn HostPlugin> {
        Some(self)
    }
}

#[async_trait]
impl HostPlugin for EnvHostPlugin {
    async fn detect(&self) -> bool {
        std::env::var_os(self.var).is_some()
    }
}

/// Constructs [`EnvHostPlugin`] values probing a fixed environment variable.
pub struct EnvHostFactory {
    var: &'static str,
}

impl EnvHostFactory {
    /// Builds a factory whose constructed plugins probe `var`.
    #[must_use]
    pub fn new(var: &'static str) -> Self {
        Self { var }
    }
}

#[async_trait]
impl Factory for EnvHostFactory {
    async fn construct(&self, _args: &InjectedArgs) -> Result<PluginInstance, FactoryError> {
        Ok(PluginInstance::new(EnvHostPlugin::new(self.var)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detects_present_variable() {
        unsafe {
            std::env::set_var("OVERSEER_DEMO_HOST_PROBE", "1");
        }
        let plugin = EnvHostPlugin::new("OVERSEER_DEMO_HOST_PROBE");
        assert!(plugin.detect().await);
        unsafe {
            std::env::remove_var("OVERSEER_DEMO_HOST_PROBE");
        }
    }

    #[tokio::test]
    async fn absent_variable_is_not_detected() {
        let plugin = EnvHostPlugin::new("OVERSEER_DEMO_HOST_PROBE_ABSENT");
        assert!(!plugin.detect().await);
    }
}
