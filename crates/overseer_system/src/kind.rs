//! Component kinds: the closed-but-extensible enumeration plugins are registered under.

/// A category of plugin the [`crate::registry::FactoryRegistry`] can hold factories for.
///
/// At minimum `Command` and `Host` are recognized by the core; `Provider` covers
/// the table row in the system overview, and `Custom` lets a downstream crate
/// introduce additional kinds without a breaking change to this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ComponentKind {
    /// A command plugin: exposes `command_info()` and `execute(words)`.
    Command,
    /// A host-detection plugin: exposes `detect()`.
    Host,
    /// A provider plugin (e.g. a VM backend).
    Provider,
    /// A kind not known to the core, named by a stable string.
    Custom(&'static str),
}

impl ComponentKind {
    /// Returns a stable label for logging and enumeration ordering.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Host => "host",
            Self::Provider => "provider",
            Self::Custom(name) => name,
        }
    }
}

impl core::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}
