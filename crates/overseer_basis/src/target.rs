//! Targets: Project children with the same owner/closer pattern as
//! Basis/Project (`# 4.F`; shape supplemented by SPEC_FULL C.3).

/// A single provisioned target owned by a [`crate::project::Project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Human-assigned name.
    pub name: String,
    /// Server-assigned resource id.
    pub resource_id: String,
    /// The provider kind tag that constructed this target (e.g. which
    /// backend plugin owns it).
    pub provider: String,
}

impl Target {
    /// Builds a target record with an empty resource id, pending the
    /// first successful Upsert.
    #[must_use]
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_id: String::new(),
            provider: provider.into(),
        }
    }
}

impl From<Target> for overseer_system::TargetRecord {
    fn from(target: Target) -> Self {
        overseer_system::TargetRecord {
            name: target.name,
            resource_id: target.resource_id,
            provider: target.provider,
        }
    }
}

impl From<overseer_system::TargetRecord> for Target {
    fn from(record: overseer_system::TargetRecord) -> Self {
        Self {
            name: record.name,
            resource_id: record.resource_id,
            provider: record.provider,
        }
    }
}
