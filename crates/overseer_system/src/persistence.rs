//! Persistence Client: the consumed contract (`# 4.D`) through which a
//! Basis/Project/Target resolves and saves its canonical record. The
//! transport is opaque to the core — only the RPC shape is specified here;
//! `overseer_persistence` supplies an in-memory implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::Context;

/// The canonical Basis record, as read from and written to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisRecord {
    /// Human-assigned name.
    pub name: String,
    /// Server-assigned resource id; empty until the first successful Upsert.
    pub resource_id: String,
    /// Data directory path, as recorded server-side.
    pub path: String,
    /// Resource ids of targets directly owned at the Basis level, if any.
    pub targets: Vec<String>,
}

/// The canonical Project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Human-assigned name.
    pub name: String,
    /// Server-assigned resource id.
    pub resource_id: String,
    /// Data directory path.
    pub path: String,
    /// Resource ids of this project's targets.
    pub targets: Vec<String>,
}

/// The canonical Target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Human-assigned name.
    pub name: String,
    /// Server-assigned resource id.
    pub resource_id: String,
    /// The provider-kind tag (e.g. which backend constructed this target).
    pub provider: String,
}

/// Errors a [`PersistenceClient`] implementation may raise. The transport
/// itself is opaque; this enum only names the shapes the core branches on.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The remote call failed; the message is transport-defined.
    #[error("persistence call failed: {0}")]
    Transport(String),

    /// The referenced record does not exist (for calls that require it to).
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Consumed contract: `Upsert`, `Find`, `Get` over Basis/Project/Target
/// records (`# 4.D`, `# 6`). `Find` returns `(record, found_flag)`; `Get`
/// and `Upsert` return the canonical record. Every call takes the Basis
/// [`Context`]. Implementations must make repeated Upserts of an unchanged
/// record idempotent.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Inserts or updates a Basis record, returning the canonical result
    /// (with a server-assigned `resource_id` if one was not already set).
    async fn upsert_basis(&self, ctx: &Context, record: BasisRecord) -> Result<BasisRecord, PersistenceError>;

    /// Fetches a Basis record by resource id, or fails with `NotFound`.
    async fn get_basis(&self, ctx: &Context, resource_id: &str) -> Result<BasisRecord, PersistenceError>;

    /// Looks a Basis record up by resource id without failing if absent.
    async fn find_basis(
        &self,
        ctx: &Context,
        resource_id: &str,
    ) -> Result<(Option<BasisRecord>, bool), PersistenceError>;

    /// Inserts or updates a Project record.
    async fn upsert_project(
        &self,
        ctx: &Context,
        record: ProjectRecord,
    ) -> Result<ProjectRecord, PersistenceError>;

    /// Fetches a Project record by resource id, or fails with `NotFound`.
    async fn get_project(&self, ctx: &Context, resource_id: &str) -> Result<ProjectRecord, PersistenceError>;

    /// Looks a Project record up by resource id without failing if absent.
    async fn find_project(
        &self,
        ctx: &Context,
        resource_id: &str,
    ) -> Result<(Option<ProjectRecord>, bool), PersistenceError>;

    /// Inserts or updates a Target record.
    async fn upsert_target(&self, ctx: &Context, record: TargetRecord) -> Result<TargetRecord, PersistenceError>;

    /// Fetches a Target record by resource id, or fails with `NotFound`.
    async fn get_target(&self, ctx: &Context, resource_id: &str) -> Result<TargetRecord, PersistenceError>;

    /// Looks a Target record up by resource id without failing if absent.
    async fn find_target(
        &self,
        ctx: &Context,
        resource_id: &str,
    ) -> Result<(Option<TargetRecord>, bool), PersistenceError>;
}
