//! An in-memory [`overseer_system::PersistenceClient`] implementation for
//! tests and the demo binary. The wire transport proper is out of scope;
//! this only has to satisfy the RPC contract's round-trip semantics.

use async_trait::async_trait;
use overseer_system::{
    BasisRecord, Context, PersistenceClient, PersistenceError, ProjectRecord, TargetRecord,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A thread-safe, process-local [`PersistenceClient`] backed by in-memory
/// maps keyed by resource id. Every Upsert that arrives without a
/// `resource_id` is assigned a fresh [`nanoid`].
#[derive(Default)]
pub struct InMemoryClient {
    basis: Mutex<HashMap<String, BasisRecord>>,
    projects: Mutex<HashMap<String, ProjectRecord>>,
    targets: Mutex<HashMap<String, TargetRecord>>,
}

impl InMemoryClient {
    /// Returns an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn assign_id(existing: &str) -> String {
    if existing.is_empty() {
        nanoid::nanoid!()
    } else {
        existing.to_string()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryClient {
    async fn upsert_basis(&self, _ctx: &Context, mut record: BasisRecord) -> Result<BasisRecord, PersistenceError> {
        record.resource_id = assign_id(&record.resource_id);
        tracing::debug!(resource_id = %record.resource_id, name = %record.name, "upsert basis");
        self.basis.lock().insert(record.resource_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_basis(&self, _ctx: &Context, resource_id: &str) -> Result<BasisRecord, PersistenceError> {
        self.basis
            .lock()
            .get(resource_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(resource_id.to_string()))
    }

    async fn find_basis(
        &self,
        _ctx: &Context,
        resource_id: &str,
    ) -> Result<(Option<BasisRecord>, bool), PersistenceError> {
        let record = self.basis.lock().get(resource_id).cloned();
        let found = record.is_some();
        Ok((record, found))
    }

    async fn upsert_project(
        &self,
        _ctx: &Context,
        mut record: ProjectRecord,
    ) -> Result<ProjectRecord, PersistenceError> {
        record.resource_id = assign_id(&record.resource_id);
        tracing::debug!(resource_id = %record.resource_id, name = %record.name, "upsert project");
        self.projects.lock().insert(record.resource_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_project(&self, _ctx: &Context, resource_id: &str) -> Result<ProjectRecord, PersistenceError> {
        self.projects
            .lock()
            .get(resource_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(resource_id.to_string()))
    }

    async fn find_project(
        &self,
        _ctx: &Context,
        resource_id: &str,
    ) -> Result<(Option<ProjectRecord>, bool), PersistenceError> {
        let record = self.projects.lock().get(resource_id).cloned();
        let found = record.is_some();
        Ok((record, found))
    }

    async fn upsert_target(&self, _ctx: &Context, mut record: TargetRecord) -> Result<TargetRecord, PersistenceError> {
        record.resource_id = assign_id(&record.resource_id);
        tracing::debug!(resource_id = %record.resource_id, name = %record.name, "upsert target");
        self.targets.lock().insert(record.resource_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_target(&self, _ctx: &Context, resource_id: &str) -> Result<TargetRecord, PersistenceError> {
        self.targets
            .lock()
            .get(resource_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(resource_id.to_string()))
    }

    async fn find_target(
        &self,
        _ctx: &Context,
        resource_id: &str,
    ) -> Result<(Option<TargetRecord>, bool), PersistenceError> {
        let record = self.targets.lock().get(resource_id).cloned();
        let found = record.is_some();
        Ok((record, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_assigns_id_when_absent() {
        let client = InMemoryClient::new();
        let ctx = Context::new();
        let saved = client
            .upsert_basis(
                &ctx,
                BasisRecord {
                    name: "demo".into(),
                    resource_id: String::new(),
                    path: "/tmp".into(),
                    targets: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert!(!saved.resource_id.is_empty());
    }

    #[tokio::test]
    async fn upsert_is_idempotent_for_unchanged_resource_id() {
        let client = InMemoryClient::new();
        let ctx = Context::new();
        let record = BasisRecord {
            name: "demo".into(),
            resource_id: "fixed-id".into(),
            path: "/tmp".into(),
            targets: Vec::new(),
        };
        let first = client.upsert_basis(&ctx, record.clone()).await.unwrap();
        let second = client.upsert_basis(&ctx, record).await.unwrap();
        assert_eq!(first.resource_id, second.resource_id);
    }

    #[tokio::test]
    async fn find_reports_not_found_without_erroring() {
        let client = InMemoryClient::new();
        let ctx = Context::new();
        let (record, found) = client.find_basis(&ctx, "missing").await.unwrap();
        assert!(record.is_none());
        assert!(!found);
    }

    #[tokio::test]
    async fn get_missing_fails_with_not_found() {
        let client = InMemoryClient::new();
        let ctx = Context::new();
        assert!(matches!(
            client.get_basis(&ctx, "missing").await,
            Err(PersistenceError::NotFound(_))
        ));
    }
}
