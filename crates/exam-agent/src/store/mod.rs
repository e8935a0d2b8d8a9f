//! Access to the resource store holding instances and templates.
//!
//! Handlers only see the [`ResourceStore`] trait: the Kubernetes-backed
//! [`KubeStore`] is used in production, [`MemoryStore`] for tests and local
//! runs without a cluster.

mod kubernetes;
mod memory;

pub use self::kubernetes::KubeStore;
pub use self::memory::MemoryStore;

use crate::crds::{Instance, InstanceSpec, Template};
use crate::error::StoreResult;
use async_trait::async_trait;
use std::fmt;

/// Outcome of [`ResourceStore::create_or_update_instance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Created,
    Updated,
}

impl OperationResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespace-scoped operations on CrownLabs resources
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch an instance by name
    async fn get_instance(&self, namespace: &str, name: &str) -> StoreResult<Instance>;

    /// Create the instance, or replace the spec of an existing one
    async fn create_or_update_instance(
        &self,
        namespace: &str,
        name: &str,
        spec: InstanceSpec,
    ) -> StoreResult<OperationResult>;

    /// Delete an instance by name
    async fn delete_instance(&self, namespace: &str, name: &str) -> StoreResult<()>;

    /// List every template of a namespace
    async fn list_templates(&self, namespace: &str) -> StoreResult<Vec<Template>>;
}
