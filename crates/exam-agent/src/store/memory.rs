//! In-memory resource store.

use super::{OperationResult, ResourceStore};
use crate::crds::{EnvironmentPhase, Instance, InstanceSpec, InstanceStatus, Template, TemplateSpec};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// [`ResourceStore`] keeping objects in process memory.
///
/// Listing returns objects ordered by name, as the API server does.
#[derive(Default)]
pub struct MemoryStore {
    instances: RwLock<BTreeMap<Key, Instance>>,
    templates: RwLock<BTreeMap<Key, Template>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template created at `created_at`
    pub async fn insert_template(
        &self,
        namespace: &str,
        name: &str,
        spec: TemplateSpec,
        created_at: DateTime<Utc>,
    ) {
        let mut template = Template::new(name, spec);
        template.metadata.namespace = Some(namespace.to_string());
        template.metadata.creation_timestamp = Some(Time(created_at));
        self.templates
            .write()
            .await
            .insert(key(namespace, name), template);
    }

    /// Records the observed state of an instance, as the instance operator would
    pub async fn set_status(
        &self,
        namespace: &str,
        name: &str,
        phase: EnvironmentPhase,
        url: Option<&str>,
    ) -> StoreResult<()> {
        let mut instances = self.instances.write().await;
        let instance = instances
            .get_mut(&key(namespace, name))
            .ok_or_else(|| not_found(namespace, name))?;
        instance.status = Some(InstanceStatus {
            phase,
            url: url.map(str::to_string),
            ..Default::default()
        });
        Ok(())
    }

    /// Snapshot of a stored instance
    pub async fn instance(&self, namespace: &str, name: &str) -> Option<Instance> {
        self.instances
            .read()
            .await
            .get(&key(namespace, name))
            .cloned()
    }

    pub async fn instance_count(&self) -> usize {
        self.instances.read().await.len()
    }
}

fn not_found(namespace: &str, name: &str) -> StoreError {
    StoreError::NotFound {
        kind: "Instance",
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get_instance(&self, namespace: &str, name: &str) -> StoreResult<Instance> {
        self.instance(namespace, name)
            .await
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn create_or_update_instance(
        &self,
        namespace: &str,
        name: &str,
        spec: InstanceSpec,
    ) -> StoreResult<OperationResult> {
        let mut instances = self.instances.write().await;

        if let Some(existing) = instances.get_mut(&key(namespace, name)) {
            existing.spec = spec;
            return Ok(OperationResult::Updated);
        }

        let mut instance = Instance::new(name, spec);
        instance.metadata.namespace = Some(namespace.to_string());
        instance.metadata.creation_timestamp = Some(Time(Utc::now()));
        instances.insert(key(namespace, name), instance);
        Ok(OperationResult::Created)
    }

    async fn delete_instance(&self, namespace: &str, name: &str) -> StoreResult<()> {
        self.instances
            .write()
            .await
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found(namespace, name))
    }

    async fn list_templates(&self, namespace: &str) -> StoreResult<Vec<Template>> {
        Ok(self
            .templates
            .read()
            .await
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, template)| template.clone())
            .collect())
    }
}
