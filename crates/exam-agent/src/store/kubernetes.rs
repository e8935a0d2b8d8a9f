//! Kubernetes-backed resource store.

use super::{OperationResult, ResourceStore};
use crate::crds::{Instance, InstanceSpec, Template};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use kube::{
    api::{Api, DeleteParams, ListParams, PostParams},
    Client,
};
use tracing::{debug, info};

/// [`ResourceStore`] talking to the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the in-cluster environment or the local kubeconfig
    pub async fn try_default() -> StoreResult<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn instances(&self, namespace: &str) -> Api<Instance> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn templates(&self, namespace: &str) -> Api<Template> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Maps API errors on a named object to store errors
fn map_err(err: kube::Error, kind: &'static str, namespace: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        err => StoreError::Kube(err),
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn get_instance(&self, namespace: &str, name: &str) -> StoreResult<Instance> {
        self.instances(namespace)
            .get(name)
            .await
            .map_err(|e| map_err(e, "Instance", namespace, name))
    }

    async fn create_or_update_instance(
        &self,
        namespace: &str,
        name: &str,
        spec: InstanceSpec,
    ) -> StoreResult<OperationResult> {
        let instances = self.instances(namespace);

        match instances.get(name).await {
            Ok(mut existing) => {
                existing.spec = spec;
                instances
                    .replace(name, &PostParams::default(), &existing)
                    .await
                    .map_err(|e| map_err(e, "Instance", namespace, name))?;
                debug!("Updated instance {}/{}", namespace, name);
                Ok(OperationResult::Updated)
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                let mut instance = Instance::new(name, spec);
                instance.metadata.namespace = Some(namespace.to_string());
                instances
                    .create(&PostParams::default(), &instance)
                    .await
                    .map_err(|e| map_err(e, "Instance", namespace, name))?;
                info!("Created instance {}/{}", namespace, name);
                Ok(OperationResult::Created)
            }
            Err(e) => Err(map_err(e, "Instance", namespace, name)),
        }
    }

    async fn delete_instance(&self, namespace: &str, name: &str) -> StoreResult<()> {
        self.instances(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_err(e, "Instance", namespace, name))?;
        Ok(())
    }

    async fn list_templates(&self, namespace: &str) -> StoreResult<Vec<Template>> {
        let list = self.templates(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::GenericRef;
    use axum::http::{Method, Request, Response, StatusCode};
    use bytes::Bytes;
    use http_body_util::Full;
    use serde_json::{json, Value};
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    const INSTANCES: &str = "/apis/crownlabs.polito.it/v1alpha2/namespaces/ns/instances";
    const TEMPLATES: &str = "/apis/crownlabs.polito.it/v1alpha2/namespaces/ns/templates";

    type Calls = Arc<Mutex<Vec<(Method, String)>>>;

    /// Builds a client whose requests are answered by `respond` and recorded
    fn fake_client<F>(respond: F) -> (Client, Calls)
    where
        F: Fn(&Method, &str) -> (StatusCode, Value) + Clone + Send + Sync + 'static,
    {
        let calls: Calls = Arc::default();
        let recorded = calls.clone();
        let service = tower::service_fn(move |req: Request<kube::client::Body>| {
            let respond = respond.clone();
            let recorded = recorded.clone();
            async move {
                let method = req.method().clone();
                let path = req.uri().path().to_string();
                let (status, body) = respond(&method, &path);
                recorded.lock().unwrap().push((method, path));
                let response = Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Full::new(Bytes::from(body.to_string())))
                    .unwrap();
                Ok::<_, Infallible>(response)
            }
        });
        (Client::new(service, "default"), calls)
    }

    fn status_error(code: u16, reason: &str) -> Value {
        json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": reason,
            "reason": reason,
            "code": code
        })
    }

    fn instance_json(template: &str) -> Value {
        json!({
            "apiVersion": "crownlabs.polito.it/v1alpha2",
            "kind": "Instance",
            "metadata": {"name": "x", "namespace": "ns", "resourceVersion": "7"},
            "spec": {
                "template.crownlabs.polito.it/TemplateRef": {"name": template, "namespace": "ns"},
                "tenant.crownlabs.polito.it/TenantRef": {"name": "service-tenant"},
                "running": true
            }
        })
    }

    fn spec() -> InstanceSpec {
        InstanceSpec {
            template: GenericRef::namespaced("t1", "ns"),
            tenant: GenericRef::new("service-tenant"),
            running: true,
            pretty_name: Some("Exam x".to_string()),
            customization_urls: None,
        }
    }

    #[tokio::test]
    async fn test_get_maps_404_to_not_found() {
        let (client, calls) =
            fake_client(|_, _| (StatusCode::NOT_FOUND, status_error(404, "NotFound")));
        let store = KubeStore::new(client);

        let err = store.get_instance("ns", "x").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[(Method::GET, format!("{INSTANCES}/x"))]
        );
    }

    #[tokio::test]
    async fn test_get_keeps_other_api_errors() {
        let (client, _) = fake_client(|_, _| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                status_error(500, "InternalError"),
            )
        });
        let store = KubeStore::new(client);

        let err = store.get_instance("ns", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::Kube(_)));
    }

    #[tokio::test]
    async fn test_create_when_missing() {
        let (client, calls) = fake_client(|method, _| match *method {
            Method::GET => (StatusCode::NOT_FOUND, status_error(404, "NotFound")),
            _ => (StatusCode::CREATED, instance_json("t1")),
        });
        let store = KubeStore::new(client);

        let op = store
            .create_or_update_instance("ns", "x", spec())
            .await
            .unwrap();
        assert_eq!(op, OperationResult::Created);
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[
                (Method::GET, format!("{INSTANCES}/x")),
                (Method::POST, INSTANCES.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_when_present() {
        let (client, calls) = fake_client(|_, _| (StatusCode::OK, instance_json("t1")));
        let store = KubeStore::new(client);

        let op = store
            .create_or_update_instance("ns", "x", spec())
            .await
            .unwrap();
        assert_eq!(op, OperationResult::Updated);
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[
                (Method::GET, format!("{INSTANCES}/x")),
                (Method::PUT, format!("{INSTANCES}/x")),
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_conflict() {
        let (client, _) = fake_client(|method, _| match *method {
            Method::GET => (StatusCode::OK, instance_json("t1")),
            _ => (StatusCode::CONFLICT, status_error(409, "Conflict")),
        });
        let store = KubeStore::new(client);

        let err = store
            .create_or_update_instance("ns", "x", spec())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_templates() {
        let (client, calls) = fake_client(|_, _| {
            (
                StatusCode::OK,
                json!({
                    "apiVersion": "crownlabs.polito.it/v1alpha2",
                    "kind": "TemplateList",
                    "metadata": {"resourceVersion": "1"},
                    "items": [{
                        "apiVersion": "crownlabs.polito.it/v1alpha2",
                        "kind": "Template",
                        "metadata": {
                            "name": "green-tea",
                            "namespace": "ns",
                            "creationTimestamp": "2024-03-01T10:00:00Z"
                        },
                        "spec": {"prettyName": "Green Tea", "environmentList": []}
                    }]
                }),
            )
        });
        let store = KubeStore::new(client);

        let templates = store.list_templates("ns").await.unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].spec.pretty_name, "Green Tea");
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[(Method::GET, TEMPLATES.to_string())]
        );
    }
}
