//! Instance lookup, upsert and deletion.

use crate::crds::{EnvironmentPhase, GenericRef, Instance, InstanceSpec, SVC_TENANT_NAME};
use crate::error::ApiError;
use crate::server::ServerState;
use crate::store::OperationResult;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{
        header::{LOCATION, REFRESH},
        Method, StatusCode, Uri,
    },
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Route prefix; everything after it is the instance name
pub const INSTANCE_PATH_PREFIX: &str = "/instance/";

/// Page served while the environment is still being provisioned
pub const STARTING_UP_PAGE: &str = include_str!("../../assets/starting-up.html");

/// Seconds after which the browser reloads the starting-up page
const REFRESH_SECONDS: &str = "5";

/// Instance as submitted by exam clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EAInstance {
    pub id: String,
    pub template: String,
    pub running: bool,
}

impl EAInstance {
    /// Desired state of the backing `Instance`; the template is looked up in `namespace`
    pub fn to_spec(&self, namespace: &str) -> InstanceSpec {
        InstanceSpec {
            template: GenericRef::namespaced(&self.template, namespace),
            tenant: GenericRef::new(SVC_TENANT_NAME),
            running: self.running,
            pretty_name: Some(format!("Exam {}", self.id)),
            customization_urls: None,
        }
    }
}

/// Instance name carried by the request path, taken verbatim after the prefix
pub fn instance_name(uri: &Uri) -> &str {
    let path = uri.path();
    path.strip_prefix(INSTANCE_PATH_PREFIX).unwrap_or(path)
}

/// `/instance/<name>`: GET, PUT and DELETE on a single instance
pub async fn instance_handler(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let name = instance_name(&uri);
    debug!("Request for instance: {}", name);

    let result = match method {
        Method::GET => handle_get(&state, name).await,
        Method::PUT => handle_put(&state, peer, name, &body).await,
        Method::DELETE => handle_delete(&state, peer, name).await,
        _ => Err(ApiError::MethodNotAllowed),
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

async fn handle_get(state: &ServerState, name: &str) -> Result<Response, ApiError> {
    let instance = state
        .store
        .get_instance(&state.namespace, name)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                return ApiError::NotFound;
            }
            error!("Error retrieving instance {}: {}", name, e);
            ApiError::RetrieveFailed
        })?;

    access_response(&instance)
}

/// Maps the observed phase of an instance to what the browser should see
fn access_response(instance: &Instance) -> Result<Response, ApiError> {
    let phase = instance.phase();
    let name = instance.metadata.name.as_deref().unwrap_or_default();

    if phase == EnvironmentPhase::Ready {
        info!("Redirecting {} to {}", name, instance.url());
        return Ok((StatusCode::FOUND, [(LOCATION, instance.url())]).into_response());
    }

    if phase.is_failed() {
        error!("Instance {} in invalid phase: {}", name, phase);
        return Err(ApiError::EnvironmentFailed);
    }

    debug!("Instance {} (phase: {}): sending starting-up page", name, phase);
    Ok((
        StatusCode::CREATED,
        [(REFRESH, REFRESH_SECONDS)],
        Html(STARTING_UP_PAGE),
    )
        .into_response())
}

async fn handle_put(
    state: &ServerState,
    peer: SocketAddr,
    name: &str,
    body: &[u8],
) -> Result<Response, ApiError> {
    authorize(state, peer)?;

    let request: EAInstance = serde_json::from_slice(body).map_err(|e| {
        error!("Error parsing request: {}", e);
        ApiError::BadRequest
    })?;

    if request.id != name {
        error!("Incoherent EAInstance ids {}:{}", name, request.id);
        return Err(ApiError::BadRequest);
    }

    let spec = request.to_spec(&state.namespace);
    let op = state
        .store
        .create_or_update_instance(&state.namespace, name, spec)
        .await
        .map_err(|e| {
            error!("Instance {} cannot be saved: {}", name, e);
            ApiError::SaveFailed(name.to_string())
        })?;

    let status = match op {
        OperationResult::Created => StatusCode::CREATED,
        OperationResult::Updated => StatusCode::OK,
    };
    info!("Instance {} {}", name, op);

    Ok((status, op.as_str()).into_response())
}

async fn handle_delete(
    state: &ServerState,
    peer: SocketAddr,
    name: &str,
) -> Result<Response, ApiError> {
    authorize(state, peer)?;

    state
        .store
        .delete_instance(&state.namespace, name)
        .await
        .map_err(|e| {
            error!("Error deleting instance {}: {}", name, e);
            ApiError::DeleteFailed
        })?;

    info!("Instance {} deleted", name);
    Ok(StatusCode::OK.into_response())
}

fn authorize(state: &ServerState, peer: SocketAddr) -> Result<(), ApiError> {
    let remote_addr = peer.to_string();
    if state.allow_list.check_allowed_ip(&remote_addr) {
        return Ok(());
    }

    error!("Request from unauthorized IP: {}", remote_addr);
    Err(ApiError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::InstanceStatus;

    fn instance_in_phase(phase: EnvironmentPhase, url: Option<&str>) -> Instance {
        let mut instance = Instance::new("x", EAInstance::default().to_spec("ns"));
        instance.status = Some(InstanceStatus {
            phase,
            url: url.map(str::to_string),
            ..Default::default()
        });
        instance
    }

    #[test]
    fn test_spec_from_request() {
        let request = EAInstance {
            id: "x".to_string(),
            template: "t1".to_string(),
            running: true,
        };

        let spec = request.to_spec("workspace-exams");
        assert_eq!(spec.template, GenericRef::namespaced("t1", "workspace-exams"));
        assert_eq!(spec.tenant, GenericRef::new("service-tenant"));
        assert!(spec.running);
        assert_eq!(spec.pretty_name.as_deref(), Some("Exam x"));
    }

    #[test]
    fn test_request_fields_default() {
        let request: EAInstance = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(request.template, "");
        assert!(!request.running);
    }

    #[test]
    fn test_instance_name_is_whole_remainder() {
        let uri: Uri = "/instance/exam/student-1?x=1".parse().unwrap();
        assert_eq!(instance_name(&uri), "exam/student-1");

        let uri: Uri = "/instance/a%20b".parse().unwrap();
        assert_eq!(instance_name(&uri), "a%20b");
    }

    #[test]
    fn test_ready_redirects() {
        let rsp = access_response(&instance_in_phase(
            EnvironmentPhase::Ready,
            Some("https://foo"),
        ))
        .unwrap();
        assert_eq!(rsp.status(), StatusCode::FOUND);
        assert_eq!(rsp.headers()[LOCATION], "https://foo");
    }

    #[test]
    fn test_failed_phases_are_errors() {
        for phase in [EnvironmentPhase::Failed, EnvironmentPhase::CreationLoopBackoff] {
            let err = access_response(&instance_in_phase(phase, None)).unwrap_err();
            assert!(matches!(err, ApiError::EnvironmentFailed));
        }
    }

    #[test]
    fn test_intermediate_phases_serve_starting_page() {
        for phase in [
            EnvironmentPhase::Unset,
            EnvironmentPhase::Importing,
            EnvironmentPhase::Starting,
            EnvironmentPhase::Running,
            EnvironmentPhase::Other("Hibernating".to_string()),
        ] {
            let rsp = access_response(&instance_in_phase(phase, None)).unwrap();
            assert_eq!(rsp.status(), StatusCode::CREATED);
            assert_eq!(rsp.headers()[REFRESH], "5");
        }
    }
}
