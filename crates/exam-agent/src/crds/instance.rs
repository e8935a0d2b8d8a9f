//! `Instance` Custom Resource Definition (crownlabs.polito.it/v1alpha2)

use super::GenericRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_running() -> bool {
    true
}

/// URLs used to customize the instance environment
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct InstanceCustomizationUrls {
    /// URL the content of the instance is loaded from on start
    #[serde(default, rename = "contentOrigin", skip_serializing_if = "Option::is_none")]
    pub content_origin: Option<String>,

    /// URL the content of the instance is uploaded to on termination
    #[serde(default, rename = "contentDestination", skip_serializing_if = "Option::is_none")]
    pub content_destination: Option<String>,

    /// URL notified when the instance is stopped
    #[serde(default, rename = "statusCheck", skip_serializing_if = "Option::is_none")]
    pub status_check: Option<String>,
}

/// `Instance` CRD: a running (or stopped) environment derived from a `Template`
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "crownlabs.polito.it", version = "v1alpha2", kind = "Instance")]
#[kube(namespaced)]
#[kube(status = "InstanceStatus")]
#[kube(shortname = "inst")]
#[kube(printcolumn = r#"{"name":"Pretty Name","type":"string","jsonPath":".spec.prettyName"}"#)]
#[kube(printcolumn = r#"{"name":"Running","type":"boolean","jsonPath":".spec.running"}"#)]
#[kube(printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#)]
#[kube(printcolumn = r#"{"name":"URL","type":"string","jsonPath":".status.url"}"#)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
pub struct InstanceSpec {
    /// Template the instance is created from
    #[serde(rename = "template.crownlabs.polito.it/TemplateRef")]
    pub template: GenericRef,

    /// Tenant owning the instance
    #[serde(rename = "tenant.crownlabs.polito.it/TenantRef")]
    pub tenant: GenericRef,

    /// Desired power state
    #[serde(default = "default_running")]
    pub running: bool,

    /// Human-readable name shown in the dashboard
    #[serde(default, rename = "prettyName", skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,

    #[serde(default, rename = "customizationUrls", skip_serializing_if = "Option::is_none")]
    pub customization_urls: Option<InstanceCustomizationUrls>,
}

/// Observed state of an `Instance`, written by the instance operator
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct InstanceStatus {
    /// Current provisioning phase
    #[serde(default)]
    #[schemars(with = "String")]
    pub phase: EnvironmentPhase,

    /// Public URL the environment is reachable at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Internal IP address of the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Node the environment is scheduled on
    #[serde(default, rename = "nodeName", skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    /// Time elapsed between creation and first readiness
    #[serde(default, rename = "initialReadyTime", skip_serializing_if = "Option::is_none")]
    pub initial_ready_time: Option<String>,
}

/// Provisioning phase of an environment.
///
/// Values outside the known set are preserved in [`EnvironmentPhase::Other`].
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum EnvironmentPhase {
    #[default]
    Unset,
    Importing,
    Starting,
    ResourceQuotaExceeded,
    Running,
    Ready,
    Stopping,
    Off,
    Failed,
    CreationLoopBackoff,
    Other(String),
}

impl EnvironmentPhase {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::Importing => "Importing",
            Self::Starting => "Starting",
            Self::ResourceQuotaExceeded => "ResourceQuotaExceeded",
            Self::Running => "Running",
            Self::Ready => "Ready",
            Self::Stopping => "Stopping",
            Self::Off => "Off",
            Self::Failed => "Failed",
            Self::CreationLoopBackoff => "CreationLoopBackoff",
            Self::Other(phase) => phase,
        }
    }

    /// Phases from which the environment will not recover on its own
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::CreationLoopBackoff)
    }
}

impl From<String> for EnvironmentPhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => Self::Unset,
            "Importing" => Self::Importing,
            "Starting" => Self::Starting,
            "ResourceQuotaExceeded" => Self::ResourceQuotaExceeded,
            "Running" => Self::Running,
            "Ready" => Self::Ready,
            "Stopping" => Self::Stopping,
            "Off" => Self::Off,
            "Failed" => Self::Failed,
            "CreationLoopBackoff" => Self::CreationLoopBackoff,
            _ => Self::Other(value),
        }
    }
}

impl From<EnvironmentPhase> for String {
    fn from(value: EnvironmentPhase) -> Self {
        match value {
            EnvironmentPhase::Other(phase) => phase,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EnvironmentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Instance {
    /// Phase reported by the operator, `Unset` when no status was written yet
    pub fn phase(&self) -> EnvironmentPhase {
        self.status
            .as_ref()
            .map(|status| status.phase.clone())
            .unwrap_or_default()
    }

    /// Published URL, empty when the operator did not set one
    pub fn url(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|status| status.url.as_deref())
            .unwrap_or_default()
    }
}
