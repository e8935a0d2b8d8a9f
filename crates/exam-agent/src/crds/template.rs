//! `Template` Custom Resource Definition (crownlabs.polito.it/v1alpha2)

use super::GenericRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_delete_after() -> String {
    "never".to_string()
}

/// `Template` CRD: a reusable environment definition instances are created from
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "crownlabs.polito.it", version = "v1alpha2", kind = "Template")]
#[kube(namespaced)]
#[kube(shortname = "tmpl")]
#[kube(printcolumn = r#"{"name":"Pretty Name","type":"string","jsonPath":".spec.prettyName"}"#)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
pub struct TemplateSpec {
    /// Human-readable name of the template
    #[serde(rename = "prettyName")]
    pub pretty_name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Workspace the template belongs to
    #[serde(
        default,
        rename = "workspace.crownlabs.polito.it/WorkspaceRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub workspace: Option<GenericRef>,

    /// Environments composing the template, passed through untouched
    #[serde(default, rename = "environmentList")]
    pub environment_list: Vec<serde_json::Value>,

    /// Lifetime of instances created from this template (e.g. "7d", "never")
    #[serde(default = "default_delete_after", rename = "deleteAfter")]
    pub delete_after: String,
}
