//! CrownLabs custom resources consumed by the exam agent.
//!
//! Only the fields the agent reads or writes are modelled; unknown fields sent
//! by the API server are ignored on deserialization.

pub mod instance;
pub mod template;

pub use instance::*;
pub use template::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the CrownLabs resources
pub const CROWNLABS_GROUP: &str = "crownlabs.polito.it";

/// Tenant owning every instance created through the exam agent
pub const SVC_TENANT_NAME: &str = "service-tenant";

/// Reference to another namespaced (or cluster-scoped) object
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct GenericRef {
    /// Name of the referenced object
    pub name: String,

    /// Namespace of the referenced object, absent for cluster-scoped objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl GenericRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}
