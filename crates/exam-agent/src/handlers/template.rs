//! Template listing.

use crate::crds::Template;
use crate::error::ApiError;
use crate::server::ServerState;
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Rendering of a missing creation timestamp (the zero time)
const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

/// Template as exposed to exam clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EATemplate {
    pub name: String,
    #[serde(rename = "prettyName")]
    pub pretty_name: String,
    /// RFC 3339 creation time
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&Template> for EATemplate {
    fn from(template: &Template) -> Self {
        let created_at = template
            .metadata
            .creation_timestamp
            .as_ref()
            .map_or_else(
                || ZERO_TIME.to_string(),
                |time| time.0.to_rfc3339_opts(SecondsFormat::Secs, true),
            );

        Self {
            name: template.metadata.name.clone().unwrap_or_default(),
            pretty_name: template.spec.pretty_name.clone(),
            created_at,
        }
    }
}

/// `GET /template`: lists the templates of the configured namespace
pub async fn template_handler(State(state): State<Arc<ServerState>>, method: Method) -> Response {
    if method != Method::GET {
        return ApiError::MethodNotAllowed.into_response();
    }

    let templates = match state.store.list_templates(&state.namespace).await {
        Ok(templates) => templates,
        Err(e) => {
            error!("Error listing templates in {}: {}", state.namespace, e);
            return ApiError::Internal.into_response();
        }
    };

    let agent_templates: Vec<EATemplate> = templates.iter().map(EATemplate::from).collect();
    debug!("Listing {} templates", agent_templates.len());

    match serde_json::to_vec(&agent_templates) {
        Ok(body) => (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!("Error encoding templates: {}", e);
            ApiError::Internal.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::TemplateSpec;
    use chrono::{TimeZone, Utc};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    fn template(name: &str, pretty_name: &str) -> Template {
        Template::new(
            name,
            TemplateSpec {
                pretty_name: pretty_name.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_projection_formats_rfc3339_seconds() {
        let mut tmpl = template("green-tea", "Green Tea");
        tmpl.metadata.creation_timestamp = Some(Time(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                + chrono::Duration::milliseconds(250),
        ));

        assert_eq!(
            EATemplate::from(&tmpl),
            EATemplate {
                name: "green-tea".to_string(),
                pretty_name: "Green Tea".to_string(),
                created_at: "2024-03-01T10:00:00Z".to_string(),
            }
        );
    }

    #[test]
    fn test_projection_without_timestamp() {
        let tmpl = template("green-tea", "Green Tea");
        assert_eq!(EATemplate::from(&tmpl).created_at, ZERO_TIME);
    }

    #[test]
    fn test_json_field_names() {
        let value = serde_json::to_value(EATemplate {
            name: "a".to_string(),
            pretty_name: "A".to_string(),
            created_at: ZERO_TIME.to_string(),
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "a", "prettyName": "A", "createdAt": ZERO_TIME})
        );
    }
}
