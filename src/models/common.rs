use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::database::UpdateOutcome;

/// Undeclared client fields may not use keys the document store reserves.
pub fn validate_extra_fields(extra: &BTreeMap<String, Value>) -> Result<(), ValidationError> {
    let reserved = extra
        .keys()
        .find(|key| key.is_empty() || *key == "_id" || key.starts_with('$') || key.contains('.'));

    match reserved {
        Some(key) => {
            let mut error = ValidationError::new("reserved_field");
            error.message = Some(format!("field '{}' cannot be stored", key).into());
            Err(error)
        }
        None => Ok(()),
    }
}

/// Result of an insert, shaped like the driver's `insertOne` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InsertResponse {
    pub fn inserted(id: String) -> Self {
        Self {
            acknowledged: true,
            inserted_id: Some(id),
            message: None,
        }
    }
}

/// Result of an update or delete that matched a document.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

impl MutationResponse {
    pub fn updated(what: &str, outcome: UpdateOutcome) -> Self {
        let success = outcome.modified > 0;
        Self {
            success,
            message: if success {
                format!("{} updated successfully", what)
            } else {
                format!("{} already up to date, nothing changed", what)
            },
            matched_count: Some(outcome.matched),
            modified_count: Some(outcome.modified),
            deleted_count: None,
        }
    }

    pub fn deleted(what: &str, count: u64) -> Self {
        Self {
            success: true,
            message: format!("{} deleted successfully", what),
            matched_count: None,
            modified_count: None,
            deleted_count: Some(count),
        }
    }
}

/// `?email=` filter used by the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}
