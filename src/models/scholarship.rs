use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::common::validate_extra_fields;

/// Amounts keep the client's number form, so `5000` is stored as an integer.
fn validate_non_negative(value: &Number) -> Result<(), ValidationError> {
    match value.as_f64() {
        Some(v) if v >= 0.0 => Ok(()),
        _ => Err(ValidationError::new("range")),
    }
}

/// Body of `POST /scholarships`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScholarshipRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Free-form deadline as entered by the client, e.g. `2025-08-31`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "validate_non_negative"))]
    pub amount: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "validate_non_negative"))]
    pub application_fee: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub posted_by: Option<String>,
    /// Fields outside the declared schema, stored as sent
    #[serde(flatten)]
    #[validate(custom(function = "validate_extra_fields"))]
    pub extra: BTreeMap<String, Value>,
}

/// Body of `PUT /scholarships/{id}`; only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScholarshipRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "validate_non_negative"))]
    pub amount: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "validate_non_negative"))]
    pub application_fee: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image_url: Option<String>,
    /// Fields outside the declared schema, stored as sent
    #[serde(flatten)]
    #[validate(custom(function = "validate_extra_fields"))]
    pub extra: BTreeMap<String, Value>,
}
