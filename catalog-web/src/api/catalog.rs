//! JSON edit/delete endpoints used by the index page
//!
//! Request bodies are typed: `id` is required, every other field is optional.
//! Ids may arrive as numbers or numeric strings (HTML data attributes are
//! strings), and `lifetime`/`year` accept numbers as well as text.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use catalog_common::catalog::{ComposerPatch, CompositionPatch};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EditComposerRequest {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub lifetime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditCompositionRequest {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub url: Option<String>,
}

/// Body of both delete endpoints. Extra fields (the page also sends the
/// composer name) are ignored.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationResponse {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    fn ok_with(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
        }
    }
}

/// Build the JSON mutation routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/edit-composer", post(edit_composer))
        .route("/edit-composition", post(edit_composition))
        .route("/delete-composer", post(delete_composer))
        .route("/delete-composition", post(delete_composition))
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// POST /edit-composer
///
/// Partial update: only non-empty `name`/`lifetime` overwrite stored values.
pub async fn edit_composer(
    State(state): State<AppState>,
    payload: Result<Json<EditComposerRequest>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let req = parse_body(payload)?;
    info!("Edit composer request: {}", req.id);

    let patch = ComposerPatch {
        name: req.name,
        lifetime: req.lifetime,
    };
    state
        .catalog
        .edit_composer(req.id, patch)
        .await
        .map_err(|e| ApiError::from_catalog("Failed to update composer", e))?;

    Ok(Json(MutationResponse::ok_with("Composer updated successfully")))
}

/// POST /edit-composition
///
/// Partial update: only non-empty `title`/`year`/`url` overwrite stored values.
pub async fn edit_composition(
    State(state): State<AppState>,
    payload: Result<Json<EditCompositionRequest>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let req = parse_body(payload)?;
    info!("Edit composition request: {}", req.id);

    let patch = CompositionPatch {
        title: req.title,
        year: req.year,
        url: req.url,
    };
    state
        .catalog
        .edit_composition(req.id, patch)
        .await
        .map_err(|e| ApiError::from_catalog("Failed to update composition", e))?;

    Ok(Json(MutationResponse::ok_with("Composition updated successfully")))
}

/// POST /delete-composer
///
/// Removes the composer together with all of its compositions.
pub async fn delete_composer(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let req = parse_body(payload)?;

    state
        .catalog
        .delete_composer(req.id)
        .await
        .map_err(|e| ApiError::from_catalog("Failed to delete composer", e))?;

    Ok(Json(MutationResponse::ok()))
}

/// POST /delete-composition
pub async fn delete_composition(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let req = parse_body(payload)?;

    state
        .catalog
        .delete_composition(req.id)
        .await
        .map_err(|e| ApiError::from_catalog("Failed to delete composition", e))?;

    Ok(Json(MutationResponse::ok()))
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("invalid id: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid id: {:?}", s))),
        other => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected text, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_accepts_number_and_numeric_string() {
        let from_number: DeleteRequest = serde_json::from_value(json!({"id": 4})).unwrap();
        let from_string: DeleteRequest = serde_json::from_value(json!({"id": " 4 "})).unwrap();
        assert_eq!(from_number.id, 4);
        assert_eq!(from_string.id, 4);

        assert!(serde_json::from_value::<DeleteRequest>(json!({"id": "four"})).is_err());
        assert!(serde_json::from_value::<DeleteRequest>(json!({})).is_err());
    }

    #[test]
    fn test_optional_text_fields() {
        let req: EditComposerRequest =
            serde_json::from_value(json!({"id": "1", "lifetime": 1685})).unwrap();
        assert_eq!(req.name, None);
        assert_eq!(req.lifetime.as_deref(), Some("1685"));

        let req: EditCompositionRequest =
            serde_json::from_value(json!({"id": 2, "title": null, "year": "", "url": "u"}))
                .unwrap();
        assert_eq!(req.title, None);
        assert_eq!(req.year.as_deref(), Some(""));
        assert_eq!(req.url.as_deref(), Some("u"));

        assert!(serde_json::from_value::<EditCompositionRequest>(json!({"id": 2, "year": true}))
            .is_err());
    }
}
