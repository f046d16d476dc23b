use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::api::errors::ApiError;
use crate::api::extract::{from_merged, merge_patch, Payload};
use crate::api::middleware::JwtAuth;
use crate::api::responses::DocumentResponse;
use crate::api::state::AppState;
use crate::domain::document::{Document, DocumentInput};

async fn find_document(state: &AppState, id: i64) -> Result<Document, ApiError> {
    state
        .documents
        .find_by_id(id)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// GET /documents/
#[tracing::instrument(skip(state, _auth))]
pub async fn list_documents(
    State(state): State<AppState>,
    _auth: JwtAuth,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = state.documents.list().await?;
    Ok(Json(documents.into_iter().map(DocumentResponse::from).collect()))
}

/// Attach a document to an IPO that has none yet
///
/// POST /documents/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn create_document(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Payload(input): Payload<DocumentInput>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let document = state.documents.create(input.validate()?).await?;

    tracing::info!(document_id = document.id, ipo_id = document.ipo_id, "Document created");

    Ok((StatusCode::CREATED, Json(document.into())))
}

/// GET /documents/:id/
#[tracing::instrument(skip(state, _auth))]
pub async fn get_document(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<Json<DocumentResponse>, ApiError> {
    Ok(Json(find_document(&state, id).await?.into()))
}

/// PUT /documents/:id/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn update_document(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    Payload(input): Payload<DocumentInput>,
) -> Result<Json<DocumentResponse>, ApiError> {
    find_document(&state, id).await?;
    save_document(&state, id, input).await
}

/// PATCH /documents/:id/
#[tracing::instrument(skip(state, _auth, patch))]
pub async fn patch_document(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    Payload(patch): Payload<Value>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let current = find_document(&state, id).await?;
    let base = json!({
        "ipo": current.ipo_id,
        "rhp_pdf": current.files.rhp_pdf,
        "drhp_pdf": current.files.drhp_pdf,
    });

    save_document(&state, id, from_merged(merge_patch(base, patch)?)?).await
}

async fn save_document(
    state: &AppState,
    id: i64,
    input: DocumentInput,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .documents
        .update(id, input.validate()?)
        .await?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(document_id = id, "Document updated");

    Ok(Json(document.into()))
}

/// DELETE /documents/:id/
#[tracing::instrument(skip(state, _auth))]
pub async fn delete_document(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.documents.delete(id).await? {
        return Err(ApiError::not_found());
    }

    tracing::info!(document_id = id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
