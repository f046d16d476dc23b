use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::extract::{from_merged, merge_patch, Payload};
use crate::api::middleware::JwtAuth;
use crate::api::responses::{render_ipo, render_ipos, IpoResponse};
use crate::api::state::AppState;
use crate::domain::ipo::{Ipo, IpoInput, IpoStatus};

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

pub(crate) async fn find_ipo(state: &AppState, id: i64) -> Result<Ipo, ApiError> {
    state
        .ipos
        .find_by_id(id)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// Validates and stores a full IPO payload over an existing id
pub(crate) async fn save_ipo(
    state: &AppState,
    id: i64,
    input: IpoInput,
) -> Result<Json<IpoResponse>, ApiError> {
    let ipo = input.validate()?;
    let updated = state
        .ipos
        .update(id, ipo)
        .await?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(ipo_id = id, "IPO updated");

    Ok(Json(render_ipo(state, updated).await?))
}

/// List IPOs, optionally only those with a given status
///
/// GET /ipos/?status=upcoming
#[tracing::instrument(skip(state, _auth))]
pub async fn list_ipos(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<IpoResponse>>, ApiError> {
    let ipos = match filter.status.as_deref() {
        None | Some("") => state.ipos.list(None).await?,
        Some(raw) => match IpoStatus::ALL.into_iter().find(|status| status.as_str() == raw) {
            Some(status) => state.ipos.list(Some(status)).await?,
            // No IPO can carry a status outside the known set
            None => Vec::new(),
        },
    };

    Ok(Json(render_ipos(&state, ipos).await?))
}

/// POST /ipos/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn create_ipo(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Payload(input): Payload<IpoInput>,
) -> Result<(StatusCode, Json<IpoResponse>), ApiError> {
    let ipo = state.ipos.create(input.validate()?).await?;

    tracing::info!(ipo_id = ipo.id, company_id = ipo.company_id, "IPO created");

    Ok((StatusCode::CREATED, Json(render_ipo(&state, ipo).await?)))
}

/// GET /ipos/:id/
#[tracing::instrument(skip(state, _auth))]
pub async fn get_ipo(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<Json<IpoResponse>, ApiError> {
    let ipo = find_ipo(&state, id).await?;
    Ok(Json(render_ipo(&state, ipo).await?))
}

/// PUT /ipos/:id/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn update_ipo(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    Payload(input): Payload<IpoInput>,
) -> Result<Json<IpoResponse>, ApiError> {
    find_ipo(&state, id).await?;
    save_ipo(&state, id, input).await
}

/// PATCH /ipos/:id/
#[tracing::instrument(skip(state, _auth, patch))]
pub async fn patch_ipo(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    Payload(patch): Payload<Value>,
) -> Result<Json<IpoResponse>, ApiError> {
    let current = find_ipo(&state, id).await?;
    let mut base = serde_json::to_value(IpoResponse::new(current, Vec::new()))
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    if let Value::Object(map) = &mut base {
        map.remove("id");
        map.remove("documents");
    }

    let mut merged = merge_patch(base, patch)?;
    if let Value::Object(map) = &mut merged {
        map.remove("documents");
    }

    save_ipo(&state, id, from_merged(merged)?).await
}

/// Delete an IPO together with its document
///
/// DELETE /ipos/:id/
#[tracing::instrument(skip(state, _auth))]
pub async fn delete_ipo(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.ipos.delete(id).await? {
        return Err(ApiError::not_found());
    }

    tracing::info!(ipo_id = id, "IPO deleted");
    Ok(StatusCode::NO_CONTENT)
}
