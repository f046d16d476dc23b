use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::api::errors::ApiError;
use crate::api::extract::{from_merged, merge_patch, Payload};
use crate::api::middleware::JwtAuth;
use crate::api::responses::{render_companies, render_company, render_ipos, CompanyResponse, IpoResponse};
use crate::api::state::AppState;
use crate::domain::company::{Company, CompanyInput};

async fn find_company(state: &AppState, id: i64) -> Result<Company, ApiError> {
    state
        .companies
        .find_by_id(id)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// List all companies with their IPOs
///
/// GET /companies/
#[tracing::instrument(skip(state, _auth))]
pub async fn list_companies(
    State(state): State<AppState>,
    _auth: JwtAuth,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let companies = state.companies.list().await?;
    Ok(Json(render_companies(&state, companies).await?))
}

/// Create a company, optionally with nested IPOs and documents
///
/// POST /companies/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn create_company(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Payload(input): Payload<CompanyInput>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let listing = input.validate()?;
    let nested = listing.ipos.len();

    let company = state.companies.create(listing).await?;

    tracing::info!(company_id = company.id, ipos = nested, "Company created");

    Ok((StatusCode::CREATED, Json(render_company(&state, company).await?)))
}

/// GET /companies/:id/
#[tracing::instrument(skip(state, _auth))]
pub async fn get_company(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = find_company(&state, id).await?;
    Ok(Json(render_company(&state, company).await?))
}

/// Replace a company's own fields (its IPOs are managed separately)
///
/// PUT /companies/:id/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn update_company(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    Payload(input): Payload<CompanyInput>,
) -> Result<Json<CompanyResponse>, ApiError> {
    find_company(&state, id).await?;
    save_company(&state, id, input).await
}

/// PATCH /companies/:id/
#[tracing::instrument(skip(state, _auth, patch))]
pub async fn patch_company(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    Payload(patch): Payload<Value>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let current = find_company(&state, id).await?;
    let base = json!({
        "company_name": current.company_name,
        "company_logo": current.company_logo,
    });

    let mut merged = merge_patch(base, patch)?;
    if let Value::Object(map) = &mut merged {
        map.remove("ipos");
    }

    save_company(&state, id, from_merged(merged)?).await
}

async fn save_company(
    state: &AppState,
    id: i64,
    input: CompanyInput,
) -> Result<Json<CompanyResponse>, ApiError> {
    let fields = input.validate_fields()?;
    let company = state
        .companies
        .update(id, fields)
        .await?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(company_id = id, "Company updated");

    Ok(Json(render_company(state, company).await?))
}

/// Delete a company that no longer owns IPOs
///
/// DELETE /companies/:id/
#[tracing::instrument(skip(state, _auth))]
pub async fn delete_company(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.companies.delete(id).await? {
        return Err(ApiError::not_found());
    }

    tracing::info!(company_id = id, "Company deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// All IPOs of one company
///
/// GET /companies/:id/ipos/
#[tracing::instrument(skip(state, _auth))]
pub async fn list_company_ipos(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
) -> Result<Json<Vec<IpoResponse>>, ApiError> {
    find_company(&state, id).await?;
    let ipos = state.ipos.list_by_company(id).await?;
    Ok(Json(render_ipos(&state, ipos).await?))
}
