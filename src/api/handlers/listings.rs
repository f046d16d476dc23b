// Paginated company listing and the single-function IPO detail endpoint

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::extract::Payload;
use crate::api::handlers::ipos::{find_ipo, save_ipo};
use crate::api::middleware::JwtAuth;
use crate::api::pagination::{PageLinks, PageQuery, PageWindow, Paginated, PAGE_SIZE};
use crate::api::responses::{render_companies, render_company, render_ipo, CompanyResponse};
use crate::api::state::AppState;
use crate::domain::company::CompanyInput;
use crate::domain::ipo::IpoInput;
use crate::domain::repositories::RepositoryError;

/// Retrieve, replace or delete one IPO
///
/// The IPO is looked up before the method is dispatched, so an unknown id is
/// a 404 whatever the method or body.
///
/// GET/PUT/DELETE /ipo/:id/
#[tracing::instrument(skip(state, _auth, method, request), fields(method = %method))]
pub async fn ipo_detail(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Path(id): Path<i64>,
    method: Method,
    request: Request,
) -> Result<Response, ApiError> {
    let ipo = find_ipo(&state, id).await?;
    tracing::info!(ipo_id = id, "IPO detail request");

    match method {
        Method::GET | Method::HEAD => Ok(Json(render_ipo(&state, ipo).await?).into_response()),
        Method::PUT => {
            let Payload(input) = Payload::<IpoInput>::from_request(request, &state).await?;
            Ok(save_ipo(&state, id, input).await?.into_response())
        }
        Method::DELETE => {
            // Gone between lookup and delete is still gone
            state.ipos.delete(id).await?;
            tracing::info!(ipo_id = id, "IPO deleted");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(ApiError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method \"{}\" not allowed.", method),
        )),
    }
}

/// One page of companies with their IPOs
///
/// GET /ipo/ and /ipo/paginated/
#[tracing::instrument(skip(state, _auth, headers, uri))]
pub async fn list_companies_paginated(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<Paginated<CompanyResponse>>, ApiError> {
    let count = state.companies.count().await?;
    let window = PageWindow::resolve(query.page.as_deref(), count, PAGE_SIZE)?;

    let companies = state
        .companies
        .list_page(window.offset, window.limit)
        .await?;
    let results = render_companies(&state, companies).await?;

    let links = PageLinks::from_request(&headers, &uri);
    Ok(Json(links.paginate(&window, count, results)))
}

/// Create a company (with optional nested IPOs and documents)
///
/// POST /ipo/ and /ipo/paginated/
#[tracing::instrument(skip(state, _auth, input))]
pub async fn create_company_listing(
    State(state): State<AppState>,
    _auth: JwtAuth,
    Payload(input): Payload<CompanyInput>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let listing = input.validate()?;

    let company = match state.companies.create(listing).await {
        Ok(company) => company,
        Err(e @ RepositoryError::Violation(_)) => return Err(e.into()),
        Err(e) => return Err(saving_failed(e)),
    };

    tracing::info!(company_id = company.id, "Company listing created");

    let rendered = render_company(&state, company).await.map_err(saving_failed)?;
    Ok((StatusCode::CREATED, Json(rendered)))
}

fn saving_failed(error: RepositoryError) -> ApiError {
    tracing::error!(error = %error, "Failed to save company listing");
    ApiError::internal_server_error("Something went wrong while saving data.")
        .with_details(error.to_string())
}
