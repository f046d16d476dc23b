use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{auth, companies, documents, ipos, listings};
use crate::api::state::AppState;

/// Builds the application router with every route and middleware attached
pub fn router(state: AppState) -> Router {
    // The browser frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(auth::home))
        .route("/health", get(auth::health_check))
        // Auth routes
        .route("/signup/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/logout/", post(auth::logout))
        .route("/token/refresh/", post(auth::refresh_token))
        // Company routes
        .route(
            "/companies/",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/companies/:id/",
            get(companies::get_company)
                .put(companies::update_company)
                .patch(companies::patch_company)
                .delete(companies::delete_company),
        )
        .route("/companies/:id/ipos/", get(companies::list_company_ipos))
        // IPO routes
        .route("/ipos/", get(ipos::list_ipos).post(ipos::create_ipo))
        .route(
            "/ipos/:id/",
            get(ipos::get_ipo)
                .put(ipos::update_ipo)
                .patch(ipos::patch_ipo)
                .delete(ipos::delete_ipo),
        )
        // Document routes
        .route(
            "/documents/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/documents/:id/",
            get(documents::get_document)
                .put(documents::update_document)
                .patch(documents::patch_document)
                .delete(documents::delete_document),
        )
        // Listing routes
        .route(
            "/ipo/",
            get(listings::list_companies_paginated).post(listings::create_company_listing),
        )
        .route(
            "/ipo/paginated/",
            get(listings::list_companies_paginated).post(listings::create_company_listing),
        )
        .route(
            "/ipo/:id/",
            get(listings::ipo_detail)
                .put(listings::ipo_detail)
                .delete(listings::ipo_detail),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
