// Response representations
// Entities are rendered with their children nested (company -> ipos -> documents)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::api::state::AppState;
use crate::domain::company::Company;
use crate::domain::document::Document;
use crate::domain::ipo::{Ipo, IpoStatus};
use crate::domain::repositories::{RepositoryError, RepositoryResult};
use crate::domain::user::User;

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            email: user.email.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: i64,
    pub ipo: i64,
    pub rhp_pdf: Option<String>,
    pub drhp_pdf: Option<String>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            ipo: document.ipo_id,
            rhp_pdf: document.files.rhp_pdf,
            drhp_pdf: document.files.drhp_pdf,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IpoResponse {
    pub id: i64,
    pub company: i64,
    pub status: IpoStatus,
    pub price_band: Option<String>,
    pub open_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub issue_size: Option<String>,
    pub issue_type: Option<String>,
    pub listing_date: Option<NaiveDate>,
    pub ipo_price: Option<Decimal>,
    pub listing_price: Option<Decimal>,
    pub listing_gain: Option<Decimal>,
    pub current_market_price: Option<Decimal>,
    pub current_return: Option<Decimal>,
    pub documents: Vec<DocumentResponse>,
}

impl IpoResponse {
    pub fn new(ipo: Ipo, documents: Vec<DocumentResponse>) -> Self {
        let details = ipo.details;
        Self {
            id: ipo.id,
            company: ipo.company_id,
            status: details.status,
            price_band: details.price_band,
            open_date: details.open_date,
            close_date: details.close_date,
            issue_size: details.issue_size,
            issue_type: details.issue_type,
            listing_date: details.listing_date,
            ipo_price: details.ipo_price,
            listing_price: details.listing_price,
            listing_gain: details.listing_gain,
            current_market_price: details.current_market_price,
            current_return: details.current_return,
            documents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyResponse {
    pub id: i64,
    pub company_name: String,
    pub company_logo: Option<String>,
    pub ipos: Vec<IpoResponse>,
}

impl CompanyResponse {
    pub fn new(company: Company, ipos: Vec<IpoResponse>) -> Self {
        Self {
            id: company.id,
            company_name: company.company_name,
            company_logo: company.company_logo,
            ipos,
        }
    }
}

/// Renders IPOs with their documents using one batched document lookup
pub async fn render_ipos(state: &AppState, ipos: Vec<Ipo>) -> RepositoryResult<Vec<IpoResponse>> {
    let ids: Vec<i64> = ipos.iter().map(|ipo| ipo.id).collect();
    let mut by_ipo: HashMap<i64, Vec<DocumentResponse>> = HashMap::new();
    if !ids.is_empty() {
        for document in state.documents.list_by_ipos(&ids).await? {
            by_ipo
                .entry(document.ipo_id)
                .or_default()
                .push(document.into());
        }
    }

    Ok(ipos
        .into_iter()
        .map(|ipo| {
            let documents = by_ipo.remove(&ipo.id).unwrap_or_default();
            IpoResponse::new(ipo, documents)
        })
        .collect())
}

pub async fn render_ipo(state: &AppState, ipo: Ipo) -> RepositoryResult<IpoResponse> {
    render_ipos(state, vec![ipo])
        .await?
        .pop()
        .ok_or_else(|| RepositoryError::Corrupt("IPO vanished while rendering".to_string()))
}

/// Renders companies with nested IPOs and documents
///
/// Two batched lookups regardless of how many companies are rendered.
pub async fn render_companies(
    state: &AppState,
    companies: Vec<Company>,
) -> RepositoryResult<Vec<CompanyResponse>> {
    let ids: Vec<i64> = companies.iter().map(|company| company.id).collect();
    let ipos = if ids.is_empty() {
        Vec::new()
    } else {
        state.ipos.list_by_companies(&ids).await?
    };

    let mut by_company: HashMap<i64, Vec<IpoResponse>> = HashMap::new();
    for ipo in render_ipos(state, ipos).await? {
        by_company.entry(ipo.company).or_default().push(ipo);
    }

    Ok(companies
        .into_iter()
        .map(|company| {
            let ipos = by_company.remove(&company.id).unwrap_or_default();
            CompanyResponse::new(company, ipos)
        })
        .collect())
}

pub async fn render_company(state: &AppState, company: Company) -> RepositoryResult<CompanyResponse> {
    render_companies(state, vec![company])
        .await?
        .pop()
        .ok_or_else(|| RepositoryError::Corrupt("company vanished while rendering".to_string()))
}
