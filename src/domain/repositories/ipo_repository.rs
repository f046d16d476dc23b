use async_trait::async_trait;

use super::RepositoryResult;
use crate::domain::ipo::{Ipo, IpoStatus, NewIpo};

/// Repository trait for IPOs
///
/// Listings are ordered by ascending id.
#[async_trait]
pub trait IpoRepository: Send + Sync {
    /// All IPOs, or only those with the given status
    async fn list(&self, status: Option<IpoStatus>) -> RepositoryResult<Vec<Ipo>>;

    /// IPOs of one company
    async fn list_by_company(&self, company_id: i64) -> RepositoryResult<Vec<Ipo>>;

    /// IPOs of any of the given companies
    async fn list_by_companies(&self, company_ids: &[i64]) -> RepositoryResult<Vec<Ipo>>;

    /// Find an IPO by ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Ipo>>;

    /// Create an IPO
    ///
    /// Fails with `Constraint::IpoCompanyExists` for an unknown company.
    async fn create(&self, ipo: NewIpo) -> RepositoryResult<Ipo>;

    /// Replace an IPO; `None` if it does not exist
    async fn update(&self, id: i64, ipo: NewIpo) -> RepositoryResult<Option<Ipo>>;

    /// Delete an IPO and its document; `false` if it did not exist
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}
