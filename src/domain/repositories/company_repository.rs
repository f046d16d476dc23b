use async_trait::async_trait;

use super::RepositoryResult;
use crate::domain::company::{Company, NewCompany, NewListing};

/// Repository trait for companies
///
/// Listings are ordered by ascending id.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// All companies
    async fn list(&self) -> RepositoryResult<Vec<Company>>;

    /// Number of companies
    async fn count(&self) -> RepositoryResult<u64>;

    /// A window of companies for page-number pagination
    async fn list_page(&self, offset: u64, limit: u64) -> RepositoryResult<Vec<Company>>;

    /// Find a company by ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Company>>;

    /// Create a company together with its nested IPOs and documents
    ///
    /// Either everything is stored or nothing is.
    async fn create(&self, listing: NewListing) -> RepositoryResult<Company>;

    /// Replace a company's fields; `None` if it does not exist
    async fn update(&self, id: i64, company: NewCompany) -> RepositoryResult<Option<Company>>;

    /// Delete a company; `false` if it did not exist
    ///
    /// Fails with `Constraint::CompanyHasNoIpos` while IPOs still reference it.
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}
