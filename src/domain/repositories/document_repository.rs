use async_trait::async_trait;

use super::RepositoryResult;
use crate::domain::document::{Document, NewDocument};

/// Repository trait for IPO documents
///
/// Listings are ordered by ascending id.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// All documents
    async fn list(&self) -> RepositoryResult<Vec<Document>>;

    /// Documents attached to any of the given IPOs
    async fn list_by_ipos(&self, ipo_ids: &[i64]) -> RepositoryResult<Vec<Document>>;

    /// Find a document by ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Document>>;

    /// Create a document
    ///
    /// Fails with `Constraint::DocumentIpoExists` for an unknown IPO and
    /// `Constraint::UniqueDocumentIpo` if the IPO already has one.
    async fn create(&self, document: NewDocument) -> RepositoryResult<Document>;

    /// Replace a document; `None` if it does not exist
    async fn update(&self, id: i64, document: NewDocument) -> RepositoryResult<Option<Document>>;

    /// Delete a document; `false` if it did not exist
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}
