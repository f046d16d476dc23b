// Repository ports
// Implemented by the adapters in crate::infrastructure::repositories

pub mod company_repository;
pub mod document_repository;
pub mod ipo_repository;
pub mod token_blacklist;
pub mod user_repository;

pub use company_repository::CompanyRepository;
pub use document_repository::DocumentRepository;
pub use ipo_repository::IpoRepository;
pub use token_blacklist::{BlacklistedToken, TokenBlacklist};
pub use user_repository::UserRepository;

use thiserror::Error;

/// Integrity rules the store enforces on writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Another user already has this username
    UniqueUsername,
    /// Another company already has this name
    UniqueCompanyName,
    /// The IPO already has a document
    UniqueDocumentIpo,
    /// The referenced company does not exist
    IpoCompanyExists,
    /// The referenced IPO does not exist
    DocumentIpoExists,
    /// The company still owns IPOs and cannot be deleted
    CompanyHasNoIpos,
}

impl Constraint {
    /// Input field the violation is reported against
    pub fn field(&self) -> &'static str {
        match self {
            Constraint::UniqueUsername => "username",
            Constraint::UniqueCompanyName => "company_name",
            Constraint::UniqueDocumentIpo | Constraint::DocumentIpoExists => "ipo",
            Constraint::IpoCompanyExists => "company",
            Constraint::CompanyHasNoIpos => "ipos",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Constraint::UniqueUsername => "A user with that username already exists.",
            Constraint::UniqueCompanyName => "company with this company name already exists.",
            Constraint::UniqueDocumentIpo => "document with this ipo already exists.",
            Constraint::IpoCompanyExists => "Invalid pk - company does not exist.",
            Constraint::DocumentIpoExists => "Invalid pk - ipo does not exist.",
            Constraint::CompanyHasNoIpos => {
                "Cannot delete a company that still has IPOs; delete its IPOs first."
            }
        }
    }
}

/// Errors surfaced by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Constraint violated on {}: {}", .0.field(), .0.message())]
    Violation(Constraint),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid data in store: {0}")]
    Corrupt(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
