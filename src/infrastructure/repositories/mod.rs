// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod memory;
pub mod postgres_company_repository;
pub mod postgres_document_repository;
pub mod postgres_ipo_repository;
pub mod postgres_token_blacklist;
pub mod postgres_user_repository;

pub use memory::InMemoryStore;
pub use postgres_company_repository::PostgresCompanyRepository;
pub use postgres_document_repository::PostgresDocumentRepository;
pub use postgres_ipo_repository::PostgresIpoRepository;
pub use postgres_token_blacklist::PostgresTokenBlacklist;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::repositories::{Constraint, RepositoryError};

/// Maps integrity errors raised by PostgreSQL onto domain constraints
///
/// Constraint names are the defaults PostgreSQL generates for the schema in
/// `migrations/`.
pub(crate) fn map_db_error(error: sqlx::Error) -> RepositoryError {
    let constraint = match &error {
        sqlx::Error::Database(db) => match db.constraint() {
            Some("users_username_key") => Some(Constraint::UniqueUsername),
            Some("companies_company_name_key") => Some(Constraint::UniqueCompanyName),
            Some("documents_ipo_id_key") => Some(Constraint::UniqueDocumentIpo),
            Some("documents_ipo_id_fkey") => Some(Constraint::DocumentIpoExists),
            Some("ipos_company_id_fkey") => Some(Constraint::IpoCompanyExists),
            _ => None,
        },
        _ => None,
    };

    match constraint {
        Some(constraint) => RepositoryError::Violation(constraint),
        None => RepositoryError::Database(error),
    }
}
