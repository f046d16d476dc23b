// Shared application state
// Cheap to clone: every field is a handle

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::domain::repositories::{
    CompanyRepository, DocumentRepository, IpoRepository, TokenBlacklist, UserRepository,
};
use crate::infrastructure::repositories::{
    InMemoryStore, PostgresCompanyRepository, PostgresDocumentRepository, PostgresIpoRepository,
    PostgresTokenBlacklist, PostgresUserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub ipos: Arc<dyn IpoRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            companies: Arc::new(PostgresCompanyRepository::new(pool.clone())),
            ipos: Arc::new(PostgresIpoRepository::new(pool.clone())),
            documents: Arc::new(PostgresDocumentRepository::new(pool.clone())),
            blacklist: Arc::new(PostgresTokenBlacklist::new(pool)),
            tokens: Arc::new(tokens),
            passwords,
        }
    }

    /// State backed by one shared in-memory store
    pub fn in_memory(store: InMemoryStore, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            users: Arc::new(store.clone()),
            companies: Arc::new(store.clone()),
            ipos: Arc::new(store.clone()),
            documents: Arc::new(store.clone()),
            blacklist: Arc::new(store),
            tokens: Arc::new(tokens),
            passwords,
        }
    }
}
