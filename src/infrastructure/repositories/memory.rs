// In-memory repository adapter
// Same contracts as the PostgreSQL adapters, used by tests and STORAGE=memory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::company::{Company, NewCompany, NewListing};
use crate::domain::document::{Document, NewDocument};
use crate::domain::ipo::{Ipo, IpoStatus, NewIpo};
use crate::domain::repositories::{
    BlacklistedToken, CompanyRepository, Constraint, DocumentRepository, IpoRepository,
    RepositoryError, RepositoryResult, TokenBlacklist, UserRepository,
};
use crate::domain::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    companies: BTreeMap<i64, Company>,
    ipos: BTreeMap<i64, Ipo>,
    documents: BTreeMap<i64, Document>,
    blacklist: HashMap<Uuid, BlacklistedToken>,
    sequences: Sequences,
}

#[derive(Default)]
struct Sequences {
    users: i64,
    companies: i64,
    ipos: i64,
    documents: i64,
}

fn next(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

impl Tables {
    fn check_company_name(&self, name: &str, except: Option<i64>) -> RepositoryResult<()> {
        let taken = self
            .companies
            .values()
            .any(|c| c.company_name == name && Some(c.id) != except);
        if taken {
            Err(RepositoryError::Violation(Constraint::UniqueCompanyName))
        } else {
            Ok(())
        }
    }

    fn check_document_slot(&self, ipo_id: i64, except: Option<i64>) -> RepositoryResult<()> {
        if !self.ipos.contains_key(&ipo_id) {
            return Err(RepositoryError::Violation(Constraint::DocumentIpoExists));
        }
        let taken = self
            .documents
            .values()
            .any(|d| d.ipo_id == ipo_id && Some(d.id) != except);
        if taken {
            Err(RepositoryError::Violation(Constraint::UniqueDocumentIpo))
        } else {
            Ok(())
        }
    }
}

/// Process-local store implementing every repository port
///
/// Clones share the same tables. The lock is never held across an `.await`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Corrupt("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Corrupt("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Violation(Constraint::UniqueUsername));
        }

        let id = next(&mut tables.sequences.users);
        let stored = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn update_last_login(&self, user_id: i64) -> RepositoryResult<()> {
        if let Some(user) = self.write()?.users.get_mut(&user_id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn list(&self) -> RepositoryResult<Vec<Company>> {
        Ok(self.read()?.companies.values().cloned().collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.read()?.companies.len() as u64)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> RepositoryResult<Vec<Company>> {
        Ok(self
            .read()?
            .companies
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Company>> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    async fn create(&self, listing: NewListing) -> RepositoryResult<Company> {
        let mut tables = self.write()?;
        // Everything is checked before the first insert, so a failure leaves no trace
        tables.check_company_name(&listing.company.company_name, None)?;

        let company_id = next(&mut tables.sequences.companies);
        let company = Company {
            id: company_id,
            company_name: listing.company.company_name,
            company_logo: listing.company.company_logo,
        };
        tables.companies.insert(company_id, company.clone());

        for ipo in listing.ipos {
            let ipo_id = next(&mut tables.sequences.ipos);
            tables.ipos.insert(
                ipo_id,
                Ipo {
                    id: ipo_id,
                    company_id,
                    details: ipo.details,
                },
            );

            if let Some(files) = ipo.document {
                let document_id = next(&mut tables.sequences.documents);
                tables.documents.insert(
                    document_id,
                    Document {
                        id: document_id,
                        ipo_id,
                        files,
                    },
                );
            }
        }

        Ok(company)
    }

    async fn update(&self, id: i64, company: NewCompany) -> RepositoryResult<Option<Company>> {
        let mut tables = self.write()?;
        if !tables.companies.contains_key(&id) {
            return Ok(None);
        }
        tables.check_company_name(&company.company_name, Some(id))?;

        let updated = Company {
            id,
            company_name: company.company_name,
            company_logo: company.company_logo,
        };
        tables.companies.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.write()?;
        if !tables.companies.contains_key(&id) {
            return Ok(false);
        }
        if tables.ipos.values().any(|ipo| ipo.company_id == id) {
            return Err(RepositoryError::Violation(Constraint::CompanyHasNoIpos));
        }
        tables.companies.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl IpoRepository for InMemoryStore {
    async fn list(&self, status: Option<IpoStatus>) -> RepositoryResult<Vec<Ipo>> {
        Ok(self
            .read()?
            .ipos
            .values()
            .filter(|ipo| status.map_or(true, |s| ipo.details.status == s))
            .cloned()
            .collect())
    }

    async fn list_by_company(&self, company_id: i64) -> RepositoryResult<Vec<Ipo>> {
        self.list_by_companies(&[company_id]).await
    }

    async fn list_by_companies(&self, company_ids: &[i64]) -> RepositoryResult<Vec<Ipo>> {
        Ok(self
            .read()?
            .ipos
            .values()
            .filter(|ipo| company_ids.contains(&ipo.company_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Ipo>> {
        Ok(self.read()?.ipos.get(&id).cloned())
    }

    async fn create(&self, ipo: NewIpo) -> RepositoryResult<Ipo> {
        let mut tables = self.write()?;
        if !tables.companies.contains_key(&ipo.company_id) {
            return Err(RepositoryError::Violation(Constraint::IpoCompanyExists));
        }

        let id = next(&mut tables.sequences.ipos);
        let stored = Ipo {
            id,
            company_id: ipo.company_id,
            details: ipo.details,
        };
        tables.ipos.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, ipo: NewIpo) -> RepositoryResult<Option<Ipo>> {
        let mut tables = self.write()?;
        if !tables.ipos.contains_key(&id) {
            return Ok(None);
        }
        if !tables.companies.contains_key(&ipo.company_id) {
            return Err(RepositoryError::Violation(Constraint::IpoCompanyExists));
        }

        let updated = Ipo {
            id,
            company_id: ipo.company_id,
            details: ipo.details,
        };
        tables.ipos.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.write()?;
        if tables.ipos.remove(&id).is_none() {
            return Ok(false);
        }
        tables.documents.retain(|_, document| document.ipo_id != id);
        Ok(true)
    }
}

#[async_trait]
impl DocumentRepository for InMemoryStore {
    async fn list(&self) -> RepositoryResult<Vec<Document>> {
        Ok(self.read()?.documents.values().cloned().collect())
    }

    async fn list_by_ipos(&self, ipo_ids: &[i64]) -> RepositoryResult<Vec<Document>> {
        Ok(self
            .read()?
            .documents
            .values()
            .filter(|d| ipo_ids.contains(&d.ipo_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Document>> {
        Ok(self.read()?.documents.get(&id).cloned())
    }

    async fn create(&self, document: NewDocument) -> RepositoryResult<Document> {
        let mut tables = self.write()?;
        tables.check_document_slot(document.ipo_id, None)?;

        let id = next(&mut tables.sequences.documents);
        let stored = Document {
            id,
            ipo_id: document.ipo_id,
            files: document.files,
        };
        tables.documents.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, document: NewDocument) -> RepositoryResult<Option<Document>> {
        let mut tables = self.write()?;
        if !tables.documents.contains_key(&id) {
            return Ok(None);
        }
        tables.check_document_slot(document.ipo_id, Some(id))?;

        let updated = Document {
            id,
            ipo_id: document.ipo_id,
            files: document.files,
        };
        tables.documents.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.write()?.documents.remove(&id).is_some())
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryStore {
    async fn blacklist(&self, token: BlacklistedToken) -> RepositoryResult<bool> {
        let mut tables = self.write()?;
        if tables.blacklist.contains_key(&token.jti) {
            return Ok(false);
        }
        tables.blacklist.insert(token.jti, token);
        Ok(true)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> RepositoryResult<bool> {
        Ok(self.read()?.blacklist.contains_key(&jti))
    }

    async fn prune_expired(&self, cutoff: DateTime<Utc>) -> RepositoryResult<u64> {
        let mut tables = self.write()?;
        let before = tables.blacklist.len();
        tables.blacklist.retain(|_, entry| entry.expires_at >= cutoff);
        Ok((before - tables.blacklist.len()) as u64)
    }
}
