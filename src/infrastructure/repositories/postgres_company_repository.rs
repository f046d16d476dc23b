use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::map_db_error;
use super::postgres_document_repository::insert_document;
use super::postgres_ipo_repository::insert_ipo;
use crate::domain::company::{Company, NewCompany, NewListing};
use crate::domain::document::NewDocument;
use crate::domain::ipo::NewIpo;
use crate::domain::repositories::{
    CompanyRepository, Constraint, RepositoryError, RepositoryResult,
};

/// PostgreSQL implementation of CompanyRepository
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CompanyRow {
    id: i64,
    company_name: String,
    company_logo: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            company_name: row.company_name,
            company_logo: row.company_logo,
        }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn list(&self) -> RepositoryResult<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>(
            "SELECT id, company_name, company_logo FROM companies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> RepositoryResult<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT id, company_name, company_logo
            FROM companies
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "SELECT id, company_name, company_logo FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Company::from))
    }

    async fn create(&self, listing: NewListing) -> RepositoryResult<Company> {
        let mut tx = self.pool.begin().await?;

        let company: Company = sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (company_name, company_logo)
            VALUES ($1, $2)
            RETURNING id, company_name, company_logo
            "#,
        )
        .bind(&listing.company.company_name)
        .bind(&listing.company.company_logo)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?
        .into();

        for ipo in listing.ipos {
            let stored = insert_ipo(
                &mut *tx,
                &NewIpo {
                    company_id: company.id,
                    details: ipo.details,
                },
            )
            .await?;

            if let Some(files) = ipo.document {
                insert_document(
                    &mut *tx,
                    &NewDocument {
                        ipo_id: stored.id,
                        files,
                    },
                )
                .await?;
            }
        }

        tx.commit().await?;

        Ok(company)
    }

    async fn update(&self, id: i64, company: NewCompany) -> RepositoryResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            UPDATE companies
            SET company_name = $2, company_logo = $3
            WHERE id = $1
            RETURNING id, company_name, company_logo
            "#,
        )
        .bind(id)
        .bind(&company.company_name)
        .bind(&company.company_logo)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Company::from))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
                    RepositoryError::Violation(Constraint::CompanyHasNoIpos)
                } else {
                    RepositoryError::Database(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
