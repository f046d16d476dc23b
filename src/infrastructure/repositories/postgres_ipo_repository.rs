use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor, PgPool};

use super::map_db_error;
use crate::domain::ipo::{Ipo, IpoDetails, IpoStatus, NewIpo};
use crate::domain::repositories::{IpoRepository, RepositoryError, RepositoryResult};

/// PostgreSQL implementation of IpoRepository
pub struct PostgresIpoRepository {
    pool: PgPool,
}

impl PostgresIpoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct IpoRow {
    id: i64,
    company_id: i64,
    status: String,
    price_band: Option<String>,
    open_date: Option<NaiveDate>,
    close_date: Option<NaiveDate>,
    issue_size: Option<String>,
    issue_type: Option<String>,
    listing_date: Option<NaiveDate>,
    ipo_price: Option<Decimal>,
    listing_price: Option<Decimal>,
    listing_gain: Option<Decimal>,
    current_market_price: Option<Decimal>,
    current_return: Option<Decimal>,
}

impl TryFrom<IpoRow> for Ipo {
    type Error = RepositoryError;

    fn try_from(row: IpoRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<IpoStatus>()
            .map_err(|e| RepositoryError::Corrupt(format!("ipo {} status: {}", row.id, e)))?;

        Ok(Ipo {
            id: row.id,
            company_id: row.company_id,
            details: IpoDetails {
                status,
                price_band: row.price_band,
                open_date: row.open_date,
                close_date: row.close_date,
                issue_size: row.issue_size,
                issue_type: row.issue_type,
                listing_date: row.listing_date,
                ipo_price: row.ipo_price,
                listing_price: row.listing_price,
                listing_gain: row.listing_gain,
                current_market_price: row.current_market_price,
                current_return: row.current_return,
            },
        })
    }
}

const IPO_COLUMNS: &str = "id, company_id, status, price_band, open_date, close_date, \
     issue_size, issue_type, listing_date, ipo_price, listing_price, listing_gain, \
     current_market_price, current_return";

fn into_ipos(rows: Vec<IpoRow>) -> RepositoryResult<Vec<Ipo>> {
    rows.into_iter().map(Ipo::try_from).collect()
}

/// Inserts an IPO on any executor, so nested creation can run it inside a transaction
pub(super) async fn insert_ipo<'e, E>(executor: E, ipo: &NewIpo) -> RepositoryResult<Ipo>
where
    E: PgExecutor<'e>,
{
    let d = &ipo.details;
    let row = sqlx::query_as::<_, IpoRow>(&format!(
        r#"
        INSERT INTO ipos (
            company_id, status, price_band, open_date, close_date, issue_size,
            issue_type, listing_date, ipo_price, listing_price, listing_gain,
            current_market_price, current_return
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {IPO_COLUMNS}
        "#
    ))
    .bind(ipo.company_id)
    .bind(d.status.as_str())
    .bind(&d.price_band)
    .bind(d.open_date)
    .bind(d.close_date)
    .bind(&d.issue_size)
    .bind(&d.issue_type)
    .bind(d.listing_date)
    .bind(d.ipo_price)
    .bind(d.listing_price)
    .bind(d.listing_gain)
    .bind(d.current_market_price)
    .bind(d.current_return)
    .fetch_one(executor)
    .await
    .map_err(map_db_error)?;

    row.try_into()
}

#[async_trait]
impl IpoRepository for PostgresIpoRepository {
    async fn list(&self, status: Option<IpoStatus>) -> RepositoryResult<Vec<Ipo>> {
        let rows = sqlx::query_as::<_, IpoRow>(&format!(
            r#"
            SELECT {IPO_COLUMNS}
            FROM ipos
            WHERE ($1::VARCHAR IS NULL OR status = $1)
            ORDER BY id
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        into_ipos(rows)
    }

    async fn list_by_company(&self, company_id: i64) -> RepositoryResult<Vec<Ipo>> {
        let rows = sqlx::query_as::<_, IpoRow>(&format!(
            "SELECT {IPO_COLUMNS} FROM ipos WHERE company_id = $1 ORDER BY id"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        into_ipos(rows)
    }

    async fn list_by_companies(&self, company_ids: &[i64]) -> RepositoryResult<Vec<Ipo>> {
        if company_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, IpoRow>(&format!(
            "SELECT {IPO_COLUMNS} FROM ipos WHERE company_id = ANY($1) ORDER BY id"
        ))
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await?;

        into_ipos(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Ipo>> {
        let row = sqlx::query_as::<_, IpoRow>(&format!(
            "SELECT {IPO_COLUMNS} FROM ipos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Ipo::try_from).transpose()
    }

    async fn create(&self, ipo: NewIpo) -> RepositoryResult<Ipo> {
        insert_ipo(&self.pool, &ipo).await
    }

    async fn update(&self, id: i64, ipo: NewIpo) -> RepositoryResult<Option<Ipo>> {
        let d = &ipo.details;
        let row = sqlx::query_as::<_, IpoRow>(&format!(
            r#"
            UPDATE ipos SET
                company_id = $2, status = $3, price_band = $4, open_date = $5,
                close_date = $6, issue_size = $7, issue_type = $8, listing_date = $9,
                ipo_price = $10, listing_price = $11, listing_gain = $12,
                current_market_price = $13, current_return = $14
            WHERE id = $1
            RETURNING {IPO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(ipo.company_id)
        .bind(d.status.as_str())
        .bind(&d.price_band)
        .bind(d.open_date)
        .bind(d.close_date)
        .bind(&d.issue_size)
        .bind(&d.issue_type)
        .bind(d.listing_date)
        .bind(d.ipo_price)
        .bind(d.listing_price)
        .bind(d.listing_gain)
        .bind(d.current_market_price)
        .bind(d.current_return)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Ipo::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        // documents go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM ipos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
