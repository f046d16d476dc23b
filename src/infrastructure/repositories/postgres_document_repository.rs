use async_trait::async_trait;
use sqlx::{FromRow, PgExecutor, PgPool};

use super::map_db_error;
use crate::domain::document::{Document, DocumentFiles, NewDocument};
use crate::domain::repositories::{DocumentRepository, RepositoryResult};

/// PostgreSQL implementation of DocumentRepository
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DocumentRow {
    id: i64,
    ipo_id: i64,
    rhp_pdf: Option<String>,
    drhp_pdf: Option<String>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            ipo_id: row.ipo_id,
            files: DocumentFiles {
                rhp_pdf: row.rhp_pdf,
                drhp_pdf: row.drhp_pdf,
            },
        }
    }
}

pub(super) async fn insert_document<'e, E>(
    executor: E,
    document: &NewDocument,
) -> RepositoryResult<Document>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DocumentRow>(
        r#"
        INSERT INTO documents (ipo_id, rhp_pdf, drhp_pdf)
        VALUES ($1, $2, $3)
        RETURNING id, ipo_id, rhp_pdf, drhp_pdf
        "#,
    )
    .bind(document.ipo_id)
    .bind(&document.files.rhp_pdf)
    .bind(&document.files.drhp_pdf)
    .fetch_one(executor)
    .await
    .map_err(map_db_error)?;

    Ok(row.into())
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn list(&self) -> RepositoryResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, ipo_id, rhp_pdf, drhp_pdf FROM documents ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn list_by_ipos(&self, ipo_ids: &[i64]) -> RepositoryResult<Vec<Document>> {
        if ipo_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, ipo_id, rhp_pdf, drhp_pdf
            FROM documents
            WHERE ipo_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ipo_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, ipo_id, rhp_pdf, drhp_pdf FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn create(&self, document: NewDocument) -> RepositoryResult<Document> {
        insert_document(&self.pool, &document).await
    }

    async fn update(&self, id: i64, document: NewDocument) -> RepositoryResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET ipo_id = $2, rhp_pdf = $3, drhp_pdf = $4
            WHERE id = $1
            RETURNING id, ipo_id, rhp_pdf, drhp_pdf
            "#,
        )
        .bind(id)
        .bind(document.ipo_id)
        .bind(&document.files.rhp_pdf)
        .bind(&document.files.drhp_pdf)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Document::from))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
