use async_trait::async_trait;
use simsy_model::{Taxonomy, TaxonomyDraft, TaxonomyID, TaxonomyKind};
use sqlx::PgPool;

use super::{db_err, raw_ids};
use crate::database::ports::taxonomy::TaxonomyRepository;
use crate::error::Result;

/// One table per [`TaxonomyKind`]; the table name comes from
/// [`TaxonomyKind::collection`] and never from user input.
#[derive(Clone, Debug)]
pub struct PostgresTaxonomyRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct TaxonomyRow {
    id: i64,
    name: String,
    image: Option<String>,
    description: String,
}

impl TaxonomyRow {
    fn into_model(self, kind: TaxonomyKind) -> Taxonomy {
        Taxonomy {
            id: TaxonomyID(self.id),
            kind,
            name: self.name,
            image: self.image,
            description: self.description,
        }
    }
}

fn order_by(kind: TaxonomyKind) -> &'static str {
    if kind.orders_by_name() { "name, id" } else { "id" }
}

impl PostgresTaxonomyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaxonomyRepository for PostgresTaxonomyRepository {
    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<Taxonomy>> {
        let sql = format!(
            "SELECT id, name, image, description FROM {} ORDER BY {}",
            kind.collection(),
            order_by(kind)
        );
        let rows: Vec<TaxonomyRow> = sqlx::query_as(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to list taxonomy"))?;
        Ok(rows.into_iter().map(|r| r.into_model(kind)).collect())
    }

    async fn get(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<Option<Taxonomy>> {
        let sql = format!(
            "SELECT id, name, image, description FROM {} WHERE id = $1",
            kind.collection()
        );
        let row: Option<TaxonomyRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get taxonomy"))?;
        Ok(row.map(|r| r.into_model(kind)))
    }

    async fn get_many(
        &self,
        kind: TaxonomyKind,
        ids: &[TaxonomyID],
    ) -> Result<Vec<Taxonomy>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, name, image, description FROM {} WHERE id = ANY($1) ORDER BY {}",
            kind.collection(),
            order_by(kind)
        );
        let rows: Vec<TaxonomyRow> = sqlx::query_as(&sql)
            .bind(raw_ids(ids))
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to load taxonomy"))?;
        Ok(rows.into_iter().map(|r| r.into_model(kind)).collect())
    }

    async fn create(&self, kind: TaxonomyKind, draft: &TaxonomyDraft) -> Result<Taxonomy> {
        let sql = format!(
            "INSERT INTO {} (name, description) VALUES ($1, $2) \
             RETURNING id, name, image, description",
            kind.collection()
        );
        let row: TaxonomyRow = sqlx::query_as(&sql)
            .bind(draft.name.trim())
            .bind(&draft.description)
            .fetch_one(self.pool())
            .await
            .map_err(db_err("Failed to create taxonomy"))?;
        Ok(row.into_model(kind))
    }

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        draft: &TaxonomyDraft,
    ) -> Result<Option<Taxonomy>> {
        let sql = format!(
            "UPDATE {} SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, image, description",
            kind.collection()
        );
        let row: Option<TaxonomyRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .bind(draft.name.trim())
            .bind(&draft.description)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to update taxonomy"))?;
        Ok(row.map(|r| r.into_model(kind)))
    }

    async fn delete(&self, kind: TaxonomyKind, id: TaxonomyID) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.collection());
        let result = sqlx::query(&sql)
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to delete taxonomy"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_image(
        &self,
        kind: TaxonomyKind,
        id: TaxonomyID,
        path: Option<&str>,
    ) -> Result<bool> {
        let sql = format!("UPDATE {} SET image = $2 WHERE id = $1", kind.collection());
        let result = sqlx::query(&sql)
            .bind(id.get())
            .bind(path)
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to set taxonomy image"))?;
        Ok(result.rows_affected() > 0)
    }
}
