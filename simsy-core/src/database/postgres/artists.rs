use async_trait::async_trait;
use simsy_model::{Artist, ArtistDraft, ArtistID, CountryID};
use sqlx::PgPool;

use super::{db_err, raw_ids};
use crate::database::ports::artists::ArtistsRepository;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresArtistsRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ArtistRow {
    id: i64,
    name: String,
    birth_year: i32,
    nationality: Option<i64>,
    image: Option<String>,
    description: String,
}

impl From<ArtistRow> for Artist {
    fn from(row: ArtistRow) -> Self {
        Artist {
            id: ArtistID(row.id),
            name: row.name,
            birth_year: row.birth_year,
            nationality: row.nationality.map(CountryID),
            image: row.image,
            description: row.description,
        }
    }
}

const ARTIST_COLUMNS: &str = "id, name, birth_year, nationality, image, description";

impl PostgresArtistsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ArtistsRepository for PostgresArtistsRepository {
    async fn list(&self) -> Result<Vec<Artist>> {
        let sql = format!("SELECT {ARTIST_COLUMNS} FROM artists ORDER BY name, id");
        let rows: Vec<ArtistRow> = sqlx::query_as(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to list artists"))?;
        Ok(rows.into_iter().map(Artist::from).collect())
    }

    async fn get(&self, id: ArtistID) -> Result<Option<Artist>> {
        let sql = format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = $1");
        let row: Option<ArtistRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get artist"))?;
        Ok(row.map(Artist::from))
    }

    async fn get_many(&self, ids: &[ArtistID]) -> Result<Vec<Artist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ANY($1) ORDER BY name, id"
        );
        let rows: Vec<ArtistRow> = sqlx::query_as(&sql)
            .bind(raw_ids(ids))
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to load artists"))?;
        Ok(rows.into_iter().map(Artist::from).collect())
    }

    async fn by_nationality(&self, country: CountryID) -> Result<Vec<Artist>> {
        let sql = format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE nationality = $1 ORDER BY name, id"
        );
        let rows: Vec<ArtistRow> = sqlx::query_as(&sql)
            .bind(country.get())
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to list artists by nationality"))?;
        Ok(rows.into_iter().map(Artist::from).collect())
    }

    async fn create(&self, draft: &ArtistDraft) -> Result<Artist> {
        let sql = format!(
            "INSERT INTO artists (name, birth_year, nationality, description) \
             VALUES ($1, $2, $3, $4) RETURNING {ARTIST_COLUMNS}"
        );
        let row: ArtistRow = sqlx::query_as(&sql)
            .bind(draft.name.trim())
            .bind(draft.birth_year)
            .bind(draft.nationality.map(|c| c.get()))
            .bind(&draft.description)
            .fetch_one(self.pool())
            .await
            .map_err(db_err("Failed to create artist"))?;
        Ok(row.into())
    }

    async fn update(&self, id: ArtistID, draft: &ArtistDraft) -> Result<Option<Artist>> {
        let sql = format!(
            "UPDATE artists SET name = $2, birth_year = $3, nationality = $4, description = $5 \
             WHERE id = $1 RETURNING {ARTIST_COLUMNS}"
        );
        let row: Option<ArtistRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .bind(draft.name.trim())
            .bind(draft.birth_year)
            .bind(draft.nationality.map(|c| c.get()))
            .bind(&draft.description)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to update artist"))?;
        Ok(row.map(Artist::from))
    }

    async fn delete(&self, id: ArtistID) -> Result<bool> {
        let result = sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to delete artist"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_image(&self, id: ArtistID, path: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE artists SET image = $2 WHERE id = $1")
            .bind(id.get())
            .bind(path)
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to set artist image"))?;
        Ok(result.rows_affected() > 0)
    }
}
