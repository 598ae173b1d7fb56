use async_trait::async_trait;
use chrono::{DateTime, Utc};
use simsy_model::{
    ArtistID, CountryID, EpisodeCounts, Show, ShowDraft, ShowID, TaxonomyID,
    TaxonomyKind,
};
use sqlx::{PgPool, Postgres, Transaction, types::Json};

use super::{db_err, raw_ids};
use crate::database::ports::shows::{ShowFilter, ShowsRepository};
use crate::error::{CoreError, Result};

#[derive(Clone, Debug)]
pub struct PostgresShowsRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ShowRow {
    id: i64,
    name: String,
    year: String,
    kind: String,
    sample: bool,
    captions: bool,
    image: Option<String>,
    imdb: String,
    description: String,
    rating_id: Option<i64>,
    episodes: Json<EpisodeCounts>,
    finalized: bool,
    popup: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    country_ids: Vec<i64>,
    language_ids: Vec<i64>,
    genre_ids: Vec<i64>,
    label_ids: Vec<i64>,
    artist_ids: Vec<i64>,
}

impl TryFrom<ShowRow> for Show {
    type Error = CoreError;

    fn try_from(row: ShowRow) -> Result<Self> {
        Ok(Show {
            id: ShowID(row.id),
            name: row.name,
            year: row.year,
            kind: row.kind.parse()?,
            sample: row.sample,
            captions: row.captions,
            image: row.image,
            imdb: row.imdb,
            description: row.description,
            country_ids: row.country_ids.into_iter().map(CountryID).collect(),
            language_ids: row.language_ids.into_iter().map(TaxonomyID).collect(),
            genre_ids: row.genre_ids.into_iter().map(TaxonomyID).collect(),
            label_ids: row.label_ids.into_iter().map(TaxonomyID).collect(),
            rating_id: row.rating_id.map(TaxonomyID),
            artist_ids: row.artist_ids.into_iter().map(ArtistID).collect(),
            episodes: row.episodes.0,
            finalized: row.finalized,
            popup: row.popup,
            created: row.created,
            updated: row.updated,
        })
    }
}

const SHOW_SELECT: &str = r#"
    SELECT s.id, s.name, s.year, s.kind, s.sample, s.captions, s.image, s.imdb,
           s.description, s.rating_id, s.episodes, s.finalized, s.popup,
           s.created, s.updated,
           ARRAY(SELECT country_id FROM show_countries WHERE show_id = s.id ORDER BY country_id) AS country_ids,
           ARRAY(SELECT language_id FROM show_languages WHERE show_id = s.id ORDER BY language_id) AS language_ids,
           ARRAY(SELECT genre_id FROM show_genres WHERE show_id = s.id ORDER BY genre_id) AS genre_ids,
           ARRAY(SELECT label_id FROM show_labels WHERE show_id = s.id ORDER BY label_id) AS label_ids,
           ARRAY(SELECT artist_id FROM show_artists WHERE show_id = s.id ORDER BY artist_id) AS artist_ids
    FROM shows s
"#;

const CATALOG_ORDER: &str = "ORDER BY s.year DESC, s.name, s.id";

/// Join tables written from a draft: (table, foreign key column).
const RELATIONS: [(&str, &str); 5] = [
    ("show_countries", "country_id"),
    ("show_languages", "language_id"),
    ("show_genres", "genre_id"),
    ("show_labels", "label_id"),
    ("show_artists", "artist_id"),
];

fn relation_ids(draft: &ShowDraft) -> [Vec<i64>; 5] {
    [
        raw_ids(&draft.country_ids),
        raw_ids(&draft.language_ids),
        raw_ids(&draft.genre_ids),
        raw_ids(&draft.label_ids),
        raw_ids(&draft.artist_ids),
    ]
}

/// Escape `%`, `_` and `\` for an ILIKE pattern.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl PostgresShowsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows(&self, sql: &str, bind: Option<i64>) -> Result<Vec<Show>> {
        let mut query = sqlx::query_as::<_, ShowRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to load shows"))?;
        rows.into_iter().map(Show::try_from).collect()
    }

    async fn write_relations(
        tx: &mut Transaction<'_, Postgres>,
        show_id: i64,
        draft: &ShowDraft,
    ) -> Result<()> {
        for ((table, column), ids) in RELATIONS.iter().zip(relation_ids(draft)) {
            sqlx::query(&format!("DELETE FROM {table} WHERE show_id = $1"))
                .bind(show_id)
                .execute(&mut **tx)
                .await
                .map_err(db_err("Failed to clear show relations"))?;
            sqlx::query(&format!(
                "INSERT INTO {table} (show_id, {column}) \
                 SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING"
            ))
            .bind(show_id)
            .bind(ids)
            .execute(&mut **tx)
            .await
            .map_err(db_err("Failed to store show relations"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ShowsRepository for PostgresShowsRepository {
    async fn list(&self) -> Result<Vec<Show>> {
        self.fetch_rows(&format!("{SHOW_SELECT} {CATALOG_ORDER}"), None)
            .await
    }

    async fn list_filtered(&self, filter: ShowFilter) -> Result<Vec<Show>> {
        let (condition, id) = match filter {
            ShowFilter::Artist(id) => (
                "EXISTS (SELECT 1 FROM show_artists x WHERE x.show_id = s.id AND x.artist_id = $1)",
                id.get(),
            ),
            ShowFilter::Country(id) => (
                "EXISTS (SELECT 1 FROM show_countries x WHERE x.show_id = s.id AND x.country_id = $1)",
                id.get(),
            ),
            ShowFilter::Taxonomy(TaxonomyKind::Language, id) => (
                "EXISTS (SELECT 1 FROM show_languages x WHERE x.show_id = s.id AND x.language_id = $1)",
                id.get(),
            ),
            ShowFilter::Taxonomy(TaxonomyKind::Genre, id) => (
                "EXISTS (SELECT 1 FROM show_genres x WHERE x.show_id = s.id AND x.genre_id = $1)",
                id.get(),
            ),
            ShowFilter::Taxonomy(TaxonomyKind::Label, id) => (
                "EXISTS (SELECT 1 FROM show_labels x WHERE x.show_id = s.id AND x.label_id = $1)",
                id.get(),
            ),
            ShowFilter::Taxonomy(TaxonomyKind::Rating, id) => {
                ("s.rating_id = $1", id.get())
            }
        };
        self.fetch_rows(
            &format!("{SHOW_SELECT} WHERE {condition} {CATALOG_ORDER}"),
            Some(id),
        )
        .await
    }

    async fn get(&self, id: ShowID) -> Result<Option<Show>> {
        let mut shows = self
            .fetch_rows(&format!("{SHOW_SELECT} WHERE s.id = $1"), Some(id.get()))
            .await?;
        Ok(shows.pop())
    }

    async fn get_many(&self, ids: &[ShowID]) -> Result<Vec<Show>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<ShowRow> =
            sqlx::query_as(&format!("{SHOW_SELECT} WHERE s.id = ANY($1)"))
                .bind(raw_ids(ids))
                .fetch_all(self.pool())
                .await
                .map_err(db_err("Failed to load shows"))?;
        rows.into_iter().map(Show::try_from).collect()
    }

    async fn create(&self, draft: &ShowDraft) -> Result<Show> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO shows (
                name, year, kind, sample, captions, imdb, description,
                rating_id, episodes, finalized, popup, created, updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(draft.name.trim())
        .bind(draft.year.trim())
        .bind(draft.kind.as_str())
        .bind(draft.sample)
        .bind(draft.captions)
        .bind(&draft.imdb)
        .bind(&draft.description)
        .bind(draft.rating_id.map(|r| r.get()))
        .bind(Json(&draft.episodes))
        .bind(draft.finalized)
        .bind(&draft.popup)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to create show"))?;

        Self::write_relations(&mut tx, id, draft).await?;
        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;

        self.get(ShowID(id))
            .await?
            .ok_or_else(|| CoreError::Internal("Created show vanished".into()))
    }

    async fn update(&self, id: ShowID, draft: &ShowDraft) -> Result<Option<Show>> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        let updated = sqlx::query(
            r#"
            UPDATE shows SET
                name = $2, year = $3, kind = $4, sample = $5, captions = $6,
                imdb = $7, description = $8, rating_id = $9, episodes = $10,
                finalized = $11, popup = $12, updated = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(draft.name.trim())
        .bind(draft.year.trim())
        .bind(draft.kind.as_str())
        .bind(draft.sample)
        .bind(draft.captions)
        .bind(&draft.imdb)
        .bind(&draft.description)
        .bind(draft.rating_id.map(|r| r.get()))
        .bind(Json(&draft.episodes))
        .bind(draft.finalized)
        .bind(&draft.popup)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to update show"))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        Self::write_relations(&mut tx, id.get(), draft).await?;
        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        self.get(id).await
    }

    async fn delete(&self, id: ShowID) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shows WHERE id = $1")
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to delete show"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_image(&self, id: ShowID, path: Option<&str>) -> Result<bool> {
        let result =
            sqlx::query("UPDATE shows SET image = $2, updated = NOW() WHERE id = $1")
                .bind(id.get())
                .bind(path)
                .execute(self.pool())
                .await
                .map_err(db_err("Failed to set show image"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn newest(&self, limit: usize) -> Result<Vec<Show>> {
        let rows: Vec<ShowRow> = sqlx::query_as(&format!(
            "{SHOW_SELECT} ORDER BY s.updated DESC, s.id DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await
        .map_err(db_err("Failed to load newest shows"))?;
        rows.into_iter().map(Show::try_from).collect()
    }

    async fn random(&self, limit: usize) -> Result<Vec<Show>> {
        let rows: Vec<ShowRow> =
            sqlx::query_as(&format!("{SHOW_SELECT} ORDER BY RANDOM() LIMIT $1"))
                .bind(limit as i64)
                .fetch_all(self.pool())
                .await
                .map_err(db_err("Failed to load random shows"))?;
        rows.into_iter().map(Show::try_from).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Show>> {
        let rows: Vec<ShowRow> = sqlx::query_as(&format!(
            "{SHOW_SELECT} WHERE s.name ILIKE $1 OR s.description ILIKE $1 {CATALOG_ORDER}"
        ))
        .bind(like_pattern(query))
        .fetch_all(self.pool())
        .await
        .map_err(db_err("Failed to search shows"))?;
        rows.into_iter().map(Show::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dark"), "%dark%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
