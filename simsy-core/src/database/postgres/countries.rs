use async_trait::async_trait;
use simsy_model::{Country, CountryDraft, CountryID, ImageSlot, TaxonomyID};
use sqlx::PgPool;

use super::{db_err, raw_ids};
use crate::database::ports::countries::CountriesRepository;
use crate::error::{CoreError, Result};

#[derive(Clone, Debug)]
pub struct PostgresCountriesRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CountryRow {
    id: i64,
    name: String,
    flag: Option<String>,
    image: Option<String>,
    description: String,
    language_ids: Vec<i64>,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country {
            id: CountryID(row.id),
            name: row.name,
            language_ids: row.language_ids.into_iter().map(TaxonomyID).collect(),
            flag: row.flag,
            image: row.image,
            description: row.description,
        }
    }
}

const COUNTRY_SELECT: &str = r#"
    SELECT c.id, c.name, c.flag, c.image, c.description,
           ARRAY(
               SELECT language_id FROM country_languages
               WHERE country_id = c.id ORDER BY language_id
           ) AS language_ids
    FROM countries c
"#;

impl PostgresCountriesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch(&self, id: CountryID) -> Result<Option<Country>> {
        let sql = format!("{COUNTRY_SELECT} WHERE c.id = $1");
        let row: Option<CountryRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(db_err("Failed to get country"))?;
        Ok(row.map(Country::from))
    }
}

#[async_trait]
impl CountriesRepository for PostgresCountriesRepository {
    async fn list(&self) -> Result<Vec<Country>> {
        let sql = format!("{COUNTRY_SELECT} ORDER BY c.name, c.id");
        let rows: Vec<CountryRow> = sqlx::query_as(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to list countries"))?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn get(&self, id: CountryID) -> Result<Option<Country>> {
        self.fetch(id).await
    }

    async fn get_many(&self, ids: &[CountryID]) -> Result<Vec<Country>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{COUNTRY_SELECT} WHERE c.id = ANY($1) ORDER BY c.name, c.id");
        let rows: Vec<CountryRow> = sqlx::query_as(&sql)
            .bind(raw_ids(ids))
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to load countries"))?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn speaking(&self, language: TaxonomyID) -> Result<Vec<Country>> {
        let sql = format!(
            "{COUNTRY_SELECT} WHERE EXISTS (
                SELECT 1 FROM country_languages cl
                WHERE cl.country_id = c.id AND cl.language_id = $1
            ) ORDER BY c.name, c.id"
        );
        let rows: Vec<CountryRow> = sqlx::query_as(&sql)
            .bind(language.get())
            .fetch_all(self.pool())
            .await
            .map_err(db_err("Failed to list countries by language"))?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn create(&self, draft: &CountryDraft) -> Result<Country> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO countries (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(draft.name.trim())
        .bind(&draft.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to create country"))?;

        sqlx::query(
            "INSERT INTO country_languages (country_id, language_id) \
             SELECT $1, UNNEST($2::bigint[])",
        )
        .bind(id)
        .bind(raw_ids(&draft.language_ids))
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to store country languages"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;

        self.fetch(CountryID(id))
            .await?
            .ok_or_else(|| CoreError::Internal("Created country vanished".into()))
    }

    async fn update(&self, id: CountryID, draft: &CountryDraft) -> Result<Option<Country>> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_err("Failed to start transaction"))?;

        let updated = sqlx::query(
            "UPDATE countries SET name = $2, description = $3 WHERE id = $1",
        )
        .bind(id.get())
        .bind(draft.name.trim())
        .bind(&draft.description)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to update country"))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM country_languages WHERE country_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to clear country languages"))?;
        sqlx::query(
            "INSERT INTO country_languages (country_id, language_id) \
             SELECT $1, UNNEST($2::bigint[])",
        )
        .bind(id.get())
        .bind(raw_ids(&draft.language_ids))
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to store country languages"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;
        self.fetch(id).await
    }

    async fn delete(&self, id: CountryID) -> Result<bool> {
        let result = sqlx::query("DELETE FROM countries WHERE id = $1")
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to delete country"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_image(
        &self,
        id: CountryID,
        slot: ImageSlot,
        path: Option<&str>,
    ) -> Result<bool> {
        let sql = match slot {
            ImageSlot::CountryFlag => "UPDATE countries SET flag = $2 WHERE id = $1",
            ImageSlot::CountryImage => "UPDATE countries SET image = $2 WHERE id = $1",
            other => {
                return Err(CoreError::invalid(format!(
                    "countries have no {} image",
                    other.slot()
                )));
            }
        };
        let result = sqlx::query(sql)
            .bind(id.get())
            .bind(path)
            .execute(self.pool())
            .await
            .map_err(db_err("Failed to set country image"))?;
        Ok(result.rows_affected() > 0)
    }
}
