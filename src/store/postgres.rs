//! Postgres-backed [`DocumentStore`].
//!
//! Schema (managed externally):
//! - `extracted(filename, page_number, key, value)` with one row per
//!   extracted field per page.
//! - `pages(page_id uuid, filename, page_number)`.
//! - `entities(entity_id uuid, entity_type text, entity_name text,
//!   identifier text, additional_info jsonb, created_at timestamptz,
//!   unique(entity_type, identifier))`.
//! - `page_entity_crosswalk(page_id uuid, entity_id uuid,
//!   primary key(page_id, entity_id))`.

use std::collections::BTreeMap;

use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::error::StoreError;
use super::matcher::MatchStrategy;
use super::{DocumentStore, EntityKind, NewEntity};

/// Entity store on a shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_in<'e, E>(
        executor: E,
        kind: EntityKind,
        identifier: &str,
        strategy: &MatchStrategy,
    ) -> Result<Option<Uuid>, StoreError>
    where
        E: sqlx::PgExecutor<'e>,
    {
        match strategy {
            MatchStrategy::ExactNormalized => {
                let row = sqlx::query(
                    "SELECT entity_id FROM entities \
                     WHERE entity_type = $1 AND identifier = $2 \
                     ORDER BY created_at LIMIT 1",
                )
                .bind(kind.as_str())
                .bind(identifier)
                .fetch_optional(executor)
                .await?;
                Ok(row.map(|r| r.try_get("entity_id")).transpose()?)
            }
            MatchStrategy::Substring => {
                // Unanchored containment scan over the attribute bag,
                // preserved behind an explicit opt-in.
                let pattern = format!("%{identifier}%");
                let row = sqlx::query(
                    "SELECT entity_id FROM entities \
                     WHERE entity_type = $1 AND additional_info::text ILIKE $2 \
                     ORDER BY created_at LIMIT 1",
                )
                .bind(kind.as_str())
                .bind(&pattern)
                .fetch_optional(executor)
                .await?;
                Ok(row.map(|r| r.try_get("entity_id")).transpose()?)
            }
            MatchStrategy::EditDistance { max_distance } => {
                // No fuzzystrmatch dependency: pull the identifiers for
                // this kind and compare in process.
                let rows = sqlx::query(
                    "SELECT entity_id, identifier FROM entities \
                     WHERE entity_type = $1 ORDER BY created_at",
                )
                .bind(kind.as_str())
                .fetch_all(executor)
                .await?;
                for row in rows {
                    let stored: String = row.try_get("identifier")?;
                    if strsim::levenshtein(&stored, identifier) <= *max_distance {
                        return Ok(Some(row.try_get("entity_id")?));
                    }
                }
                Ok(None)
            }
        }
    }
}

impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn fetch_extracted(
        &self,
        filename: &str,
        page_number: u32,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        let rows = sqlx::query(
            "SELECT key, value FROM extracted WHERE filename = $1 AND page_number = $2",
        )
        .bind(filename)
        .bind(page_number as i32)
        .fetch_all(&self.pool)
        .await?;

        let mut data = BTreeMap::new();
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            data.insert(key, value);
        }
        debug!(fields = data.len(), "fetched extracted data");
        Ok(data)
    }

    #[instrument(skip(self))]
    async fn page_numbers(&self, filename: &str) -> Result<Vec<u32>, StoreError> {
        let rows = sqlx::query(
            "SELECT page_number FROM pages WHERE filename = $1 ORDER BY page_number",
        )
        .bind(filename)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let n: i32 = row.try_get("page_number")?;
                u32::try_from(n).map_err(|_| StoreError::MalformedRow {
                    reason: format!("page number {n} out of range"),
                })
            })
            .collect()
    }

    async fn find_entity(
        &self,
        kind: EntityKind,
        identifier: &str,
        strategy: &MatchStrategy,
    ) -> Result<Option<Uuid>, StoreError> {
        Self::find_in(&self.pool, kind, identifier, strategy).await
    }

    #[instrument(skip(self, entity), fields(kind = %entity.kind))]
    async fn create_entity(&self, entity: NewEntity) -> Result<Uuid, StoreError> {
        let row = sqlx::query(
            "INSERT INTO entities (entity_id, entity_type, entity_name, identifier, additional_info) \
             VALUES ($1, $2, $3, $4, $5) RETURNING entity_id",
        )
        .bind(Uuid::new_v4())
        .bind(entity.kind.as_str())
        .bind(&entity.entity_name)
        .bind(&entity.identifier)
        .bind(&entity.additional_info)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("entity_id")?)
    }

    #[instrument(skip(self, entity), fields(kind = %entity.kind, strategy = %strategy))]
    async fn match_or_create_entity(
        &self,
        entity: NewEntity,
        strategy: &MatchStrategy,
    ) -> Result<Uuid, StoreError> {
        match strategy {
            MatchStrategy::ExactNormalized => {
                // Single-statement upsert on (entity_type, identifier): the
                // no-op DO UPDATE makes RETURNING yield the existing row's
                // id on conflict, so concurrent resolvers converge on one
                // entity.
                let row = sqlx::query(
                    "INSERT INTO entities (entity_id, entity_type, entity_name, identifier, additional_info) \
                     VALUES ($1, $2, $3, $4, $5) \
                     ON CONFLICT (entity_type, identifier) \
                     DO UPDATE SET entity_type = EXCLUDED.entity_type \
                     RETURNING entity_id",
                )
                .bind(Uuid::new_v4())
                .bind(entity.kind.as_str())
                .bind(&entity.entity_name)
                .bind(&entity.identifier)
                .bind(&entity.additional_info)
                .fetch_one(&self.pool)
                .await?;
                Ok(row.try_get("entity_id")?)
            }
            fuzzy => {
                // Fuzzy strategies cannot be expressed as a conflict target;
                // run find-then-insert inside one transaction.
                let mut tx = self.pool.begin().await?;
                if let Some(existing) =
                    Self::find_in(&mut *tx, entity.kind, &entity.identifier, fuzzy).await?
                {
                    tx.commit().await?;
                    debug!(entity_id = %existing, "matched existing entity");
                    return Ok(existing);
                }
                let row = sqlx::query(
                    "INSERT INTO entities (entity_id, entity_type, entity_name, identifier, additional_info) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING entity_id",
                )
                .bind(Uuid::new_v4())
                .bind(entity.kind.as_str())
                .bind(&entity.entity_name)
                .bind(&entity.identifier)
                .bind(&entity.additional_info)
                .fetch_one(&mut *tx)
                .await?;
                let id: Uuid = row.try_get("entity_id")?;
                tx.commit().await?;
                Ok(id)
            }
        }
    }

    #[instrument(skip(self))]
    async fn create_crosswalk(&self, page_id: Uuid, entity_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO page_entity_crosswalk (page_id, entity_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(page_id)
        .bind(entity_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
