//! PostgreSQL-backed interaction log and catalog
//!
//! Enabled with the `backend_postgresql` feature. Queries are built at runtime
//! so the crate compiles without a reachable database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgPool, PgPoolOptions, PgRow},
    types::Json,
    Row,
};
use tracing::{debug, info, instrument};

use avmo_common::{AvmoError, Result};

use super::{CatalogProvider, InteractionStore};
use crate::models::{AppRecord, InteractionMetadata, InteractionRecord, InteractionType};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS user_app_interactions (
        id BIGSERIAL PRIMARY KEY,
        user_id TEXT NOT NULL,
        app_id TEXT NOT NULL,
        interaction_type TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        usage_time DOUBLE PRECISION NOT NULL DEFAULT 0,
        metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS user_app_interactions_user_idx ON user_app_interactions (user_id)",
    "CREATE INDEX IF NOT EXISTS user_app_interactions_created_idx ON user_app_interactions (created_at)",
    r#"CREATE TABLE IF NOT EXISTS app_recommendations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        score DOUBLE PRECISION NOT NULL,
        popularity INTEGER NOT NULL,
        owner_id TEXT,
        icon_name TEXT,
        version TEXT,
        size TEXT,
        ai_recommendation_reason TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS app_recommendations_category_idx ON app_recommendations (category)",
];

fn db_error(err: sqlx::Error) -> AvmoError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AvmoError::StoreUnavailable(err.to_string())
        }
        other => AvmoError::Database(other.to_string()),
    }
}

/// Interaction store and catalog provider over one connection pool
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    #[instrument(level = "debug", skip(url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_error)?;
        info!("✅ Connected to PostgreSQL (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    /// Create tables and indexes when missing
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }
        debug!("📋 Recommendation schema ready");
        Ok(())
    }

    /// Insert or replace a catalog entry
    pub async fn upsert_app(&self, app: &AppRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO app_recommendations
                (id, name, category, description, score, popularity, owner_id,
                 icon_name, version, size, ai_recommendation_reason)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 category = EXCLUDED.category,
                 description = EXCLUDED.description,
                 score = EXCLUDED.score,
                 popularity = EXCLUDED.popularity,
                 owner_id = EXCLUDED.owner_id,
                 icon_name = EXCLUDED.icon_name,
                 version = EXCLUDED.version,
                 size = EXCLUDED.size,
                 ai_recommendation_reason = EXCLUDED.ai_recommendation_reason"#,
        )
        .bind(&app.id)
        .bind(&app.name)
        .bind(&app.category)
        .bind(&app.description)
        .bind(app.score)
        .bind(app.popularity as i32)
        .bind(&app.owner_id)
        .bind(&app.icon_name)
        .bind(&app.version)
        .bind(&app.size)
        .bind(&app.ai_recommendation_reason)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

fn interaction_from_row(row: &PgRow) -> Result<InteractionRecord> {
    let interaction_type: String = row.try_get("interaction_type").map_err(db_error)?;
    let interaction_type: InteractionType = interaction_type
        .parse()
        .map_err(|e: AvmoError| AvmoError::Database(format!("malformed interaction row: {}", e)))?;
    let metadata: Json<InteractionMetadata> = row.try_get("metadata").map_err(db_error)?;

    Ok(InteractionRecord {
        user_id: row.try_get("user_id").map_err(db_error)?,
        app_id: row.try_get("app_id").map_err(db_error)?,
        interaction_type,
        category: row.try_get("category").map_err(db_error)?,
        usage_time: row.try_get("usage_time").map_err(db_error)?,
        metadata: metadata.0,
        timestamp: row.try_get("created_at").map_err(db_error)?,
    })
}

fn app_from_row(row: &PgRow) -> Result<AppRecord> {
    let popularity: i32 = row.try_get("popularity").map_err(db_error)?;
    let popularity = u32::try_from(popularity)
        .map_err(|_| AvmoError::Database(format!("negative popularity {}", popularity)))?;

    Ok(AppRecord {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        category: row.try_get("category").map_err(db_error)?,
        description: row.try_get("description").map_err(db_error)?,
        score: row.try_get("score").map_err(db_error)?,
        popularity,
        owner_id: row.try_get("owner_id").map_err(db_error)?,
        icon_name: row.try_get("icon_name").map_err(db_error)?,
        version: row.try_get("version").map_err(db_error)?,
        size: row.try_get("size").map_err(db_error)?,
        ai_recommendation_reason: row.try_get("ai_recommendation_reason").map_err(db_error)?,
    })
}

#[async_trait]
impl InteractionStore for PostgresStore {
    async fn append(&self, record: InteractionRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO user_app_interactions
                (user_id, app_id, interaction_type, category, usage_time, metadata, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&record.user_id)
        .bind(&record.app_id)
        .bind(record.interaction_type.as_str())
        .bind(&record.category)
        .bind(record.usage_time)
        .bind(Json(&record.metadata))
        .bind(record.timestamp)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<InteractionRecord>> {
        let rows = sqlx::query(
            r#"SELECT user_id, app_id, interaction_type, category, usage_time, metadata, created_at
               FROM user_app_interactions
               WHERE user_id = $1
               ORDER BY created_at"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(interaction_from_row).collect()
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let result = sqlx::query("DELETE FROM user_app_interactions WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl CatalogProvider for PostgresStore {
    async fn apps_in_categories(
        &self,
        categories: &[String],
        exclude_owner: &str,
    ) -> Result<Vec<AppRecord>> {
        let rows = sqlx::query(
            r#"SELECT id, name, category, description, score, popularity, owner_id,
                      icon_name, version, size, ai_recommendation_reason
               FROM app_recommendations
               WHERE category = ANY($1)
                 AND (owner_id IS NULL OR owner_id <> $2)
               ORDER BY score DESC, popularity DESC"#,
        )
        .bind(categories.to_vec())
        .bind(exclude_owner)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(app_from_row).collect()
    }
}
