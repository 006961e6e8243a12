//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CreationStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Queries use the runtime API rather than the compile-time-checked macros so
//! the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use creator_studio_core::domain::{Creation, CreationKind, NewCreation};
use creator_studio_core::ports::{CreationStore, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CreationStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CreationRecord {
    id: Uuid,
    owner_id: String,
    prompt: String,
    content: String,
    kind: String,
    publish: bool,
    liked_by: Vec<String>,
    created_at: DateTime<Utc>,
}

impl CreationRecord {
    fn to_domain(self) -> PortResult<Creation> {
        let kind = CreationKind::from_str(&self.kind).ok_or_else(|| {
            PortError::Unexpected(format!("unknown creation kind '{}' in row {}", self.kind, self.id))
        })?;
        Ok(Creation {
            id: self.id,
            owner_id: self.owner_id,
            kind,
            prompt: self.prompt,
            content: self.content,
            publish: self.publish,
            liked_by: self.liked_by,
            created_at: self.created_at,
        })
    }
}

fn to_domain_rows(records: Vec<CreationRecord>) -> PortResult<Vec<Creation>> {
    records.into_iter().map(CreationRecord::to_domain).collect()
}

const CREATION_COLUMNS: &str =
    "id, owner_id, prompt, content, kind, publish, liked_by, created_at";

//=========================================================================================
// `CreationStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CreationStore for DbAdapter {
    async fn insert(&self, creation: NewCreation) -> PortResult<Creation> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO creations (id, owner_id, prompt, content, kind, publish, liked_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&creation.owner_id)
        .bind(&creation.prompt)
        .bind(&creation.content)
        .bind(creation.kind.as_str())
        .bind(creation.publish)
        .bind(Vec::<String>::new())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(Creation {
            id,
            owner_id: creation.owner_id,
            kind: creation.kind,
            prompt: creation.prompt,
            content: creation.content,
            publish: creation.publish,
            liked_by: Vec::new(),
            created_at,
        })
    }

    async fn list_by_owner(&self, owner_id: &str) -> PortResult<Vec<Creation>> {
        let records = sqlx::query_as::<_, CreationRecord>(&format!(
            "SELECT {CREATION_COLUMNS} FROM creations WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        to_domain_rows(records)
    }

    async fn list_published(&self) -> PortResult<Vec<Creation>> {
        let records = sqlx::query_as::<_, CreationRecord>(&format!(
            "SELECT {CREATION_COLUMNS} FROM creations WHERE publish = TRUE ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        to_domain_rows(records)
    }

    async fn get(&self, id: Uuid) -> PortResult<Option<Creation>> {
        let record = sqlx::query_as::<_, CreationRecord>(&format!(
            "SELECT {CREATION_COLUMNS} FROM creations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        record.map(CreationRecord::to_domain).transpose()
    }

    async fn replace_liked_by(
        &self,
        id: Uuid,
        expected: &[String],
        new: &[String],
    ) -> PortResult<bool> {
        // The like-set is only ever written through this conditional update,
        // so array equality against the previously-read value is a sound CAS.
        let result = sqlx::query(
            "UPDATE creations SET liked_by = $2 WHERE id = $1 AND liked_by = $3",
        )
        .bind(id)
        .bind(new)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
