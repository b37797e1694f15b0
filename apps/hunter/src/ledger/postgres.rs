use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use super::{ApplicationLedger, LedgerError};
use crate::models::application::{ApplicationRecord, ApplicationRow};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS applications (
        seq             BIGSERIAL PRIMARY KEY,
        id              TEXT        NOT NULL,
        title           TEXT        NOT NULL,
        company         TEXT        NOT NULL,
        recorded_at     TIMESTAMPTZ NOT NULL,
        status          TEXT        NOT NULL,
        match_score     INTEGER     NOT NULL,
        application_url TEXT        NOT NULL,
        run_id          UUID        NOT NULL,
        cover_letter    TEXT
    )
"#;

/// PostgreSQL-backed ledger. Append-only: rows are only ever INSERTed.
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    /// Wraps the pool, creating the `applications` table when it is missing.
    pub async fn connect(pool: PgPool) -> Result<Self, LedgerError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("Application ledger table ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl ApplicationLedger for PgLedger {
    async fn load(&self) -> Result<Vec<ApplicationRecord>, LedgerError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, title, company, recorded_at, status, match_score,
                   application_url, run_id, cover_letter
            FROM applications
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                let record = row.into_record();
                if record.is_none() {
                    warn!("Skipping ledger row {id} with unknown status");
                }
                record
            })
            .collect())
    }

    async fn append(&self, record: ApplicationRecord) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO applications
                (id, title, company, recorded_at, status, match_score,
                 application_url, run_id, cover_letter)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.company)
        .bind(record.recorded_at)
        .bind(record.status.as_str())
        .bind(i32::try_from(record.match_score).unwrap_or(i32::MAX))
        .bind(&record.application_url)
        .bind(record.run_id)
        .bind(&record.cover_letter)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM applications WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(found)
    }
}
