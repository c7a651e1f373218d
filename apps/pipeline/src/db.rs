use std::future::Future;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::errors::PipelineError;
use crate::models::payload::ExtractionPayload;
use crate::models::resume::{LegacyResumeRow, ResumeRow};

/// Relational access used by the persister and the batch matcher.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Appends one row to `resumes`. Identical payloads produce distinct rows.
    async fn insert_resume(&self, payload: &ExtractionPayload) -> Result<ResumeRow, PipelineError>;

    /// Most recently inserted row of the legacy `curriculos` table.
    async fn latest_legacy_resume(&self) -> Result<Option<LegacyResumeRow>, PipelineError>;
}

pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port);
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }
    options
}

/// PostgreSQL store. Every call opens its own connection and closes it before
/// returning; on error paths the connection is dropped, which closes the socket.
#[derive(Clone)]
pub struct PgResumeStore {
    options: PgConnectOptions,
}

impl PgResumeStore {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }

    async fn connect(&self) -> Result<PgConnection, PipelineError> {
        debug!("Connecting to PostgreSQL...");
        Ok(self.options.connect().await?)
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert_resume(&self, payload: &ExtractionPayload) -> Result<ResumeRow, PipelineError> {
        let mut conn = self.connect().await?;

        let mut tx = conn.begin().await?;
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (filename, pdf_text, txt_content)
            VALUES ($1, $2, $3)
            RETURNING id, filename, pdf_text, txt_content
            "#,
        )
        .bind(&payload.filename)
        .bind(&payload.pdf_text)
        .bind(&payload.txt_content)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Inserted resume '{}' as row {}", row.filename, row.id);
        Ok(after_close(row, conn.close()).await)
    }

    async fn latest_legacy_resume(&self) -> Result<Option<LegacyResumeRow>, PipelineError> {
        let mut conn = self.connect().await?;

        let row = sqlx::query_as::<_, LegacyResumeRow>(
            "SELECT id, nome, competencias, experiencia FROM curriculos ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&mut conn)
        .await?;

        Ok(after_close(row, conn.close()).await)
    }
}

/// The work is already committed when the connection closes, so a failed close
/// is only logged.
async fn after_close<T>(value: T, close: impl Future<Output = Result<(), sqlx::Error>>) -> T {
    if let Err(e) = close.await {
        warn!("Closing the PostgreSQL connection failed: {e}");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_close_keeps_the_committed_result() {
        let row = ResumeRow {
            id: 7,
            filename: "cv".into(),
            pdf_text: "text".into(),
            txt_content: String::new(),
        };

        let kept = after_close(row, async { Err(sqlx::Error::PoolClosed) }).await;
        assert_eq!(kept.id, 7);

        let kept = after_close(Some(3), async { Ok(()) }).await;
        assert_eq!(kept, Some(3));
    }

    #[test]
    fn test_connect_options_apply_configured_fields() {
        let options = connect_options(&DatabaseConfig {
            host: "db.internal".into(),
            port: 6543,
            user: Some("pipeline".into()),
            password: Some("secret".into()),
            database: Some("recruiting".into()),
        });
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "pipeline");
        assert_eq!(options.get_database(), Some("recruiting"));
    }
}
