//! Vacancy catalog backed by Redis.
//!
//! A catalog "table" is a key prefix: each vacancy is a JSON document stored at
//! `<table>:<id>`. Scans follow SCAN cursors until the keyspace is exhausted, so
//! callers always see the whole table.

use std::collections::BTreeSet;
use std::future::Future;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::models::vacancy::VacancyRecord;

const SCAN_BATCH: usize = 100;

#[async_trait]
pub trait VacancyCatalog: Send + Sync {
    /// Full snapshot of the table.
    async fn scan(&self, table: &str) -> Result<Vec<VacancyRecord>, PipelineError>;
}

#[derive(Clone)]
pub struct RedisCatalog {
    client: redis::Client,
}

impl RedisCatalog {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn scan_keys(
        conn: &MultiplexedConnection,
        table: &str,
    ) -> Result<Vec<String>, PipelineError> {
        let pattern = format!("{table}:*");
        collect_cursor_pages(|cursor| {
            let mut conn = conn.clone();
            let pattern = pattern.clone();
            async move {
                let page: (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn)
                    .await?;
                Ok(page)
            }
        })
        .await
    }
}

/// Follows a SCAN-style cursor from 0 until the server hands back 0.
/// A key may show up on more than one page; the result is deduplicated and sorted.
async fn collect_cursor_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<String>, PipelineError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<(u64, Vec<String>), PipelineError>>,
{
    let mut keys = BTreeSet::new();
    let mut cursor: u64 = 0;
    loop {
        let (next, batch) = fetch_page(cursor).await?;
        keys.extend(batch);
        if next == 0 {
            break;
        }
        cursor = next;
    }
    Ok(keys.into_iter().collect())
}

#[async_trait]
impl VacancyCatalog for RedisCatalog {
    async fn scan(&self, table: &str) -> Result<Vec<VacancyRecord>, PipelineError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let keys = Self::scan_keys(&conn, table).await?;
        if keys.is_empty() {
            debug!("Catalog table '{table}' is empty");
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let records = keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| parse_vacancy(key, value?.as_str()))
            .collect::<Vec<_>>();

        debug!("Scanned {} vacancies from '{table}'", records.len());
        Ok(records)
    }
}

/// Vacancies that are not JSON objects are skipped so one bad row does not hide the rest.
fn parse_vacancy(key: &str, raw: &str) -> Option<VacancyRecord> {
    match serde_json::from_str::<VacancyRecord>(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping unreadable vacancy at '{key}': {e}");
            None
        }
    }
}
