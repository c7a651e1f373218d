//! In-memory doubles for every external seam, shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Map};

use crate::broadcast::{Dispatcher, Notification, Notifier};
use crate::catalog::VacancyCatalog;
use crate::db::ResumeStore;
use crate::errors::PipelineError;
use crate::llm_client::{GenerativeModel, LlmError};
use crate::models::payload::{
    ExtractionPayload, S3Bucket, S3Entity, S3Object, StorageEvent, StorageRecord,
};
use crate::models::resume::{LegacyResumeRow, ResumeRow};
use crate::models::vacancy::VacancyRecord;
use crate::ocr::{OcrEngine, PageSplitter, PdfPage};

pub fn storage_event(bucket: &str, key: &str) -> StorageEvent {
    StorageEvent {
        records: vec![StorageRecord {
            s3: S3Entity {
                bucket: S3Bucket {
                    name: bucket.to_string(),
                },
                object: S3Object {
                    key: key.to_string(),
                },
            },
        }],
    }
}

pub fn vacancy(id: &str, tags: &[&str]) -> VacancyRecord {
    let mut fields = Map::new();
    fields.insert("id".to_string(), json!(id));
    fields.insert("cargo".to_string(), json!(format!("Role {id}")));
    VacancyRecord {
        competencias: tags.iter().map(|t| t.to_string()).collect(),
        fields,
    }
}

#[derive(Default)]
pub struct FakeObjectStore {
    objects: HashMap<(String, String), Bytes>,
}

impl FakeObjectStore {
    pub fn with_object(mut self, bucket: &str, key: &str, data: &[u8]) -> Self {
        self.objects.insert(
            (bucket.to_string(), key.to_string()),
            Bytes::copy_from_slice(data),
        );
        self
    }
}

#[async_trait]
impl crate::storage::ObjectStore for FakeObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, PipelineError> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| PipelineError::Storage(format!("NoSuchKey: s3://{bucket}/{key}")))
    }
}

pub struct FakePageSplitter {
    pages: usize,
}

impl FakePageSplitter {
    pub fn with_pages(pages: usize) -> Self {
        Self { pages }
    }
}

impl PageSplitter for FakePageSplitter {
    fn split_pages(&self, _pdf: &[u8]) -> Result<Vec<PdfPage>, PipelineError> {
        Ok((1..=self.pages as u32)
            .map(|number| PdfPage {
                number,
                bytes: format!("page-{number}").into_bytes(),
            })
            .collect())
    }
}

/// Returns the configured lines for each 1-based page number.
pub struct FakeOcr {
    pages: Vec<Vec<String>>,
    fail_on: Option<u32>,
}

impl FakeOcr {
    pub fn with_pages(pages: Vec<Vec<&str>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|lines| lines.into_iter().map(String::from).collect())
                .collect(),
            fail_on: None,
        }
    }

    pub fn failing_on_page(mut self, number: u32) -> Self {
        self.fail_on = Some(number);
        self
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn detect_lines(&self, page: &PdfPage) -> Result<Vec<String>, PipelineError> {
        if self.fail_on == Some(page.number) {
            return Err(PipelineError::Ocr(format!(
                "page {}: ProvisionedThroughputExceededException",
                page.number
            )));
        }
        Ok(self
            .pages
            .get(page.number as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(String, ExtractionPayload)>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, ExtractionPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, target: &str, payload: &ExtractionPayload) -> Result<(), PipelineError> {
        if self.fail {
            return Err(PipelineError::Internal(anyhow::anyhow!("broker unreachable")));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target.to_string(), payload.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    rows: Vec<VacancyRecord>,
    fail: bool,
    scanned: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_rows(rows: Vec<VacancyRecord>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn scanned_tables(&self) -> Vec<String> {
        self.scanned.lock().unwrap().clone()
    }
}

#[async_trait]
impl VacancyCatalog for FakeCatalog {
    async fn scan(&self, table: &str) -> Result<Vec<VacancyRecord>, PipelineError> {
        self.scanned.lock().unwrap().push(table.to_string());
        if self.fail {
            return Err(PipelineError::Internal(anyhow::anyhow!(
                "ResourceNotFoundException: {table}"
            )));
        }
        Ok(self.rows.clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<(String, Notification)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, Notification)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, notification: &Notification) -> Result<(), PipelineError> {
        if self.fail {
            return Err(PipelineError::Internal(anyhow::anyhow!("topic not found")));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), notification.clone()));
        Ok(())
    }
}

/// Mimics `resumes` (BIGSERIAL ids) and `curriculos` in memory.
#[derive(Default)]
pub struct InMemoryResumeStore {
    rows: Mutex<Vec<ResumeRow>>,
    legacy: Vec<LegacyResumeRow>,
    fail: bool,
}

impl InMemoryResumeStore {
    pub fn with_legacy(legacy: Vec<LegacyResumeRow>) -> Self {
        Self {
            legacy,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<ResumeRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn insert_resume(&self, payload: &ExtractionPayload) -> Result<ResumeRow, PipelineError> {
        if self.fail {
            return Err(PipelineError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = ResumeRow {
            id: rows.last().map_or(1, |r| r.id + 1),
            filename: payload.filename.clone(),
            pdf_text: payload.pdf_text.clone(),
            txt_content: payload.txt_content.clone(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn latest_legacy_resume(&self) -> Result<Option<LegacyResumeRow>, PipelineError> {
        if self.fail {
            return Err(PipelineError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.legacy.iter().max_by_key(|r| r.id).cloned())
    }
}

/// Answers every prompt with a fixed text, or fails with an API error.
pub struct FakeModel {
    answer: Result<String, u16>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            answer: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.answer {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::Api {
                status: *status,
                message: "quota exceeded".to_string(),
            }),
        }
    }
}
