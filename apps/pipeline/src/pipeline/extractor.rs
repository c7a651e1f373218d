//! Extractor: turns one storage notification into an `ExtractionPayload` and
//! fans it out.
//!
//! Steps: download the PDF, try the `.txt` sidecar next to it, OCR every page in
//! order, then dispatch the payload to each configured target without waiting
//! for the targets to run.

use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use percent_encoding::percent_decode_str;
use serde_json::json;
use tracing::{error, info, warn};

use crate::broadcast::Dispatcher;
use crate::errors::PipelineError;
use crate::models::payload::{ExtractionPayload, StorageEvent};
use crate::models::response::InvocationResponse;
use crate::ocr::{page_text, OcrEngine, PageSplitter};
use crate::storage::ObjectStore;

/// Named fan-out destinations. A `None` target is skipped.
#[derive(Debug, Clone, Default)]
pub struct FanOutTargets {
    pub persister: Option<String>,
    pub matcher: Option<String>,
}

impl FanOutTargets {
    fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        [
            ("persister", self.persister.as_deref()),
            ("matcher", self.matcher.as_deref()),
        ]
        .into_iter()
    }
}

pub struct Extractor {
    store: Arc<dyn ObjectStore>,
    splitter: Arc<dyn PageSplitter>,
    ocr: Arc<dyn OcrEngine>,
    dispatcher: Arc<dyn Dispatcher>,
    targets: FanOutTargets,
}

impl Extractor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        splitter: Arc<dyn PageSplitter>,
        ocr: Arc<dyn OcrEngine>,
        dispatcher: Arc<dyn Dispatcher>,
        targets: FanOutTargets,
    ) -> Self {
        Self {
            store,
            splitter,
            ocr,
            dispatcher,
            targets,
        }
    }

    /// Entry point for an unparsed notification body. An unreadable event fails
    /// the same way as any later step.
    pub async fn handle_raw(&self, body: &str) -> InvocationResponse {
        match serde_json::from_str::<StorageEvent>(body) {
            Ok(event) => self.handle(&event).await,
            Err(e) => extraction_failed(&PipelineError::from(e)),
        }
    }

    pub async fn handle(&self, event: &StorageEvent) -> InvocationResponse {
        match self.run(event).await {
            Ok(()) => InvocationResponse::ok(&json!("Success: Data forwarded")),
            Err(e) => extraction_failed(&e),
        }
    }

    async fn run(&self, event: &StorageEvent) -> Result<(), PipelineError> {
        let payload = self.extract(event).await?;
        self.fan_out(&payload).await
    }

    /// Builds the payload for the first record of the event.
    pub async fn extract(&self, event: &StorageEvent) -> Result<ExtractionPayload, PipelineError> {
        let record = event
            .records
            .first()
            .ok_or_else(|| PipelineError::Payload("storage event has no records".to_string()))?;
        let bucket = record.s3.bucket.name.as_str();
        let key = decode_object_key(&record.s3.object.key);
        let filename = base_name(&key);
        info!("Extracting s3://{bucket}/{key}");

        let pdf = self.store.get_object(bucket, &key).await?;
        info!("PDF downloaded ({} bytes)", pdf.len());

        let txt_content = self.read_sidecar(bucket, &sidecar_key(&key, &filename)).await;

        let pages = self.splitter.split_pages(&pdf)?;
        info!("PDF has {} page(s)", pages.len());

        let mut pdf_text = String::new();
        for page in &pages {
            let lines = self.ocr.detect_lines(page).await?;
            let text = page_text(&lines);
            info!("Extracted {} chars from page {}", text.len(), page.number);
            pdf_text.push_str(&text);
            pdf_text.push('\n');
        }

        Ok(ExtractionPayload {
            filename,
            pdf_text,
            txt_content,
        })
    }

    /// A missing or unreadable sidecar is not an error; it reads as empty text.
    async fn read_sidecar(&self, bucket: &str, key: &str) -> String {
        let bytes = match self.store.get_object(bucket, key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("No matching TXT file '{key}': {e}");
                return String::new();
            }
        };
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => {
                info!("TXT file '{key}' found and read");
                text
            }
            Err(e) => {
                warn!("TXT file '{key}' is not UTF-8: {e}");
                String::new()
            }
        }
    }

    async fn fan_out(&self, payload: &ExtractionPayload) -> Result<(), PipelineError> {
        for (role, target) in self.targets.iter() {
            match target {
                Some(target) => {
                    self.dispatcher.dispatch(target, payload).await?;
                    info!("Payload '{}' sent to {role} target '{target}'", payload.filename);
                }
                None => warn!("No {role} target configured; skipping"),
            }
        }
        Ok(())
    }
}

fn extraction_failed(err: &PipelineError) -> InvocationResponse {
    error!("Extraction failed: {err}");
    InvocationResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!(format!("Extraction failed: {err}")),
    )
}

/// Notification keys are URL-encoded with `+` for spaces.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// `uploads/resume123.pdf` -> `resume123`.
pub fn base_name(key: &str) -> String {
    Path::new(key)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The sidecar lives next to the PDF: `uploads/resume123.pdf` -> `uploads/resume123.txt`.
pub fn sidecar_key(key: &str, filename: &str) -> String {
    match key.rfind('/') {
        Some(idx) => format!("{}/{filename}.txt", &key[..idx]),
        None => format!("{filename}.txt"),
    }
}
