//! OCR seam: page splitting (`pages`) and line-level text detection.

use async_trait::async_trait;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{BlockType, Document};
use tracing::debug;

use crate::errors::PipelineError;

pub mod pages;

pub use pages::{LopdfPageSplitter, PageSplitter, PdfPage};

/// Detects text lines in one page, in the engine's block order.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn detect_lines(&self, page: &PdfPage) -> Result<Vec<String>, PipelineError>;
}

/// Joins the LINE blocks of one page the way the extractor accumulates them.
pub fn page_text(lines: &[String]) -> String {
    lines.join(" ")
}

#[derive(Clone)]
pub struct TextractOcr {
    client: aws_sdk_textract::Client,
}

impl TextractOcr {
    pub fn new(client: aws_sdk_textract::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OcrEngine for TextractOcr {
    async fn detect_lines(&self, page: &PdfPage) -> Result<Vec<String>, PipelineError> {
        let document = Document::builder()
            .bytes(Blob::new(page.bytes.clone()))
            .build();

        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|e| PipelineError::Ocr(format!("page {}: {e}", page.number)))?;

        let lines: Vec<String> = output
            .blocks()
            .iter()
            .filter(|b| b.block_type() == Some(&BlockType::Line))
            .filter_map(|b| b.text().map(String::from))
            .collect();

        debug!("Textract returned {} line(s) for page {}", lines.len(), page.number);
        Ok(lines)
    }
}
