use lopdf::Document;
use tracing::debug;

use crate::errors::PipelineError;

/// One page of the source document as a standalone PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// 1-based page number.
    pub number: u32,
    pub bytes: Vec<u8>,
}

/// Splits a PDF into per-page documents for OCR, in page order.
pub trait PageSplitter: Send + Sync {
    fn split_pages(&self, pdf: &[u8]) -> Result<Vec<PdfPage>, PipelineError>;
}

/// Textract reads single-page PDFs directly, so pages are never rasterized.
#[derive(Debug, Clone, Default)]
pub struct LopdfPageSplitter;

impl PageSplitter for LopdfPageSplitter {
    fn split_pages(&self, pdf: &[u8]) -> Result<Vec<PdfPage>, PipelineError> {
        let doc = Document::load_mem(pdf).map_err(|e| PipelineError::Pdf(e.to_string()))?;
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        debug!("PDF has {} page(s)", page_numbers.len());

        let mut pages = Vec::with_capacity(page_numbers.len());
        for &number in &page_numbers {
            let others: Vec<u32> = page_numbers
                .iter()
                .copied()
                .filter(|&n| n != number)
                .collect();

            let mut single = doc.clone();
            single.delete_pages(&others);
            single.prune_objects();

            let mut bytes = Vec::new();
            single
                .save_to(&mut bytes)
                .map_err(|e| PipelineError::Pdf(format!("page {number}: {e}")))?;
            pages.push(PdfPage { number, bytes });
        }

        Ok(pages)
    }
}
