use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::db::ResumeStore;
use crate::errors::PipelineError;
use crate::models::payload::ExtractionPayload;
use crate::models::response::InvocationResponse;
use crate::pipeline::InvocationHandler;

/// Persister: stores each extraction payload as a new `resumes` row.
/// No deduplication; redelivered payloads become additional rows.
pub struct Persister {
    store: Arc<dyn ResumeStore>,
}

impl Persister {
    pub fn new(store: Arc<dyn ResumeStore>) -> Self {
        Self { store }
    }

    pub async fn persist(&self, payload: &ExtractionPayload) -> InvocationResponse {
        match self.store.insert_resume(payload).await {
            Ok(row) => {
                info!("Data for '{}' inserted as row {}", row.filename, row.id);
                InvocationResponse::ok(&json!("Success: Data inserted into database"))
            }
            Err(e) => {
                error!("Persisting '{}' failed: {e}", payload.filename);
                InvocationResponse::from_error(&e)
            }
        }
    }
}

#[async_trait]
impl InvocationHandler for Persister {
    fn name(&self) -> &'static str {
        "persister"
    }

    async fn invoke(&self, input: &str) -> InvocationResponse {
        match serde_json::from_str::<ExtractionPayload>(input) {
            Ok(payload) => self.persist(&payload).await,
            Err(e) => {
                let err = PipelineError::from(e);
                error!("Persister received an unreadable payload: {err}");
                InvocationResponse::from_error(&err)
            }
        }
    }
}
