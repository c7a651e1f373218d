//! Fan-out consumers: one Redis subscription per unit, one task per message.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use tracing::{error, info, warn};

use crate::models::response::InvocationResponse;
use crate::pipeline::InvocationHandler;

/// Subscribes to `channel` and hands every message to `handler` on its own task.
/// Returns only when the subscription stream ends.
pub async fn run_worker(
    client: redis::Client,
    channel: String,
    handler: Arc<dyn InvocationHandler>,
) -> Result<()> {
    let mut pubsub = client
        .get_async_pubsub()
        .await
        .context("Failed to open Redis pub/sub connection")?;
    pubsub
        .subscribe(&channel)
        .await
        .with_context(|| format!("Failed to subscribe to '{channel}'"))?;
    info!("{} worker listening on '{channel}'", handler.name());

    let mut messages = pubsub.on_message();
    while let Some(msg) = messages.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping unreadable message on '{channel}': {e}");
                continue;
            }
        };
        let handler = handler.clone();
        tokio::spawn(async move {
            deliver(handler.as_ref(), &payload).await;
        });
    }

    warn!("Subscription to '{channel}' closed");
    Ok(())
}

/// Runs one invocation and logs its outcome. Messages are never redelivered.
pub async fn deliver(handler: &dyn InvocationHandler, payload: &str) -> InvocationResponse {
    let response = handler.invoke(payload).await;
    if response.is_success() {
        info!("{} invocation finished: {}", handler.name(), response.status_code);
    } else {
        error!(
            "{} invocation failed ({}): {}",
            handler.name(),
            response.status_code,
            response.body
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::persister::Persister;
    use crate::testing::InMemoryResumeStore;

    #[tokio::test]
    async fn test_deliver_returns_the_unit_response() {
        let store = Arc::new(InMemoryResumeStore::default());
        let persister = Persister::new(store.clone());

        let ok = deliver(
            &persister,
            r#"{"filename": "cv", "pdf_text": "text", "txt_content": ""}"#,
        )
        .await;
        assert_eq!(ok.status_code, 200);
        assert_eq!(store.rows().len(), 1);

        let bad = deliver(&persister, "42").await;
        assert_eq!(bad.status_code, 400);
        assert_eq!(store.rows().len(), 1);
    }
}
