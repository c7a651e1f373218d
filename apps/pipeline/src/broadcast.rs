//! Outbound messaging over Redis pub/sub: topic notifications and fan-out dispatch.
//!
//! Both are fire-and-forget. PUBLISH reports how many subscribers received the
//! message; zero means it was dropped, which is logged and otherwise accepted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::models::payload::ExtractionPayload;

/// Prefix of the channels fan-out consumers subscribe to.
pub const INVOKE_CHANNEL_PREFIX: &str = "invoke:";

pub fn invoke_channel(target: &str) -> String {
    format!("{INVOKE_CHANNEL_PREFIX}{target}")
}

/// A message published to a notification topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, topic: &str, notification: &Notification) -> Result<(), PipelineError>;
}

/// Asynchronous invocation of a named downstream target.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, target: &str, payload: &ExtractionPayload) -> Result<(), PipelineError>;
}

#[derive(Clone)]
pub struct RedisBroadcaster {
    client: redis::Client,
}

impl RedisBroadcaster {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn publish_raw(&self, channel: &str, message: &str) -> Result<i64, PipelineError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(message)
            .query_async(&mut conn)
            .await?;
        Ok(receivers)
    }
}

#[async_trait]
impl Notifier for RedisBroadcaster {
    async fn publish(&self, topic: &str, notification: &Notification) -> Result<(), PipelineError> {
        let message = serde_json::to_string(notification)?;
        let receivers = self.publish_raw(topic, &message).await?;
        if receivers == 0 {
            warn!("Notification '{}' on '{topic}' had no subscribers", notification.subject);
        } else {
            info!("Published '{}' to '{topic}' ({receivers} subscriber(s))", notification.subject);
        }
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for RedisBroadcaster {
    async fn dispatch(&self, target: &str, payload: &ExtractionPayload) -> Result<(), PipelineError> {
        let message = serde_json::to_string(payload)?;
        let receivers = self.publish_raw(&invoke_channel(target), &message).await?;
        if receivers == 0 {
            warn!("No consumer subscribed to target '{target}'; payload for '{}' dropped", payload.filename);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_channel_is_prefixed() {
        assert_eq!(invoke_channel("persister"), "invoke:persister");
    }

    #[test]
    fn test_notification_wire_shape() {
        let n = Notification {
            subject: "Resume Processing Summary".into(),
            message: "{}".into(),
        };
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            serde_json::json!({"subject": "Resume Processing Summary", "message": "{}"})
        );
    }
}
