// The pipeline units. Each unit owns its collaborators as injected trait objects
// and produces an `InvocationResponse`; none calls another unit directly.

pub mod batch;
pub mod extractor;
pub mod matcher;
pub mod persister;
pub mod upload;

use async_trait::async_trait;

use crate::models::response::InvocationResponse;

/// A unit that can be triggered with a raw JSON input, as fan-out consumers are.
#[async_trait]
pub trait InvocationHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn invoke(&self, input: &str) -> InvocationResponse;
}
