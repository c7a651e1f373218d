use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use bytes::Bytes;
use tracing::debug;

use crate::config::AwsConfig;
use crate::errors::PipelineError;

/// Read access to the object store holding uploaded resumes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, PipelineError>;
}

#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, PipelineError> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| PipelineError::Storage(format!("get s3://{bucket}/{key} failed: {e}")))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| PipelineError::Storage(format!("read s3://{bucket}/{key} failed: {e}")))?
            .into_bytes();

        debug!("Downloaded s3://{bucket}/{key} ({} bytes)", data.len());
        Ok(data)
    }
}

/// Shared AWS SDK config for S3 and Textract.
/// Static credentials are used when both keys are configured; otherwise the default chain.
pub async fn load_sdk_config(aws: &AwsConfig) -> aws_config::SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));

    if let (Some(key_id), Some(secret)) = (&aws.access_key_id, &aws.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "resume-pipeline-static",
        ));
    }

    loader.load().await
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub fn build_s3_client(sdk_config: &aws_config::SdkConfig, aws: &AwsConfig) -> aws_sdk_s3::Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
    if let Some(endpoint) = &aws.s3_endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}
