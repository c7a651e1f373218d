use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::broadcast::RedisBroadcaster;
use crate::catalog::RedisCatalog;
use crate::config::Config;
use crate::db::{connect_options, PgResumeStore};
use crate::llm_client::{self, GeminiClient};
use crate::ocr::{LopdfPageSplitter, TextractOcr};
use crate::pipeline::batch::BatchMatcher;
use crate::pipeline::extractor::{Extractor, FanOutTargets};
use crate::pipeline::matcher::Matcher;
use crate::pipeline::persister::Persister;
use crate::storage::{build_s3_client, load_sdk_config, S3ObjectStore};

/// Every unit, wired to its external clients. Built once per process and
/// handed to whichever entry point the command line selected.
pub struct Services {
    pub redis: redis::Client,
    pub extractor: Arc<Extractor>,
    pub persister: Arc<Persister>,
    pub matcher: Arc<Matcher>,
    /// `None` when no generative-model key is configured.
    pub batch: Option<Arc<BatchMatcher>>,
}

impl Services {
    pub async fn build(config: &Config) -> Result<Self> {
        let redis = redis::Client::open(config.redis_url.clone()).context("Invalid REDIS_URL")?;
        let broadcaster = Arc::new(RedisBroadcaster::new(redis.clone()));
        let catalog = Arc::new(RedisCatalog::new(redis.clone()));
        info!("Redis client initialized");

        let sdk_config = load_sdk_config(&config.aws).await;
        let s3 = build_s3_client(&sdk_config, &config.aws);
        let textract = aws_sdk_textract::Client::new(&sdk_config);
        info!("S3 and Textract clients initialized");

        let resumes = Arc::new(PgResumeStore::new(connect_options(&config.database)));

        let extractor = Arc::new(Extractor::new(
            Arc::new(S3ObjectStore::new(s3)),
            Arc::new(LopdfPageSplitter),
            Arc::new(TextractOcr::new(textract)),
            broadcaster.clone(),
            FanOutTargets {
                persister: config.persister_target.clone(),
                matcher: config.matcher_target.clone(),
            },
        ));

        let persister = Arc::new(Persister::new(resumes.clone()));

        let matcher = Arc::new(Matcher::new(
            catalog.clone(),
            broadcaster.clone(),
            config.catalog_table.clone(),
            config.notify_topic.clone(),
        ));

        let batch = match &config.gemini_api_key {
            Some(key) => {
                let gemini = GeminiClient::new(key.clone())
                    .context("Failed to build the Gemini HTTP client")?;
                info!("LLM client initialized (model: {})", llm_client::MODEL);
                Some(Arc::new(BatchMatcher::new(
                    resumes,
                    catalog,
                    Arc::new(gemini),
                    broadcaster,
                    config.batch_catalog_table.clone(),
                    config.notify_topic.clone(),
                )))
            }
            None => {
                warn!("GEMINI_API_KEY not set; batch matching disabled");
                None
            }
        };

        Ok(Self {
            redis,
            extractor,
            persister,
            matcher,
            batch,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            extractor: self.extractor.clone(),
            batch: self.batch.clone(),
        }
    }
}

/// Shared state injected into route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub batch: Option<Arc<BatchMatcher>>,
}
