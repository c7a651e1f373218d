use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// Broadcast topic (Redis channel) for match summaries and batch answers.
    pub notify_topic: String,
    pub catalog_table: String,
    pub batch_catalog_table: String,
    /// Fan-out targets. Unset targets are skipped with a warning.
    pub persister_target: Option<String>,
    pub matcher_target: Option<String>,
    pub database: DatabaseConfig,
    pub gemini_api_key: Option<String>,
    pub aws: AwsConfig,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    /// MinIO (local) endpoint override for S3. Textract always talks to AWS.
    pub s3_endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            notify_topic: require_env("NOTIFY_TOPIC")?,
            catalog_table: env_or("CATALOG_TABLE", "VagasCompetencias"),
            batch_catalog_table: env_or("BATCH_CATALOG_TABLE", "vagas"),
            persister_target: optional_env("TARGET_PERSISTER"),
            matcher_target: optional_env("TARGET_MATCHER"),
            database: DatabaseConfig {
                host: env_or("DB_HOST", "localhost"),
                port: env_or("DB_PORT", "5432")
                    .parse::<u16>()
                    .context("DB_PORT must be a valid port number")?,
                user: optional_env("DB_USER"),
                password: optional_env("DB_PASSWORD"),
                database: optional_env("DB_NAME"),
            },
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            aws: AwsConfig {
                region: env_or("AWS_REGION", "us-east-1"),
                s3_endpoint: optional_env("S3_ENDPOINT"),
                access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
                secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
            },
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Empty values count as unset, so `TARGET_MATCHER=` disables the target.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
