use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use platform_db::DatabaseSettings;
use platform_storage::StorageSettings;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub documents: DatabaseSettings,
    pub auth_secret: String,
    pub session_ttl_minutes: i64,
    pub cors_allowed_origins: Vec<String>,
    pub storage: StorageSettings,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let database = DatabaseSettings::from_env("DATABASE_URL", None)?;
        let documents =
            DatabaseSettings::from_env("DOCUMENT_DATABASE_URL", Some("DATABASE_URL"))?;

        let auth_secret = env_required("AUTH_SECRET")?;
        if auth_secret.len() < 16 {
            return Err(anyhow!("AUTH_SECRET must be at least 16 bytes"));
        }
        let session_ttl_minutes = env_parsed("SESSION_TTL_MINUTES")?.unwrap_or(60);

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let mut storage = StorageSettings::new(
            std::env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:8787".into()),
        );
        storage.space_name = env_optional("STORAGE_SPACE_NAME");
        storage.token = env_optional("STORAGE_TOKEN");
        if let Some(secs) = env_parsed("STORAGE_TIMEOUT_SECS")? {
            storage.timeout = Duration::from_secs(secs);
        }

        let max_upload_bytes = env_parsed("MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            database,
            documents,
            auth_secret,
            session_ttl_minutes,
            cors_allowed_origins,
            storage,
            max_upload_bytes,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing env {}", key))
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_optional(key)
        .map(|raw| raw.parse::<T>().with_context(|| format!("invalid {}", key)))
        .transpose()
}
