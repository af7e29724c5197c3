use secrecy::SecretString;
use std::{env, time::Duration};

const PLACEHOLDER_API_KEY: &str = "sk-placeholder";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => StorageBackend::Memory,
            _ => StorageBackend::Mongo,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub storage_backend: StorageBackend,
    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub generation_timeout_secs: u64,
    pub generation_max_retries: u32,
    pub generation_retry_backoff_ms: u64,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "study-quiz-local".to_string()),
            storage_backend: env::var("STORAGE_BACKEND")
                .map(|raw| StorageBackend::parse(&raw))
                .unwrap_or(StorageBackend::Mongo),
            openai_api_key: SecretString::from(
                env::var("OPENAI_API_KEY").unwrap_or_else(|_| PLACEHOLDER_API_KEY.to_string()),
            ),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            generation_timeout_secs: parse_or("GENERATION_TIMEOUT_SECS", 45),
            generation_max_retries: parse_or("GENERATION_MAX_RETRIES", 2),
            generation_retry_backoff_ms: parse_or("GENERATION_RETRY_BACKOFF_MS", 500),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: parse_or("WEB_SERVER_PORT", 8080),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn generation_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.generation_retry_backoff_ms)
    }

    /// Validate that production-critical configuration is set
    /// Panics if the model API key is missing or still the placeholder
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let api_key = self.openai_api_key.expose_secret();

        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            panic!(
                "FATAL: OPENAI_API_KEY is not set! Set OPENAI_API_KEY before starting in production."
            );
        }

        if self.storage_backend == StorageBackend::Memory {
            log::warn!("STORAGE_BACKEND=memory in production; data will not survive a restart");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "study-quiz-test".to_string(),
            storage_backend: StorageBackend::Memory,
            openai_api_key: SecretString::from("sk-test".to_string()),
            openai_model: "gpt-4o-mini".to_string(),
            generation_timeout_secs: 5,
            generation_max_retries: 0,
            generation_retry_backoff_ms: 1,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            app_env: "test".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
