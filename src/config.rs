use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub inference_url: String,
    pub backend: BackendConfig,
    pub session_file: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = BackendConfig {
            url: std::env::var("SUPABASE_URL")?,
            anon_key: std::env::var("SUPABASE_ANON_KEY")?,
        };
        Ok(Self {
            inference_url: std::env::var("INFERENCE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            backend,
            session_file: std::env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".vinewise-session.json".into()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        })
    }
}
