use std::str::FromStr;

/// Service configuration, read once at startup from the environment.
///
/// Every knob has a default so the server comes up in a bare dev
/// environment; `.env` is loaded by the binaries before this runs.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Single origin allowed by CORS (the storefront frontend).
    pub allowed_origin: String,
    pub commerce_api_url: String,
    pub commerce_timeout_secs: u64,
    pub gemini_model: String,
    pub faq_db_path: String,
    /// How many FAQ chunks to append to every context.
    pub faq_top_k: usize,
    /// Upper bound on the assembled context, in characters.
    pub context_max_chars: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 8000),
            allowed_origin: env_or("ALLOWED_ORIGIN", "http://localhost:3000".to_string()),
            commerce_api_url: env_or("COMMERCE_API_URL", "http://localhost:8001".to_string()),
            commerce_timeout_secs: env_or("COMMERCE_TIMEOUT_SECS", 5),
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.0-flash".to_string()),
            faq_db_path: env_or("FAQ_DB_PATH", "data/faq.lance".to_string()),
            faq_top_k: env_or("FAQ_TOP_K", 2),
            context_max_chars: env_or("CONTEXT_MAX_CHARS", 6000),
        }
    }
}

/// Read an env var, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
