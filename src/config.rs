use std::env;

pub struct AppConfig {
    pub base_url: String,
    /// Seeded into the page's hidden CSRF field.
    pub csrf_token: Option<String>,
    /// Raw `Cookie` header, e.g. `sessionid=...; csrftoken=...`.
    pub cookie: Option<String>,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_var("DEVICESCOPE_URL", "http://127.0.0.1:8000"),
            csrf_token: optional_env_var("DEVICESCOPE_CSRF_TOKEN"),
            cookie: optional_env_var("DEVICESCOPE_COOKIE"),
            timeout_secs: env_var("DEVICESCOPE_TIMEOUT_SECS", "30").parse().unwrap_or(30),
        }
    }
}

fn env_var(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
