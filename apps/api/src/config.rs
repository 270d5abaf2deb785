use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database, profiles come from an empty in-memory store.
    pub database_url: Option<String>,
    /// When set, CMS responses are cached in Redis instead of process memory.
    pub redis_url: Option<String>,
    pub wordpress: Option<WordPressConfig>,
    pub domains: DomainSettings,
    pub client_bundle_path: String,
    pub client_stylesheet_path: String,
    pub cms_cache_ttl: Duration,
    pub cms_deadline: Duration,
    pub openai_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

/// Credentials for the WordPress REST API. Absent → blog serves bundled content only.
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    /// e.g. `https://blog.example.com/wp-json/wp/v2`
    pub base_url: String,
    pub username: String,
    pub app_password: String,
}

/// Host names the tenant router treats as belonging to the platform itself.
#[derive(Debug, Clone, Default)]
pub struct DomainSettings {
    pub main_domain: String,
    pub preview_host_suffixes: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let wordpress = match optional_env("WORDPRESS_API_URL") {
            Some(base_url) => Some(WordPressConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                username: require_env("WORDPRESS_USERNAME")?,
                app_password: require_env("WORDPRESS_APP_PASSWORD")?,
            }),
            None => None,
        };

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            wordpress,
            domains: DomainSettings {
                main_domain: require_env("MAIN_DOMAIN")?.to_ascii_lowercase(),
                preview_host_suffixes: optional_env("PREVIEW_HOST_SUFFIXES")
                    .map(|v| parse_list(&v))
                    .unwrap_or_default(),
            },
            client_bundle_path: optional_env("CLIENT_BUNDLE_PATH")
                .unwrap_or_else(|| "/assets/index.js".to_string()),
            client_stylesheet_path: optional_env("CLIENT_STYLESHEET_PATH")
                .unwrap_or_else(|| "/assets/index.css".to_string()),
            cms_cache_ttl: Duration::from_secs(parse_env("CMS_CACHE_TTL_SECS", 300)?),
            cms_deadline: Duration::from_secs(parse_env("CMS_DEADLINE_SECS", 15)?),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
