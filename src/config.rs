use crate::error::{Error, Result};
use std::env;
use std::sync::OnceLock;

const DEFAULT_OPENROUTER_MODELS: &str = "google/gemini-2.5-flash-lite";
const DEFAULT_GEMINI_MODELS: &str = "gemini-3-flash-preview,gemini-1.5-flash,gemini-pro";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openrouter_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Ordered model lists; the first entry is primary, the rest are
    /// fallbacks tried only on model-specific failures.
    pub openrouter_models: Vec<String>,
    pub gemini_models: Vec<String>,
    pub fetch_concurrency: usize,
    pub ai_request_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            openrouter_api_key: env::var("OPENROUTER_API_KEY").ok().filter(|v| !v.is_empty()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|v| !v.is_empty()),
            openrouter_models: get_env_list("OPENROUTER_MODELS", DEFAULT_OPENROUTER_MODELS),
            gemini_models: get_env_list("GEMINI_MODELS", DEFAULT_GEMINI_MODELS),
            fetch_concurrency: get_env_parse_or("FETCH_CONCURRENCY", 4)?,
            ai_request_timeout_secs: get_env_parse_or("AI_REQUEST_TIMEOUT_SECS", 120)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_list(name: &str, default: &str) -> Vec<String> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
