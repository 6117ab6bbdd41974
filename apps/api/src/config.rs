use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Loaded once at startup; every component receives it by construction so
/// the generator and filler can be tested with fakes instead of ambient
/// env lookups.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    /// Static rubric document, read fresh on every generation request.
    pub rubric_path: PathBuf,
    /// The blank assessment form the filler renders into.
    pub template_path: PathBuf,
    /// Where rendered documents are written (idempotent overwrite by filename).
    pub output_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            rubric_path: path_env("RUBRIC_PATH", "data/rubric.json"),
            template_path: path_env("TEMPLATE_PATH", "templates/blank_form.docx"),
            output_dir: path_env("OUTPUT_DIR", "output"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn path_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
