use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Seconds a clock token stays valid after the password check.
    pub clock_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_public_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub user_cache_ttl: u64,

    /// TTF files for the PDF report. The bundled DejaVu Sans is used when unset.
    pub pdf_font_path: Option<String>,
    pub pdf_bold_font_path: Option<String>,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            clock_token_ttl: or_default("CLOCK_TOKEN_TTL", 300)?, // default 5 min

            rate_login_per_min: or_default("RATE_LOGIN_PER_MIN", 60)?,
            rate_public_per_min: or_default("RATE_PUBLIC_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            user_cache_ttl: or_default("USER_CACHE_TTL", 300)?,

            pdf_font_path: env::var("PDF_FONT_PATH").ok(),
            pdf_bold_font_path: env::var("PDF_BOLD_FONT_PATH").ok(),
        })
    }
}
