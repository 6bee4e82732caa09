use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub db_readers: usize,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("BLOG_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("BLOG_PORT")
            .unwrap_or_else(|| "4000".into())
            .parse()
            .context("BLOG_PORT must be a port number")?;
        let db_path: PathBuf = get("BLOG_DB_PATH").unwrap_or_else(|| "blog.db".into()).into();
        let db_readers: usize = match get("BLOG_DB_READERS") {
            Some(v) => v.parse().context("BLOG_DB_READERS must be a positive integer")?,
            None => blog_db::DEFAULT_READER_POOL_SIZE,
        };
        let cors_origin =
            get("BLOG_CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into());

        Ok(Self {
            host,
            port,
            db_path,
            db_readers,
            cors_origin,
        })
    }
}
