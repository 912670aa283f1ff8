//! # Settings Loader
//!
//! Centralized settings loading for the exchange-rate dashboard.
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory.
//!
//! | Variable          | Default     |
//! |-------------------|-------------|
//! | `HOST_API`        | required    |
//! | `HOST`            | `127.0.0.1` |
//! | `PORT`            | `8050`      |
//! | `DEFAULT_COUNTRY` | `colombia`  |
//! | `DEFAULT_YEAR`    | `2018`      |
//! | `SESSION_TTL_SECS`| `1800`      |
//!
//! ```rust,no_run
//! let settings = settings_loader::load_settings()?;
//! println!("provider at {}", settings.host_api);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use models::{Country, Selection, Year};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the rate provider, without trailing slash.
    pub host_api: String,
    pub host: String,
    pub port: u16,
    pub default_selection: Selection,
    /// Idle time after which a dashboard session is dropped.
    pub session_ttl: Duration,
}

/// Loads `.env` (if present) and then reads settings from the environment.
pub fn load_settings() -> Result<Settings> {
    load_dotenv(".env")?;
    settings_from_lookup(|name| std::env::var(name).ok())
}

/// Seeds the process environment from a dotenv file. A missing file is not an error.
pub fn load_dotenv<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(false);
    }
    dotenvy::from_path(path).with_context(|| format!("Reading env file: {}", path.display()))?;
    Ok(true)
}

/// Builds settings from an arbitrary variable lookup.
pub fn settings_from_lookup<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| {
        lookup(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let host_api = get("HOST_API")
        .ok_or_else(|| anyhow!("HOST_API is not set (rate provider base URL)"))?
        .trim_end_matches('/')
        .to_string();

    let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = get("PORT")
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let session_ttl = get("SESSION_TTL_SECS")
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TTL_SECS));

    let defaults = Selection::default();
    let country = match get("DEFAULT_COUNTRY") {
        Some(raw) => raw
            .parse::<Country>()
            .with_context(|| "Parsing DEFAULT_COUNTRY")?,
        None => defaults.country,
    };
    let year = match get("DEFAULT_YEAR") {
        Some(raw) => raw.parse::<Year>().with_context(|| "Parsing DEFAULT_YEAR")?,
        None => defaults.year,
    };

    Ok(Settings {
        host_api,
        host,
        port,
        default_selection: Selection::new(country, year),
        session_ttl,
    })
}
