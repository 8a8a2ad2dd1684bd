use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_REFRESH_MINUTES: u64 = 15;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Published sheet URL or a local CSV path.
    pub sheet_location: Option<String>,
    pub refresh_interval: Duration,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads `SHEET_CSV_URL`, `REFRESH_INTERVAL_MINUTES` and `HTTP_TIMEOUT_SECS`,
    /// loading a `.env` file first when one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let minutes = read_u64(&lookup, "REFRESH_INTERVAL_MINUTES", DEFAULT_REFRESH_MINUTES)?;
        if minutes == 0 {
            anyhow::bail!("REFRESH_INTERVAL_MINUTES must be at least 1");
        }
        let refresh_interval =
            minutes_to_interval(minutes).context("REFRESH_INTERVAL_MINUTES is too large")?;
        let timeout_secs = read_u64(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            sheet_location: lookup("SHEET_CSV_URL").filter(|value| !value.trim().is_empty()),
            refresh_interval,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The command-line source wins over the environment.
    pub fn resolve_source(&self, cli_source: Option<&str>) -> anyhow::Result<String> {
        cli_source
            .map(str::to_string)
            .or_else(|| self.sheet_location.clone())
            .context("set SHEET_CSV_URL or pass --source with the published sheet CSV")
    }
}

/// `minutes` as a `Duration`, failing instead of overflowing.
pub fn minutes_to_interval(minutes: u64) -> anyhow::Result<Duration> {
    let secs = minutes
        .checked_mul(60)
        .with_context(|| format!("{minutes} minutes does not fit in a refresh interval"))?;
    Ok(Duration::from_secs(secs))
}

fn read_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> anyhow::Result<u64> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a whole number, got {value:?}")),
    }
}
