use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LoadError, LoadResult};

/// Where the published sheet CSV comes from.
#[derive(Debug, Clone)]
pub enum SheetSource {
    Http { url: String, client: reqwest::Client },
    File(PathBuf),
}

impl SheetSource {
    /// `http(s)://` locations are fetched over HTTP; anything else is a local path.
    pub fn from_location(location: &str, timeout: Duration) -> LoadResult<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(SheetSource::Http {
                url: location.to_string(),
                client,
            })
        } else {
            Ok(SheetSource::File(PathBuf::from(location)))
        }
    }

    pub fn label(&self) -> String {
        match self {
            SheetSource::Http { url, .. } => url.clone(),
            SheetSource::File(path) => path.display().to_string(),
        }
    }

    pub async fn fetch_text(&self) -> LoadResult<String> {
        match self {
            SheetSource::Http { url, client } => {
                tracing::info!("Fetching sheet CSV from {}", url);
                let response = client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::HttpStatus { status });
                }
                Ok(response.text().await?)
            }
            SheetSource::File(path) => {
                tracing::info!("Reading sheet CSV from {}", path.display());
                Ok(tokio::fs::read_to_string(path).await?)
            }
        }
    }
}
