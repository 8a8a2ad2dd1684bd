use thiserror::Error;

/// Failures while fetching or tokenizing the published sheet.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheet request returned {status}")]
    HttpStatus { status: reqwest::StatusCode },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
