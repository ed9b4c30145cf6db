use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to load page {url}: {source}")]
    PageLoad {
        url: String,
        #[source]
        source: jobscout_browser::BrowserError,
    },

    #[error("Challenge solver failed: {0}")]
    SolverFailed(String),

    #[error("Operator unavailable: {0}")]
    OperatorUnavailable(String),

    #[error("Browser error: {0}")]
    Browser(#[from] jobscout_browser::BrowserError),

    #[error("Core error: {0}")]
    Core(#[from] jobscout_core::CoreError),

    #[error("CSV output error: {0}")]
    Output(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
