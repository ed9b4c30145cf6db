//! Jobscout Core - Foundation crate for the jobscout crawler.
//!
//! This crate provides shared types, error handling and configuration
//! management that the browser and scraper crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - `JobRecord`, `SearchQuery` and the field sentinel
//!
//! # Example
//!
//! ```rust
//! use jobscout_core::{AppConfig, SearchQuery};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let query = SearchQuery::new(&config.search.position, &config.search.location)?;
//! let url = query.search_url(&config.site.origin, &config.site.search_path)?;
//! assert!(url.starts_with("https://www.indeed.com/jobs?q="));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, ChallengeConfig, DelayBounds, OutputConfig, PacingConfig,
    SearchConfig, SiteConfig,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{is_sentinel, JobRecord, SearchQuery, POSTED_TODAY, SENTINEL};
