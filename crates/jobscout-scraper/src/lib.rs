//! Jobscout Scraper - job-listing scrape orchestration.
//!
//! This crate drives a browser page through a search-results site,
//! clearing bot challenges, extracting one record per listing, following
//! pagination, fetching each listing's full description and writing the
//! result set to CSV.
//!
//! # Features
//!
//! - Layered challenge resolution: automated solver, polling, operator
//! - Field-local extraction with a `"NaN"` sentinel for missing values
//! - Explicit next-page links with offset-based fallback
//! - Partial-failure tolerance: per-item errors never abort a run
//!
//! # Example
//!
//! ```rust,ignore
//! use jobscout_browser::BrowserEngine;
//! use jobscout_core::AppConfig;
//! use jobscout_scraper::{ChallengeResolver, ScrapeOrchestrator};
//!
//! let config = AppConfig::load()?;
//! let engine = BrowserEngine::launch(&config.browser).await?;
//! let page = engine.new_page().await?;
//!
//! let resolver = ChallengeResolver::new(config.challenge.clone());
//! let orchestrator = ScrapeOrchestrator::new(&config, resolver)?;
//! let report = orchestrator.run(&page).await;
//! println!("{} jobs saved to {:?}", report.records.len(), report.output);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod challenge;
#[allow(missing_docs)]
pub mod enricher;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extractor;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod pagination;
#[allow(missing_docs)]
pub mod session;
#[allow(missing_docs)]
pub mod sink;

// Re-export commonly used types
pub use challenge::{
    AutoAcknowledge, ChallengeKind, ChallengeOutcome, ChallengeResolver, ChallengeSolver,
    ConsoleOperator, DeclineOperator, OperatorAck, UnsupportedSolver,
};
pub use enricher::DetailEnricher;
pub use error::{Result, ScrapeError};
pub use extractor::{extract_fields, normalize_posted_date, RecordExtractor};
pub use orchestrator::{ScrapeOrchestrator, ScrapeReport, ScrapeState, StopReason};
pub use pagination::{PageCursor, PaginationDriver};
pub use session::{align_descriptions, ScrapeSession};
pub use sink::CsvSink;
