//! Browser capabilities for the jobscout crawler.
//!
//! Defines the page/element capability traits the scraper depends on,
//! a Chromium engine implementing them with a randomized fingerprint,
//! human-mimicking pacing, and a canned-markup page for offline runs.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod fixture;
pub mod pacing;

pub use actions::{resolve_link, ElementHandle, PageHandle};
pub use engine::{BrowserElement, BrowserEngine, BrowserPage};
pub use error::{BrowserError, Result};
pub use fixture::{StaticElement, StaticPage};
pub use pacing::{human_pause, sample_delay};
