//! Configuration management for jobscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Command-line arguments are layered on
//! top by the binary.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// Loaded from `~/.config/jobscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// What to search for and how much of it
    pub search: SearchConfig,
    /// Markup and URL conventions of the target site
    pub site: SiteConfig,
    /// Randomized human-mimicking delays
    pub pacing: PacingConfig,
    /// Bot-challenge and consent-banner handling
    pub challenge: ChallengeConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Where results are written
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let config: Self = if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `JOBSCOUT_HEADLESS`: Override browser headless mode (true/false)
    /// - `JOBSCOUT_TARGET_COUNT`: Override the number of jobs to collect
    /// - `JOBSCOUT_OUTPUT_DIR`: Override the CSV output directory
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("JOBSCOUT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("JOBSCOUT_TARGET_COUNT") {
            if let Ok(count) = val.parse() {
                self.search.target_count = count;
                tracing::debug!("Override search.target_count from env: {}", count);
            }
        }

        if let Some(val) = lookup("JOBSCOUT_OUTPUT_DIR") {
            tracing::debug!("Override output.directory from env: {}", val);
            self.output.directory = PathBuf::from(val);
        }
    }

    /// Reject values the scraper cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.site.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "site.page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.site.job_selectors.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "site.job_selectors".to_string(),
                reason: "at least one selector is required".to_string(),
            });
        }
        if self.challenge.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "challenge.poll_interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        for (name, bounds) in self.pacing.stages() {
            if bounds.min_ms > bounds.max_ms {
                return Err(ConfigError::InvalidValue {
                    field: format!("pacing.{name}"),
                    reason: format!("min_ms {} exceeds max_ms {}", bounds.min_ms, bounds.max_ms),
                });
            }
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "jobscout", "jobscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Search parameters for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Job title or keywords
    pub position: String,
    /// Location filter
    pub location: String,
    /// Stop collecting once this many records are held
    pub target_count: usize,
    /// Visit each detail page for the full description
    pub enrich_descriptions: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            position: "python analyst".to_string(),
            location: "remote".to_string(),
            target_count: 800,
            enrich_descriptions: true,
        }
    }
}

/// Markup and URL conventions of the target site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host used to absolutize relative links
    pub origin: String,
    /// Path of the search-results page
    pub search_path: String,
    /// Query parameter holding the result offset
    pub offset_param: String,
    /// Results per page
    pub page_size: usize,
    /// Job-card selectors, tried in order until one matches
    pub job_selectors: Vec<String>,
    /// Explicit "next page" control
    pub next_page_selector: String,
    /// Full-description container on the detail page
    pub description_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.indeed.com".to_string(),
            search_path: "/jobs".to_string(),
            offset_param: "start".to_string(),
            page_size: 10,
            job_selectors: vec![
                ".job_seen_beacon".to_string(),
                "[data-testid=\"job-card\"]".to_string(),
                ".slider_container .slider_item".to_string(),
            ],
            next_page_selector: "a[data-testid=\"pagination-page-next\"]".to_string(),
            description_selector: "#jobDescriptionText".to_string(),
        }
    }
}

/// Inclusive bounds of a uniformly random pause, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBounds {
    /// Shortest pause
    pub min_ms: u64,
    /// Longest pause
    pub max_ms: u64,
}

impl DelayBounds {
    /// Bounds in whole seconds.
    #[must_use]
    pub const fn secs(min: u64, max: u64) -> Self {
        Self {
            min_ms: min * 1000,
            max_ms: max * 1000,
        }
    }

    /// No pause at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }
}

/// Randomized delays applied between browser actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// After a search page loads
    pub page_load: DelayBounds,
    /// After each extracted record
    pub per_record: DelayBounds,
    /// Before advancing to the next search page
    pub between_pages: DelayBounds,
    /// After a detail page loads
    pub detail_load: DelayBounds,
    /// After each enriched record
    pub between_details: DelayBounds,
}

impl PacingConfig {
    /// Pacing with every pause disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            page_load: DelayBounds::none(),
            per_record: DelayBounds::none(),
            between_pages: DelayBounds::none(),
            detail_load: DelayBounds::none(),
            between_details: DelayBounds::none(),
        }
    }

    fn stages(&self) -> [(&'static str, DelayBounds); 5] {
        [
            ("page_load", self.page_load),
            ("per_record", self.per_record),
            ("between_pages", self.between_pages),
            ("detail_load", self.detail_load),
            ("between_details", self.between_details),
        ]
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_load: DelayBounds::secs(3, 5),
            per_record: DelayBounds::secs(1, 2),
            between_pages: DelayBounds::secs(5, 8),
            detail_load: DelayBounds::secs(2, 4),
            between_details: DelayBounds::secs(3, 6),
        }
    }
}

/// Bot-challenge detection and resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Text fragments marking an interstitial challenge page
    pub indicators: Vec<String>,
    /// Text fragments marking a cookie-consent banner
    pub consent_indicators: Vec<String>,
    /// Text fragments proving real site content is shown
    pub success_indicators: Vec<String>,
    /// Pause after the solver reports success
    pub settle_ms: u64,
    /// Ceiling of the polling fallback
    pub poll_timeout_secs: u64,
    /// Interval between polling checks
    pub poll_interval_secs: u64,
    /// Pause after polling observes resolution
    pub post_resolve_settle_ms: u64,
    /// Pause after the consent banner is accepted
    pub consent_settle_ms: u64,
    /// Ask the operator when automated strategies fail
    pub manual_fallback: bool,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            indicators: owned(&[
                "checking your browser",
                "just a moment",
                "verify you are human",
                "security check",
            ]),
            consent_indicators: owned(&[
                "accept all",
                "accept cookies",
                "cookie consent",
                "cookies policy",
                "we use cookies",
                "cookie notice",
                "privacy notice",
                "accept all cookies",
                "onetrust",
                "cookie banner",
                "cookie preferences",
            ]),
            success_indicators: owned(&["job", "vacancy", "position", "indeed.com"]),
            settle_ms: 5000,
            poll_timeout_secs: 30,
            poll_interval_secs: 2,
            post_resolve_settle_ms: 3000,
            consent_settle_ms: 3000,
            manual_fallback: true,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl ChallengeConfig {
    /// Polling ceiling as a duration.
    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Polling interval as a duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width; randomized when unset
    pub window_width: Option<u32>,
    /// Browser window height; randomized when unset
    pub window_height: Option<u32>,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Quiet period after navigation before the page is read
    pub network_settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: None,
            window_height: None,
            navigation_timeout_secs: 30,
            network_settle_ms: 1500,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the CSV file
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}
