//! Shared types used across jobscout.
//!
//! `JobRecord` is the unit of harvested data; `SearchQuery` carries the
//! position/location pair that drives both the search URL and the output
//! file name.

use crate::error::{CoreError, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Placeholder stored in a field that could not be extracted.
pub const SENTINEL: &str = "NaN";

/// Normalized value for listings posted today.
pub const POSTED_TODAY: &str = "0 days ago";

/// One harvested job listing.
///
/// Every field always holds either a real value or [`SENTINEL`]; the
/// description defaults to an empty string instead. Serialized column
/// names and order match the CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Listing title
    #[serde(rename = "Title")]
    pub title: String,
    /// Hiring company
    #[serde(rename = "Company")]
    pub company: String,
    /// Job location as displayed
    #[serde(rename = "Location")]
    pub location: String,
    /// Company rating as displayed
    #[serde(rename = "Rating")]
    pub rating: String,
    /// Normalized posting age (`"N days ago"`)
    #[serde(rename = "Date")]
    pub posted_date: String,
    /// Salary snippet
    #[serde(rename = "Salary")]
    pub salary: String,
    /// Short snippet after extraction, full text after enrichment
    #[serde(rename = "Description")]
    pub description: String,
    /// Absolute URL of the detail page
    #[serde(rename = "Links")]
    pub detail_url: String,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            title: SENTINEL.to_string(),
            company: SENTINEL.to_string(),
            location: SENTINEL.to_string(),
            rating: SENTINEL.to_string(),
            posted_date: SENTINEL.to_string(),
            salary: SENTINEL.to_string(),
            description: String::new(),
            detail_url: SENTINEL.to_string(),
        }
    }
}

impl JobRecord {
    /// Whether the detail link was resolved during extraction.
    #[must_use]
    pub fn has_detail_url(&self) -> bool {
        !is_sentinel(&self.detail_url) && !self.detail_url.is_empty()
    }
}

/// Check whether a field value is the extraction sentinel.
#[must_use]
pub fn is_sentinel(value: &str) -> bool {
    value == SENTINEL
}

/// Position and location searched for in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Job title or keywords
    pub position: String,
    /// Location filter
    pub location: String,
}

impl SearchQuery {
    /// Create a query, rejecting an empty position.
    pub fn new(position: impl Into<String>, location: impl Into<String>) -> Result<Self> {
        let position = position.into();
        if position.trim().is_empty() {
            return Err(CoreError::Validation(
                "position must not be empty".to_string(),
            ));
        }
        Ok(Self {
            position,
            location: location.into(),
        })
    }

    /// Build the first search-results URL, e.g.
    /// `https://www.indeed.com/jobs?q=python+analyst&l=remote`.
    pub fn search_url(&self, origin: &str, search_path: &str) -> Result<String> {
        let base = Url::parse(origin).map_err(|e| CoreError::InvalidUrl {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;
        let mut url = base.join(search_path).map_err(|e| CoreError::InvalidUrl {
            url: search_path.to_string(),
            reason: e.to_string(),
        })?;

        url.query_pairs_mut()
            .append_pair("q", &self.position)
            .append_pair("l", &self.location);

        Ok(url.to_string())
    }

    /// Output file name: `{YYYY-MM-DD_HH-MM}_{position}_{location}.csv`.
    ///
    /// Characters that cannot appear in a file name are replaced with `-`.
    #[must_use]
    pub fn output_file_name<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        format!(
            "{}_{}_{}.csv",
            at.format("%Y-%m-%d_%H-%M"),
            file_name_component(&self.position),
            file_name_component(&self.location)
        )
    }
}

/// Replace path separators, reserved and control characters with `-`.
fn file_name_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' in '{}'", self.position, self.location)
    }
}
