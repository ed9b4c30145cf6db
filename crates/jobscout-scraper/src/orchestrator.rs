//! Scrape orchestrator driving one run from search page to CSV file.
//!
//! A run is a single sequential pass: the collection phase walks result
//! pages until the target count is reached or results run out, the
//! enrichment phase visits each record's detail page, and a single write
//! persists what survived. Per-item failures never abort the run; a
//! page-level failure ends collection but keeps what was gathered.

use crate::challenge::{ChallengeOutcome, ChallengeResolver};
use crate::enricher::DetailEnricher;
use crate::error::{Result, ScrapeError};
use crate::extractor::RecordExtractor;
use crate::pagination::{PageCursor, PaginationDriver};
use crate::session::{align_descriptions, ScrapeSession};
use crate::sink::CsvSink;
use chrono::Local;
use jobscout_browser::{human_pause, PageHandle};
use jobscout_core::{AppConfig, JobRecord, PacingConfig, SearchQuery};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Navigation attempts per results page.
const MAX_PAGE_LOAD_ATTEMPTS: u32 = 3;

/// Base delay in milliseconds between navigation attempts.
const RETRY_DELAY_MS: u64 = 2000;

/// Records shown in the closing summary.
const PREVIEW_ROWS: usize = 5;

/// Phase of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    /// Nothing started yet
    Idle,
    /// Navigating to a results page
    PageLoading,
    /// Looking for challenges and consent banners
    ChallengeCheck,
    /// Reading job elements on the current page
    Extracting,
    /// Fetching detail-page descriptions
    Enriching,
    /// Writing the output file
    Persisting,
    /// Run finished
    Done,
}

impl fmt::Display for ScrapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PageLoading => "page-loading",
            Self::ChallengeCheck => "challenge-check",
            Self::Extracting => "extracting",
            Self::Enriching => "enriching",
            Self::Persisting => "persisting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why the collection phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The target count was reached
    TargetReached,
    /// A results page held no job elements
    Exhausted,
    /// No next page could be determined
    NoNextPage,
    /// A results page held job elements but none could be read
    NoRecords,
    /// A results page could not be loaded or queried
    PageFailed(String),
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// Identifier attached to every log line of the run
    pub run_id: Uuid,
    /// Records that survived enrichment, in encounter order
    pub records: Vec<JobRecord>,
    /// Output file, if anything was written
    pub output: Option<PathBuf>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Results pages loaded successfully
    pub pages_visited: usize,
    /// Records removed for lacking a detail link
    pub dropped: usize,
    /// Why collection stopped
    pub stop_reason: StopReason,
    /// Every state the run passed through, in order
    pub states: Vec<ScrapeState>,
}

/// Records state transitions and logs them.
#[derive(Debug)]
struct StateTracker {
    current: ScrapeState,
    history: Vec<ScrapeState>,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            current: ScrapeState::Idle,
            history: vec![ScrapeState::Idle],
        }
    }

    fn enter(&mut self, next: ScrapeState) {
        if self.current != next {
            tracing::debug!("State {} -> {}", self.current, next);
            self.current = next;
            self.history.push(next);
        }
    }
}

/// Drives a complete scrape run over one page handle.
pub struct ScrapeOrchestrator<P: PageHandle> {
    query: SearchQuery,
    search_url: String,
    target_count: usize,
    enrich_descriptions: bool,
    job_selectors: Vec<String>,
    pacing: PacingConfig,
    resolver: Arc<ChallengeResolver<P>>,
    extractor: RecordExtractor,
    paginator: PaginationDriver,
    enricher: DetailEnricher<P>,
    sink: CsvSink,
}

impl<P: PageHandle> ScrapeOrchestrator<P> {
    /// Build an orchestrator from configuration.
    pub fn new(config: &AppConfig, resolver: ChallengeResolver<P>) -> Result<Self> {
        let query = SearchQuery::new(&config.search.position, &config.search.location)?;
        let search_url = query.search_url(&config.site.origin, &config.site.search_path)?;
        let resolver = Arc::new(resolver);

        Ok(Self {
            query,
            search_url,
            target_count: config.search.target_count,
            enrich_descriptions: config.search.enrich_descriptions,
            job_selectors: config.site.job_selectors.clone(),
            pacing: config.pacing.clone(),
            extractor: RecordExtractor::new(&config.site.origin),
            paginator: PaginationDriver::new(&config.site),
            enricher: DetailEnricher::new(
                Arc::clone(&resolver),
                &config.site.description_selector,
                config.pacing.detail_load,
            ),
            resolver,
            sink: CsvSink::new(&config.output.directory),
        })
    }

    /// Position and location this orchestrator searches for.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// First results page URL.
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Run collection, enrichment and persistence to completion.
    ///
    /// Never fails: a failed write leaves `output` unset and the collected
    /// records stay in the report.
    pub async fn run(&self, page: &P) -> ScrapeReport {
        let session = ScrapeSession::new(self.query.clone(), self.target_count);
        let span = tracing::info_span!(
            "scrape",
            run_id = %session.run_id,
            position = %self.query.position,
            location = %self.query.location,
        );
        self.execute(page, session).instrument(span).await
    }

    async fn execute(&self, page: &P, mut session: ScrapeSession) -> ScrapeReport {
        let mut tracker = StateTracker::new();
        tracing::info!(
            target_count = self.target_count,
            started_at = %session.started_at.format("%Y-%m-%d %H:%M:%S"),
            "Starting job scrape for '{}' in '{}'",
            self.query.position,
            self.query.location
        );

        let (stop_reason, pages_visited) = self.collect(page, &mut session, &mut tracker).await;
        tracing::info!(
            collected = session.collected(),
            "Collection finished: {:?}",
            stop_reason
        );

        let dropped = if session.collected() > 0 {
            self.enrich(page, &mut session, &mut tracker).await
        } else {
            0
        };

        tracker.enter(ScrapeState::Persisting);
        let output = self.persist(&session);
        tracker.enter(ScrapeState::Done);

        let elapsed = session.elapsed();
        let run_id = session.run_id;
        let records = session.into_records();
        log_summary(&records, elapsed, output.as_ref());

        ScrapeReport {
            run_id,
            records,
            output,
            elapsed,
            pages_visited,
            dropped,
            stop_reason,
            states: tracker.history,
        }
    }

    async fn collect(
        &self,
        page: &P,
        session: &mut ScrapeSession,
        tracker: &mut StateTracker,
    ) -> (StopReason, usize) {
        let page_size = self.paginator.page_size();
        let first = self
            .paginator
            .page_url(&self.search_url, 0)
            .unwrap_or_else(|| self.search_url.clone());
        let mut cursor = PageCursor::new(first);
        let mut pages_visited = 0;

        while !session.is_target_reached() {
            tracker.enter(ScrapeState::PageLoading);
            tracing::info!(
                offset = cursor.offset(),
                "Processing page {}: {}",
                cursor.page_number(page_size),
                cursor.url()
            );
            if let Err(e) = self.load_with_retry(page, cursor.url()).await {
                tracing::error!("Stopping collection: {}", e);
                return (StopReason::PageFailed(e.to_string()), pages_visited);
            }
            pages_visited += 1;
            human_pause(self.pacing.page_load).await;

            tracker.enter(ScrapeState::ChallengeCheck);
            if self.resolver.prepare(page).await == ChallengeOutcome::Unresolved {
                tracing::warn!("Challenge unresolved, extracting whatever the page shows");
            }

            tracker.enter(ScrapeState::Extracting);
            let elements = match self.find_job_elements(page).await {
                Ok(elements) => elements,
                Err(e) => {
                    tracing::error!("Stopping collection: {}", e);
                    return (StopReason::PageFailed(e.to_string()), pages_visited);
                }
            };
            if elements.is_empty() {
                tracing::info!("No job elements found, results exhausted");
                return (StopReason::Exhausted, pages_visited);
            }
            tracing::info!("Found {} job elements on page", elements.len());

            if self.collect_page(&elements, session).await == 0 {
                tracing::warn!("No records extracted from {} job elements", elements.len());
                return (StopReason::NoRecords, pages_visited);
            }
            if session.is_target_reached() {
                break;
            }

            human_pause(self.pacing.between_pages).await;
            match self.paginator.next_page(page, cursor.offset()).await {
                Some(next) => cursor.advance(next, page_size),
                None => {
                    tracing::info!("No next page found");
                    return (StopReason::NoNextPage, pages_visited);
                }
            }
        }

        tracing::info!("Reached target of {} jobs", self.target_count);
        (StopReason::TargetReached, pages_visited)
    }

    /// Navigate with linear backoff between attempts.
    async fn load_with_retry(&self, page: &P, url: &str) -> Result<()> {
        let mut attempt = 1;
        loop {
            match page.goto(url).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= MAX_PAGE_LOAD_ATTEMPTS => {
                    return Err(ScrapeError::PageLoad {
                        url: url.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tracing::warn!(
                        "Page load failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt,
                        MAX_PAGE_LOAD_ATTEMPTS,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Job elements under the first selector that matches anything.
    async fn find_job_elements(&self, page: &P) -> Result<Vec<P::Element>> {
        for selector in &self.job_selectors {
            let elements = page.query_all(selector).await?;
            if !elements.is_empty() {
                return Ok(elements);
            }
            tracing::debug!("No job elements for selector {}", selector);
        }
        Ok(Vec::new())
    }

    /// Extract records in page order until the target is reached.
    ///
    /// Returns the number of records added.
    async fn collect_page(&self, elements: &[P::Element], session: &mut ScrapeSession) -> usize {
        let mut added = 0;
        for element in elements {
            let Some(record) = self.extractor.extract(element).await else {
                continue;
            };
            tracing::info!("Job number {} added - {}", session.collected() + 1, record.title);
            session.push(record);
            added += 1;

            if session.is_target_reached() {
                break;
            }
            human_pause(self.pacing.per_record).await;
        }
        added
    }

    /// Drop unlinked records and attach detail descriptions to the rest.
    ///
    /// Returns the number of records dropped.
    async fn enrich(
        &self,
        page: &P,
        session: &mut ScrapeSession,
        tracker: &mut StateTracker,
    ) -> usize {
        let unlinked: HashSet<usize> = session
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.has_detail_url())
            .map(|(index, _)| index)
            .collect();
        for index in &unlinked {
            tracing::warn!("Job {} has no detail link, dropping it", index + 1);
        }

        if !self.enrich_descriptions {
            tracing::info!("Description enrichment disabled");
            return session.remove_indices(&unlinked);
        }

        tracker.enter(ScrapeState::Enriching);
        let total = session.collected();
        let mut descriptions = Vec::with_capacity(total);
        for (index, record) in session.records().iter().enumerate() {
            if unlinked.contains(&index) {
                continue;
            }
            tracing::info!("Getting job description {}/{}", index + 1, total);
            descriptions.push(self.enricher.enrich(page, &record.detail_url).await);
            human_pause(self.pacing.between_details).await;
        }

        let dropped = session.remove_indices(&unlinked);
        let descriptions = align_descriptions(descriptions, session.collected());
        session.assign_descriptions(descriptions);
        dropped
    }

    fn persist(&self, session: &ScrapeSession) -> Option<PathBuf> {
        if session.records().is_empty() {
            tracing::warn!("No jobs found, nothing to save");
            return None;
        }
        match self
            .sink
            .write(&session.query, &Local::now(), session.records())
        {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(
                    directory = %self.sink.directory().display(),
                    "Failed to save {} jobs: {}",
                    session.collected(),
                    e
                );
                None
            }
        }
    }
}

fn log_summary(records: &[JobRecord], elapsed: Duration, output: Option<&PathBuf>) {
    tracing::info!(
        "Scraping completed: {} jobs in {:.1}s",
        records.len(),
        elapsed.as_secs_f64()
    );
    if let Some(path) = output {
        tracing::info!("Results saved to {}", path.display());
    }
    for record in records.iter().take(PREVIEW_ROWS) {
        tracing::info!(
            "{} | {} | {} | {} | {}",
            record.title,
            record.company,
            record.location,
            record.posted_date,
            record.salary
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_constants() {
        assert!(MAX_PAGE_LOAD_ATTEMPTS >= 1);
        assert!(RETRY_DELAY_MS >= 1000);
    }

    #[test]
    fn test_state_tracker_records_transitions_once() {
        let mut tracker = StateTracker::new();
        tracker.enter(ScrapeState::PageLoading);
        tracker.enter(ScrapeState::PageLoading);
        tracker.enter(ScrapeState::ChallengeCheck);
        assert_eq!(
            tracker.history,
            vec![
                ScrapeState::Idle,
                ScrapeState::PageLoading,
                ScrapeState::ChallengeCheck
            ]
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ScrapeState::ChallengeCheck.to_string(), "challenge-check");
        assert_eq!(ScrapeState::Done.to_string(), "done");
    }
}
