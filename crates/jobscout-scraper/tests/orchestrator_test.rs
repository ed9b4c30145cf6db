//! End-to-end runs of the orchestrator over canned result pages.

use async_trait::async_trait;
use jobscout_browser::{BrowserError, ElementHandle, PageHandle, StaticPage};
use jobscout_core::{AppConfig, PacingConfig, SENTINEL};
use jobscout_scraper::{
    ChallengeResolver, DeclineOperator, ScrapeOrchestrator, ScrapeState, StopReason,
};
use tempfile::TempDir;

const PAGE_1: &str = "https://www.indeed.com/jobs?q=python+analyst&l=remote";
const PAGE_2: &str = "https://www.indeed.com/jobs?q=python+analyst&l=remote&start=10";
const EMPTY_RESULTS: &str = "<html><body><p>No matching jobs found.</p></body></html>";

fn card(jk: u32, title: &str, salary: Option<&str>, rating: Option<&str>) -> String {
    let salary = salary
        .map(|s| format!(r#"<div class="salary-snippet-container">{s}</div>"#))
        .unwrap_or_default();
    let rating = rating
        .map(|r| format!(r#"<span class="ratingsDisplay">{r}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<div class="job_seen_beacon">
             <h2 class="jobTitle"><a href="/rc/clk?jk={jk}">{title}</a></h2>
             <div class="companyInfo">
               <span data-testid="company-name">Company {jk}</span>{rating}
             </div>
             <div data-testid="text-location">Remote</div>
             {salary}
             <span data-testid="myJobsStateDate">Posted {jk} days ago</span>
             <div class="job-snippet">Snippet {jk}</div>
           </div>"#
    )
}

fn results_page(cards: &[String]) -> String {
    format!("<html><body><div id=\"mosaic\">{}</div></body></html>", cards.concat())
}

fn detail_url(jk: u32) -> String {
    format!("https://www.indeed.com/rc/clk?jk={jk}")
}

fn detail_page(jk: u32) -> String {
    format!(r#"<html><body><div id="jobDescriptionText"> Full description {jk} </div></body></html>"#)
}

fn three_cards() -> Vec<String> {
    vec![
        card(1, "Data Analyst", Some("$80,000 a year"), Some("4.1")),
        card(2, "Python Analyst", Some("$45 an hour"), Some("3.8")),
        card(3, "Junior Analyst", None, None),
    ]
}

fn with_details(page: StaticPage, jks: &[u32]) -> StaticPage {
    for jk in jks {
        page.set_route(detail_url(*jk), detail_page(*jk));
    }
    page
}

fn config(output: &TempDir, target_count: usize, enrich: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.search.target_count = target_count;
    config.search.enrich_descriptions = enrich;
    config.pacing = PacingConfig::disabled();
    config.output.directory = output.path().to_path_buf();
    config
}

fn orchestrator(config: &AppConfig) -> ScrapeOrchestrator<StaticPage> {
    let resolver = ChallengeResolver::new(config.challenge.clone())
        .with_operator(Box::new(DeclineOperator));
    ScrapeOrchestrator::new(config, resolver).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_collection_halts_when_results_exhausted() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, true);
    let page = with_details(
        StaticPage::new()
            .with_route(PAGE_1, results_page(&three_cards()))
            .with_route(PAGE_2, EMPTY_RESULTS),
        &[1, 2, 3],
    );

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.dropped, 0);

    let partial = &report.records[2];
    assert_eq!(partial.title, "Junior Analyst");
    assert_eq!(partial.rating, SENTINEL);
    assert_eq!(partial.salary, SENTINEL);
    assert_eq!(partial.company, "Company 3");

    let full = &report.records[0];
    assert_eq!(full.rating, "4.1");
    assert_eq!(full.salary, "$80,000 a year");
    assert_eq!(full.posted_date, "1 days ago");
    assert_eq!(full.detail_url, detail_url(1));

    let descriptions: Vec<_> = report.records.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(
        descriptions,
        ["Full description 1", "Full description 2", "Full description 3"]
    );

    assert_eq!(
        page.visits(),
        vec![
            PAGE_1.to_string(),
            PAGE_2.to_string(),
            detail_url(1),
            detail_url(2),
            detail_url(3),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_walks_states_in_order() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, true);
    let page = with_details(
        StaticPage::new()
            .with_route(PAGE_1, results_page(&three_cards()))
            .with_route(PAGE_2, EMPTY_RESULTS),
        &[1, 2, 3],
    );

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.states.first(), Some(&ScrapeState::Idle));
    assert_eq!(
        &report.states[report.states.len() - 3..],
        [
            ScrapeState::Enriching,
            ScrapeState::Persisting,
            ScrapeState::Done
        ]
    );
    assert!(report.states.contains(&ScrapeState::ChallengeCheck));
    assert!(report.states.contains(&ScrapeState::Extracting));
}

#[tokio::test(start_paused = true)]
async fn test_target_reached_mid_page() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 2, false);
    let page = StaticPage::new().with_route(PAGE_1, results_page(&three_cards()));

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].title, "Python Analyst");
    // enrichment disabled keeps the listing snippet
    assert_eq!(report.records[0].description, "Snippet 1");
    assert_eq!(page.visits(), vec![PAGE_1.to_string()]);
    assert!(!report.states.contains(&ScrapeState::Enriching));
}

#[tokio::test(start_paused = true)]
async fn test_target_spans_pages() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 4, false);
    let page = StaticPage::new()
        .with_route(PAGE_1, results_page(&three_cards()))
        .with_route(
            PAGE_2,
            results_page(&[
                card(4, "Senior Analyst", None, Some("4.5")),
                card(5, "Lead Analyst", None, None),
            ]),
        );

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(report.pages_visited, 2);
    let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Data Analyst", "Python Analyst", "Junior Analyst", "Senior Analyst"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unlinked_record_is_dropped() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, true);
    let unlinked = r#"<div class="job_seen_beacon">
            <h2 class="jobTitle">Unlinked Analyst</h2>
            <span data-testid="company-name">Nobody</span>
        </div>"#
        .to_string();
    let cards = vec![
        card(1, "Data Analyst", Some("$80,000 a year"), Some("4.1")),
        unlinked,
        card(3, "Junior Analyst", None, None),
    ];
    let page = with_details(
        StaticPage::new()
            .with_route(PAGE_1, results_page(&cards))
            .with_route(PAGE_2, EMPTY_RESULTS),
        &[1, 3],
    );

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.dropped, 1);
    assert_eq!(report.records.len(), 2);
    assert!(report.records.iter().all(|r| r.has_detail_url()));
    assert_eq!(report.records[0].description, "Full description 1");
    assert_eq!(report.records[1].title, "Junior Analyst");
    assert_eq!(report.records[1].description, "Full description 3");
}

#[tokio::test(start_paused = true)]
async fn test_failed_detail_page_leaves_empty_description() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, true);
    let page = with_details(
        StaticPage::new()
            .with_route(PAGE_1, results_page(&three_cards()))
            .with_route(PAGE_2, EMPTY_RESULTS),
        &[1, 3],
    );

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[1].description, "");
    assert_eq!(report.records[2].description, "Full description 3");
}

#[tokio::test(start_paused = true)]
async fn test_page_load_failure_keeps_collected_records() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 10, false);
    let page = StaticPage::new().with_route(PAGE_1, results_page(&three_cards()));

    let report = orchestrator(&config).run(&page).await;

    assert!(matches!(report.stop_reason, StopReason::PageFailed(_)));
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.records.len(), 3);
    assert!(report.output.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_alternative_job_selector() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 1, false);
    let markup = results_page(&[card(7, "Card Analyst", None, None)])
        .replace("class=\"job_seen_beacon\"", "data-testid=\"job-card\"");
    let page = StaticPage::new().with_route(PAGE_1, markup);

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Card Analyst");
}

#[tokio::test(start_paused = true)]
async fn test_explicit_next_link_is_followed() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 10, false);
    let next = "https://www.indeed.com/jobs?q=python+analyst&l=remote&start=10&vjk=abc";
    let first = results_page(&three_cards()).replace(
        "</body>",
        r#"<nav><a data-testid="pagination-page-next" href="/jobs?q=python+analyst&amp;l=remote&amp;start=10&amp;vjk=abc">Next</a></nav></body>"#,
    );
    let page = StaticPage::new()
        .with_route(PAGE_1, first)
        .with_route(next, EMPTY_RESULTS);

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(page.visits(), vec![PAGE_1.to_string(), next.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_no_results_writes_nothing() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, true);
    let page = StaticPage::new().with_route(PAGE_1, EMPTY_RESULTS);

    let report = orchestrator(&config).run(&page).await;

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert!(report.records.is_empty());
    assert!(report.output.is_none());
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_results_written_to_csv() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, true);
    let page = with_details(
        StaticPage::new()
            .with_route(PAGE_1, results_page(&three_cards()))
            .with_route(PAGE_2, EMPTY_RESULTS),
        &[1, 2, 3],
    );

    let report = orchestrator(&config).run(&page).await;

    let path = report.output.unwrap();
    assert_eq!(path.parent().unwrap(), output.path());
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.ends_with("_python analyst_remote.csv"));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(
        headers,
        ["Title", "Company", "Location", "Rating", "Date", "Salary", "Description", "Links"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[2][0], "Junior Analyst");
    assert_eq!(&rows[2][3], SENTINEL);
    assert_eq!(&rows[2][5], SENTINEL);
    assert_eq!(&rows[2][7], detail_url(3).as_str());
}

#[tokio::test(start_paused = true)]
async fn test_position_with_slash_still_saves() {
    let output = TempDir::new().unwrap();
    let mut config = config(&output, 1, false);
    config.search.position = "c/c++ developer".to_string();
    let orchestrator = orchestrator(&config);
    let page = StaticPage::new().with_route(
        orchestrator.search_url(),
        results_page(&[card(1, "C++ Developer", None, None)]),
    );

    let report = orchestrator.run(&page).await;

    assert_eq!(report.records.len(), 1);
    let path = report.output.unwrap();
    assert_eq!(path.parent().unwrap(), output.path());
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.ends_with("_c-c++ developer_remote.csv"));
    assert!(path.is_file());
}

#[tokio::test(start_paused = true)]
async fn test_write_failure_keeps_records() {
    let output = TempDir::new().unwrap();
    let blocked = output.path().join("blocked");
    std::fs::write(&blocked, "not a directory").unwrap();
    let mut config = config(&output, 2, false);
    config.output.directory = blocked;
    let page = StaticPage::new().with_route(PAGE_1, results_page(&three_cards()));

    let report = orchestrator(&config).run(&page).await;

    assert!(report.output.is_none());
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.states.last(), Some(&ScrapeState::Done));
}

/// Page whose job elements can never be read.
struct UnreadablePage(StaticPage);

struct UnreadableElement;

fn detached() -> BrowserError {
    BrowserError::StaleElement("node detached".to_string())
}

#[async_trait]
impl ElementHandle for UnreadableElement {
    async fn inner_html(&self) -> jobscout_browser::Result<String> {
        Err(detached())
    }

    async fn inner_text(&self) -> jobscout_browser::Result<String> {
        Err(detached())
    }

    async fn query_child(&self, _selector: &str) -> jobscout_browser::Result<Option<Self>> {
        Err(detached())
    }

    async fn attribute(&self, _name: &str) -> jobscout_browser::Result<Option<String>> {
        Err(detached())
    }

    async fn click(&self) -> jobscout_browser::Result<()> {
        Err(detached())
    }
}

#[async_trait]
impl PageHandle for UnreadablePage {
    type Element = UnreadableElement;

    async fn goto(&self, url: &str) -> jobscout_browser::Result<()> {
        self.0.goto(url).await
    }

    async fn url(&self) -> jobscout_browser::Result<String> {
        self.0.url().await
    }

    async fn content(&self) -> jobscout_browser::Result<String> {
        self.0.content().await
    }

    async fn query(&self, selector: &str) -> jobscout_browser::Result<Option<UnreadableElement>> {
        Ok(self.0.query(selector).await?.map(|_| UnreadableElement))
    }

    async fn query_all(&self, selector: &str) -> jobscout_browser::Result<Vec<UnreadableElement>> {
        let found = self.0.query_all(selector).await?;
        Ok(found.iter().map(|_| UnreadableElement).collect())
    }
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_page_stops_collection() {
    let output = TempDir::new().unwrap();
    let config = config(&output, 5, false);
    let page = UnreadablePage(
        StaticPage::new()
            .with_route(PAGE_1, results_page(&three_cards()))
            .with_route(PAGE_2, results_page(&three_cards())),
    );
    let resolver = ChallengeResolver::new(config.challenge.clone())
        .with_operator(Box::new(DeclineOperator));
    let orchestrator = ScrapeOrchestrator::new(&config, resolver).unwrap();

    let report = orchestrator.run(&page).await;

    assert_eq!(report.stop_reason, StopReason::NoRecords);
    assert_eq!(report.pages_visited, 1);
    assert!(report.records.is_empty());
    assert!(report.output.is_none());
    assert_eq!(page.0.visits(), vec![PAGE_1.to_string()]);
}
