//! Challenge resolution ladder against canned pages.

use async_trait::async_trait;
use jobscout_browser::StaticPage;
use jobscout_core::ChallengeConfig;
use jobscout_scraper::{
    ChallengeKind, ChallengeOutcome, ChallengeResolver, ChallengeSolver, DeclineOperator,
    OperatorAck, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SEARCH_URL: &str = "https://www.indeed.com/jobs?q=python+analyst&l=remote";
const CHALLENGE_PAGE: &str = "<html><head><title>Just a moment...</title></head>\
    <body><p>Checking your browser before accessing the site.</p></body></html>";
const RESULTS_PAGE: &str = "<html><body><div class=\"job_seen_beacon\">Data Analyst job</div>\
    </body></html>";

/// Solver that claims success without touching the page.
struct ClaimsSuccess;

#[async_trait]
impl ChallengeSolver<StaticPage> for ClaimsSuccess {
    async fn attempt(&self, _page: &StaticPage, _kind: ChallengeKind) -> Result<()> {
        Ok(())
    }
}

/// Solver that really clears the challenge.
struct ClearsChallenge(&'static str);

#[async_trait]
impl ChallengeSolver<StaticPage> for ClearsChallenge {
    async fn attempt(&self, page: &StaticPage, _kind: ChallengeKind) -> Result<()> {
        page.set_content(self.0);
        Ok(())
    }
}

/// Operator that confirms immediately and counts prompts.
#[derive(Clone, Default)]
struct CountingOperator(Arc<AtomicUsize>);

impl CountingOperator {
    fn prompts(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperatorAck for CountingOperator {
    async fn acknowledge(&self, _prompt: &str) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn challenge_page() -> StaticPage {
    let page = StaticPage::new();
    page.load(SEARCH_URL, CHALLENGE_PAGE);
    page
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_solver_escalates_to_operator() {
    let page = challenge_page();
    let operator = CountingOperator::default();
    let resolver = ChallengeResolver::new(ChallengeConfig::default())
        .with_solver(Box::new(ClaimsSuccess))
        .with_operator(Box::new(operator.clone()));

    let started = tokio::time::Instant::now();
    let outcome = resolver.resolve(&page).await;

    assert_eq!(outcome, ChallengeOutcome::Resolved);
    assert_eq!(operator.prompts(), 1);
    // settle pause plus the full polling window
    assert!(started.elapsed() >= Duration::from_secs(35));
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_solver_skips_operator_and_accepts_consent() {
    let page = challenge_page();
    let operator = CountingOperator::default();
    let cleared = "<div class=\"job_seen_beacon\">Analyst job</div>\
        <div>We use cookies <button id=\"onetrust-accept-btn-handler\">OK</button></div>";
    let resolver = ChallengeResolver::new(ChallengeConfig::default())
        .with_solver(Box::new(ClearsChallenge(cleared)))
        .with_operator(Box::new(operator.clone()));

    assert_eq!(resolver.resolve(&page).await, ChallengeOutcome::Resolved);
    assert_eq!(operator.prompts(), 0);

    let clicks = page.clicks();
    assert_eq!(clicks.len(), 1);
    assert!(clicks[0].contains("onetrust-accept-btn-handler"));
}

#[tokio::test(start_paused = true)]
async fn test_polling_observes_challenge_clearing() {
    let page = Arc::new(challenge_page());
    let operator = CountingOperator::default();
    let resolver = ChallengeResolver::new(ChallengeConfig::default())
        .with_operator(Box::new(operator.clone()));

    let clearing = Arc::clone(&page);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        clearing.set_content(RESULTS_PAGE);
    });

    assert_eq!(resolver.resolve(page.as_ref()).await, ChallengeOutcome::Resolved);
    assert_eq!(operator.prompts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_non_interactive_run_is_unresolved() {
    let page = challenge_page();
    let resolver = ChallengeResolver::<StaticPage>::new(ChallengeConfig::default())
        .with_operator(Box::new(DeclineOperator));

    assert_eq!(resolver.resolve(&page).await, ChallengeOutcome::Unresolved);
}

#[tokio::test]
async fn test_clean_page_is_untouched() {
    let page = StaticPage::new();
    page.load(SEARCH_URL, RESULTS_PAGE);
    let operator = CountingOperator::default();
    let resolver = ChallengeResolver::new(ChallengeConfig::default())
        .with_solver(Box::new(ClaimsSuccess))
        .with_operator(Box::new(operator.clone()));

    assert_eq!(resolver.prepare(&page).await, ChallengeOutcome::Clean);
    assert_eq!(operator.prompts(), 0);
    assert!(page.clicks().is_empty());
}
