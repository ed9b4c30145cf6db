//! Bot-challenge detection and resolution.
//!
//! Resolution walks a fixed ladder: the automated solver, then polling
//! for the challenge to clear by itself, then the operator. Detection and
//! click errors are treated as "indicator not found", so `resolve` never
//! fails.

mod consent;
pub mod operator;
pub mod solver;

pub use consent::{ConsentControl, CONSENT_CONTROLS};
pub use operator::{AutoAcknowledge, ConsoleOperator, DeclineOperator, OperatorAck};
pub use solver::{ChallengeKind, ChallengeSolver, UnsupportedSolver};

use jobscout_browser::PageHandle;
use jobscout_core::ChallengeConfig;
use std::time::Duration;

const OPERATOR_PROMPT: &str = "Manual intervention required: complete the verification in the \
browser window, then confirm once the job search page has loaded.";

/// Result of checking a page for a bot challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// No challenge was present
    Clean,
    /// A challenge was present and has been cleared
    Resolved,
    /// A challenge was present and every strategy failed
    Unresolved,
}

/// Case-insensitive check for any of `needles` in `haystack`.
pub(crate) fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

/// Detects and clears bot challenges and consent banners.
pub struct ChallengeResolver<P: PageHandle> {
    config: ChallengeConfig,
    solver: Box<dyn ChallengeSolver<P>>,
    operator: Box<dyn OperatorAck>,
}

impl<P: PageHandle> ChallengeResolver<P> {
    /// Create a resolver with no automated solver that asks on the console.
    #[must_use]
    pub fn new(config: ChallengeConfig) -> Self {
        Self {
            config,
            solver: Box::new(UnsupportedSolver),
            operator: Box::new(ConsoleOperator),
        }
    }

    /// Install an automated solver.
    #[must_use]
    pub fn with_solver(mut self, solver: Box<dyn ChallengeSolver<P>>) -> Self {
        self.solver = solver;
        self
    }

    /// Install the operator consulted as a last resort.
    #[must_use]
    pub fn with_operator(mut self, operator: Box<dyn OperatorAck>) -> Self {
        self.operator = operator;
        self
    }

    /// Whether page text shows a challenge.
    #[must_use]
    pub fn is_challenge(&self, content: &str) -> bool {
        contains_any(content, &self.config.indicators)
    }

    /// Whether page text shows real site content.
    #[must_use]
    pub fn has_site_content(&self, content: &str) -> bool {
        contains_any(content, &self.config.success_indicators)
    }

    /// Clear any challenge, then any consent banner.
    pub async fn prepare(&self, page: &P) -> ChallengeOutcome {
        let outcome = self.resolve(page).await;
        self.dismiss_consent(page).await;
        outcome
    }

    /// Detect and clear a bot challenge on the current page.
    pub async fn resolve(&self, page: &P) -> ChallengeOutcome {
        let Some(content) = self.snapshot(page).await else {
            return ChallengeOutcome::Clean;
        };
        if !self.is_challenge(&content) {
            return ChallengeOutcome::Clean;
        }

        tracing::warn!("Bot challenge detected, attempting automatic resolution");

        if self.try_solver(page).await {
            return ChallengeOutcome::Resolved;
        }

        if self.poll_for_resolution(page).await {
            return ChallengeOutcome::Resolved;
        }

        self.escalate_to_operator().await
    }

    async fn snapshot(&self, page: &P) -> Option<String> {
        match page.content().await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::debug!("Could not read page content: {}", e);
                None
            }
        }
    }

    async fn try_solver(&self, page: &P) -> bool {
        if let Err(e) = self.solver.attempt(page, ChallengeKind::Interstitial).await {
            tracing::warn!("Automatic challenge solving failed: {}", e);
            return false;
        }

        tracing::info!("Challenge solver finished, waiting for the page to settle");
        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

        self.dismiss_consent(page).await;

        let confirmed = self
            .snapshot(page)
            .await
            .is_some_and(|content| self.has_site_content(&content));
        if confirmed {
            tracing::info!("Verification successful, site content loaded");
        } else {
            tracing::warn!("Solver result unconfirmed, falling back to polling");
        }
        confirmed
    }

    async fn poll_for_resolution(&self, page: &P) -> bool {
        let timeout = self.config.poll_timeout();
        let interval = self.config.poll_interval().max(Duration::from_millis(100));
        let mut waited = Duration::ZERO;

        tracing::info!("Waiting up to {:?} for the challenge to clear", timeout);
        while waited < timeout {
            tracing::debug!(
                "Waiting... ({}/{}s)",
                waited.as_secs(),
                timeout.as_secs()
            );
            tokio::time::sleep(interval).await;
            waited += interval;

            let Some(content) = self.snapshot(page).await else {
                continue;
            };
            if !self.is_challenge(&content) && self.has_site_content(&content) {
                tracing::info!("Challenge cleared after {:?}", waited);
                tokio::time::sleep(Duration::from_millis(self.config.post_resolve_settle_ms))
                    .await;
                return true;
            }
        }
        false
    }

    async fn escalate_to_operator(&self) -> ChallengeOutcome {
        if !self.config.manual_fallback {
            tracing::error!("Challenge unresolved and manual fallback is disabled");
            return ChallengeOutcome::Unresolved;
        }

        tracing::warn!("Manual intervention required");
        match self.operator.acknowledge(OPERATOR_PROMPT).await {
            Ok(()) => {
                tracing::info!("Operator confirmed, continuing");
                ChallengeOutcome::Resolved
            }
            Err(e) => {
                tracing::error!("Challenge unresolved: {}", e);
                ChallengeOutcome::Unresolved
            }
        }
    }
}
