//! Automated challenge solving.

use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use jobscout_browser::PageHandle;
use std::fmt;

/// Category of bot challenge handed to a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// Full-page "checking your browser" interstitial
    Interstitial,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeKind::Interstitial => write!(f, "interstitial"),
        }
    }
}

/// Challenge solver trait for pluggable implementations.
#[async_trait]
pub trait ChallengeSolver<P: PageHandle>: Send + Sync {
    /// Attempt to clear a challenge on the current page.
    ///
    /// `Ok(())` only claims the attempt finished; the resolver still
    /// verifies the page afterwards.
    async fn attempt(&self, page: &P, kind: ChallengeKind) -> Result<()>;
}

/// Solver used when no automated capability is installed.
///
/// Always fails, so resolution continues with polling and the operator.
pub struct UnsupportedSolver;

#[async_trait]
impl<P: PageHandle> ChallengeSolver<P> for UnsupportedSolver {
    async fn attempt(&self, _page: &P, kind: ChallengeKind) -> Result<()> {
        Err(ScrapeError::SolverFailed(format!(
            "no automated solver installed for {kind} challenges"
        )))
    }
}
