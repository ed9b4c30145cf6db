use crate::challenge::{ChallengeOutcome, ChallengeResolver};
use jobscout_browser::{human_pause, ElementHandle, PageHandle};
use jobscout_core::DelayBounds;
use std::sync::Arc;

/// Fetches the full posting text from a listing's detail page.
pub struct DetailEnricher<P: PageHandle> {
    resolver: Arc<ChallengeResolver<P>>,
    description_selector: String,
    detail_load: DelayBounds,
}

impl<P: PageHandle> DetailEnricher<P> {
    pub fn new(
        resolver: Arc<ChallengeResolver<P>>,
        description_selector: impl Into<String>,
        detail_load: DelayBounds,
    ) -> Self {
        Self {
            resolver,
            description_selector: description_selector.into(),
            detail_load,
        }
    }

    /// Full description text at `detail_url`, or `""` on any failure.
    pub async fn enrich(&self, page: &P, detail_url: &str) -> String {
        if let Err(e) = page.goto(detail_url).await {
            tracing::warn!(url = %detail_url, "Error loading job description: {}", e);
            return String::new();
        }
        human_pause(self.detail_load).await;

        if self.resolver.resolve(page).await == ChallengeOutcome::Unresolved {
            tracing::warn!(url = %detail_url, "Detail page still blocked by a challenge");
        }

        match page.query(&self.description_selector).await {
            Ok(Some(container)) => match container.inner_text().await {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::warn!(url = %detail_url, "Could not read description: {}", e);
                    String::new()
                }
            },
            Ok(None) => {
                tracing::debug!(url = %detail_url, "No description container found");
                String::new()
            }
            Err(e) => {
                tracing::warn!(url = %detail_url, "Description query failed: {}", e);
                String::new()
            }
        }
    }
}
