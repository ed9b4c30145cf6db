use super::{contains_any, ChallengeResolver};
use jobscout_browser::{ElementHandle, PageHandle};
use std::time::Duration;

/// One way of locating a cookie-consent accept control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentControl {
    /// First element matching a CSS selector
    Css(&'static str),
    /// First element matching `selector` whose text contains `label`
    Text {
        /// Candidate elements
        selector: &'static str,
        /// Lowercase text the element must contain
        label: &'static str,
    },
}

/// Accept controls, tried in order until one is clicked.
pub const CONSENT_CONTROLS: &[ConsentControl] = &[
    ConsentControl::Css("button#onetrust-accept-btn-handler"),
    ConsentControl::Css("#onetrust-accept-btn-handler"),
    ConsentControl::Text {
        selector: "button, a, [role=\"button\"]",
        label: "accept all",
    },
    ConsentControl::Css("button[id*=\"accept-all\"]"),
    ConsentControl::Css("button[class*=\"accept-all\"]"),
];

impl ConsentControl {
    async fn locate<P: PageHandle>(&self, page: &P) -> Option<P::Element> {
        match self {
            Self::Css(selector) => page.query(selector).await.ok().flatten(),
            Self::Text { selector, label } => {
                let candidates = page.query_all(selector).await.ok()?;
                for candidate in candidates {
                    let Ok(text) = candidate.inner_text().await else {
                        continue;
                    };
                    if text.to_lowercase().contains(label) {
                        return Some(candidate);
                    }
                }
                None
            }
        }
    }
}

impl<P: PageHandle> ChallengeResolver<P> {
    /// Click through a cookie-consent banner if one is showing.
    ///
    /// Returns whether a control was clicked. Never fails.
    pub async fn dismiss_consent(&self, page: &P) -> bool {
        let Ok(content) = page.content().await else {
            return false;
        };
        if !contains_any(&content, &self.config.consent_indicators) {
            return false;
        }

        tracing::debug!("Cookie consent banner detected");
        for control in CONSENT_CONTROLS {
            let Some(element) = control.locate(page).await else {
                continue;
            };
            match element.click().await {
                Ok(()) => {
                    tracing::info!("Accepted cookie consent via {:?}", control);
                    tokio::time::sleep(Duration::from_millis(self.config.consent_settle_ms)).await;
                    return true;
                }
                Err(e) => tracing::debug!("Consent control {:?} not clickable: {}", control, e),
            }
        }

        tracing::warn!("Cookie consent banner found but no accept control matched");
        false
    }
}
