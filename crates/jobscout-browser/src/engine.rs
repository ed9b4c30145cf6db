use crate::actions::{ElementHandle, PageHandle};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use jobscout_core::BrowserConfig;
use std::time::Duration;
use tokio::task::JoinHandle;

fn cdp_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::ChromiumError(e.to_string())
}

/// Browser automation engine
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    navigation_timeout: Duration,
    network_settle: Duration,
}

impl BrowserEngine {
    /// Launch Chromium with a randomized fingerprint
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = FingerprintConfig::randomized()
            .with_viewport(config.window_width, config.window_height);
        let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);

        let mut builder = CdpConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .request_timeout(navigation_timeout)
            .arg(format!("--user-agent={}", fingerprint.user_agent))
            .arg("--disable-blink-features=AutomationControlled");
        if !config.headless {
            builder = builder.with_head();
        }
        let cdp_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(cdp_error)?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        tracing::info!(
            headless = config.headless,
            width = fingerprint.viewport_width,
            height = fingerprint.viewport_height,
            "Browser launched"
        );

        Ok(Self {
            browser,
            handler,
            fingerprint,
            navigation_timeout,
            network_settle: Duration::from_millis(config.network_settle_ms),
        })
    }

    /// Open a blank tab carrying the engine's fingerprint
    pub async fn new_page(&self) -> Result<BrowserPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(cdp_error)?;
        page.set_user_agent(SetUserAgentOverrideParams::new(
            self.fingerprint.user_agent.clone(),
        ))
        .await
        .map_err(cdp_error)?;

        Ok(BrowserPage {
            page,
            navigation_timeout: self.navigation_timeout,
            network_settle: self.network_settle,
        })
    }

    /// Close the browser and stop the event handler
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await.map(|_| ()).map_err(cdp_error);
        self.handler.abort();
        closed
    }
}

/// A tab driven through the Chrome DevTools protocol
pub struct BrowserPage {
    page: Page,
    navigation_timeout: Duration,
    network_settle: Duration,
}

#[async_trait::async_trait]
impl PageHandle for BrowserPage {
    type Element = BrowserElement;

    async fn goto(&self, url: &str) -> Result<()> {
        let navigation = async {
            self.page.goto(url).await.map_err(|e| {
                BrowserError::NavigationError(format!("{url}: {e}"))
            })?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
            Ok::<_, BrowserError>(())
        };

        tokio::time::timeout(self.navigation_timeout, navigation)
            .await
            .map_err(|_| BrowserError::Timeout(format!("navigation to {url}")))??;

        // CDP has no network-idle signal; a quiet period stands in for it
        tokio::time::sleep(self.network_settle).await;
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(cdp_error)?
            .ok_or_else(|| BrowserError::NavigationError("page has no URL".to_string()))
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.map_err(cdp_error)
    }

    async fn query(&self, selector: &str) -> Result<Option<BrowserElement>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<BrowserElement>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::InvalidSelector {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(elements.into_iter().map(BrowserElement).collect())
    }
}

/// An element handle backed by a remote DOM node
pub struct BrowserElement(Element);

#[async_trait::async_trait]
impl ElementHandle for BrowserElement {
    async fn inner_html(&self) -> Result<String> {
        self.0
            .inner_html()
            .await
            .map_err(|e| BrowserError::StaleElement(e.to_string()))?
            .ok_or_else(|| BrowserError::StaleElement("no inner HTML".to_string()))
    }

    async fn inner_text(&self) -> Result<String> {
        Ok(self
            .0
            .inner_text()
            .await
            .map_err(|e| BrowserError::StaleElement(e.to_string()))?
            .unwrap_or_default())
    }

    async fn query_child(&self, selector: &str) -> Result<Option<BrowserElement>> {
        let children = self
            .0
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::InvalidSelector {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(children.into_iter().next().map(BrowserElement))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.0
            .attribute(name)
            .await
            .map_err(|e| BrowserError::StaleElement(e.to_string()))
    }

    async fn click(&self) -> Result<()> {
        self.0.click().await.map_err(cdp_error)?;
        Ok(())
    }
}
