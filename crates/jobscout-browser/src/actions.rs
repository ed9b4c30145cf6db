use crate::error::{BrowserError, Result};

/// A rendered page the scraper can drive.
///
/// Implemented by the chromiumoxide engine and by [`crate::StaticPage`].
/// Every call is a suspension point; implementations are used from a
/// single task at a time.
#[async_trait::async_trait]
pub trait PageHandle: Send + Sync + 'static {
    /// Element type returned by queries on this page
    type Element: ElementHandle;

    /// Navigate to a URL and wait for the page to settle
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL of the currently loaded document
    async fn url(&self) -> Result<String>;

    /// Full markup snapshot of the current document
    async fn content(&self) -> Result<String>;

    /// First element matching a CSS selector
    async fn query(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// All elements matching a CSS selector, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>>;
}

/// One element of a rendered page.
#[async_trait::async_trait]
pub trait ElementHandle: Send + Sync + Sized {
    /// Markup inside the element
    async fn inner_html(&self) -> Result<String>;

    /// Text content of the element
    async fn inner_text(&self) -> Result<String>;

    /// First descendant matching a CSS selector
    async fn query_child(&self, selector: &str) -> Result<Option<Self>>;

    /// Value of an attribute, if present
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Click the element
    async fn click(&self) -> Result<()>;
}

/// Turn an `href` into an absolute URL.
///
/// Absolute links are returned unchanged; anything else is joined onto
/// `origin`.
pub fn resolve_link(origin: &str, href: &str) -> Result<String> {
    let href = href.trim();
    if href.is_empty() {
        return Err(BrowserError::NavigationError("empty link".to_string()));
    }

    if url::Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }

    let base = url::Url::parse(origin)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid origin {origin}: {e}")))?;
    base.join(href)
        .map(String::from)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid link {href}: {e}")))
}
