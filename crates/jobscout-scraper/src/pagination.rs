use jobscout_browser::{resolve_link, ElementHandle, PageHandle};
use jobscout_core::SiteConfig;
use url::Url;

/// Position within a paginated result set.
///
/// The offset only ever grows, one page size at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    offset: usize,
    url: String,
}

impl PageCursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            offset: 0,
            url: url.into(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One-based page number.
    pub fn page_number(&self, page_size: usize) -> usize {
        self.offset / page_size.max(1) + 1
    }

    /// Move to the next page.
    pub fn advance(&mut self, next_url: String, page_size: usize) {
        self.offset += page_size;
        self.url = next_url;
    }
}

/// Finds the URL of the next results page.
#[derive(Debug, Clone)]
pub struct PaginationDriver {
    origin: String,
    offset_param: String,
    page_size: usize,
    next_selector: String,
}

impl PaginationDriver {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            origin: site.origin.clone(),
            offset_param: site.offset_param.clone(),
            page_size: site.page_size,
            next_selector: site.next_page_selector.clone(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rewrite `base` so its offset parameter equals `offset`.
    ///
    /// Any existing offset parameter is dropped; offset zero leaves it out.
    pub fn page_url(&self, base: &str, offset: usize) -> Option<String> {
        let mut url = Url::parse(base).ok()?;
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != self.offset_param.as_str())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in &kept {
                query.append_pair(name, value);
            }
            if offset > 0 {
                query.append_pair(&self.offset_param, &offset.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Some(url.into())
    }

    /// URL of the page after the one at `current_offset`.
    ///
    /// The site's own "next" control wins; otherwise the offset parameter
    /// of the current URL is advanced by one page.
    pub async fn next_page<P: PageHandle>(&self, page: &P, current_offset: usize) -> Option<String> {
        if let Some(next) = self.explicit_next(page).await {
            tracing::debug!("Following next-page control to {}", next);
            return Some(next);
        }

        let current = page.url().await.ok()?;
        self.page_url(&current, current_offset + self.page_size)
    }

    async fn explicit_next<P: PageHandle>(&self, page: &P) -> Option<String> {
        let control = page.query(&self.next_selector).await.ok()??;
        let href = control.attribute("href").await.ok()??;
        resolve_link(&self.origin, &href).ok()
    }
}
