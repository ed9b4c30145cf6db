//! In-memory page that serves canned markup.
//!
//! `StaticPage` implements the same capabilities as the Chromium engine,
//! answering navigation from a URL → markup table and queries with the
//! `scraper` crate. The scraper's tests drive whole runs against it.

use crate::actions::{ElementHandle, PageHandle};
use crate::error::{BrowserError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| BrowserError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Loaded {
    url: String,
    html: String,
}

/// A page whose documents are registered up front.
#[derive(Debug, Default)]
pub struct StaticPage {
    routes: Mutex<HashMap<String, String>>,
    current: Mutex<Option<Loaded>>,
    visits: Mutex<Vec<String>>,
    clicks: Arc<Mutex<Vec<String>>>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the markup served for `url`.
    #[must_use]
    pub fn with_route(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.set_route(url, html);
        self
    }

    pub fn set_route(&self, url: impl Into<String>, html: impl Into<String>) {
        lock(&self.routes).insert(url.into(), html.into());
    }

    /// Show `html` as if the browser were already on `url`.
    pub fn load(&self, url: impl Into<String>, html: impl Into<String>) {
        *lock(&self.current) = Some(Loaded {
            url: url.into(),
            html: html.into(),
        });
    }

    /// Replace the markup of the loaded document in place.
    pub fn set_content(&self, html: impl Into<String>) {
        let mut current = lock(&self.current);
        match current.as_mut() {
            Some(loaded) => loaded.html = html.into(),
            None => {
                *current = Some(Loaded {
                    url: "about:blank".to_string(),
                    html: html.into(),
                });
            }
        }
    }

    /// URLs navigated to, in order.
    pub fn visits(&self) -> Vec<String> {
        lock(&self.visits).clone()
    }

    /// Outer markup of every clicked element, in order.
    pub fn clicks(&self) -> Vec<String> {
        lock(&self.clicks).clone()
    }

    fn snapshot(&self) -> Result<Loaded> {
        lock(&self.current)
            .as_ref()
            .map(|loaded| Loaded {
                url: loaded.url.clone(),
                html: loaded.html.clone(),
            })
            .ok_or_else(|| BrowserError::NavigationError("no document loaded".to_string()))
    }

    fn select(&self, selector: &str) -> Result<Vec<StaticElement>> {
        let selector = parse_selector(selector)?;
        let html = self.snapshot()?.html;
        let document = Html::parse_document(&html);
        Ok(document
            .select(&selector)
            .map(|el| StaticElement::capture(el, &self.clicks))
            .collect())
    }
}

#[async_trait::async_trait]
impl PageHandle for StaticPage {
    type Element = StaticElement;

    async fn goto(&self, url: &str) -> Result<()> {
        let html = lock(&self.routes)
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::NavigationError(format!("no route for {url}")))?;
        lock(&self.visits).push(url.to_string());
        self.load(url, html);
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.snapshot()?.url)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.snapshot()?.html)
    }

    async fn query(&self, selector: &str) -> Result<Option<StaticElement>> {
        Ok(self.select(selector)?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<StaticElement>> {
        self.select(selector)
    }
}

/// A detached copy of one element of a [`StaticPage`] document.
#[derive(Debug, Clone)]
pub struct StaticElement {
    outer_html: String,
    inner_html: String,
    text: String,
    attributes: HashMap<String, String>,
    clicks: Arc<Mutex<Vec<String>>>,
}

impl StaticElement {
    fn capture(element: ElementRef<'_>, clicks: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            outer_html: element.html(),
            inner_html: element.inner_html(),
            text: element.text().collect(),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            clicks: Arc::clone(clicks),
        }
    }

    fn select_child(&self, selector: &str) -> Result<Option<StaticElement>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.inner_html);
        let child = fragment
            .select(&selector)
            .next()
            .map(|el| StaticElement::capture(el, &self.clicks));
        Ok(child)
    }
}

#[async_trait::async_trait]
impl ElementHandle for StaticElement {
    async fn inner_html(&self) -> Result<String> {
        Ok(self.inner_html.clone())
    }

    async fn inner_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    async fn query_child(&self, selector: &str) -> Result<Option<StaticElement>> {
        self.select_child(selector)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn click(&self) -> Result<()> {
        lock(&self.clicks).push(self.outer_html.clone());
        Ok(())
    }
}
