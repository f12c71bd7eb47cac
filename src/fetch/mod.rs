pub mod browser;
pub mod http;

use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

use crate::config::AppConfig;
use crate::error::FetchError;

/// How a page should be retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Single GET request; the server renders full content
    Static,
    /// Drive a headless browser session; content loads via client-side
    /// script or the site blocks plain HTTP clients
    Browser,
}

/// A single page retrieval, created per fetch call and discarded after
/// the fetch returns.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// URL to retrieve
    pub url: String,

    /// Retrieval mode
    pub mode: FetchMode,

    /// CSS selector for a best-effort interaction element (e.g. a consent
    /// banner) to click if present. Browser mode only; not finding it is
    /// not an error.
    pub dismiss: Option<String>,

    /// CSS selector for the target content element to wait for before
    /// reading the rendered page. Browser mode only; not finding it
    /// within the wait budget fails the fetch.
    pub wait_for: Option<String>,
}

impl PageRequest {
    /// Request a server-rendered page over plain HTTP
    pub fn static_page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: FetchMode::Static,
            dismiss: None,
            wait_for: None,
        }
    }

    /// Request a page through a headless browser session
    pub fn browser_page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: FetchMode::Browser,
            dismiss: None,
            wait_for: None,
        }
    }

    /// Attempt to click this element after navigation, skipping it if absent
    pub fn with_dismiss(mut self, selector: impl Into<String>) -> Self {
        self.dismiss = Some(selector.into());
        self
    }

    /// Wait for this element before reading the page source
    pub fn with_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }
}

/// Raw page content as retrieved. Consumed once by extraction; never
/// persisted.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// URL the content was retrieved from
    pub url: String,

    /// Full HTML content
    pub html: String,

    /// When the page was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl RawPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            retrieved_at: Utc::now(),
        }
    }

    /// Origin of the page (scheme + host), used to absolutize relative
    /// links recovered during extraction
    pub fn origin(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let origin = url.origin();
        origin.is_tuple().then(|| origin.ascii_serialization())
    }
}

/// Retrieves raw page content, either directly over HTTP or through a
/// driven WebDriver session.
pub struct Fetcher {
    http: reqwest::Client,
    webdriver_url: String,
    wait_timeout: Duration,
    banner_timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            webdriver_url: config.webdriver_url.clone(),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
            banner_timeout: Duration::from_secs(config.banner_timeout_secs),
        }
    }

    /// Retrieve the requested page.
    ///
    /// Fails with [`FetchError`] on network failure, a non-2xx status, or
    /// an element-wait timeout. Never retried here; the caller decides
    /// what a failed fetch means for its run.
    pub async fn fetch(&self, request: &PageRequest) -> Result<RawPage, FetchError> {
        match request.mode {
            FetchMode::Static => http::fetch(&self.http, &request.url).await,
            FetchMode::Browser => {
                browser::fetch(
                    &self.webdriver_url,
                    request,
                    self.wait_timeout,
                    self.banner_timeout,
                )
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let page = RawPage::new("https://www.bbc.com/news", "<html></html>");
        assert_eq!(page.origin().as_deref(), Some("https://www.bbc.com"));

        let page = RawPage::new("not a url", "");
        assert_eq!(page.origin(), None);
    }

    #[test]
    fn test_request_builders() {
        let request = PageRequest::browser_page("https://example.com")
            .with_dismiss("#banner")
            .with_wait_for("div.content");
        assert_eq!(request.mode, FetchMode::Browser);
        assert_eq!(request.dismiss.as_deref(), Some("#banner"));
        assert_eq!(request.wait_for.as_deref(), Some("div.content"));

        let request = PageRequest::static_page("https://example.com");
        assert_eq!(request.mode, FetchMode::Static);
        assert!(request.dismiss.is_none());
    }
}
