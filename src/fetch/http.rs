use reqwest::header::USER_AGENT;

use crate::error::FetchError;
use crate::fetch::RawPage;

/// Browser-identifying User-Agent sent with every static fetch. The
/// target sites reject default client identifiers.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetch a server-rendered page with a single GET.
///
/// A non-2xx status is a fatal [`FetchError`] for this call; there is no
/// retry.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<RawPage, FetchError> {
    ::log::debug!("GET {}", url);

    let response = client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response
        .text()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    ::log::debug!("GET {} returned {} bytes", url, html.len());
    Ok(RawPage::new(url, html))
}
