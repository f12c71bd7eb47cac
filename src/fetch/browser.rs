use std::time::Duration;

use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};

use crate::error::FetchError;
use crate::fetch::{PageRequest, RawPage};

/// Outcome of a best-effort interaction step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The element appeared and was clicked
    Found,
    /// The element did not appear within the wait budget
    NotFound,
}

/// Fetch a page through an isolated WebDriver session.
///
/// The session is torn down on every exit path, success or failure, so a
/// failed navigation never leaks a browser process.
pub async fn fetch(
    webdriver_url: &str,
    request: &PageRequest,
    wait_timeout: Duration,
    banner_timeout: Duration,
) -> Result<RawPage, FetchError> {
    let client = ClientBuilder::native()
        .connect(webdriver_url)
        .await
        .map_err(|source| FetchError::Session {
            webdriver_url: webdriver_url.to_string(),
            source,
        })?;

    let result = drive(&client, request, wait_timeout, banner_timeout).await;

    // Guaranteed cleanup regardless of how the navigation went
    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }

    result
}

/// Navigate, perform the optional interaction steps, and read the
/// rendered page source.
async fn drive(
    client: &Client,
    request: &PageRequest,
    wait_timeout: Duration,
    banner_timeout: Duration,
) -> Result<RawPage, FetchError> {
    ::log::debug!("Navigating browser to {}", request.url);

    client
        .goto(&request.url)
        .await
        .map_err(|source| browser_error(&request.url, source))?;

    // Best-effort dismissal: a missing banner is logged and skipped, only
    // a genuine transport failure propagates
    if let Some(selector) = &request.dismiss {
        match attempt(client, &request.url, selector, banner_timeout).await? {
            StepOutcome::Found => {
                ::log::info!("Dismissed `{}` on {}", selector, request.url);
            }
            StepOutcome::NotFound => {
                ::log::info!("No `{}` element on {}, continuing", selector, request.url);
            }
        }
    }

    if let Some(selector) = &request.wait_for {
        ::log::debug!("Waiting for `{}` on {}", selector, request.url);
        wait_for(client, &request.url, selector, wait_timeout).await?;
    }

    let html = client
        .source()
        .await
        .map_err(|source| browser_error(&request.url, source))?;

    ::log::debug!("Browser fetched {} bytes from {}", html.len(), request.url);
    Ok(RawPage::new(request.url.clone(), html))
}

/// Attempt to click an element, treating its absence as a normal outcome.
pub async fn attempt(
    client: &Client,
    url: &str,
    selector: &str,
    timeout: Duration,
) -> Result<StepOutcome, FetchError> {
    match client
        .wait()
        .at_most(timeout)
        .for_element(Locator::Css(selector))
        .await
    {
        Ok(element) => {
            element
                .click()
                .await
                .map_err(|source| browser_error(url, source))?;
            Ok(StepOutcome::Found)
        }
        Err(CmdError::WaitTimeout) => Ok(StepOutcome::NotFound),
        Err(source) => Err(browser_error(url, source)),
    }
}

/// Wait for the target content element; its absence fails the fetch.
async fn wait_for(
    client: &Client,
    url: &str,
    selector: &str,
    timeout: Duration,
) -> Result<(), FetchError> {
    match client
        .wait()
        .at_most(timeout)
        .for_element(Locator::Css(selector))
        .await
    {
        Ok(_) => Ok(()),
        Err(CmdError::WaitTimeout) => Err(FetchError::WaitTimeout {
            url: url.to_string(),
            selector: selector.to_string(),
        }),
        Err(source) => Err(browser_error(url, source)),
    }
}

fn browser_error(url: &str, source: CmdError) -> FetchError {
    FetchError::Browser {
        url: url.to_string(),
        source,
    }
}
