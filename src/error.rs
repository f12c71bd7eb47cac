use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while retrieving a page, over plain HTTP or through the
/// WebDriver session.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be completed (DNS, connect, read, ...)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// No WebDriver session could be established
    #[error("failed to start WebDriver session at {webdriver_url}: {source}")]
    Session {
        webdriver_url: String,
        source: fantoccini::error::NewSessionError,
    },

    /// A WebDriver command failed mid-session
    #[error("WebDriver command failed for {url}: {source}")]
    Browser {
        url: String,
        source: fantoccini::error::CmdError,
    },

    /// The target content element never appeared within the configured wait
    #[error("timed out waiting for `{selector}` on {url}")]
    WaitTimeout { url: String, selector: String },
}

/// Errors raised while writing to or reading from the document store.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The store could not be reached
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-2xx status
    #[error("store returned status {status} for {collection}/{doc_id}: {body}")]
    Rejected {
        collection: String,
        doc_id: String,
        status: u16,
        body: String,
    },

    /// The payload could not be serialized to a document
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// The payload is not a document-shaped value (a JSON object)
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Fatal start-up errors. Any of these aborts the process before a
/// pipeline runs.
#[derive(Debug, Error)]
pub enum InitError {
    /// The config file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON
    #[error("config {path} is not valid: {source}")]
    ConfigFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The credential file could not be read
    #[error("failed to read credentials {path}: {source}")]
    CredentialsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The credential file is not valid JSON
    #[error("credentials {path} are not valid: {source}")]
    CredentialsFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document store rejected the initial probe
    #[error("cannot reach document store: {0}")]
    Store(#[from] PersistError),
}

/// A single pipeline run failing at either end of the pipe. Extraction
/// never fails; an empty extraction is a reported skip, not an error.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}
