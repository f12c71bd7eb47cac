// Re-export modules
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod jobs;
pub mod sentiment;
pub mod serve;
pub mod store;
pub mod topics;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use fetch::Fetcher;
pub use jobs::JobOutcome;

use std::sync::Arc;

use crate::error::InitError;
use crate::store::{DocumentStore, FirestoreStore};

/// Everything a pipeline run needs, constructed once at start-up.
///
/// There is no global store handle; the context is passed into each job
/// explicitly, so tests can substitute a fake store.
pub struct Context {
    pub config: AppConfig,
    pub fetcher: Fetcher,
    pub store: Arc<dyn DocumentStore>,
}

/// Build the runtime context: load credentials, connect the document
/// store, and set up the fetcher.
///
/// Any failure here is fatal and surfaces as a typed [`InitError`]; the
/// caller decides exit behavior.
pub async fn initialize(config: AppConfig) -> Result<Context, InitError> {
    let config = config.apply_env();
    let store = FirestoreStore::connect(&config.credentials_path).await?;
    let fetcher = Fetcher::new(&config);

    Ok(Context {
        config,
        fetcher,
        store: Arc::new(store),
    })
}
