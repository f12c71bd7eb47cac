use serde::Serialize;

use crate::error::{FetchError, JobError};
use crate::extract::{self, ExtractedRecord, Headline, MAX_RECORDS, RecordKind, SelectorSpec};
use crate::fetch::{Fetcher, PageRequest};
use crate::jobs::JobOutcome;
use crate::store::DocumentStore;

/// The news page is server-rendered, so a plain GET is enough
pub const NEWS_URL: &str = "https://www.bbc.com/news";

const HEADLINE_BLOCK: &str = r#"h2[data-testid="card-headline"]"#;

#[derive(Serialize)]
struct HeadlinesPayload<'a> {
    headlines: &'a [Headline],
}

/// Selector spec for headline cards, capped at the top entries in
/// document order
pub fn headline_spec() -> SelectorSpec {
    SelectorSpec::new(HEADLINE_BLOCK, RecordKind::Headline).with_limit(MAX_RECORDS)
}

/// Fetch the news page and extract the top headlines
pub async fn scrape_headlines(fetcher: &Fetcher) -> Result<Vec<Headline>, FetchError> {
    ::log::info!("Scraping {} for top headlines", NEWS_URL);

    let page = fetcher.fetch(&PageRequest::static_page(NEWS_URL)).await?;
    let headlines: Vec<Headline> = extract::extract(&page, &headline_spec())
        .into_iter()
        .filter_map(ExtractedRecord::into_headline)
        .collect();

    ::log::info!("Extracted {} headlines", headlines.len());
    Ok(headlines)
}

/// Scrape headlines and overwrite the given document with them.
///
/// The same pipeline feeds two documents (`news/latest_headlines` and
/// `dashboard_data/latest_news`), so the target is a parameter.
pub async fn run(
    fetcher: &Fetcher,
    store: &dyn DocumentStore,
    collection: &str,
    doc_id: &str,
) -> Result<JobOutcome, JobError> {
    let headlines = scrape_headlines(fetcher).await?;

    if headlines.is_empty() {
        ::log::warn!("No headlines matched; the page structure may have changed");
        return Ok(JobOutcome::skipped("no headlines matched"));
    }

    let payload = serde_json::to_value(HeadlinesPayload {
        headlines: &headlines,
    })
    .map_err(crate::error::PersistError::from)?;
    store.set(collection, doc_id, payload).await?;

    ::log::info!(
        "Stored {} headlines in {}/{}",
        headlines.len(),
        collection,
        doc_id
    );
    Ok(JobOutcome::Stored {
        count: headlines.len(),
    })
}
