use serde::Serialize;

use crate::error::JobError;
use crate::extract::{self, ExtractedRecord, RecordKind, SelectorSpec};
use crate::fetch::{Fetcher, PageRequest};
use crate::jobs::{JobOutcome, news};
use crate::sentiment::{self, PolarityScorer, SentimentResult, SentimentSummary};
use crate::store::{self, DocumentStore};
use crate::topics::{self, TopicResult};

/// First search result on the listing page; it is itself the anchor
const POST_LINK: &str = r#"a[data-testid="post-title"]"#;

/// Comment blocks on a post page
const COMMENT_BLOCK: &str = r#"div[data-testid="comment"]"#;

/// Consent banner, attempted best-effort on the search page
const CONSENT_BUTTON: &str = r#"button[aria-label="Accept all"]"#;

/// Fallback topic when the news fetch itself fails
const FETCH_FAILED_TOPIC: &str = "Technology";

/// Fallback topic when the news page yields no headlines
const NO_HEADLINES_TOPIC: &str = "Global";

/// Fallback topic when headlines carry no qualifying tokens
const NO_TOKENS_TOPIC: &str = "World";

#[derive(Serialize)]
struct SentimentPayload<'a> {
    topic: &'a str,
    summary: &'a SentimentSummary,
    opinions: &'a [SentimentResult],
}

/// Find the trending topic, scrape forum opinions on it, classify them,
/// and overwrite `sentiments/<topic_key>`.
///
/// An empty opinion batch halts the run with nothing persisted; there is
/// no partial write.
pub async fn run(
    fetcher: &Fetcher,
    store: &dyn DocumentStore,
    scorer: &dyn PolarityScorer,
) -> Result<JobOutcome, JobError> {
    let topic = trending_topic(fetcher).await;
    ::log::info!(
        "Trending topic: {} (fallback: {})",
        topic.topic,
        topic.fallback_used
    );

    let opinions = scrape_opinions(fetcher, &topic.topic).await?;
    analyze_and_store(store, scorer, &topic.topic, opinions).await
}

/// Classify the opinion batch and overwrite the topic's sentiment
/// document. An empty batch is an explicit halt, not an error.
async fn analyze_and_store(
    store: &dyn DocumentStore,
    scorer: &dyn PolarityScorer,
    topic: &str,
    opinions: Vec<String>,
) -> Result<JobOutcome, JobError> {
    if opinions.is_empty() {
        ::log::warn!("No opinions to analyze, halting");
        return Ok(JobOutcome::skipped("no opinions to analyze"));
    }

    ::log::info!("Analyzing sentiment of {} opinions", opinions.len());
    let (results, summary) = sentiment::classify_batch(scorer, opinions);

    let payload = serde_json::to_value(SentimentPayload {
        topic,
        summary: &summary,
        opinions: &results,
    })
    .map_err(crate::error::PersistError::from)?;
    store
        .set("sentiments", &store::document_id(topic), payload)
        .await?;

    ::log::info!("Stored sentiment analysis for `{}`", topic);
    Ok(JobOutcome::Stored {
        count: results.len(),
    })
}

/// Derive the trending topic from the news headlines.
///
/// The three fallbacks mirror the three ways the derivation can come up
/// empty; a failed news fetch is absorbed here rather than failing the
/// run, since the topic has a usable default.
async fn trending_topic(fetcher: &Fetcher) -> TopicResult {
    match news::scrape_headlines(fetcher).await {
        Ok(headlines) if headlines.is_empty() => {
            ::log::warn!("No headlines found, using default topic");
            TopicResult {
                topic: NO_HEADLINES_TOPIC.to_string(),
                fallback_used: true,
            }
        }
        Ok(headlines) => {
            let titles: Vec<String> = headlines.into_iter().map(|h| h.title).collect();
            topics::rank(&titles, NO_TOKENS_TOPIC)
        }
        Err(e) => {
            ::log::error!("Failed to scrape news for a topic: {}", e);
            TopicResult {
                topic: FETCH_FAILED_TOPIC.to_string(),
                fallback_used: true,
            }
        }
    }
}

/// Two-level navigation: fetch the search listing, extract the first
/// result's link, then fetch that post and extract its comments. Two
/// sequential fetches, not a special mode.
async fn scrape_opinions(fetcher: &Fetcher, topic: &str) -> Result<Vec<String>, JobError> {
    let search_url = format!("https://www.reddit.com/search/?q={}&type=link", topic);
    ::log::info!("Searching for opinions on `{}`", topic);

    let listing = fetcher
        .fetch(
            &PageRequest::browser_page(&search_url)
                .with_dismiss(CONSENT_BUTTON)
                .with_wait_for(POST_LINK),
        )
        .await?;

    let first_post = extract::extract(&listing, &post_link_spec())
        .into_iter()
        .filter_map(ExtractedRecord::into_headline)
        .next();

    let Some(post) = first_post else {
        ::log::warn!("No search results for `{}`", topic);
        return Ok(Vec::new());
    };

    ::log::info!("Navigating to top post: {}", post.link);
    let page = fetcher
        .fetch(&PageRequest::browser_page(&post.link).with_wait_for(COMMENT_BLOCK))
        .await?;

    let comments: Vec<String> = extract::extract(&page, &comment_spec())
        .into_iter()
        .filter_map(ExtractedRecord::into_comment)
        .collect();

    ::log::info!("Scraped {} comments", comments.len());
    Ok(comments)
}

/// Selector spec for the first post link on the search page. The anchor
/// carries both the title text and the href.
pub fn post_link_spec() -> SelectorSpec {
    SelectorSpec::new(POST_LINK, RecordKind::Headline).with_limit(1)
}

/// Selector spec for comment blocks, uncapped
pub fn comment_spec() -> SelectorSpec {
    SelectorSpec::new(COMMENT_BLOCK, RecordKind::Comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RawPage;
    use crate::store::MemoryStore;

    struct NeutralScorer;

    impl PolarityScorer for NeutralScorer {
        fn compound(&self, _text: &str) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_post_link_spec_takes_first_result() {
        let html = r#"<html><body>
            <a data-testid="post-title" href="/r/news/comments/abc/first/">First post</a>
            <a data-testid="post-title" href="/r/news/comments/def/second/">Second post</a>
        </body></html>"#;
        let page = RawPage::new("https://www.reddit.com/search/?q=Ukraine&type=link", html);

        let posts: Vec<_> = extract::extract(&page, &post_link_spec())
            .into_iter()
            .filter_map(ExtractedRecord::into_headline)
            .collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "First post");
        assert_eq!(
            posts[0].link,
            "https://www.reddit.com/r/news/comments/abc/first/"
        );
    }

    #[tokio::test]
    async fn test_empty_opinion_batch_writes_nothing() {
        let store = MemoryStore::new();
        let outcome = analyze_and_store(&store, &NeutralScorer, "Ukraine", Vec::new())
            .await
            .unwrap();

        assert_eq!(outcome, JobOutcome::skipped("no opinions to analyze"));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_sentiment_payload_shape_and_doc_id() {
        let store = MemoryStore::new();
        let outcome = analyze_and_store(
            &store,
            &NeutralScorer,
            "World News",
            vec!["some opinion".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(outcome, JobOutcome::Stored { count: 1 });
        assert_eq!(
            store.writes(),
            vec![("sentiments".to_string(), "world_news".to_string())]
        );
        let doc = store.get("sentiments", "world_news").await.unwrap().unwrap();
        assert_eq!(doc["topic"], "World News");
        assert_eq!(doc["summary"]["neutral"], 1);
        assert_eq!(doc["summary"]["positive"], 0);
        assert_eq!(doc["opinions"][0]["text"], "some opinion");
        assert_eq!(doc["opinions"][0]["sentiment"], "neutral");
    }
}
