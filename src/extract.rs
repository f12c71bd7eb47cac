use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::fetch::RawPage;

/// Maximum number of headline/rate records kept per extraction, in
/// document order
pub const MAX_RECORDS: usize = 10;

/// A headline with its absolutized link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

/// One row of a rates table. Prices stay currency-formatted strings;
/// they are displayed, never computed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rate {
    pub carat: String,
    pub price: String,
}

/// A structured record recovered from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedRecord {
    Headline(Headline),
    Rate(Rate),
    Comment(String),
}

impl ExtractedRecord {
    pub fn into_headline(self) -> Option<Headline> {
        match self {
            ExtractedRecord::Headline(headline) => Some(headline),
            _ => None,
        }
    }

    pub fn into_rate(self) -> Option<Rate> {
        match self {
            ExtractedRecord::Rate(rate) => Some(rate),
            _ => None,
        }
    }

    pub fn into_comment(self) -> Option<String> {
        match self {
            ExtractedRecord::Comment(text) => Some(text),
            _ => None,
        }
    }
}

/// What kind of record the matched blocks carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Element text is the title; the link is recovered from the element
    /// itself or its nearest `a[href]` ancestor
    Headline,
    /// First two `td` cells of each row are the carat label and price
    Rate,
    /// Element text is a free-text comment
    Comment,
}

/// Declarative selector spec identifying repeated content blocks
#[derive(Debug, Clone)]
pub struct SelectorSpec {
    /// CSS selector for the repeated blocks
    pub block: String,

    /// How each block maps to a record
    pub kind: RecordKind,

    /// Cap on the number of records kept, in document order
    pub limit: Option<usize>,
}

impl SelectorSpec {
    pub fn new(block: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            block: block.into(),
            kind,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Extract structured records from a raw page.
///
/// Never fails on zero matches - an empty sequence is returned and the
/// caller decides fallback policy. Blocks that do not yield a complete
/// record (empty title, missing link, too few cells) are skipped without
/// counting against the limit.
pub fn extract(page: &RawPage, spec: &SelectorSpec) -> Vec<ExtractedRecord> {
    let block_selector = match Selector::parse(&spec.block) {
        Ok(selector) => selector,
        Err(e) => {
            ::log::error!("Invalid block selector `{}`: {}", spec.block, e);
            return Vec::new();
        }
    };

    let origin = page.origin();
    let doc = Html::parse_document(&page.html);
    let limit = spec.limit.unwrap_or(usize::MAX);

    let mut records = Vec::new();
    for element in doc.select(&block_selector) {
        if records.len() >= limit {
            break;
        }

        let record = match spec.kind {
            RecordKind::Headline => headline_record(element, origin.as_deref()),
            RecordKind::Rate => rate_record(element),
            RecordKind::Comment => comment_record(element),
        };

        if let Some(record) = record {
            records.push(record);
        }
    }

    ::log::debug!(
        "Extracted {} records from {} with `{}`",
        records.len(),
        page.url,
        spec.block
    );
    records
}

/// Builds a headline record from a matched block
fn headline_record(element: ElementRef, origin: Option<&str>) -> Option<ExtractedRecord> {
    let title = element_text(element);
    if title.is_empty() {
        return None;
    }

    let href = link_for(element)?;
    let link = match origin {
        Some(origin) => normalize_link(origin, &href),
        None => href,
    };

    Some(ExtractedRecord::Headline(Headline { title, link }))
}

/// Builds a rate record from a table row. Header rows carry `th` cells
/// and are skipped naturally.
fn rate_record(element: ElementRef) -> Option<ExtractedRecord> {
    let cell_selector = Selector::parse("td").expect("valid selector");
    let cells: Vec<String> = element
        .select(&cell_selector)
        .map(element_text)
        .collect();

    if cells.len() < 2 {
        return None;
    }

    let mut cells = cells.into_iter();
    Some(ExtractedRecord::Rate(Rate {
        carat: cells.next().unwrap_or_default(),
        price: cells.next().unwrap_or_default(),
    }))
}

/// Builds a comment record from a matched block
fn comment_record(element: ElementRef) -> Option<ExtractedRecord> {
    let text = element_text(element);
    if text.is_empty() {
        return None;
    }
    Some(ExtractedRecord::Comment(text))
}

/// Collects an element's text nodes into a single whitespace-normalized
/// string
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Recovers the link for a block: the element itself if it is an anchor,
/// otherwise the nearest `a[href]` ancestor
fn link_for(element: ElementRef) -> Option<String> {
    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            return Some(href.to_string());
        }
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find_map(|ancestor| {
            if ancestor.value().name() == "a" {
                ancestor.value().attr("href").map(|href| href.to_string())
            } else {
                None
            }
        })
}

/// Absolutize a recovered link against the page's origin.
///
/// Relative links get the origin prepended exactly once; absolute links
/// pass through unchanged.
pub fn normalize_link(origin: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", origin, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline_fixture(count: usize) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..count {
            html.push_str(&format!(
                r#"<a href="/news/article-{i}"><h2 data-testid="card-headline">Headline {i}</h2></a>"#
            ));
        }
        html.push_str("</body></html>");
        html
    }

    fn headline_spec() -> SelectorSpec {
        SelectorSpec::new(r#"h2[data-testid="card-headline"]"#, RecordKind::Headline)
            .with_limit(MAX_RECORDS)
    }

    #[test]
    fn test_extract_headlines_capped_in_document_order() {
        // 12 matching blocks in the fixture, exactly 10 extracted
        let page = RawPage::new("https://www.bbc.com/news", headline_fixture(12));
        let records = extract(&page, &headline_spec());
        assert_eq!(records.len(), 10);

        for (i, record) in records.into_iter().enumerate() {
            let headline = record.into_headline().unwrap();
            assert_eq!(headline.title, format!("Headline {}", i));
            assert!(!headline.title.trim().is_empty());
            assert_eq!(
                headline.link,
                format!("https://www.bbc.com/news/article-{}", i)
            );
        }
    }

    #[test]
    fn test_extract_fewer_matches_than_cap() {
        let page = RawPage::new("https://www.bbc.com/news", headline_fixture(3));
        assert_eq!(extract(&page, &headline_spec()).len(), 3);
    }

    #[test]
    fn test_extract_zero_matches_is_empty_not_error() {
        let page = RawPage::new("https://www.bbc.com/news", "<html><body></body></html>");
        assert!(extract(&page, &headline_spec()).is_empty());
    }

    #[test]
    fn test_headline_without_link_is_skipped() {
        let html = r#"<html><body>
            <h2 data-testid="card-headline">Orphan headline</h2>
            <a href="/linked"><h2 data-testid="card-headline">Linked headline</h2></a>
        </body></html>"#;
        let page = RawPage::new("https://www.bbc.com/news", html);
        let records = extract(&page, &headline_spec());
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].clone().into_headline().unwrap().title,
            "Linked headline"
        );
    }

    #[test]
    fn test_absolute_link_passes_through() {
        let html = r#"<html><body>
            <a href="https://other.example.com/story"><h2 data-testid="card-headline">Away</h2></a>
        </body></html>"#;
        let page = RawPage::new("https://www.bbc.com/news", html);
        let records = extract(&page, &headline_spec());
        assert_eq!(
            records[0].clone().into_headline().unwrap().link,
            "https://other.example.com/story"
        );
    }

    #[test]
    fn test_extract_rates_skips_header_row() {
        let html = r#"<html><body><div class="gold_silver_table"><table>
            <tr><th>Carat</th><th>Price</th></tr>
            <tr><td>22K</td><td>₹ 5,500</td></tr>
            <tr><td>24K</td><td>₹ 6,000</td></tr>
        </table></div></body></html>"#;
        let page = RawPage::new("https://www.goodreturns.in/gold-rates/hyderabad.html", html);
        let spec = SelectorSpec::new("div.gold_silver_table table tr", RecordKind::Rate)
            .with_limit(MAX_RECORDS);

        let rates: Vec<Rate> = extract(&page, &spec)
            .into_iter()
            .filter_map(ExtractedRecord::into_rate)
            .collect();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].carat, "22K");
        assert_eq!(rates[0].price, "₹ 5,500");
        assert_eq!(rates[1].carat, "24K");
    }

    #[test]
    fn test_extract_comments_skips_empty() {
        let html = r#"<html><body>
            <div data-testid="comment">  First   comment </div>
            <div data-testid="comment">   </div>
            <div data-testid="comment">Second<br>comment</div>
        </body></html>"#;
        let page = RawPage::new("https://www.reddit.com/r/test/post", html);
        let spec = SelectorSpec::new(r#"div[data-testid="comment"]"#, RecordKind::Comment);

        let comments: Vec<String> = extract(&page, &spec)
            .into_iter()
            .filter_map(ExtractedRecord::into_comment)
            .collect();
        assert_eq!(comments, vec!["First comment", "Second comment"]);
    }

    #[test]
    fn test_normalize_link() {
        assert_eq!(
            normalize_link("https://www.bbc.com", "/news/article"),
            "https://www.bbc.com/news/article"
        );
        assert_eq!(
            normalize_link("https://www.bbc.com", "https://www.bbc.com/news/article"),
            "https://www.bbc.com/news/article"
        );
    }

    #[test]
    fn test_invalid_selector_yields_empty() {
        let page = RawPage::new("https://www.bbc.com/news", headline_fixture(2));
        let spec = SelectorSpec::new("h2[[", RecordKind::Headline);
        assert!(extract(&page, &spec).is_empty());
    }
}
