use serde::Serialize;

use crate::error::JobError;
use crate::extract::{self, ExtractedRecord, MAX_RECORDS, Rate, RecordKind, SelectorSpec};
use crate::fetch::{Fetcher, PageRequest};
use crate::jobs::JobOutcome;
use crate::store::DocumentStore;

/// The rates site blocks plain HTTP clients, so this page goes through
/// the browser
pub const GOLD_URL: &str = "https://www.goodreturns.in/gold-rates/hyderabad.html";

/// Target content element the browser waits for before reading the page
const RATE_TABLE: &str = "div.gold_silver_table";

const RATE_ROWS: &str = "div.gold_silver_table table tr";

#[derive(Serialize)]
struct RatesPayload<'a> {
    rates: &'a [Rate],
}

/// Selector spec for the rate table rows
pub fn rate_spec() -> SelectorSpec {
    SelectorSpec::new(RATE_ROWS, RecordKind::Rate).with_limit(MAX_RECORDS)
}

/// Scrape live gold rates and overwrite
/// `dashboard_data/latest_gold_rates`.
pub async fn run(fetcher: &Fetcher, store: &dyn DocumentStore) -> Result<JobOutcome, JobError> {
    ::log::info!("Scraping {} for gold rates", GOLD_URL);

    let request = PageRequest::browser_page(GOLD_URL).with_wait_for(RATE_TABLE);
    let page = fetcher.fetch(&request).await?;

    let rates: Vec<Rate> = extract::extract(&page, &rate_spec())
        .into_iter()
        .filter_map(ExtractedRecord::into_rate)
        .collect();

    if rates.is_empty() {
        ::log::warn!("No gold rates matched; the table structure may have changed");
        return Ok(JobOutcome::skipped("no gold rates matched"));
    }

    let payload = serde_json::to_value(RatesPayload { rates: &rates })
        .map_err(crate::error::PersistError::from)?;
    store
        .set("dashboard_data", "latest_gold_rates", payload)
        .await?;

    ::log::info!("Stored {} gold rate entries", rates.len());
    Ok(JobOutcome::Stored { count: rates.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::fetch::RawPage;

    #[test]
    fn test_rate_spec_against_fixture() {
        let html = r#"<html><body><div class="gold_silver_table"><table>
            <tr><th>Gold</th><th>Today</th></tr>
            <tr><td>22 Carat</td><td>₹ 55,000</td></tr>
            <tr><td>24 Carat</td><td>₹ 60,000</td></tr>
            <tr><td>18 Carat</td><td>₹ 45,000</td></tr>
        </table></div></body></html>"#;
        let page = RawPage::new(GOLD_URL, html);

        let rates: Vec<Rate> = extract(&page, &rate_spec())
            .into_iter()
            .filter_map(ExtractedRecord::into_rate)
            .collect();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0].carat, "22 Carat");
        assert_eq!(rates[0].price, "₹ 55,000");
        assert_eq!(rates[2].carat, "18 Carat");
    }
}
