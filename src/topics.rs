use regex::Regex;

/// Tokens that look like proper nouns: an uppercase letter followed by
/// at least three lowercase letters
const TOPIC_PATTERN: &str = r"\b[A-Z][a-z]{3,}\b";

/// The trending topic derived from a batch of headlines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResult {
    pub topic: String,
    /// True when no headline matched the extraction pattern and the
    /// caller's fallback was used instead
    pub fallback_used: bool,
}

/// Rank headline text by word frequency and return the most frequent
/// proper-noun-like token.
///
/// Ties go to the first-encountered token. With no headlines, or no
/// qualifying tokens, the caller's fallback is returned unchanged -
/// different call sites supply different defaults.
pub fn rank(headlines: &[String], fallback: &str) -> TopicResult {
    if headlines.is_empty() {
        return fallback_result(fallback);
    }

    let pattern = Regex::new(TOPIC_PATTERN).expect("valid topic pattern");
    let joined = headlines.join(" ");

    // Counts keyed in first-encounter order so the tie-break is stable
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for token in pattern.find_iter(&joined) {
        match counts.iter_mut().find(|(word, _)| *word == token.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((token.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (word, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((word, count)),
        }
    }

    match best {
        Some((word, count)) => {
            ::log::info!("Trending topic `{}` ({} occurrences)", word, count);
            TopicResult {
                topic: word.to_string(),
                fallback_used: false,
            }
        }
        None => fallback_result(fallback),
    }
}

fn fallback_result(fallback: &str) -> TopicResult {
    ::log::warn!("No qualifying topic tokens, falling back to `{}`", fallback);
    TopicResult {
        topic: fallback.to_string(),
        fallback_used: true,
    }
}
