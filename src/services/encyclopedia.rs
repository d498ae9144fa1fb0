//! Short encyclopedia answers from Wikipedia
//!
//! One request to the MediaWiki action API both resolves the query to the
//! best matching article (search generator, first hit) and returns that
//! article's plain-text intro. The intro is cut down to two sentences.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";

/// Sentences kept from an article intro
pub const SUMMARY_SENTENCES: usize = 2;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("No article found for '{0}'")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),
}

pub trait EncyclopediaService {
    /// A short summary of the best matching article
    fn summary(&self, query: &str) -> Result<String, LookupError>;
}

pub struct WikipediaClient {
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    /// Search rank when produced by a search generator
    index: Option<u32>,
    extract: Option<String>,
}

impl WikipediaClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("sayso/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }
}

impl EncyclopediaService for WikipediaClient {
    fn summary(&self, query: &str) -> Result<String, LookupError> {
        debug!("Looking up '{}'", query);

        let response: QueryResponse = self
            .http
            .get(WIKIPEDIA_API)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| LookupError::Network(e.to_string()))?
            .json()
            .map_err(|e| LookupError::Network(format!("Invalid response: {}", e)))?;

        best_summary(response).ok_or_else(|| LookupError::NotFound(query.to_string()))
    }
}

fn best_summary(response: QueryResponse) -> Option<String> {
    let page = response
        .query?
        .pages
        .into_values()
        .min_by_key(|page| page.index.unwrap_or(u32::MAX))?;

    debug!("Best article: {}", page.title);
    let summary = first_sentences(page.extract.as_deref()?, SUMMARY_SENTENCES);
    (!summary.is_empty()).then_some(summary)
}

/// The first `count` sentences of `text`
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of
/// the text, so "3.14" or "U.S.A" inside a sentence doesn't split it.
pub fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    let mut found = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                found += 1;
                if found == count {
                    return text[..i + c.len_utf8()].to_string();
                }
            }
        }
    }

    text.to_string()
}
