/*!
 * Remote meaning service client.
 *
 * Queries a Jisho-compatible word search API:
 * `GET {endpoint}?keyword=<word>` returning
 * `{"data": [{"senses": [{"english_definitions": [...]}]}]}`.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::app_config::DictionaryConfig;
use crate::errors::LookupError;

/// Definitions kept from the first sense
const MAX_DEFINITIONS: usize = 3;

/// Remote tier of the dictionary
#[async_trait]
pub trait MeaningService: Send + Sync {
    /// Look up a word. `Ok(None)` means the service has no entry for it.
    async fn fetch_meaning(&self, word: &str) -> Result<Option<String>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    senses: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct Sense {
    #[serde(default)]
    english_definitions: Vec<String>,
}

/// Extract the meaning from a search response body.
///
/// First result, first sense, up to three definitions joined with ", ".
pub fn parse_meaning(body: &str) -> Result<Option<String>, LookupError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::ParseError(e.to_string()))?;

    let meaning = response
        .data
        .first()
        .and_then(|result| result.senses.first())
        .map(|sense| {
            sense
                .english_definitions
                .iter()
                .take(MAX_DEFINITIONS)
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|meaning| !meaning.is_empty());

    Ok(meaning)
}

/// HTTP client for the word search API
pub struct JishoClient {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl JishoClient {
    pub fn new(config: &DictionaryConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.clone())
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Search URL for a word, with the keyword percent-encoded
    pub fn search_url(&self, word: &str) -> Result<Url, LookupError> {
        Url::parse_with_params(&self.endpoint, &[("keyword", word)])
            .map_err(|e| LookupError::RequestFailed(format!("Invalid endpoint {}: {}", self.endpoint, e)))
    }
}

#[async_trait]
impl MeaningService for JishoClient {
    async fn fetch_meaning(&self, word: &str) -> Result<Option<String>, LookupError> {
        let url = self.search_url(word)?;
        debug!("Dictionary request: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.timeout_secs)
                } else {
                    LookupError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(LookupError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.timeout_secs)
            } else {
                LookupError::RequestFailed(e.to_string())
            }
        })?;

        parse_meaning(&body)
    }
}
