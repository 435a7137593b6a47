pub mod error;

pub use error::{RelayError, Result};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use triplink_common::RawMessage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Client for the message relay API.
///
/// The relay sits in front of the messaging platform's webhook: it stores
/// incoming messages, forwards outbound sends, and hosts the server-side
/// image search endpoint (the search API key never reaches this client).
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
    channel_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    /// May be null when no messages have been received yet.
    messages: Option<Vec<RawMessage>>,
    #[allow(dead_code)]
    count: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    group_id: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageSearchResponse {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

impl RelayClient {
    pub fn new(base_url: &str, channel_token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            channel_token: channel_token.map(String::from).filter(|t| !t.is_empty()),
        }
    }

    /// Fetch the full message history, optionally filtered to one sender id.
    pub async fn fetch_messages(&self, filter_id: Option<&str>) -> Result<Vec<RawMessage>> {
        let mut endpoint = format!("{}/messages", self.base_url);
        if let Some(id) = filter_id.filter(|id| !id.is_empty()) {
            endpoint.push_str(&format!("?line_id={}", urlencoding::encode(id)));
        }

        debug!(endpoint = %endpoint, "Fetching messages");

        let resp = self.client.get(&endpoint).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RelayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = resp.json().await?;
        Ok(body.messages.unwrap_or_default())
    }

    /// Send a message to a group via the relay.
    ///
    /// Requires the channel token; a missing token is a typed failure since
    /// it blocks an explicit user action rather than a background enrichment.
    pub async fn send_message(&self, group_id: &str, text: &str) -> Result<()> {
        if self.channel_token.is_none() {
            return Err(RelayError::MissingToken);
        }

        let endpoint = format!("{}/send", self.base_url);
        let body = SendRequest {
            group_id,
            message: text,
        };

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), group_id, "Message send rejected");
            return Err(RelayError::SendFailed {
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Keyword image search via the relay's server-side search endpoint.
    /// Returns the first image URL, or None when the response has no usable
    /// `imageUrl` field.
    pub async fn search_image(&self, query: &str) -> Result<Option<String>> {
        let endpoint = format!(
            "{}/search_image?q={}",
            self.base_url,
            urlencoding::encode(query)
        );

        debug!(query, "Image search");

        let resp = self.client.get(&endpoint).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RelayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ImageSearchResponse = resp.json().await?;
        Ok(body.image_url.filter(|u| !u.is_empty()))
    }
}
