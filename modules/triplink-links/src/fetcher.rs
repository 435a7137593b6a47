use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

const HEAD_TIMEOUT: Duration = Duration::from_secs(5);
const GET_TIMEOUT: Duration = Duration::from_secs(6);
/// Body cap for page GETs; previews live in the head or early body.
const MAX_BODY_BYTES: usize = 512 * 1024;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml";

/// A fetched page after redirect following.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after redirects; coordinate and query extraction read this, not
    /// the requested URL.
    pub final_url: String,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: u16,
    pub content_type: Option<String>,
}

impl HeadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Narrow HTTP surface the pipeline depends on.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET with HTML accept header, 6s timeout, redirects followed.
    async fn get(&self, url: &str) -> Result<FetchedPage>;

    /// HEAD with 5s timeout.
    async fn head(&self, url: &str) -> Result<HeadResponse>;
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", HTML_ACCEPT)
            .timeout(GET_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let bytes = response.bytes().await?;
        let bytes = if bytes.len() > MAX_BODY_BYTES {
            &bytes[..MAX_BODY_BYTES]
        } else {
            &bytes[..]
        };
        let body = String::from_utf8_lossy(bytes).into_owned();

        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }

    async fn head(&self, url: &str) -> Result<HeadResponse> {
        let response = self
            .client
            .head(url)
            .header("User-Agent", &self.user_agent)
            .timeout(HEAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(HeadResponse {
            status,
            content_type,
        })
    }
}
