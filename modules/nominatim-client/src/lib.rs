pub mod error;

pub use error::{NominatimError, Result};

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Japanese postal mark.
const POSTAL_MARK: char = '〒';

/// 3-4 digit postal code, with or without the hyphen (e.g. `358-0014`).
static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3}-?[0-9]{4}").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Nominatim returns lat/lon as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Client for the Nominatim geocoding API.
///
/// Queries are restricted to one country and one result, with localized
/// naming; an empty result triggers a single retry with the country
/// restriction removed. Nominatim's usage policy requires an identifying
/// User-Agent on every request.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    country: String,
    language: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(base_url: &str, country: &str, language: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            country: country.to_string(),
            language: language.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Geocode a free-text address. Returns the first match, or None when
    /// neither the restricted nor the relaxed query finds anything.
    pub async fn search(&self, address: &str) -> Result<Option<GeoPoint>> {
        let normalized = normalize_address(address);
        if normalized.is_empty() {
            return Ok(None);
        }

        if let Some(point) = self.search_once(&normalized, true).await? {
            return Ok(Some(point));
        }

        // Formatted addresses sometimes fall outside the country filter
        // (romanized names, landmark-only strings). Retry once, relaxed.
        debug!(address = %normalized, "No restricted result, retrying without country filter");
        self.search_once(&normalized, false).await
    }

    async fn search_once(&self, query: &str, country_restricted: bool) -> Result<Option<GeoPoint>> {
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("accept-language", &self.language),
        ];
        if country_restricted {
            params.push(("countrycodes", &self.country));
        }

        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Nominatim request rejected");
            return Err(NominatimError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let results: Vec<SearchResult> = resp.json().await?;
        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = first
            .lat
            .parse()
            .map_err(|_| NominatimError::Parse(format!("bad latitude: {}", first.lat)))?;
        let lon: f64 = first
            .lon
            .parse()
            .map_err(|_| NominatimError::Parse(format!("bad longitude: {}", first.lon)))?;

        Ok(Some(GeoPoint { lat, lon }))
    }
}

/// Normalize a free-text address before geocoding: strip the postal mark and
/// postal codes, normalize the full-width hyphen to ASCII, collapse
/// whitespace runs.
pub fn normalize_address(address: &str) -> String {
    let s = address.replace(POSTAL_MARK, "");
    let s = s.replace('−', "-");
    let s = POSTAL_CODE_RE.replace_all(&s, "");
    WHITESPACE_RE.replace_all(&s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_postal_mark_and_code() {
        let normalized = normalize_address("〒358-0014 埼玉県入間市宮寺");
        assert!(!normalized.contains('〒'));
        assert!(!normalized.contains("358-0014"));
        assert_eq!(normalized, "埼玉県入間市宮寺");
    }

    #[test]
    fn normalize_handles_unhyphenated_postal_code() {
        let normalized = normalize_address("〒3580014 埼玉県入間市");
        assert_eq!(normalized, "埼玉県入間市");
    }

    #[test]
    fn normalize_converts_fullwidth_hyphen() {
        assert_eq!(normalize_address("1−2−3 宮寺"), "1-2-3 宮寺");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_address("  東京都  千代田区\t丸の内 "), "東京都 千代田区 丸の内");
    }

    #[test]
    fn search_result_parses_string_coordinates() {
        let results: Vec<SearchResult> =
            serde_json::from_str(r#"[{"lat": "35.68123", "lon": "139.76712"}]"#).unwrap();
        assert_eq!(results[0].lat, "35.68123");
        assert_eq!(results[0].lon, "139.76712");
    }
}
