// Trait abstractions for pipeline collaborators.
//
// MessageSource, Geocoder, and ImageSearcher sit in front of the client
// crates so the pipeline can be tested deterministically with mocks: no
// network, no relay, no Nominatim. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;

use triplink_common::RawMessage;

/// Produces the raw message batch for one refresh.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch(&self, filter_id: Option<&str>) -> Result<Vec<RawMessage>>;
}

#[async_trait]
impl MessageSource for relay_client::RelayClient {
    async fn fetch(&self, filter_id: Option<&str>) -> Result<Vec<RawMessage>> {
        Ok(self.fetch_messages(filter_id).await?)
    }
}

/// Free-text address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, address: &str) -> Result<Option<(f64, f64)>>;
}

#[async_trait]
impl Geocoder for nominatim_client::NominatimClient {
    async fn search(&self, address: &str) -> Result<Option<(f64, f64)>> {
        Ok(nominatim_client::NominatimClient::search(self, address)
            .await?
            .map(|p| (p.lat, p.lon)))
    }
}

/// Keyword image search; first hit only.
#[async_trait]
pub trait ImageSearcher: Send + Sync {
    async fn search_image(&self, query: &str) -> Result<Option<String>>;
}

#[async_trait]
impl ImageSearcher for relay_client::RelayClient {
    async fn search_image(&self, query: &str) -> Result<Option<String>> {
        Ok(relay_client::RelayClient::search_image(self, query).await?)
    }
}
