use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::map::static_map_url;
use super::place::{format_place_label, place_term};
use super::{PageContext, Resolution, ResolveStrategy};
use crate::traits::{Geocoder, ImageSearcher};

/// Stage 4: a `q=` query parameter in the final URL is treated as a
/// free-text address. Geocode it to a static-map preview; when geocoding
/// finds nothing, fall back to one keyword image search on a shortened
/// place term. Both collaborators' failures degrade to "no result".
pub struct GeocodedAddressStrategy {
    geocoder: Arc<dyn Geocoder>,
    searcher: Arc<dyn ImageSearcher>,
    static_map_base_url: String,
}

impl GeocodedAddressStrategy {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        searcher: Arc<dyn ImageSearcher>,
        static_map_base_url: String,
    ) -> Self {
        Self {
            geocoder,
            searcher,
            static_map_base_url,
        }
    }
}

/// Percent-decoded `q=` parameter of a URL, if present and non-empty.
fn address_query(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl ResolveStrategy for GeocodedAddressStrategy {
    fn name(&self) -> &'static str {
        "geocoded_address"
    }

    async fn resolve(&self, page: &PageContext) -> Option<Resolution> {
        let address = address_query(&page.final_url)?;

        match self.geocoder.search(&address).await {
            Ok(Some((lat, lon))) => {
                debug!(address = %address, lat, lon, "Address geocoded");
                return Some(Resolution {
                    image_url: static_map_url(&self.static_map_base_url, lat, lon),
                    label: format_place_label(&address),
                });
            }
            Ok(None) => {
                debug!(address = %address, "Geocoder found nothing");
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Geocoding failed");
            }
        }

        let term = place_term(&address);
        if term.is_empty() {
            return None;
        }

        match self.searcher.search_image(&term).await {
            Ok(Some(image_url)) => Some(Resolution {
                image_url,
                label: format_place_label(&term),
            }),
            Ok(None) => {
                debug!(term = %term, "Image search returned nothing");
                None
            }
            Err(e) => {
                warn!(term = %term, error = %e, "Image search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;

    struct FixedGeocoder {
        point: Option<(f64, f64)>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, _address: &str) -> Result<Option<(f64, f64)>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.point)
        }
    }

    struct FixedSearcher {
        image: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageSearcher for FixedSearcher {
        async fn search_image(&self, _query: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.image.clone())
        }
    }

    fn strategy(
        point: Option<(f64, f64)>,
        image: Option<&str>,
    ) -> (GeocodedAddressStrategy, Arc<FixedGeocoder>, Arc<FixedSearcher>) {
        let geocoder = Arc::new(FixedGeocoder {
            point,
            calls: AtomicUsize::new(0),
        });
        let searcher = Arc::new(FixedSearcher {
            image: image.map(str::to_string),
            calls: AtomicUsize::new(0),
        });
        let s = GeocodedAddressStrategy::new(
            geocoder.clone(),
            searcher.clone(),
            "https://staticmap.openstreetmap.de/staticmap.php".to_string(),
        );
        (s, geocoder, searcher)
    }

    fn context(final_url: &str) -> PageContext {
        PageContext {
            requested_url: "https://maps.example.com/short".to_string(),
            final_url: final_url.to_string(),
            meta: Default::default(),
        }
    }

    #[test]
    fn address_query_percent_decodes() {
        let addr =
            address_query("https://maps.example.com/?q=%E6%9D%B1%E4%BA%AC%E9%A7%85").unwrap();
        assert_eq!(addr, "東京駅");
        assert!(address_query("https://maps.example.com/?other=1").is_none());
        assert!(address_query("https://maps.example.com/?q=").is_none());
    }

    #[tokio::test]
    async fn geocode_success_builds_static_map() {
        let (strategy, geocoder, searcher) = strategy(Some((35.5, 139.5)), None);
        let resolution = strategy
            .resolve(&context("https://maps.example.com/?q=%E6%9D%B1%E4%BA%AC%E9%A7%85"))
            .await
            .unwrap();

        assert!(resolution.image_url.contains("center=35.5,139.5"));
        assert_eq!(resolution.label, "東京駅");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn geocode_miss_falls_back_to_image_search() {
        let (strategy, _, searcher) = strategy(None, Some("https://img.example.com/place.jpg"));
        let resolution = strategy
            .resolve(&context("https://maps.example.com/?q=%E6%9D%B1%E4%BA%AC%E9%A7%85"))
            .await
            .unwrap();

        assert_eq!(resolution.image_url, "https://img.example.com/place.jpg");
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_collaborators_missing_is_no_result() {
        let (strategy, _, _) = strategy(None, None);
        assert!(strategy
            .resolve(&context("https://maps.example.com/?q=somewhere"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn no_query_parameter_skips_collaborators_entirely() {
        let (strategy, geocoder, searcher) = strategy(Some((1.0, 2.0)), Some("x"));
        assert!(strategy
            .resolve(&context("https://example.com/plain"))
            .await
            .is_none());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 0);
    }
}
