pub mod geocode;
pub mod map;
pub mod meta;
pub mod place;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use triplink_common::LinkRecord;

use crate::fetcher::{FetchedPage, PageFetcher};
use crate::html::{self, PageMeta};
use crate::traits::{Geocoder, ImageSearcher};

/// Outcome of one successful fallback stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub image_url: String,
    pub label: String,
}

/// One fetched page, parsed once, shared by every stage.
#[derive(Debug)]
pub struct PageContext {
    pub requested_url: String,
    pub final_url: String,
    pub meta: PageMeta,
}

impl PageContext {
    pub fn new(requested_url: String, page: &FetchedPage) -> Self {
        Self {
            requested_url,
            final_url: page.final_url.clone(),
            meta: html::extract_meta(&page.body),
        }
    }
}

/// One stage of the fallback chain. Stages are tried in chain order; the
/// first Some terminates the chain for that record. A stage swallows its own
/// transport errors and reports them as "no result".
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, page: &PageContext) -> Option<Resolution>;
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub static_map_base_url: String,
    /// Successful resolutions per batch; the counter moves on success, not
    /// on attempts.
    pub max_resolutions: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            static_map_base_url: "https://staticmap.openstreetmap.de/staticmap.php".to_string(),
            max_resolutions: 6,
        }
    }
}

/// Drives the fallback chain over a batch.
///
/// Records run sequentially to keep geocoding and search volume bounded;
/// stages within a record run strictly in order.
pub struct Resolver {
    fetcher: Arc<dyn PageFetcher>,
    strategies: Vec<Box<dyn ResolveStrategy>>,
    max_resolutions: usize,
}

impl Resolver {
    /// Standard chain: og:image → twitter:image → map coordinates →
    /// geocoded address with image-search fallback.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        geocoder: Arc<dyn Geocoder>,
        searcher: Arc<dyn ImageSearcher>,
        settings: ResolverSettings,
    ) -> Self {
        let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(meta::OgImageStrategy),
            Box::new(meta::TwitterImageStrategy),
            Box::new(map::MapCoordinateStrategy::new(
                settings.static_map_base_url.clone(),
            )),
            Box::new(geocode::GeocodedAddressStrategy::new(
                geocoder,
                searcher,
                settings.static_map_base_url.clone(),
            )),
        ];

        Self {
            fetcher,
            strategies,
            max_resolutions: settings.max_resolutions,
        }
    }

    /// Custom chain, for reordering or extension without touching call sites.
    pub fn with_strategies(
        fetcher: Arc<dyn PageFetcher>,
        strategies: Vec<Box<dyn ResolveStrategy>>,
        max_resolutions: usize,
    ) -> Self {
        Self {
            fetcher,
            strategies,
            max_resolutions,
        }
    }

    /// Resolve previews for every eligible record in the batch, stopping
    /// after `max_resolutions` successes. A record whose GET or chain fails
    /// is left unresolved; siblings are unaffected.
    pub async fn resolve_batch(&self, records: &mut [LinkRecord]) {
        let mut resolved = 0;

        for idx in 0..records.len() {
            if resolved >= self.max_resolutions {
                break;
            }
            if !records[idx].needs_preview() {
                continue;
            }

            let url = records[idx].url.clone();
            let page = match self.fetcher.get(&url).await {
                Ok(page) if page.is_success() => page,
                Ok(page) => {
                    debug!(url = %url, status = page.status, "Preview GET returned non-success");
                    continue;
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Preview GET failed");
                    continue;
                }
            };

            let context = PageContext::new(url, &page);

            for strategy in &self.strategies {
                if let Some(resolution) = strategy.resolve(&context).await {
                    info!(
                        url = %context.requested_url,
                        strategy = strategy.name(),
                        image = %resolution.image_url,
                        label = %resolution.label,
                        "Preview resolved"
                    );
                    records[idx].preview_image_url = Some(resolution.image_url);
                    records[idx].preview_image_source = Some(resolution.label);
                    resolved += 1;
                    break;
                }
            }
        }
    }
}
