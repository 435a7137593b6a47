use std::sync::Arc;

use tracing::{info, warn};

use crate::board::LinkSet;
use crate::extract::extract_links;
use crate::fetcher::PageFetcher;
use crate::resolve::{Resolver, ResolverSettings};
use crate::traits::{Geocoder, ImageSearcher, MessageSource};
use crate::validate::validate_image_links;

/// One-direction enrichment pipeline for a message batch:
/// fetch → extract+classify → HEAD-validate → resolve previews.
///
/// A refresh rebuilds the link set from scratch; callers must not overlap
/// two refreshes against the same set.
pub struct LinkPipeline {
    source: Arc<dyn MessageSource>,
    fetcher: Arc<dyn PageFetcher>,
    resolver: Resolver,
}

impl LinkPipeline {
    pub fn new(
        source: Arc<dyn MessageSource>,
        fetcher: Arc<dyn PageFetcher>,
        geocoder: Arc<dyn Geocoder>,
        searcher: Arc<dyn ImageSearcher>,
        settings: ResolverSettings,
    ) -> Self {
        let resolver = Resolver::new(Arc::clone(&fetcher), geocoder, searcher, settings);
        Self {
            source,
            fetcher,
            resolver,
        }
    }

    /// Run one full batch, optionally filtered to a single sender id.
    /// A message-source transport failure is treated as zero messages.
    pub async fn refresh(&self, filter_id: Option<&str>) -> LinkSet {
        let mut messages = match self.source.fetch(filter_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "Message fetch failed; treating batch as empty");
                Vec::new()
            }
        };

        // Newest first, matching the feed the cards are rendered from.
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut set = LinkSet::new(extract_links(&messages));
        info!(messages = messages.len(), links = set.len(), "Batch extracted");

        validate_image_links(&self.fetcher, set.records_mut()).await;
        self.resolver.resolve_batch(set.records_mut()).await;

        set
    }
}
