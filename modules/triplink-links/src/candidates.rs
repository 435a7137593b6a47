use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use triplink_common::LinkRecord;

use crate::fetcher::PageFetcher;
use crate::html::{extract_image_sources, extract_meta};
use crate::traits::ImageSearcher;

/// Collects multiple preview candidates for one link, for manual selection.
///
/// Never mutates the record; callers apply a chosen candidate explicitly
/// through the link set's override entry point.
pub struct CandidateGatherer {
    fetcher: Arc<dyn PageFetcher>,
    searcher: Arc<dyn ImageSearcher>,
    cap: usize,
}

impl CandidateGatherer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, searcher: Arc<dyn ImageSearcher>, cap: usize) -> Self {
        Self {
            fetcher,
            searcher,
            cap,
        }
    }

    /// Gather up to `cap` candidate image URLs: `og:image`, `twitter:image`,
    /// then every `<img src>` in document order, absolutized against the
    /// page's final URL and deduplicated first-seen. When the page yields
    /// fewer than `cap` and a query is supplied, the image search is
    /// consulted once for one extra candidate.
    pub async fn gather(&self, record: &LinkRecord, query: Option<&str>) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();

        match self.fetcher.get(&record.url).await {
            Ok(page) if page.is_success() => {
                let base = Url::parse(&page.final_url).ok();
                let meta = extract_meta(&page.body);

                for raw in meta.og_image.iter().chain(meta.twitter_image.iter()) {
                    if let Some(abs) = absolutize(raw, base.as_ref()) {
                        candidates.push(abs);
                    }
                }
                for raw in extract_image_sources(&page.body) {
                    if let Some(abs) = absolutize(&raw, base.as_ref()) {
                        candidates.push(abs);
                    }
                }
            }
            Ok(page) => {
                debug!(url = %record.url, status = page.status, "Candidate GET returned non-success");
            }
            Err(e) => {
                warn!(url = %record.url, error = %e, "Candidate GET failed");
            }
        }

        let mut seen = HashSet::new();
        let mut result: Vec<String> = candidates
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .take(self.cap)
            .collect();

        if result.len() < self.cap {
            if let Some(q) = query.filter(|q| !q.is_empty()) {
                match self.searcher.search_image(q).await {
                    Ok(Some(image_url)) => {
                        if !result.contains(&image_url) {
                            result.push(image_url);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(query = q, error = %e, "Candidate image search failed");
                    }
                }
            }
        }

        result.truncate(self.cap);
        result
    }
}

/// Resolve a possibly-relative image reference to an absolute URL.
/// `Url::join` covers scheme-relative (`//cdn...`), root-relative, and
/// relative-path forms.
fn absolutize(raw: &str, base: Option<&Url>) -> Option<String> {
    if let Ok(url) = Url::parse(raw) {
        return Some(url.to_string());
    }
    base?.join(raw).ok().map(|u| u.to_string())
}
