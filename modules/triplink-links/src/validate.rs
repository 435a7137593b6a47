use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use triplink_common::LinkRecord;

use crate::fetcher::PageFetcher;

/// Refine image classification with one HEAD per unclassified record.
///
/// All requests for the batch dispatch concurrently (batches are tens of
/// links, not thousands); each task resolves to the record index when the
/// Content-Type proves an image, and the indices are applied serially after
/// the join so no completion can clobber another. Timeouts, errors, and
/// non-2xx are inconclusive: no state change, no retry. Records already
/// classified are skipped without issuing a request.
pub async fn validate_image_links(fetcher: &Arc<dyn PageFetcher>, records: &mut [LinkRecord]) {
    let mut tasks = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        if record.is_image {
            continue;
        }
        let url = record.url.clone();
        let fetcher = Arc::clone(fetcher);

        tasks.push(async move {
            match fetcher.head(&url).await {
                Ok(head) if head.is_success() => {
                    let is_image = head
                        .content_type
                        .as_deref()
                        .map(|ct| ct.starts_with("image/"))
                        .unwrap_or(false);
                    if is_image {
                        debug!(url = %url, "HEAD indicates image");
                        Some(idx)
                    } else {
                        None
                    }
                }
                Ok(head) => {
                    debug!(url = %url, status = head.status, "HEAD inconclusive");
                    None
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "HEAD failed");
                    None
                }
            }
        });
    }

    for idx in join_all(tasks).await.into_iter().flatten() {
        records[idx].is_image = true;
    }
}
