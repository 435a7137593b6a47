use async_trait::async_trait;
use url::Url;

use super::{PageContext, Resolution, ResolveStrategy};
use crate::html::PageMeta;

/// Label preference for metadata-derived previews: site name, then page
/// title, then the final-URL host. No wrapper text.
fn derive_label(meta: &PageMeta, final_url: &str) -> String {
    meta.og_site_name
        .clone()
        .or_else(|| meta.og_title.clone())
        .or_else(|| meta.title.clone())
        .or_else(|| {
            Url::parse(final_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub struct OgImageStrategy;

#[async_trait]
impl ResolveStrategy for OgImageStrategy {
    fn name(&self) -> &'static str {
        "og_image"
    }

    async fn resolve(&self, page: &PageContext) -> Option<Resolution> {
        let image = page.meta.og_image.clone()?;
        Some(Resolution {
            image_url: image,
            label: derive_label(&page.meta, &page.final_url),
        })
    }
}

pub struct TwitterImageStrategy;

#[async_trait]
impl ResolveStrategy for TwitterImageStrategy {
    fn name(&self) -> &'static str {
        "twitter_image"
    }

    async fn resolve(&self, page: &PageContext) -> Option<Resolution> {
        let image = page.meta.twitter_image.clone()?;
        Some(Resolution {
            image_url: image,
            label: derive_label(&page.meta, &page.final_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchedPage;

    fn context(body: &str, final_url: &str) -> PageContext {
        PageContext::new(
            "https://example.com/page".to_string(),
            &FetchedPage {
                status: 200,
                final_url: final_url.to_string(),
                body: body.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn og_image_with_site_name_label() {
        let ctx = context(
            r#"
                <meta property="og:image" content="https://cdn.example.com/hero.jpg">
                <meta property="og:site_name" content="Example Cafe">
                <meta property="og:title" content="Menu">
            "#,
            "https://example.com/page",
        );
        let resolution = OgImageStrategy.resolve(&ctx).await.unwrap();
        assert_eq!(resolution.image_url, "https://cdn.example.com/hero.jpg");
        assert_eq!(resolution.label, "Example Cafe");
    }

    #[tokio::test]
    async fn label_falls_back_to_og_title_then_title_then_host() {
        let ctx = context(
            r#"
                <meta property="og:image" content="https://cdn.example.com/a.jpg">
                <meta property="og:title" content="Spot Guide">
            "#,
            "https://example.com/page",
        );
        assert_eq!(
            OgImageStrategy.resolve(&ctx).await.unwrap().label,
            "Spot Guide"
        );

        let ctx = context(
            r#"
                <meta property="og:image" content="https://cdn.example.com/a.jpg">
                <title>Page Title</title>
            "#,
            "https://example.com/page",
        );
        assert_eq!(
            OgImageStrategy.resolve(&ctx).await.unwrap().label,
            "Page Title"
        );

        let ctx = context(
            r#"<meta property="og:image" content="https://cdn.example.com/a.jpg">"#,
            "https://final.example.net/landed",
        );
        assert_eq!(
            OgImageStrategy.resolve(&ctx).await.unwrap().label,
            "final.example.net"
        );
    }

    #[tokio::test]
    async fn twitter_strategy_only_reads_twitter_image() {
        let ctx = context(
            r#"<meta name="twitter:image" content="https://cdn.example.com/card.png">"#,
            "https://example.com/page",
        );
        assert!(OgImageStrategy.resolve(&ctx).await.is_none());
        let resolution = TwitterImageStrategy.resolve(&ctx).await.unwrap();
        assert_eq!(resolution.image_url, "https://cdn.example.com/card.png");
    }

    #[tokio::test]
    async fn no_meta_no_resolution() {
        let ctx = context("<html><body>nothing</body></html>", "https://example.com");
        assert!(OgImageStrategy.resolve(&ctx).await.is_none());
        assert!(TwitterImageStrategy.resolve(&ctx).await.is_none());
    }
}
