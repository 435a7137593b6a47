use scraper::{Html, Selector};

/// Preview-relevant metadata pulled from one HTML document.
/// First occurrence of each tag wins.
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    pub og_image: Option<String>,
    pub og_site_name: Option<String>,
    pub og_title: Option<String>,
    pub twitter_image: Option<String>,
    pub title: Option<String>,
}

/// Parse `og:*` / `twitter:*` meta tags and the `<title>` fallback.
/// Sites disagree on `property` vs `name`, so both attributes are accepted
/// for every key.
pub fn extract_meta(html: &str) -> PageMeta {
    let document = Html::parse_document(html);
    let meta_selector = Selector::parse("meta[content]").expect("valid selector");
    let title_selector = Selector::parse("title").expect("valid selector");

    let mut meta = PageMeta::default();

    for element in document.select(&meta_selector) {
        let attrs = element.value();
        let Some(key) = attrs.attr("property").or_else(|| attrs.attr("name")) else {
            continue;
        };
        let Some(content) = attrs.attr("content").map(str::trim).filter(|c| !c.is_empty())
        else {
            continue;
        };

        match key {
            "og:image" if meta.og_image.is_none() => meta.og_image = Some(content.to_string()),
            "og:site_name" if meta.og_site_name.is_none() => {
                meta.og_site_name = Some(content.to_string())
            }
            "og:title" if meta.og_title.is_none() => meta.og_title = Some(content.to_string()),
            "twitter:image" if meta.twitter_image.is_none() => {
                meta.twitter_image = Some(content.to_string())
            }
            _ => {}
        }
    }

    if let Some(element) = document.select(&title_selector).next() {
        let text: String = element.text().collect::<Vec<_>>().join(" ");
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            meta.title = Some(trimmed.to_string());
        }
    }

    meta
}

/// Every `<img src>` attribute value, in document order, raw (possibly
/// relative). Empty values are dropped.
pub fn extract_image_sources(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let img_selector = Selector::parse("img[src]").expect("valid selector");

    document
        .select(&img_selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect()
}
