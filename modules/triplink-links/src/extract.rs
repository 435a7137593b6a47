use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use triplink_common::{LinkRecord, RawMessage};

/// Candidate URL scan. Message text is mixed-script chat, so the class stops
/// at whitespace (including the ideographic space), angle brackets, quotes,
/// and CJK closers rather than assuming ASCII word boundaries.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"'」』）】]+"#).expect("valid regex"));

/// Punctuation a sentence can append to a URL without being part of it.
const TRAILING: &[char] = &[
    '.', ',', ';', ':', '!', '?', ']', '}', '、', '。', '！', '？',
];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "heic", "heif"];

/// Extract one LinkRecord per URL occurrence across the batch, preserving
/// message order then intra-message match order. No dedup, no network; zero
/// matches yields an empty vec.
pub fn extract_links(messages: &[RawMessage]) -> Vec<LinkRecord> {
    let mut records = Vec::new();

    for msg in messages {
        for m in URL_RE.find_iter(&msg.text) {
            let Some(candidate) = trim_trailing(m.as_str()) else {
                continue;
            };
            // Validate syntax; the scan is permissive on purpose.
            if Url::parse(candidate).is_err() {
                continue;
            }

            let mut record = LinkRecord::new(
                candidate,
                msg.user_name.clone(),
                msg.user_id.clone(),
                msg.timestamp,
            );
            record.is_image = has_image_extension(candidate);
            records.push(record);
        }
    }

    records
}

/// Cheap direct-image heuristic: final path segment extension, lower-cased.
pub fn has_image_extension(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(last) = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
    else {
        return false;
    };
    let Some((stem, ext)) = last.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Strip sentence punctuation from the end of a match. A trailing `)` is
/// only stripped when unbalanced, so map URLs with parenthesized segments
/// survive.
fn trim_trailing(mut s: &str) -> Option<&str> {
    loop {
        let last = s.chars().next_back()?;
        if TRAILING.contains(&last) {
            s = &s[..s.len() - last.len_utf8()];
            continue;
        }
        if last == ')' && s.matches(')').count() > s.matches('(').count() {
            s = &s[..s.len() - 1];
            continue;
        }
        return Some(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> RawMessage {
        RawMessage {
            id: None,
            group_id: None,
            user_id: Some("u1".to_string()),
            text: text.to_string(),
            user_name: "Aki".to_string(),
            timestamp: 1_700_000_000_000,
            created_at: None,
        }
    }

    #[test]
    fn no_urls_yields_empty() {
        let records = extract_links(&[msg("今日は楽しかったね、また行こう！")]);
        assert!(records.is_empty());
    }

    #[test]
    fn extracts_url_from_japanese_text() {
        let records = extract_links(&[msg("ここ行きたい https://example.com/spot 楽しみ")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/spot");
        assert_eq!(records[0].source_user, "Aki");
        assert_eq!(records[0].source_user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn preserves_message_then_match_order() {
        let records = extract_links(&[
            msg("first https://a.example.com then https://b.example.com"),
            msg("later https://c.example.com"),
        ]);
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://a.example.com",
                "https://b.example.com",
                "https://c.example.com"
            ]
        );
    }

    #[test]
    fn duplicate_occurrences_are_kept_independent() {
        let records = extract_links(&[
            msg("see https://example.com/page"),
            msg("again https://example.com/page"),
        ]);
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn trailing_punctuation_is_trimmed() {
        let records = extract_links(&[msg("見て！https://example.com/page。")]);
        assert_eq!(records[0].url, "https://example.com/page");

        let records = extract_links(&[msg("(see https://example.com/page)")]);
        assert_eq!(records[0].url, "https://example.com/page");
    }

    #[test]
    fn balanced_parens_survive() {
        let records = extract_links(&[msg("https://en.example.org/wiki/Rust_(language)")]);
        assert_eq!(records[0].url, "https://en.example.org/wiki/Rust_(language)");
    }

    #[test]
    fn image_extension_sets_is_image() {
        let records = extract_links(&[msg("photo https://example.com/photo.JPG and page https://example.com/page")]);
        assert!(records[0].is_image);
        assert!(!records[1].is_image);
    }

    #[test]
    fn classifier_cases() {
        assert!(has_image_extension("https://example.com/a.png"));
        assert!(has_image_extension("https://example.com/dir/b.webp?x=1"));
        assert!(has_image_extension("https://example.com/c.HEIC"));
        assert!(!has_image_extension("https://example.com/archive.tar.gz"));
        assert!(!has_image_extension("https://example.com/noext"));
        assert!(!has_image_extension("https://example.com/"));
        assert!(!has_image_extension("https://example.com/.png"));
        assert!(!has_image_extension("not a url"));
    }

    #[test]
    fn scheme_is_case_tolerant_in_classifier() {
        assert!(has_image_extension("HTTPS://example.com/a.jpg"));
    }
}
