use std::sync::LazyLock;

use regex::Regex;

/// 3-4 digit postal code, hyphenated or not.
static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3}-?[0-9]{4}").expect("valid regex"));

/// `+` separators from percent-decoded queries and ideographic spaces both
/// act as token breaks.
static PLUS_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\u{3000}]+").expect("valid regex"));

static PURE_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

/// Reduce a decoded address to a short search term: strip the postal mark
/// and postal codes, then keep the first ≤4 non-empty tokens.
pub fn place_term(address: &str) -> String {
    let s = address.replace('〒', "").replace('−', "-");
    let s = POSTAL_CODE_RE.replace_all(&s, "");
    let s = PLUS_SPACE_RE.replace_all(&s, " ");

    s.trim()
        .split([' ', ','])
        .filter(|t| !t.is_empty())
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a place or address string for display: drop parenthetical and
/// comma-suffixed segments, strip the literal address marker, then keep the
/// trailing 2-3 tokens that are not purely numeric. Falls back to the raw
/// trailing tokens when every one is numeric.
pub fn format_place_label(raw: &str) -> String {
    let s = raw.replace('〒', "");
    let s = POSTAL_CODE_RE.replace_all(&s, "").into_owned();

    let s = match s.find('(') {
        Some(idx) => &s[..idx],
        None => s.as_str(),
    };
    let s = match s.find(',') {
        Some(idx) => &s[..idx],
        None => s,
    };
    let s = s.replace("住所", "");
    let s = s.trim();

    let tokens: Vec<&str> = s
        .split([' ', '/', ',', '、', '\u{3000}'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return s.to_string();
    }

    let tail: Vec<&str> = tokens[tokens.len().saturating_sub(3)..].to_vec();
    let non_numeric: Vec<&str> = tail
        .iter()
        .copied()
        .filter(|t| !PURE_DIGITS_RE.is_match(t))
        .collect();

    if non_numeric.is_empty() {
        tail.join(" ")
    } else {
        non_numeric.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_term_strips_postal_and_caps_tokens() {
        let term = place_term("〒358-0014 埼玉県入間市宮寺 1 2 3 4");
        let tokens: Vec<&str> = term.split(' ').collect();
        assert!(tokens.len() <= 4);
        assert!(!term.contains('〒'));
        assert!(!term.contains("358-0014"));
        assert_eq!(tokens[0], "埼玉県入間市宮寺");
    }

    #[test]
    fn place_term_breaks_on_plus_and_ideographic_space() {
        assert_eq!(place_term("東京都+千代田区"), "東京都 千代田区");
        assert_eq!(place_term("東京都\u{3000}千代田区"), "東京都 千代田区");
    }

    #[test]
    fn place_term_of_empty_is_empty() {
        assert_eq!(place_term(""), "");
        assert_eq!(place_term("〒358-0014"), "");
    }

    #[test]
    fn label_drops_parenthetical_and_comma_suffix() {
        assert_eq!(format_place_label("Example Cafe (Shinjuku)"), "Example Cafe");
        assert_eq!(format_place_label("Example Cafe, Tokyo, Japan"), "Example Cafe");
    }

    #[test]
    fn label_strips_address_marker() {
        assert_eq!(format_place_label("住所 東京都千代田区"), "東京都千代田区");
    }

    #[test]
    fn label_keeps_trailing_non_numeric_tokens() {
        assert_eq!(
            format_place_label("日本 埼玉県 入間市 宮寺 123"),
            "入間市 宮寺"
        );
    }

    #[test]
    fn label_falls_back_to_raw_tail_when_all_numeric() {
        assert_eq!(format_place_label("1 2 3"), "1 2 3");
    }

    #[test]
    fn label_of_postal_only_string_is_empty() {
        assert_eq!(format_place_label("〒358-0014"), "");
    }
}
