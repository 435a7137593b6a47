use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{PageContext, Resolution, ResolveStrategy};

/// Map-style coordinate patterns in share URLs: `@lat,lon,zoom`,
/// `?q=lat,lon`, `?ll=lat,lon`.
static COORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"@([0-9+\-.]+),([0-9+\-.]+),",
        r"[?&]q=([0-9+\-.]+),([0-9+\-.]+)",
        r"[?&]ll=([0-9+\-.]+),([0-9+\-.]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Extract a coordinate pair from a (post-redirect) URL string.
pub fn extract_coordinates(url: &str) -> Option<(f64, f64)> {
    for pattern in COORD_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(url) {
            let lat: f64 = match caps[1].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let lon: f64 = match caps[2].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            return Some((lat, lon));
        }
    }
    None
}

/// Pre-rendered map tile centered on the coordinate, with a marker.
pub fn static_map_url(base_url: &str, lat: f64, lon: f64) -> String {
    format!("{base_url}?center={lat},{lon}&zoom=15&size=600x300&markers={lat},{lon},red-pushpin")
}

/// Display label for a coordinate-only preview.
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("地図 {lat:.5},{lon:.5}")
}

/// Stage 3: a coordinate pair embedded in the final URL becomes a static-map
/// preview. Purely syntactic, no network.
pub struct MapCoordinateStrategy {
    static_map_base_url: String,
}

impl MapCoordinateStrategy {
    pub fn new(static_map_base_url: String) -> Self {
        Self {
            static_map_base_url,
        }
    }
}

#[async_trait]
impl ResolveStrategy for MapCoordinateStrategy {
    fn name(&self) -> &'static str {
        "map_coordinates"
    }

    async fn resolve(&self, page: &PageContext) -> Option<Resolution> {
        let (lat, lon) = extract_coordinates(&page.final_url)?;
        Some(Resolution {
            image_url: static_map_url(&self.static_map_base_url, lat, lon),
            label: coordinate_label(lat, lon),
        })
    }
}
