use std::env;

/// Application configuration loaded from environment variables.
///
/// Every client takes the values it needs at construction; nothing reads the
/// environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Message relay API
    pub relay_base_url: String,
    /// Messaging channel token for outbound sends. Optional: reads work
    /// without it, `send_message` fails with a typed error.
    pub channel_token: Option<String>,

    // Geocoding
    pub nominatim_base_url: String,
    /// ISO country code passed as `countrycodes` on the first attempt.
    pub geocode_country: String,
    /// Language passed as `accept-language` for localized place names.
    pub geocode_language: String,

    // Static map tiles
    pub static_map_base_url: String,

    // Outbound identification
    pub user_agent: String,

    // Pipeline tuning
    pub max_preview_fetches: usize,
    pub candidate_cap: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            relay_base_url: required_env("RELAY_BASE_URL"),
            channel_token: env::var("CHANNEL_TOKEN").ok().filter(|t| !t.is_empty()),
            nominatim_base_url: env::var("NOMINATIM_BASE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocode_country: env::var("GEOCODE_COUNTRY").unwrap_or_else(|_| "jp".to_string()),
            geocode_language: env::var("GEOCODE_LANGUAGE").unwrap_or_else(|_| "ja".to_string()),
            static_map_base_url: env::var("STATIC_MAP_BASE_URL")
                .unwrap_or_else(|_| "https://staticmap.openstreetmap.de/staticmap.php".to_string()),
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "triplink/0.1 (link preview)".to_string()),
            max_preview_fetches: env::var("MAX_PREVIEW_FETCHES")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("MAX_PREVIEW_FETCHES must be a number"),
            candidate_cap: env::var("CANDIDATE_CAP")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("CANDIDATE_CAP must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
