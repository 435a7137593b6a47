use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nominatim_client::NominatimClient;
use relay_client::RelayClient;
use triplink_common::Config;
use triplink_links::{HttpFetcher, LinkPipeline, ResolverSettings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("triplink_links=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    let relay = Arc::new(RelayClient::new(
        &config.relay_base_url,
        config.channel_token.as_deref(),
    ));
    let nominatim = Arc::new(NominatimClient::new(
        &config.nominatim_base_url,
        &config.geocode_country,
        &config.geocode_language,
        &config.user_agent,
    ));
    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent));

    let pipeline = LinkPipeline::new(
        relay.clone(),
        fetcher,
        nominatim,
        relay,
        ResolverSettings {
            static_map_base_url: config.static_map_base_url.clone(),
            max_resolutions: config.max_preview_fetches,
        },
    );

    let board = pipeline.refresh(None).await;
    info!(links = board.len(), "Refresh complete");

    for record in board.records() {
        info!(
            url = %record.url,
            from = %record.source_user,
            is_image = record.is_image,
            preview = record.preview_image_url.as_deref().unwrap_or("-"),
            label = record.preview_image_source.as_deref().unwrap_or("-"),
            "link"
        );
    }

    Ok(())
}
