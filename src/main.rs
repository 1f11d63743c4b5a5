use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use url::Url;

use gcv_rust::assets::{ContentStore, GearAssetStore, GearAssetTable, RemoteDefinitionStore};
use gcv_rust::config::load_viewer_settings;
use gcv_rust::networking::{
    BungieProfileClient, ContentGeometryClient, StaticTokenProvider,
};
use gcv_rust::utils::logging::init_logging;
use gcv_rust::utils::TracingSink;
use gcv_rust::{CharacterLoader, ManifestLookup};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let mut settings = load_viewer_settings().unwrap_or_default();
    if let Ok(api_key) = env::var("GCV_API_KEY") {
        settings.api.api_key = api_key;
    }
    if settings.api.api_key.is_empty() {
        bail!("no API key configured; set GCV_API_KEY or the settings file");
    }

    let token = env::var("GCV_TOKEN").context("GCV_TOKEN not set")?;
    let membership_type: i32 = env::var("GCV_MEMBERSHIP_TYPE")
        .context("GCV_MEMBERSHIP_TYPE not set")?
        .parse()
        .context("GCV_MEMBERSHIP_TYPE is not a number")?;
    let membership_id = env::var("GCV_MEMBERSHIP_ID").context("GCV_MEMBERSHIP_ID not set")?;
    let character_id = env::var("GCV_CHARACTER_ID").context("GCV_CHARACTER_ID not set")?;

    info!("{} {} starting", gcv_rust::APP_NAME, gcv_rust::VERSION);

    let http = reqwest::Client::new();
    let platform_base = Url::parse(&settings.api.platform_base).context("bad platform base URL")?;
    let content_base = Url::parse(&settings.api.content_base).context("bad content base URL")?;

    let credentials = Arc::new(StaticTokenProvider::new(token));
    let profile = Arc::new(BungieProfileClient::new(
        http.clone(),
        platform_base.clone(),
        settings.api.api_key.clone(),
        credentials,
    ));
    let geometry = Arc::new(ContentGeometryClient::new(http.clone(), content_base.clone()));

    // Store chain: local table first when an export is on disk, then
    // the content store, then the remote definition endpoint.
    let mut stores: Vec<Box<dyn GearAssetStore>> = Vec::new();
    if let Ok(path) = env::var("GCV_GEAR_TABLE") {
        let data = std::fs::read(&path).with_context(|| format!("reading gear table {path}"))?;
        let table = GearAssetTable::from_json_slice(&data)
            .with_context(|| format!("parsing gear table {path}"))?;
        info!("local gear table loaded: {} record(s)", table.len());
        stores.push(Box::new(table));
    }
    stores.push(Box::new(ContentStore::new(http.clone(), content_base)));
    stores.push(Box::new(RemoteDefinitionStore::new(
        http,
        platform_base,
        settings.api.api_key.clone(),
    )));

    let manifest = Arc::new(ManifestLookup::new(stores));
    let loader = CharacterLoader::new(
        profile,
        geometry,
        manifest.clone(),
        &settings,
        Arc::new(TracingSink),
    );

    let loaded = loader
        .load_character(membership_type, &membership_id, &character_id)
        .await?;

    println!(
        "{:?} {:?} {:?} (light {})",
        loaded.character.class_type,
        loaded.character.gender_type,
        loaded.character.race_type,
        loaded.character.light
    );
    for piece in &loaded.pieces {
        println!(
            "  {:?}: item {}: {:?} dyes, {} material slot(s), scale {:.2}, camera {:.2}",
            piece.slot,
            piece.item_hash,
            piece.model.material_slots.first().map(|m| m.dyes.origin),
            piece.model.material_slots.len(),
            piece.model.placement.scale,
            piece.model.placement.camera_distance,
        );
    }
    for skip in &loaded.skipped {
        println!("  {:?}: item {} skipped ({})", skip.slot, skip.item_hash, skip.reason);
    }

    let stats = manifest.stats().await;
    info!(
        "manifest: {} request(s), {} cache hit(s), {} chain walk(s)",
        stats.requests, stats.cache_hits, stats.chain_walks
    );

    Ok(())
}
