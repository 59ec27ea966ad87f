use std::sync::Arc;

use gloo_storage::Storage;
use tripmap_shared::{FeatureCollection, GeoRegistry, NavigatorConfig, RegionTable};

pub const BOUNDARY_URL: &str = "/data/skorea-provinces-2018-geo.json";
pub const CONFIG_STORAGE_KEY: &str = "tripmap_navigator_config";

#[derive(Clone)]
pub struct LoadedMap {
    pub registry: Arc<GeoRegistry>,
    pub config: NavigatorConfig,
}

/// Fetch the province boundary dataset.
pub async fn fetch_boundaries() -> Result<FeatureCollection, String> {
    let resp = gloo_net::http::Request::get(BOUNDARY_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    let body = resp.text().await.map_err(|e| format!("read error: {e}"))?;
    FeatureCollection::from_json(&body).map_err(|e| format!("parse error: {e}"))
}

/// Navigator config with an optional local-storage override applied.
/// An invalid override is logged and ignored.
pub fn load_config() -> NavigatorConfig {
    let raw = match gloo_storage::LocalStorage::raw().get_item(CONFIG_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return NavigatorConfig::default(),
        Err(err) => {
            tracing::warn!(?err, "local storage unavailable; using default config");
            return NavigatorConfig::default();
        }
    };
    match NavigatorConfig::from_json(&raw) {
        Ok(config) => {
            tracing::info!("using navigator config override from local storage");
            config
        }
        Err(err) => {
            tracing::warn!(%err, key = CONFIG_STORAGE_KEY, "ignoring invalid config override");
            NavigatorConfig::default()
        }
    }
}

pub async fn load_map() -> Result<LoadedMap, String> {
    let config = load_config();
    let table = RegionTable::bundled().map_err(|e| e.to_string())?;
    let boundaries = fetch_boundaries().await?;
    let registry = GeoRegistry::build(table, boundaries).map_err(|e| e.to_string())?;
    Ok(LoadedMap {
        registry: Arc::new(registry),
        config,
    })
}
