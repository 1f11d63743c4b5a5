use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::world::character::SocketLayout;

const CONFIG_FILE: &str = "viewer.toml";

/// Endpoints and credentials for the platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the profile API, up to and including the platform
    /// path segment.
    pub platform_base: String,
    /// Base URL of the content store serving gear records and geometry.
    pub content_base: String,
    pub api_key: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            platform_base: "https://www.bungie.net/Platform/Destiny2/".to_string(),
            content_base: "https://www.bungie.net/common/destiny2_content/".to_string(),
            api_key: String::new(),
        }
    }
}

/// Camera parameters used when computing suggested placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    /// Extra framing headroom beyond an exact fit.
    pub fit_margin: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self { fov_degrees: 50.0, fit_margin: 1.5 }
    }
}

/// Top-level settings value, passed explicitly to constructors. No
/// global mutable state: two loaders with different settings can
/// coexist in one process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerSettings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub sockets: SocketLayout,
    #[serde(default)]
    pub camera: CameraSettings,
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "gcv", "gcv-rust").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Load settings from the platform config dir, if present and valid.
pub fn load_viewer_settings() -> Option<ViewerSettings> {
    let path = config_path()?;
    let contents = fs::read_to_string(&path).ok()?;
    match toml::from_str(&contents) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Ignoring unreadable settings file {:?}: {}", path, e);
            None
        }
    }
}

/// Persist settings to the platform config dir.
pub fn save_viewer_settings(settings: &ViewerSettings) -> std::io::Result<()> {
    let path = config_path()
        .ok_or_else(|| std::io::Error::other("no config directory available"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(&path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = ViewerSettings::default();
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let restored: ViewerSettings = toml::from_str(&serialized).unwrap();

        assert_eq!(restored.sockets, SocketLayout::default());
        assert_eq!(restored.camera.fov_degrees, 50.0);
        assert_eq!(restored.camera.fit_margin, 1.5);
        assert!(restored.api.platform_base.ends_with("/Destiny2/"));
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let restored: ViewerSettings =
            toml::from_str("[sockets]\nshader_first = 1\nshader_last = 2\nornament_first = 0\nornament_last = 0\n").unwrap();
        assert_eq!(restored.sockets.shader_first, 1);
        assert_eq!(restored.camera.fit_margin, 1.5);
    }
}
