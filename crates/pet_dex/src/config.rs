use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bevy::prelude::Resource;
use reorder_grid::GridConfig;
use serde::{Deserialize, Serialize};
use sprite_recolor::RecolorThresholds;

use crate::photo::PhotoLimits;

pub const CONFIG_FILE: &str = "pet_dex.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Roster file for native builds. Ignored on the web, which keeps the
    /// roster in `localStorage`.
    pub path: PathBuf,
    /// Sync through the shared table instead of the local file.
    pub sync_pin: Option<String>,
    pub sync_table: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("save/pet_dex.json"),
            sync_pin: None,
            sync_table: PathBuf::from("save/sync_table.json"),
        }
    }
}

/// Everything tunable, read once at startup. Any field may be left out.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    pub grid: GridConfig,
    pub recolor: RecolorThresholds,
    pub store: StoreConfig,
    pub photo: PhotoLimits,
}

impl DexConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
