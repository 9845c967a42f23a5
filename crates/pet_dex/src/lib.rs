//! PET-DEX: a handheld-styled tracker for a small collection of pets.
//!
//! The roster and its care logic live in plain modules that know nothing
//! about Bevy; [`ui`] puts them on screen with the reorderable card grid
//! and the sprite recolor plugin.

use std::path::Path;

use anyhow::Context as _;
use bevy::prelude::*;
use reorder_grid::ReorderGridPlugin;
use sprite_recolor::RecolorPlugin;

pub mod config;
pub mod dates;
pub mod error;
pub mod logs;
pub mod meds;
pub mod model;
pub mod photo;
pub mod roster;
pub mod sprites;
pub mod store;
pub mod ui;

pub use config::DexConfig;
pub use error::{PhotoError, RosterError, StoreError};
pub use model::{AnimalProfile, Species};
pub use roster::Roster;
pub use store::PetStore;

/// Picks where the roster is kept for this build and configuration.
pub fn open_store(config: &DexConfig) -> anyhow::Result<Box<dyn PetStore>> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        Ok(Box::new(store::LocalStorageStore))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let backend: Box<dyn PetStore> = match &config.store.sync_pin {
            Some(pin) => {
                let pin = store::SyncPin::parse(pin).context("invalid sync pin in config")?;
                info!("Syncing roster for pin {}", pin.as_str());
                let table = store::FileTable::new(&config.store.sync_table);
                Box::new(store::PinSyncStore::new(table, pin))
            }
            None => Box::new(store::FileStore::new(&config.store.path)),
        };
        Ok(backend)
    }
}

/// Loads the saved roster, or the starter roster when nothing is saved yet.
pub fn load_roster(store: &dyn PetStore) -> Roster {
    let mut roster = match store.load() {
        Ok(Some(roster)) => roster,
        Ok(None) => Roster::default(),
        Err(err) => {
            error!("Failed to load saved roster, starting fresh: {err}");
            Roster::default()
        }
    };
    roster.normalize();
    roster
}

fn build_app(config: DexConfig, store: Box<dyn PetStore>) -> App {
    let roster = load_roster(store.as_ref());
    let mut app = dex_helpers::get_default_app("PET-DEX");
    app.add_plugins((
        ReorderGridPlugin::<String>::new(config.grid.clone()),
        RecolorPlugin {
            thresholds: config.recolor.clone(),
        },
    ))
    .insert_resource(ui::Dex(roster))
    .insert_resource(ui::Store(store))
    .insert_resource(config)
    .add_plugins(ui::DexUiPlugin);
    app
}

pub fn run() -> anyhow::Result<()> {
    let config = DexConfig::load(Path::new(config::CONFIG_FILE))?;
    let store = open_store(&config)?;
    build_app(config, store).run();
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn first_launch_gets_the_starter_roster() {
        let roster = load_roster(&MemoryStore::default());
        assert_eq!(roster, Roster::default());
    }

    #[test]
    fn sync_pin_must_be_valid() {
        let mut config = DexConfig::default();
        config.store.sync_pin = Some("ab".into());
        let err = open_store(&config).err().unwrap();
        assert!(err.to_string().contains("sync pin"));
    }
}
