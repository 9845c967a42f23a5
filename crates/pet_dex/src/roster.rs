use chrono::NaiveDate;
use reorder_grid::order::is_permutation;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::{born_on, iso};
use crate::error::RosterError;
use crate::logs::SUBSTRATE_TYPES;
use crate::model::{AnimalProfile, BeetleStage, HealthLogEntry, HealthLogType, Sex, Species};

pub const GECKO_IMAGE: &str = "/images/gecko-sprite.png";
pub const BEETLE_IMAGE: &str = "/images/beetle-sprite.png";
pub const DOG_IMAGE: &str = "/images/dog-sprite.png";

/// Every animal in display order, plus the counters handing out ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub animals: Vec<AnimalProfile>,
    pub next_id: u32,
    pub next_dex_number: u32,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            animals: vec![sample_animal()],
            next_id: 2,
            next_dex_number: 2,
        }
    }
}

fn sample_animal() -> AnimalProfile {
    let log = [
        (HealthLogType::Vet, "VET: 01/15 - CHECKUP OK"),
        (HealthLogType::Meds, "MEDS: None"),
        (HealthLogType::Vet, "VET: 06/20 - SHED ISSUE"),
        (HealthLogType::Meds, "MEDS: VIT-A DROPS x7D"),
        (HealthLogType::Vet, "VET: 12/02 - ALL CLEAR"),
        (HealthLogType::Meds, "MEDS: None"),
    ];
    AnimalProfile {
        id: "1".into(),
        dex_number: 1,
        name: "MANGO".into(),
        sex: Sex::Unknown,
        species: Species::LeopardGecko,
        morph: "TANGERINE".into(),
        born: "15/03/23".into(),
        weight: "62".into(),
        last_feed: "2026-02-12".into(),
        last_shed: "2026-01-28".into(),
        last_water_change: None,
        health_log: log
            .iter()
            .zip(1..)
            .map(|((kind, text), id)| HealthLogEntry {
                id: id.to_string(),
                kind: *kind,
                text: (*text).to_owned(),
            })
            .collect(),
        prescriptions: Vec::new(),
        weight_history: Vec::new(),
        image: GECKO_IMAGE.into(),
        custom_photo: None,
        subspecies: None,
        beetle_colors: None,
        gecko_colors: None,
        stage: None,
        substrate: None,
        last_substrate_change: None,
    }
}

/// A fresh profile for `species`, born today.
pub fn new_animal(
    species: &Species,
    id: String,
    dex_number: u32,
    today: NaiveDate,
) -> AnimalProfile {
    let mut profile = AnimalProfile {
        id,
        dex_number,
        name: "NEW GECKO".into(),
        sex: Sex::Unknown,
        species: species.clone(),
        morph: "NORMAL".into(),
        born: born_on(today),
        weight: "0".into(),
        last_feed: iso(today),
        last_shed: iso(today),
        image: GECKO_IMAGE.into(),
        ..sample_animal()
    };
    profile.health_log.clear();
    match species {
        Species::RhinoBeetle => {
            profile.name = "NEW BEETLE".into();
            profile.morph = String::new();
            profile.image = BEETLE_IMAGE.into();
            profile.stage = Some(BeetleStage::Larva);
            profile.substrate = Some(SUBSTRATE_TYPES[0].into());
            profile.last_substrate_change = Some(iso(today));
        }
        Species::Dog => {
            profile.name = "NEW DOG".into();
            profile.morph = String::new();
            profile.image = DOG_IMAGE.into();
        }
        Species::LeopardGecko | Species::Other(_) => {}
    }
    profile
}

impl Roster {
    pub fn get(&self, id: &str) -> Option<&AnimalProfile> {
        self.animals.iter().find(|animal| animal.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AnimalProfile> {
        self.animals.iter_mut().find(|animal| animal.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.animals.iter().map(|animal| animal.id.clone()).collect()
    }

    /// Appends a new animal and returns its id.
    pub fn add(&mut self, species: &Species, today: NaiveDate) -> String {
        self.normalize();
        let id = self.next_id.to_string();
        let animal = new_animal(species, id.clone(), self.next_dex_number, today);
        self.next_id = self.next_id.saturating_add(1);
        self.next_dex_number = self.next_dex_number.saturating_add(1);
        debug!("added {} {}", animal.species, animal.dex_label());
        self.animals.push(animal);
        id
    }

    pub fn remove(&mut self, id: &str) -> Result<AnimalProfile, RosterError> {
        let index = self
            .animals
            .iter()
            .position(|animal| animal.id == id)
            .ok_or_else(|| RosterError::UnknownAnimal(id.to_owned()))?;
        Ok(self.animals.remove(index))
    }

    /// Replaces the stored profile with the same id.
    pub fn update(&mut self, profile: AnimalProfile) -> Result<(), RosterError> {
        let slot = self
            .get_mut(&profile.id)
            .ok_or_else(|| RosterError::UnknownAnimal(profile.id.clone()))?;
        *slot = profile;
        Ok(())
    }

    /// Puts the animals in the order of `ids`, which must name each animal
    /// exactly once.
    pub fn reorder(&mut self, ids: &[String]) -> Result<(), RosterError> {
        if !is_permutation(&self.ids(), ids) {
            return Err(RosterError::NotAPermutation);
        }
        let mut animals = std::mem::take(&mut self.animals);
        self.animals = ids
            .iter()
            .filter_map(|id| {
                let index = animals.iter().position(|animal| &animal.id == id)?;
                Some(animals.swap_remove(index))
            })
            .collect();
        Ok(())
    }

    /// Raises the counters past anything already in use, for blobs whose
    /// counters were lost.
    pub fn normalize(&mut self) {
        let max_id = self
            .animals
            .iter()
            .filter_map(|animal| animal.id.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        let max_dex = self.animals.iter().map(|animal| animal.dex_number).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id.saturating_add(1));
        self.next_dex_number = self.next_dex_number.max(max_dex.saturating_add(1));
    }
}
