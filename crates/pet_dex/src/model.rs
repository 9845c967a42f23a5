use core::fmt;

use serde::{Deserialize, Serialize};
use sprite_recolor::{DEFAULT_BEETLE_BODY, GeckoPalette, Recipe, Rgb};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, Display)]
pub enum Sex {
    #[serde(rename = "MALE")]
    #[strum(to_string = "MALE")]
    Male,
    #[serde(rename = "FEMALE")]
    #[strum(to_string = "FEMALE")]
    Female,
    #[default]
    #[serde(rename = "?")]
    #[strum(to_string = "?")]
    Unknown,
}

/// Species are stored as display strings; names this build does not know
/// are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Species {
    LeopardGecko,
    RhinoBeetle,
    Dog,
    Other(String),
}

impl Species {
    /// Species offered when adding an animal.
    pub const PICKABLE: [Self; 2] = [Self::LeopardGecko, Self::RhinoBeetle];

    pub fn as_str(&self) -> &str {
        match self {
            Self::LeopardGecko => "LEOPARD GECKO",
            Self::RhinoBeetle => "RHINO BEETLE",
            Self::Dog => "DOG",
            Self::Other(name) => name,
        }
    }

    /// Log types worth a filter button on this species' record list.
    pub const fn log_filters(&self) -> &'static [HealthLogType] {
        match self {
            Self::RhinoBeetle => &[HealthLogType::Feeding, HealthLogType::Substrate],
            Self::Dog => &[HealthLogType::Meds, HealthLogType::Vet],
            Self::LeopardGecko | Self::Other(_) => &[
                HealthLogType::Feeding,
                HealthLogType::Meds,
                HealthLogType::Vet,
                HealthLogType::Shed,
            ],
        }
    }

    pub const fn actions(&self) -> &'static [CareAction] {
        match self {
            Self::RhinoBeetle => &[
                CareAction::Feed,
                CareAction::Weight,
                CareAction::Substrate,
                CareAction::Meds,
            ],
            Self::Dog => &[CareAction::Feed, CareAction::Weight, CareAction::Meds],
            Self::LeopardGecko | Self::Other(_) => &[
                CareAction::Feed,
                CareAction::Water,
                CareAction::Weight,
                CareAction::Shed,
                CareAction::Meds,
            ],
        }
    }
}

impl From<String> for Species {
    fn from(name: String) -> Self {
        match name.as_str() {
            "LEOPARD GECKO" => Self::LeopardGecko,
            "RHINO BEETLE" => Self::RhinoBeetle,
            "DOG" => Self::Dog,
            _ => Self::Other(name),
        }
    }
}

impl From<Species> for String {
    fn from(species: Species) -> Self {
        match species {
            Species::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum BeetleStage {
    Egg,
    #[default]
    Larva,
    Pupa,
    Adult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HealthLogType {
    Feeding,
    Meds,
    Vet,
    Shed,
    Substrate,
    Water,
}

/// Buttons on the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CareAction {
    Feed,
    Water,
    Weight,
    Shed,
    Substrate,
    Meds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthLogEntry {
    /// Millisecond timestamp of when the entry was written, sometimes with
    /// a suffix. Older entries may carry short ids.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HealthLogType,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub med_name: String,
    pub total_days: u32,
    /// 0 in old records means once a day.
    #[serde(default)]
    pub doses_per_day: u32,
    /// ISO date of every dose given, once per dose.
    #[serde(default)]
    pub doses_given: Vec<String>,
    pub start_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeetleColors {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeckoColors {
    pub skin: String,
    pub dots: String,
    pub belly: String,
    pub eyes: String,
}

impl Default for GeckoColors {
    fn default() -> Self {
        let palette = GeckoPalette::default();
        Self {
            skin: palette.skin.reference.to_hex(),
            dots: palette.dots.reference.to_hex(),
            belly: palette.belly.reference.to_hex(),
            eyes: palette.eyes.reference.to_hex(),
        }
    }
}

/// Parts of a sprite the user can pick a color for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PaintTarget {
    Body,
    Skin,
    Dots,
    Belly,
    Eyes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalProfile {
    pub id: String,
    pub dex_number: u32,
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
    pub species: Species,
    #[serde(default)]
    pub morph: String,
    /// DD/MM/YY
    #[serde(default)]
    pub born: String,
    /// Grams, as typed.
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub last_feed: String,
    #[serde(default)]
    pub last_shed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_water_change: Option<String>,
    #[serde(default)]
    pub health_log: Vec<HealthLogEntry>,
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    #[serde(default)]
    pub weight_history: Vec<WeightEntry>,
    #[serde(default)]
    pub image: String,
    /// JPEG data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subspecies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beetle_colors: Option<BeetleColors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gecko_colors: Option<GeckoColors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<BeetleStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_substrate_change: Option<String>,
}

impl AnimalProfile {
    pub fn is_beetle(&self) -> bool {
        self.species == Species::RhinoBeetle
    }

    /// Card number as shown on the grid, e.g. `#007`.
    pub fn dex_label(&self) -> String {
        format!("#{:03}", self.dex_number)
    }

    pub fn paint_targets(&self) -> &'static [PaintTarget] {
        match self.species {
            Species::RhinoBeetle => &[PaintTarget::Body],
            Species::LeopardGecko => &[
                PaintTarget::Skin,
                PaintTarget::Dots,
                PaintTarget::Belly,
                PaintTarget::Eyes,
            ],
            Species::Dog | Species::Other(_) => &[],
        }
    }

    /// Current color of a paint target, in hex.
    pub fn paint(&self, target: PaintTarget) -> Option<String> {
        let gecko = self.gecko_colors.clone().unwrap_or_default();
        match target {
            PaintTarget::Body => Some(
                self.beetle_colors
                    .as_ref()
                    .map_or_else(|| DEFAULT_BEETLE_BODY.to_hex(), |colors| colors.body.clone()),
            ),
            PaintTarget::Skin => Some(gecko.skin),
            PaintTarget::Dots => Some(gecko.dots),
            PaintTarget::Belly => Some(gecko.belly),
            PaintTarget::Eyes => Some(gecko.eyes),
        }
        .filter(|_| self.paint_targets().contains(&target))
    }

    pub fn set_paint(&mut self, target: PaintTarget, hex: &str) {
        let hex = hex.to_lowercase();
        if target == PaintTarget::Body {
            self.beetle_colors = Some(BeetleColors { body: hex });
            return;
        }
        let colors = self.gecko_colors.get_or_insert_with(GeckoColors::default);
        match target {
            PaintTarget::Skin => colors.skin = hex,
            PaintTarget::Dots => colors.dots = hex,
            PaintTarget::Belly => colors.belly = hex,
            PaintTarget::Eyes => colors.eyes = hex,
            PaintTarget::Body => {}
        }
    }

    /// How the sprite should be painted for this animal's colors.
    pub fn recipe(&self) -> Recipe {
        match self.species {
            Species::RhinoBeetle => match &self.beetle_colors {
                Some(colors) => {
                    let body = Rgb::from_hex_or_black(Some(&colors.body));
                    if body == DEFAULT_BEETLE_BODY {
                        Recipe::Original
                    } else {
                        Recipe::Tint(body)
                    }
                }
                None => Recipe::Original,
            },
            Species::LeopardGecko => match &self.gecko_colors {
                Some(colors) => Recipe::Regions(GeckoPalette::with_replacements(
                    Rgb::from_hex_or_black(Some(&colors.skin)),
                    Rgb::from_hex_or_black(Some(&colors.dots)),
                    Rgb::from_hex_or_black(Some(&colors.belly)),
                    Rgb::from_hex_or_black(Some(&colors.eyes)),
                )),
                None => Recipe::Original,
            },
            Species::Dog | Species::Other(_) => Recipe::Original,
        }
    }
}

/// Swatches offered for every paint target.
pub const SWATCHES: [&str; 30] = [
    "#5c3a1e", "#8b6914", "#6b4a14", "#4a3010", "#2a1a08", "#d4782a", "#c45a2a", "#a03020",
    "#c49b2a", "#e8c547", "#f0a030", "#f5d033", "#d44040", "#e87080", "#f0a0b0", "#111111",
    "#2d2d2d", "#404040", "#707070", "#a0a0a0", "#d0d0d0", "#ffffff", "#006020", "#208030",
    "#40a040", "#1040a0", "#2070c0", "#40a0d0", "#602090", "#8040b0",
];

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const STORED: &str = r#"{
        "id": "1",
        "dexNumber": 1,
        "name": "MANGO",
        "sex": "?",
        "species": "LEOPARD GECKO",
        "morph": "TANGERINE",
        "born": "15/03/23",
        "weight": "62",
        "lastFeed": "2026-02-12",
        "lastShed": "2026-01-28",
        "healthLog": [{ "id": "1", "type": "vet", "text": "VET: 01/15 - CHECKUP OK" }],
        "prescriptions": [{
            "id": "1739000000000",
            "medName": "VIT-A DROPS",
            "totalDays": 7,
            "dosesPerDay": 0,
            "dosesGiven": ["2026-02-10"],
            "startDate": "2026-02-10",
            "notes": "",
            "completed": false
        }],
        "weightHistory": [{ "date": "2026-02-01", "value": 61.5 }],
        "image": "/images/gecko-sprite.png"
    }"#;

    #[test]
    fn reads_stored_profiles() {
        let profile: AnimalProfile = serde_json::from_str(STORED).unwrap();
        assert_eq!(profile.species, Species::LeopardGecko);
        assert_eq!(profile.sex, Sex::Unknown);
        assert_eq!(profile.health_log[0].kind, HealthLogType::Vet);
        assert_eq!(profile.prescriptions[0].doses_per_day, 0);
        assert_eq!(profile.last_water_change, None);

        let written = serde_json::to_value(&profile).unwrap();
        assert_eq!(written["dexNumber"], 1);
        assert_eq!(written["healthLog"][0]["type"], "vet");
        assert!(written.get("lastWaterChange").is_none());
    }

    #[test]
    fn unknown_species_survive() {
        let species: Species = serde_json::from_str(r#""CORN SNAKE""#).unwrap();
        assert_eq!(species, Species::Other("CORN SNAKE".into()));
        assert_eq!(serde_json::to_string(&species).unwrap(), r#""CORN SNAKE""#);
    }

    #[test]
    fn beetle_recipe_tints_only_custom_bodies() {
        let mut profile: AnimalProfile = serde_json::from_str(STORED).unwrap();
        profile.species = Species::RhinoBeetle;
        assert_eq!(profile.recipe(), Recipe::Original);

        profile.set_paint(PaintTarget::Body, "#5C3A1E");
        assert_eq!(profile.recipe(), Recipe::Original);

        profile.set_paint(PaintTarget::Body, "#ff0000");
        assert_eq!(profile.recipe(), Recipe::Tint(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn gecko_paint_starts_from_the_drawn_colors() {
        let mut profile: AnimalProfile = serde_json::from_str(STORED).unwrap();
        assert_eq!(profile.paint(PaintTarget::Skin).as_deref(), Some("#e8c547"));
        assert_eq!(profile.paint(PaintTarget::Body), None);

        profile.set_paint(PaintTarget::Dots, "#111111");
        let Recipe::Regions(palette) = profile.recipe() else {
            panic!("gecko should repaint by region");
        };
        assert_eq!(palette.dots.replacement, Rgb::new(17, 17, 17));
        assert_eq!(palette.skin.replacement, palette.skin.reference);
    }
}
