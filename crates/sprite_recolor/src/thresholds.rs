use serde::{Deserialize, Serialize};

/// Distances are Euclidean in 0..=255 RGB space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecolorThresholds {
    /// Pixels below this alpha are never painted.
    pub alpha_min: u8,
    /// Pixels closer than this to the detected background are left alone.
    pub background: f32,
    pub eyes: f32,
    /// Brightest channel an eye pixel may have.
    pub dark_max: u8,
    pub belly: f32,
    pub dots: f32,
    pub skin: f32,
    pub belly_vs_skin: f32,
    pub dots_vs_skin: f32,
}

impl Default for RecolorThresholds {
    fn default() -> Self {
        Self {
            alpha_min: 50,
            background: 45.0,
            eyes: 40.0,
            dark_max: 80,
            belly: 60.0,
            dots: 70.0,
            skin: 120.0,
            belly_vs_skin: 0.9,
            dots_vs_skin: 0.7,
        }
    }
}
