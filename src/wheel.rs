//! Wheel configuration and rotation state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One wedge of the wheel. `function`/`args` name the server-side handler
/// that pays the prize out; the client only carries them through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub label: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

fn default_color() -> String {
    String::from("#FFFFFF")
}

fn default_function() -> String {
    String::from("builtins.default")
}

/// The loaded wheel: ordered sectors plus the configuration version the
/// server stamped them with. Replaced wholesale, never patched.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelState {
    sectors: Vec<Sector>,
    total: usize,
    version_id: String,
}

impl WheelState {
    pub fn new(sectors: Vec<Sector>, version_id: impl Into<String>) -> Self {
        let total = sectors.len();
        Self {
            sectors,
            total,
            version_id: version_id.into(),
        }
    }

    pub fn replace(&mut self, sectors: Vec<Sector>, version_id: impl Into<String>) {
        self.total = sectors.len();
        self.sectors = sectors;
        self.version_id = version_id.into();
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }
}

/// Absolute rotation of the wheel. The angle accumulates across spins and is
/// only normalized for sector lookup; `current_sector` always matches the
/// currently interpolated angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    pub previous_angle: f64,
    pub target_angle: f64,
    pub current_sector: usize,
}

impl RotationState {
    pub fn baseline() -> Self {
        Self {
            previous_angle: 0.0,
            target_angle: 0.0,
            current_sector: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::baseline();
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::baseline()
    }
}
