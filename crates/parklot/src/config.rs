//! Simulation configuration.
//!
//! Sources, later ones overriding earlier: built-in defaults, an optional JSON
//! file, `PARKLOT_*` environment variables, command-line flags. Environment
//! and flags go through the same [`SimConfig::set`] so they accept the same
//! values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::SpotLayout;
use crate::lot::{ParkingLot, ReleaseMatch};
use crate::vehicle::VehicleType;

/// Environment variable for each settable key.
pub const ENV_VARS: [(&str, &str); 6] = [
    ("capacity", "PARKLOT_CAPACITY"),
    ("vehicles", "PARKLOT_VEHICLES"),
    ("vehicle_kind", "PARKLOT_VEHICLE_KIND"),
    ("release_match", "PARKLOT_RELEASE_MATCH"),
    ("rounds", "PARKLOT_ROUNDS"),
    ("plate_prefix", "PARKLOT_PLATE_PREFIX"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of spots in the lot.
    pub capacity: usize,
    /// Number of concurrent vehicle tasks.
    pub vehicles: usize,
    pub vehicle_kind: VehicleType,
    pub layout: SpotLayout,
    pub release_match: ReleaseMatch,
    pub plate_prefix: String,
    /// Park/unpark cycles each vehicle task runs.
    pub rounds: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            vehicles: 10,
            vehicle_kind: VehicleType::Car,
            layout: SpotLayout::default(),
            release_match: ReleaseMatch::Category,
            plate_prefix: "KL".to_string(),
            rounds: 1,
        }
    }
}

impl SimConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Set a single key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "capacity" => self.capacity = parse_count(key, value)?,
            "vehicles" => self.vehicles = parse_count(key, value)?,
            "rounds" => self.rounds = parse_count(key, value)?,
            "vehicle_kind" => {
                self.vehicle_kind = value
                    .parse::<VehicleType>()
                    .map_err(|e| ConfigError::invalid(key, value, e.to_string()))?;
            }
            "release_match" => self.release_match = value.parse()?,
            "plate_prefix" => self.plate_prefix = value.to_string(),
            other => return Err(ConfigError::invalid(other, value, "unknown setting")),
        }
        Ok(())
    }

    /// Apply `PARKLOT_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Apply variables from `lookup`, which maps a variable name to its value.
    pub fn apply_vars(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        for (key, var) in ENV_VARS {
            if let Some(value) = lookup(var) {
                tracing::debug!(var, value = %value, "Config override from environment");
                self.set(key, &value)?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid("capacity", 0, "must be at least 1"));
        }
        if self.vehicles == 0 {
            return Err(ConfigError::invalid("vehicles", 0, "must be at least 1"));
        }
        if self.rounds == 0 {
            return Err(ConfigError::invalid("rounds", 0, "must be at least 1"));
        }
        let kinds = self.layout.kinds(self.capacity);
        if !kinds.contains(&self.vehicle_kind) {
            return Err(ConfigError::invalid(
                "vehicle_kind",
                self.vehicle_kind,
                "layout has no spots for this vehicle type",
            ));
        }
        Ok(())
    }

    /// Build the lot this config describes.
    pub fn build_lot(&self) -> ParkingLot {
        ParkingLot::new(self.capacity, &self.layout, self.release_match)
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::invalid(key, value, e.to_string()))
}
