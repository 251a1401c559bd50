use std::path::PathBuf;

use thiserror::Error;

use crate::vehicle::VehicleType;

/// Outcome of a rejected park or unpark. Neither is fatal: the lot is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    #[error("parking lot is full (no free {kind} spot)")]
    Full { kind: VehicleType },

    #[error("vehicle {number} ({kind}) not found in parking lot")]
    NotFound { number: String, kind: VehicleType },
}

impl LotError {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("spot layout must name at least one vehicle type")]
    Empty,

    #[error("spot layout weights must not all be zero")]
    ZeroWeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vehicle type '{0}', expected motorcycle, car or truck")]
pub struct ParseVehicleTypeError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid spot layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lot_error_messages() {
        let full = LotError::Full {
            kind: VehicleType::Car,
        };
        assert_eq!(full.to_string(), "parking lot is full (no free car spot)");
        assert!(full.is_full());

        let missing = LotError::NotFound {
            number: "KL 7".to_string(),
            kind: VehicleType::Truck,
        };
        assert_eq!(
            missing.to_string(),
            "vehicle KL 7 (truck) not found in parking lot"
        );
        assert!(missing.is_not_found());
    }

    #[test]
    fn config_error_wraps_layout_error() {
        let err: ConfigError = LayoutError::Empty.into();
        assert_eq!(
            err.to_string(),
            "invalid spot layout: spot layout must name at least one vehicle type"
        );
    }
}
