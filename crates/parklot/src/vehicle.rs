//! Vehicles and the vehicle types that spots are tagged with.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseVehicleTypeError;

/// Resource category of a spot or a vehicle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Motorcycle,
    #[default]
    Car,
    Truck,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [Self::Motorcycle, Self::Car, Self::Truck];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motorcycle => "motorcycle",
            Self::Car => "car",
            Self::Truck => "truck",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the type names case-insensitively, or the category letters `a`/`b`/`c`.
impl FromStr for VehicleType {
    type Err = ParseVehicleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motorcycle" | "a" => Ok(Self::Motorcycle),
            "car" | "b" => Ok(Self::Car),
            "truck" | "c" => Ok(Self::Truck),
            _ => Err(ParseVehicleTypeError(s.to_string())),
        }
    }
}

/// A request for a spot: the plate number plus the type of spot it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    number: String,
    kind: VehicleType,
}

impl Vehicle {
    pub fn new(number: impl Into<String>, kind: VehicleType) -> Self {
        Self {
            number: number.into(),
            kind,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> VehicleType {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_type_is_car() {
        assert_eq!(VehicleType::default(), VehicleType::Car);
    }

    #[test]
    fn parses_names_and_letters() {
        assert_eq!("Truck".parse::<VehicleType>(), Ok(VehicleType::Truck));
        assert_eq!(" car ".parse::<VehicleType>(), Ok(VehicleType::Car));
        assert_eq!("A".parse::<VehicleType>(), Ok(VehicleType::Motorcycle));
        assert_eq!("c".parse::<VehicleType>(), Ok(VehicleType::Truck));
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "bus".parse::<VehicleType>().unwrap_err();
        assert_eq!(err, ParseVehicleTypeError("bus".to_string()));
    }

    #[test]
    fn vehicle_type_serializes_lowercase() {
        insta::assert_json_snapshot!(VehicleType::ALL, @r#"
        [
          "motorcycle",
          "car",
          "truck"
        ]
        "#);
    }

    #[test]
    fn vehicle_round_trips_through_json() {
        let vehicle = Vehicle::new("KL 1", VehicleType::Car);
        let json = serde_json::to_string(&vehicle).unwrap();
        assert_eq!(json, r#"{"number":"KL 1","kind":"car"}"#);
        assert_eq!(serde_json::from_str::<Vehicle>(&json).unwrap(), vehicle);
    }
}
