//! Spot layout: which vehicle type each spot of a new lot is built for.
//!
//! A layout is validated when it is constructed (or deserialized), so turning
//! it into a per-spot assignment for any capacity cannot fail.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::vehicle::VehicleType;

/// Unvalidated layout, as it appears in config files.
///
/// [`SpotLayout`] validates it on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    /// `{"uniform": "car"}`: every spot gets this type.
    Uniform(VehicleType),
    /// `{"pattern": ["motorcycle", "car"]}`: types repeat in this order. Must not be empty.
    Pattern(Vec<VehicleType>),
    /// `{"ratio": [["car", 3], ["truck", 1]]}`: proportional blocks. Must not be
    /// empty or all zero.
    Ratio(Vec<(VehicleType, u32)>),
}

/// Category assignment policy used when building a [`ParkingLot`](crate::lot::ParkingLot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Assignment", into = "Assignment")]
pub struct SpotLayout(Assignment);

impl SpotLayout {
    /// Every spot gets the same type.
    pub fn uniform(kind: VehicleType) -> Self {
        Self(Assignment::Uniform(kind))
    }

    /// Spot `i` gets `kinds[i % kinds.len()]`.
    pub fn pattern(kinds: Vec<VehicleType>) -> Result<Self, LayoutError> {
        Self::try_from(Assignment::Pattern(kinds))
    }

    /// Contiguous blocks per type, sized proportionally to the weights.
    ///
    /// Block `i` gets `floor(capacity * w_i / total)` spots; the spots lost to
    /// rounding go one each to the non-zero blocks, first block first.
    pub fn ratio(weights: Vec<(VehicleType, u32)>) -> Result<Self, LayoutError> {
        Self::try_from(Assignment::Ratio(weights))
    }

    /// The vehicle type of each spot, in spot order.
    pub fn kinds(&self, capacity: usize) -> Vec<VehicleType> {
        match &self.0 {
            Assignment::Uniform(kind) => vec![*kind; capacity],
            Assignment::Pattern(kinds) => (0..capacity).map(|i| kinds[i % kinds.len()]).collect(),
            Assignment::Ratio(weights) => ratio_blocks(weights, capacity),
        }
    }
}

impl Default for SpotLayout {
    fn default() -> Self {
        Self::uniform(VehicleType::default())
    }
}

impl TryFrom<Assignment> for SpotLayout {
    type Error = LayoutError;

    fn try_from(assignment: Assignment) -> Result<Self, Self::Error> {
        match &assignment {
            Assignment::Uniform(_) => {}
            Assignment::Pattern(kinds) if kinds.is_empty() => return Err(LayoutError::Empty),
            Assignment::Pattern(_) => {}
            Assignment::Ratio(weights) if weights.is_empty() => return Err(LayoutError::Empty),
            Assignment::Ratio(weights) if weights.iter().all(|(_, w)| *w == 0) => {
                return Err(LayoutError::ZeroWeight);
            }
            Assignment::Ratio(_) => {}
        }
        Ok(Self(assignment))
    }
}

impl From<SpotLayout> for Assignment {
    fn from(layout: SpotLayout) -> Self {
        layout.0
    }
}

fn ratio_blocks(weights: &[(VehicleType, u32)], capacity: usize) -> Vec<VehicleType> {
    let total: u128 = weights.iter().map(|(_, w)| u128::from(*w)).sum();

    let mut sizes: Vec<usize> = weights
        .iter()
        .map(|(_, w)| (capacity as u128 * u128::from(*w) / total) as usize)
        .collect();

    let mut remainder = capacity - sizes.iter().sum::<usize>();
    for (size, (_, w)) in sizes.iter_mut().zip(weights) {
        if remainder == 0 {
            break;
        }
        if *w > 0 {
            *size += 1;
            remainder -= 1;
        }
    }

    weights
        .iter()
        .zip(sizes)
        .flat_map(|((kind, _), size)| std::iter::repeat_n(*kind, size))
        .collect()
}
