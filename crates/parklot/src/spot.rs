//! Spots and the pool that holds them.
//!
//! The pool has no synchronization of its own. It is only reachable through
//! [`ParkingLot`](crate::lot::ParkingLot), which keeps it behind a mutex.

use serde::{Deserialize, Serialize};

use crate::layout::SpotLayout;
use crate::vehicle::VehicleType;

/// 1-based position of a spot in the lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(usize);

impl SpotId {
    pub fn new(number: usize) -> Self {
        Self(number)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SpotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single parking spot. Its type is fixed when the lot is built.
#[derive(Debug, Clone)]
pub(crate) struct Spot {
    id: SpotId,
    kind: VehicleType,
    occupant: Option<String>,
}

impl Spot {
    fn new(id: SpotId, kind: VehicleType) -> Self {
        Self {
            id,
            kind,
            occupant: None,
        }
    }

    pub(crate) fn id(&self) -> SpotId {
        self.id
    }

    pub(crate) fn kind(&self) -> VehicleType {
        self.kind
    }

    pub(crate) fn is_available(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn occupant(&self) -> Option<&str> {
        self.occupant.as_deref()
    }

    /// Free → Occupied. Returns `false` (and changes nothing) if already occupied.
    pub(crate) fn occupy(&mut self, number: &str) -> bool {
        if let Some(current) = &self.occupant {
            debug_assert!(false, "occupy called on occupied spot");
            tracing::error!(spot = %self.id, occupant = %current, "Bug: attempted to occupy an occupied spot");
            return false;
        }
        self.occupant = Some(number.to_string());
        true
    }

    /// Occupied → Free, handing back the previous occupant.
    pub(crate) fn vacate(&mut self) -> Option<String> {
        let previous = self.occupant.take();
        if previous.is_none() {
            debug_assert!(false, "vacate called on free spot");
            tracing::error!(spot = %self.id, "Bug: attempted to vacate a free spot");
        }
        previous
    }
}

/// Ordered, fixed-size collection of spots.
#[derive(Debug)]
pub(crate) struct SpotPool {
    spots: Vec<Spot>,
}

impl SpotPool {
    pub(crate) fn new(capacity: usize, layout: &SpotLayout) -> Self {
        let spots = layout
            .kinds(capacity)
            .into_iter()
            .enumerate()
            .map(|(i, kind)| Spot::new(SpotId::new(i + 1), kind))
            .collect();
        Self { spots }
    }

    pub(crate) fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub(crate) fn spot_mut(&mut self, index: usize) -> Option<&mut Spot> {
        self.spots.get_mut(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.spots.len()
    }

    /// Index of the lowest-numbered free spot of `kind`.
    pub(crate) fn first_free(&self, kind: VehicleType) -> Option<usize> {
        self.spots
            .iter()
            .position(|s| s.is_available() && s.kind() == kind)
    }

    /// Index of the lowest-numbered occupied spot of `kind`.
    pub(crate) fn first_occupied(&self, kind: VehicleType) -> Option<usize> {
        self.spots
            .iter()
            .position(|s| !s.is_available() && s.kind() == kind)
    }

    /// Index of the lowest-numbered spot of `kind` held by vehicle `number`.
    pub(crate) fn occupied_by(&self, number: &str, kind: VehicleType) -> Option<usize> {
        self.spots
            .iter()
            .position(|s| s.kind() == kind && s.occupant() == Some(number))
    }

    pub(crate) fn count(&self, kind: VehicleType) -> usize {
        self.spots.iter().filter(|s| s.kind() == kind).count()
    }

    pub(crate) fn occupied(&self, kind: VehicleType) -> usize {
        self.spots
            .iter()
            .filter(|s| s.kind() == kind && !s.is_available())
            .count()
    }
}
