//! ParkingLot: the allocator.
//!
//! All reads and writes of spot state happen inside one critical section on a
//! single mutex. Scans run in ascending spot order, so a sequential trace is
//! fully deterministic; under contention the first caller to take the lock wins.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LotError};
use crate::layout::SpotLayout;
use crate::spot::{SpotId, SpotPool};
use crate::vehicle::{Vehicle, VehicleType};

/// How `unpark` decides which occupied spot to free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseMatch {
    /// First occupied spot of the vehicle's type, whoever is parked there.
    #[default]
    Category,
    /// The spot recorded for this vehicle number when it parked.
    Occupant,
}

impl ReleaseMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Occupant => "occupant",
        }
    }
}

impl std::fmt::Display for ReleaseMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseMatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "occupant" => Ok(Self::Occupant),
            _ => Err(ConfigError::invalid(
                "release_match",
                s,
                "expected 'category' or 'occupant'",
            )),
        }
    }
}

/// Cumulative outcome counters since the lot was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LotCounters {
    pub parked: usize,
    pub unparked: usize,
    pub rejected_full: usize,
    pub rejected_not_found: usize,
}

/// Spot usage for one vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindUsage {
    pub total: usize,
    pub occupied: usize,
}

impl KindUsage {
    pub fn available(&self) -> usize {
        self.total - self.occupied
    }
}

/// Point-in-time view of the lot, taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotSnapshot {
    pub total_spots: usize,
    pub occupied_spots: usize,
    /// Only types that have at least one spot.
    pub kinds: BTreeMap<VehicleType, KindUsage>,
    pub counters: LotCounters,
}

impl LotSnapshot {
    pub fn is_empty(&self) -> bool {
        self.occupied_spots == 0
    }
}

struct LotState {
    pool: SpotPool,
    counters: LotCounters,
}

/// Fixed-capacity parking lot with typed spots.
///
/// Share it between callers with `Arc<ParkingLot>`; every method takes `&self`.
pub struct ParkingLot {
    state: Mutex<LotState>,
    capacity: usize,
    release_match: ReleaseMatch,
}

impl ParkingLot {
    pub fn new(capacity: usize, layout: &SpotLayout, release_match: ReleaseMatch) -> Self {
        tracing::debug!(capacity, %release_match, "Building parking lot");
        Self {
            state: Mutex::new(LotState {
                pool: SpotPool::new(capacity, layout),
                counters: LotCounters::default(),
            }),
            capacity,
            release_match,
        }
    }

    /// All spots for cars, released by category.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, &SpotLayout::default(), ReleaseMatch::default())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn release_match(&self) -> ReleaseMatch {
        self.release_match
    }

    /// Take the lock. A panic in another holder cannot leave a spot half
    /// written, so a poisoned lock is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, LotState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Parking lot mutex poisoned - recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Park in the lowest-numbered free spot of the vehicle's type.
    pub fn park(&self, vehicle: &Vehicle) -> Result<SpotId, LotError> {
        let mut state = self.lock();
        let kind = vehicle.kind();

        let taken = state.pool.first_free(kind).and_then(|index| {
            let spot = state.pool.spot_mut(index)?;
            spot.occupy(vehicle.number()).then(|| spot.id())
        });

        match taken {
            Some(id) => {
                state.counters.parked += 1;
                tracing::info!(vehicle = %vehicle.number(), %kind, spot = %id, "Vehicle parked");
                Ok(id)
            }
            None => {
                state.counters.rejected_full += 1;
                tracing::warn!(vehicle = %vehicle.number(), %kind, "Parking lot is full");
                Err(LotError::Full { kind })
            }
        }
    }

    /// Free a spot for this vehicle, chosen according to the lot's [`ReleaseMatch`].
    pub fn unpark(&self, vehicle: &Vehicle) -> Result<SpotId, LotError> {
        let mut state = self.lock();
        let kind = vehicle.kind();

        let index = match self.release_match {
            ReleaseMatch::Category => state.pool.first_occupied(kind),
            ReleaseMatch::Occupant => state.pool.occupied_by(vehicle.number(), kind),
        };

        let freed = index.and_then(|index| {
            let spot = state.pool.spot_mut(index)?;
            let previous = spot.vacate()?;
            Some((spot.id(), previous))
        });

        match freed {
            Some((id, previous)) => {
                state.counters.unparked += 1;
                if previous != vehicle.number() {
                    tracing::debug!(
                        vehicle = %vehicle.number(),
                        occupant = %previous,
                        spot = %id,
                        "Freed a spot held by another vehicle of the same type"
                    );
                }
                tracing::info!(vehicle = %vehicle.number(), %kind, spot = %id, "Vehicle unparked");
                Ok(id)
            }
            None => {
                state.counters.rejected_not_found += 1;
                tracing::warn!(vehicle = %vehicle.number(), %kind, "Vehicle not found in parking lot");
                Err(LotError::NotFound {
                    number: vehicle.number().to_string(),
                    kind,
                })
            }
        }
    }

    /// [`park`](Self::park) reduced to success or failure.
    pub fn acquire(&self, vehicle: &Vehicle) -> bool {
        self.park(vehicle).is_ok()
    }

    /// [`unpark`](Self::unpark) reduced to success or failure.
    pub fn release(&self, vehicle: &Vehicle) -> bool {
        self.unpark(vehicle).is_ok()
    }

    /// `None` if no spot has this id.
    pub fn is_occupied(&self, id: SpotId) -> Option<bool> {
        let state = self.lock();
        let index = id.get().checked_sub(1)?;
        state.pool.spots().get(index).map(|s| !s.is_available())
    }

    /// Vehicle number parked in spot `id`, if any.
    pub fn occupant(&self, id: SpotId) -> Option<String> {
        let state = self.lock();
        let index = id.get().checked_sub(1)?;
        state
            .pool
            .spots()
            .get(index)
            .and_then(|s| s.occupant().map(str::to_string))
    }

    pub fn available(&self, kind: VehicleType) -> usize {
        let state = self.lock();
        usage(&state.pool, kind).available()
    }

    pub fn snapshot(&self) -> LotSnapshot {
        let state = self.lock();
        let kinds: BTreeMap<VehicleType, KindUsage> = VehicleType::ALL
            .into_iter()
            .map(|kind| (kind, usage(&state.pool, kind)))
            .filter(|(_, usage)| usage.total > 0)
            .collect();

        LotSnapshot {
            total_spots: state.pool.len(),
            occupied_spots: kinds.values().map(|u| u.occupied).sum(),
            kinds,
            counters: state.counters,
        }
    }
}

fn usage(pool: &SpotPool, kind: VehicleType) -> KindUsage {
    KindUsage {
        total: pool.count(kind),
        occupied: pool.occupied(kind),
    }
}

impl std::fmt::Debug for ParkingLot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingLot")
            .field("capacity", &self.capacity)
            .field("release_match", &self.release_match)
            .finish_non_exhaustive()
    }
}
