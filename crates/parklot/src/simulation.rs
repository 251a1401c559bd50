//! Concurrent driver: vehicles arriving at and leaving the lot from independent tasks.
//!
//! Each task runs park-then-unpark for every round. The driver joins all tasks
//! before reporting; beyond that join, all coordination goes through the lot's lock.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::SimConfig;
use crate::error::LotError;
use crate::lot::{LotSnapshot, ParkingLot};
use crate::spot::SpotId;
use crate::vehicle::{Vehicle, VehicleType};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("vehicle task failed: {0}")]
    Task(#[from] JoinError),
}

/// Result of one park or unpark call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Ok { spot: SpotId },
    Full,
    NotFound,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

impl From<Result<SpotId, LotError>> for StepOutcome {
    fn from(result: Result<SpotId, LotError>) -> Self {
        match result {
            Ok(spot) => Self::Ok { spot },
            Err(LotError::Full { .. }) => Self::Full,
            Err(LotError::NotFound { .. }) => Self::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleOutcome {
    pub number: String,
    pub kind: VehicleType,
    pub round: usize,
    pub park: StepOutcome,
    pub unpark: StepOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub vehicles: usize,
    pub rounds: usize,
    pub parked: usize,
    pub unparked: usize,
    pub rejected_full: usize,
    pub rejected_not_found: usize,
    /// Ordered by vehicle, then round.
    pub outcomes: Vec<VehicleOutcome>,
    /// Lot state after every task finished.
    pub lot: LotSnapshot,
}

impl SimulationReport {
    fn new(
        run_id: Uuid,
        config: &SimConfig,
        outcomes: Vec<VehicleOutcome>,
        lot: LotSnapshot,
    ) -> Self {
        let count = |f: fn(&VehicleOutcome) -> bool| outcomes.iter().filter(|o| f(o)).count();
        Self {
            run_id,
            vehicles: config.vehicles,
            rounds: config.rounds,
            parked: count(|o| o.park.is_ok()),
            unparked: count(|o| o.unpark.is_ok()),
            rejected_full: count(|o| o.park == StepOutcome::Full),
            rejected_not_found: count(|o| o.unpark == StepOutcome::NotFound),
            outcomes,
            lot,
        }
    }
}

/// Plate number of the `index`th (0-based) vehicle.
pub fn plate(prefix: &str, index: usize) -> String {
    format!("{prefix} {}", index + 1)
}

/// Spawn `config.vehicles` tasks against `lot` and wait for all of them.
pub async fn run(
    lot: Arc<ParkingLot>,
    config: &SimConfig,
) -> Result<SimulationReport, SimulationError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("simulation", run_id = %run_id);

    tracing::info!(
        parent: &span,
        capacity = lot.capacity(),
        vehicles = config.vehicles,
        rounds = config.rounds,
        release_match = %lot.release_match(),
        "Starting simulation"
    );

    let mut tasks = JoinSet::new();
    for index in 0..config.vehicles {
        let lot = Arc::clone(&lot);
        let vehicle = Vehicle::new(plate(&config.plate_prefix, index), config.vehicle_kind);
        let rounds = config.rounds;

        tasks.spawn(
            async move {
                let mut outcomes = Vec::with_capacity(rounds);
                for round in 0..rounds {
                    let park = StepOutcome::from(lot.park(&vehicle));
                    tokio::task::yield_now().await;
                    let unpark = StepOutcome::from(lot.unpark(&vehicle));
                    outcomes.push(VehicleOutcome {
                        number: vehicle.number().to_string(),
                        kind: vehicle.kind(),
                        round,
                        park,
                        unpark,
                    });
                }
                (index, outcomes)
            }
            .instrument(span.clone()),
        );
    }

    let mut finished = Vec::with_capacity(config.vehicles);
    while let Some(joined) = tasks.join_next().await {
        finished.push(joined?);
    }
    finished.sort_by_key(|(index, _)| *index);

    let outcomes = finished.into_iter().flat_map(|(_, o)| o).collect();
    let report = SimulationReport::new(run_id, config, outcomes, lot.snapshot());

    tracing::info!(
        parent: &span,
        parked = report.parked,
        unparked = report.unparked,
        rejected_full = report.rejected_full,
        rejected_not_found = report.rejected_not_found,
        "Simulation finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SpotLayout;
    use crate::lot::ReleaseMatch;

    fn config(capacity: usize, vehicles: usize) -> SimConfig {
        SimConfig {
            capacity,
            vehicles,
            ..SimConfig::default()
        }
    }

    #[test]
    fn plates_are_one_based() {
        assert_eq!(plate("KL", 0), "KL 1");
        assert_eq!(plate("MH", 9), "MH 10");
    }

    #[test]
    fn step_outcome_serializes_tagged() {
        let outcomes = [
            StepOutcome::from(Ok(SpotId::new(3))),
            StepOutcome::from(Err(LotError::Full {
                kind: VehicleType::Car,
            })),
            StepOutcome::NotFound,
        ];
        insta::assert_json_snapshot!(outcomes, @r#"
        [
          {
            "status": "ok",
            "spot": 3
          },
          {
            "status": "full"
          },
          {
            "status": "not_found"
          }
        ]
        "#);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn ten_vehicles_in_twenty_spots() {
        let config = config(20, 10);
        let lot = Arc::new(config.build_lot());

        let report = run(Arc::clone(&lot), &config).await.unwrap();

        assert_eq!(report.parked, 10);
        assert_eq!(report.unparked, 10);
        assert_eq!(report.rejected_full, 0);
        assert_eq!(report.rejected_not_found, 0);
        assert_eq!(report.outcomes.len(), 10);
        assert_eq!(report.outcomes[0].number, "KL 1");
        assert_eq!(report.outcomes[9].number, "KL 10");

        assert!(report.lot.is_empty());
        assert_eq!(report.lot.counters.parked, 10);
        assert_eq!(report.lot.counters.unparked, 10);
        for n in 1..=20 {
            assert_eq!(lot.is_occupied(SpotId::new(n)), Some(false));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn contended_lot_keeps_counts_consistent() {
        let config = SimConfig {
            rounds: 5,
            ..config(3, 12)
        };
        let lot = Arc::new(config.build_lot());

        let report = run(Arc::clone(&lot), &config).await.unwrap();

        assert_eq!(report.outcomes.len(), 60);
        assert_eq!(report.parked + report.rejected_full, 60);
        assert_eq!(report.unparked + report.rejected_not_found, 60);
        assert_eq!(report.lot.counters.parked, report.parked);
        assert_eq!(report.lot.counters.unparked, report.unparked);
        assert_eq!(report.lot.occupied_spots, report.parked - report.unparked);
        assert!(report.lot.occupied_spots <= 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn occupant_release_leaves_lot_empty() {
        let config = SimConfig {
            release_match: ReleaseMatch::Occupant,
            rounds: 3,
            ..config(2, 8)
        };
        let lot = Arc::new(config.build_lot());

        let report = run(Arc::clone(&lot), &config).await.unwrap();

        assert_eq!(report.parked, report.unparked);
        assert_eq!(report.rejected_full, report.rejected_not_found);
        for outcome in &report.outcomes {
            assert_eq!(outcome.park.is_ok(), outcome.unpark.is_ok());
        }
        assert!(report.lot.is_empty());
    }

    #[tokio::test]
    async fn vehicles_without_matching_spots_are_rejected() {
        let config = SimConfig {
            vehicle_kind: VehicleType::Truck,
            layout: SpotLayout::uniform(VehicleType::Motorcycle),
            ..config(4, 3)
        };
        let lot = Arc::new(config.build_lot());

        let report = run(lot, &config).await.unwrap();

        assert_eq!(report.parked, 0);
        assert_eq!(report.rejected_full, 3);
        assert_eq!(report.rejected_not_found, 3);
        assert_eq!(report.lot.kinds.len(), 1);
    }
}
