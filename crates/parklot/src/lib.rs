//! parklot: fixed-capacity parking lot with typed spots and concurrent park/unpark.

pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod lot;
pub mod simulation;
mod spot;
pub mod vehicle;

pub use config::SimConfig;
pub use error::{ConfigError, LayoutError, LotError, ParseVehicleTypeError};
pub use layout::SpotLayout;
pub use lot::{KindUsage, LotCounters, LotSnapshot, ParkingLot, ReleaseMatch};
pub use simulation::{SimulationError, SimulationReport, StepOutcome, VehicleOutcome};
pub use spot::SpotId;
pub use vehicle::{Vehicle, VehicleType};

/// A lot of `capacity` car spots with category release.
pub fn new_pool(capacity: usize) -> ParkingLot {
    ParkingLot::with_capacity(capacity)
}
