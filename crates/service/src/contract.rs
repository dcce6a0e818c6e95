use async_trait::async_trait;
use rust_decimal::Decimal;

use configs::BackendKind;

use crate::domain::{DriverInput, NewMaintenanceRecord, NewTrip, NewVehicle, Vehicle};
use crate::errors::FleetError;
use crate::row_set::RowSet;

/// Row limit applied when a preview asks for zero or fewer rows.
pub const DEFAULT_PREVIEW_ROWS: i32 = 100;

/// Data-access contract every backend fulfils identically.
///
/// Store-side rules (license validity, mileage propagation, cost checks,
/// deletion interception) are enforced by the store; backends surface their
/// outcome without adding checks of their own.
#[async_trait]
pub trait FleetService: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// All vehicles ordered by id.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FleetError>;
    async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, FleetError>;

    /// Each add returns the id the store assigned.
    async fn add_vehicle(&self, vehicle: &NewVehicle) -> Result<i32, FleetError>;
    async fn add_driver(&self, driver: &DriverInput) -> Result<i32, FleetError>;
    async fn add_trip(&self, trip: &NewTrip) -> Result<i32, FleetError>;
    async fn add_maintenance_record(&self, record: &NewMaintenanceRecord) -> Result<i32, FleetError>;

    /// A missing driver is a silent no-op.
    async fn update_driver(&self, id: i32, driver: &DriverInput) -> Result<(), FleetError>;

    /// Deletes report the rows the store actually removed.
    async fn delete_vehicle(&self, id: i32) -> Result<u64, FleetError>;
    async fn delete_driver(&self, id: i32) -> Result<u64, FleetError>;
    async fn delete_trip(&self, id: i32) -> Result<u64, FleetError>;
    async fn delete_maintenance_record(&self, id: i32) -> Result<u64, FleetError>;

    async fn update_vehicle_status(&self, id: i32, status: &str) -> Result<(), FleetError>;
    async fn get_vehicle_summary(&self, id: i32) -> Result<RowSet, FleetError>;
    async fn get_vehicle_history(&self, id: i32) -> Result<RowSet, FleetError>;
    async fn get_high_maintenance_vehicles(&self) -> Result<RowSet, FleetError>;
    async fn get_table_preview(&self, object_name: &str, top_rows: i32) -> Result<RowSet, FleetError>;

    async fn search_vehicles(&self, term: &str) -> Result<RowSet, FleetError>;
    async fn search_drivers(&self, term: &str) -> Result<RowSet, FleetError>;
    async fn search_trips(&self, term: &str) -> Result<RowSet, FleetError>;
    async fn search_maintenance(&self, term: &str) -> Result<RowSet, FleetError>;

    async fn calculate_fuel_cost(&self, trip_id: i32, price_per_liter: Decimal) -> Result<Decimal, FleetError>;
}
