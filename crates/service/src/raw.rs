//! Backend built only on hand-written statements through [`StatementExecutor`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use configs::{BackendKind, DatabaseConfig};

use crate::contract::FleetService;
use crate::defaults;
use crate::domain::{DriverInput, NewMaintenanceRecord, NewTrip, NewVehicle, Vehicle};
use crate::errors::FleetError;
use crate::executor::{PgExecutor, StatementExecutor};
use crate::reporting;
use crate::row_set::RowSet;
use crate::statement::SqlStatement;

const VEHICLE_COLUMNS: &str = "vehicle_id, license_plate, make, model, mileage, status";

pub struct RawBackend<E: StatementExecutor = PgExecutor> {
    exec: E,
}

impl RawBackend<PgExecutor> {
    pub fn connect(cfg: &DatabaseConfig) -> Result<Self, FleetError> {
        Ok(Self::new(PgExecutor::new(cfg)?))
    }
}

impl<E: StatementExecutor> RawBackend<E> {
    pub fn new(exec: E) -> Self {
        Self { exec }
    }

    async fn insert_returning(&self, op: &'static str, stmt: SqlStatement, key: &str) -> Result<i32, FleetError> {
        let rows = self.exec.query(&stmt).await.inspect_err(|e| log_failure(op, e))?;
        rows.get_i32(0, key)
    }

    async fn delete(&self, op: &'static str, stmt: SqlStatement) -> Result<u64, FleetError> {
        let rows = self.exec.execute(&stmt).await.inspect_err(|e| log_failure(op, e))?;
        debug!(op, rows, "delete");
        Ok(rows)
    }
}

fn log_failure(op: &'static str, err: &FleetError) {
    warn!(op, code = err.code(), error = %err, "raw operation failed");
}

fn vehicle_from_row(rows: &RowSet, row: usize) -> Result<Vehicle, FleetError> {
    Ok(Vehicle {
        vehicle_id: rows.get_i32(row, "vehicle_id")?,
        license_plate: rows.get_string(row, "license_plate")?,
        make: rows.get_string(row, "make")?,
        model: rows.get_string(row, "model")?,
        mileage: rows.get_decimal(row, "mileage")?,
        status: rows.get_string(row, "status")?,
    })
}

#[async_trait]
impl<E: StatementExecutor> FleetService for RawBackend<E> {
    fn kind(&self) -> BackendKind {
        BackendKind::Raw
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FleetError> {
        let stmt = SqlStatement::new(format!("SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY vehicle_id"));
        let rows = self.exec.query(&stmt).await?;
        (0..rows.len()).map(|i| vehicle_from_row(&rows, i)).collect()
    }

    async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, FleetError> {
        let stmt = SqlStatement::new(format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE vehicle_id = @VehicleID"))
            .bind("VehicleID", id);
        let rows = self.exec.query(&stmt).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        vehicle_from_row(&rows, 0).map(Some)
    }

    #[instrument(skip(self, input), fields(backend = "raw", plate = %input.license_plate))]
    async fn add_vehicle(&self, input: &NewVehicle) -> Result<i32, FleetError> {
        let stmt = SqlStatement::new(
            "INSERT INTO vehicles (license_plate, make, model, mileage, status) \
             VALUES (@LicensePlate, @Make, @Model, @Mileage, @Status) RETURNING vehicle_id",
        )
        .bind("LicensePlate", input.license_plate.as_str())
        .bind("Make", input.make.as_str())
        .bind("Model", input.model.as_str())
        .bind("Mileage", input.mileage)
        .bind("Status", input.status.as_str());
        let id = self.insert_returning("add_vehicle", stmt, "vehicle_id").await?;
        info!(vehicle_id = id, "vehicle_added");
        Ok(id)
    }

    #[instrument(skip(self, input), fields(backend = "raw"))]
    async fn add_driver(&self, input: &DriverInput) -> Result<i32, FleetError> {
        let values = defaults::driver_values(input, defaults::now().date());
        let stmt = SqlStatement::new(
            "INSERT INTO drivers (first_name, last_name, cnic, contact_number, license_expiry) \
             VALUES (@FirstName, @LastName, @CNIC, @ContactNumber, @LicenseExpiry) RETURNING driver_id",
        )
        .bind("FirstName", values.first_name)
        .bind("LastName", values.last_name)
        .bind("CNIC", values.cnic)
        .bind("ContactNumber", values.contact_number)
        .bind("LicenseExpiry", values.license_expiry);
        let id = self.insert_returning("add_driver", stmt, "driver_id").await?;
        info!(driver_id = id, "driver_added");
        Ok(id)
    }

    #[instrument(skip(self, input), fields(backend = "raw", vehicle_id = input.vehicle_id))]
    async fn add_trip(&self, input: &NewTrip) -> Result<i32, FleetError> {
        let values = defaults::trip_values(input, defaults::now());
        let stmt = SqlStatement::new(
            "INSERT INTO trips (vehicle_id, driver_id, start_time, end_time, start_mileage, end_mileage, purpose) \
             VALUES (@VehicleID, @DriverID, @StartTime, @EndTime, @StartMileage, @EndMileage, @Purpose) \
             RETURNING trip_id",
        )
        .bind("VehicleID", values.vehicle_id)
        .bind("DriverID", values.driver_id)
        .bind("StartTime", values.start_time)
        .bind("EndTime", values.end_time)
        .bind("StartMileage", values.start_mileage)
        .bind("EndMileage", values.end_mileage)
        .bind("Purpose", values.purpose);
        let id = self.insert_returning("add_trip", stmt, "trip_id").await?;
        info!(trip_id = id, "trip_added");
        Ok(id)
    }

    #[instrument(skip(self, input), fields(backend = "raw", vehicle_id = input.vehicle_id))]
    async fn add_maintenance_record(&self, input: &NewMaintenanceRecord) -> Result<i32, FleetError> {
        let values = defaults::maintenance_values(input, defaults::now());
        let stmt = SqlStatement::new(
            "INSERT INTO maintenance_records (vehicle_id, service_date, service_type, cost, description) \
             VALUES (@VehicleID, @ServiceDate, @ServiceType, @Cost, @Description) RETURNING record_id",
        )
        .bind("VehicleID", values.vehicle_id)
        .bind("ServiceDate", values.service_date)
        .bind("ServiceType", values.service_type)
        .bind("Cost", values.cost)
        .bind("Description", values.description);
        let id = self.insert_returning("add_maintenance_record", stmt, "record_id").await?;
        info!(record_id = id, "maintenance_record_added");
        Ok(id)
    }

    async fn update_driver(&self, id: i32, input: &DriverInput) -> Result<(), FleetError> {
        let values = defaults::driver_values(input, defaults::now().date());
        let stmt = SqlStatement::new(
            "UPDATE drivers SET first_name = @FirstName, last_name = @LastName, cnic = @CNIC, \
             contact_number = @ContactNumber, license_expiry = @LicenseExpiry WHERE driver_id = @DriverID",
        )
        .bind("FirstName", values.first_name)
        .bind("LastName", values.last_name)
        .bind("CNIC", values.cnic)
        .bind("ContactNumber", values.contact_number)
        .bind("LicenseExpiry", values.license_expiry)
        .bind("DriverID", id);
        let rows = self.exec.execute(&stmt).await.inspect_err(|e| log_failure("update_driver", e))?;
        if rows == 0 {
            debug!(driver_id = id, "driver not found, nothing to update");
        }
        Ok(())
    }

    async fn delete_vehicle(&self, id: i32) -> Result<u64, FleetError> {
        let stmt = SqlStatement::new("DELETE FROM vehicles WHERE vehicle_id = @VehicleID").bind("VehicleID", id);
        self.delete("delete_vehicle", stmt).await
    }

    async fn delete_driver(&self, id: i32) -> Result<u64, FleetError> {
        let stmt = SqlStatement::new("DELETE FROM drivers WHERE driver_id = @DriverID").bind("DriverID", id);
        self.delete("delete_driver", stmt).await
    }

    async fn delete_trip(&self, id: i32) -> Result<u64, FleetError> {
        let stmt = SqlStatement::new("DELETE FROM trips WHERE trip_id = @TripID").bind("TripID", id);
        self.delete("delete_trip", stmt).await
    }

    async fn delete_maintenance_record(&self, id: i32) -> Result<u64, FleetError> {
        let stmt = SqlStatement::new("DELETE FROM maintenance_records WHERE record_id = @RecordID").bind("RecordID", id);
        self.delete("delete_maintenance_record", stmt).await
    }

    async fn update_vehicle_status(&self, id: i32, status: &str) -> Result<(), FleetError> {
        reporting::update_vehicle_status(&self.exec, id, status).await
    }

    async fn get_vehicle_summary(&self, id: i32) -> Result<RowSet, FleetError> {
        reporting::vehicle_summary(&self.exec, id).await
    }

    async fn get_vehicle_history(&self, id: i32) -> Result<RowSet, FleetError> {
        reporting::vehicle_history(&self.exec, id).await
    }

    async fn get_high_maintenance_vehicles(&self) -> Result<RowSet, FleetError> {
        reporting::high_maintenance_vehicles(&self.exec).await
    }

    async fn get_table_preview(&self, object_name: &str, top_rows: i32) -> Result<RowSet, FleetError> {
        reporting::table_preview(&self.exec, object_name, top_rows).await
    }

    async fn search_vehicles(&self, term: &str) -> Result<RowSet, FleetError> {
        reporting::search_vehicles(&self.exec, term).await
    }

    async fn search_drivers(&self, term: &str) -> Result<RowSet, FleetError> {
        reporting::search_drivers(&self.exec, term).await
    }

    async fn search_trips(&self, term: &str) -> Result<RowSet, FleetError> {
        reporting::search_trips(&self.exec, term).await
    }

    async fn search_maintenance(&self, term: &str) -> Result<RowSet, FleetError> {
        reporting::search_maintenance(&self.exec, term).await
    }

    async fn calculate_fuel_cost(&self, trip_id: i32, price_per_liter: Decimal) -> Result<Decimal, FleetError> {
        reporting::fuel_cost(&self.exec, trip_id, price_per_liter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::RecordingExecutor;
    use crate::row_set::Cell;
    use crate::statement::SqlParam;
    use chrono::{Local, Months, NaiveDate};

    fn vehicle_rows() -> RowSet {
        RowSet::with_rows(
            &["vehicle_id", "license_plate", "make", "model", "mileage", "status"],
            vec![
                vec![1.into(), "LEA-0001".into(), "Toyota".into(), "Corolla".into(), Decimal::new(500, 0).into(), "Available".into()],
                vec![2.into(), "LEA-0002".into(), "Honda".into(), "Civic".into(), Decimal::new(900, 0).into(), "In-Use".into()],
            ],
        )
    }

    #[tokio::test]
    async fn projects_vehicle_rows() {
        let exec = RecordingExecutor::new();
        exec.respond("FROM vehicles ORDER BY", vehicle_rows());
        let backend = RawBackend::new(exec);
        let vehicles = backend.list_vehicles().await.unwrap();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[1].status, "In-Use");
        assert_eq!(vehicles[1].mileage, Decimal::new(900, 0));
    }

    #[tokio::test]
    async fn get_missing_vehicle_is_none() {
        let backend = RawBackend::new(RecordingExecutor::new());
        assert!(backend.get_vehicle(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_driver_defaults_expiry_and_never_writes_validity() {
        let exec = RecordingExecutor::new();
        exec.respond("INSERT INTO drivers", RowSet::with_rows(&["driver_id"], vec![vec![Cell::Int(8)]]));
        let backend = RawBackend::new(exec.clone());
        let input = DriverInput {
            first_name: "Ayesha".into(),
            last_name: "Khan".into(),
            cnic: "35202-1234567-1".into(),
            ..Default::default()
        };
        assert_eq!(backend.add_driver(&input).await.unwrap(), 8);

        let stmt = exec.last().unwrap();
        assert!(!stmt.text().contains("license_validity"));
        let expected = Local::now().date_naive().checked_add_months(Months::new(12)).unwrap();
        match stmt.param("LicenseExpiry") {
            Some(SqlParam::Date(d)) => assert!((*d - expected).num_days().abs() <= 1, "{d}"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(stmt.param("ContactNumber"), Some(&SqlParam::Text(None)));
    }

    #[tokio::test]
    async fn add_trip_binds_defaulted_values() {
        let exec = RecordingExecutor::new();
        exec.respond("INSERT INTO trips", RowSet::with_rows(&["trip_id"], vec![vec![Cell::Int(5)]]));
        let backend = RawBackend::new(exec.clone());
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let input = NewTrip {
            vehicle_id: 1,
            driver_id: 2,
            start_time: Some(start),
            end_time: None,
            start_mileage: Decimal::new(100, 0),
            end_mileage: Decimal::ZERO,
            purpose: None,
        };
        assert_eq!(backend.add_trip(&input).await.unwrap(), 5);
        let stmt = exec.last().unwrap();
        assert_eq!(
            stmt.param("EndTime"),
            Some(&SqlParam::Timestamp(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 30, 0).unwrap()))
        );
        assert_eq!(stmt.param("EndMileage"), Some(&SqlParam::Decimal(Decimal::new(101, 0))));
        assert!(stmt.render().is_ok());
    }

    #[tokio::test]
    async fn store_rejection_passes_through() {
        let exec = RecordingExecutor::new();
        exec.fail("DELETE FROM vehicles", FleetError::StoreRejected("Vehicle 3 is in use and cannot be deleted.".into()));
        let backend = RawBackend::new(exec);
        let err = backend.delete_vehicle(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Vehicle 3 is in use and cannot be deleted.");
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let exec = RecordingExecutor::new();
        exec.set_affected(1);
        let backend = RawBackend::new(exec.clone());
        assert_eq!(backend.delete_trip(9).await.unwrap(), 1);
        assert_eq!(exec.last().unwrap().param("TripID"), Some(&SqlParam::Int(9)));
    }

    #[tokio::test]
    async fn insert_without_returned_id_is_a_schema_error() {
        let backend = RawBackend::new(RecordingExecutor::new());
        let err = backend.add_vehicle(&NewVehicle::default()).await.unwrap_err();
        assert!(matches!(err, FleetError::Schema(_)));
    }
}
