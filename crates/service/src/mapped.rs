//! Backend that uses sea-orm entities for plain CRUD and raw statements for
//! everything the mapper cannot express (routines, views, previews).

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set};
use tracing::{debug, info, instrument, warn};

use configs::{BackendKind, DatabaseConfig};
use models::{driver, maintenance_record, trip, vehicle};

use crate::contract::FleetService;
use crate::defaults;
use crate::domain::{DriverInput, NewMaintenanceRecord, NewTrip, NewVehicle, Vehicle};
use crate::errors::FleetError;
use crate::executor::{PgExecutor, StatementExecutor};
use crate::reporting;
use crate::row_set::RowSet;

pub struct MappedBackend<E: StatementExecutor = PgExecutor> {
    db: DatabaseConnection,
    exec: E,
}

impl MappedBackend<PgExecutor> {
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, FleetError> {
        let exec = PgExecutor::new(cfg)?;
        let db = models::db::connect_with_config(cfg)
            .await
            .map_err(|e| FleetError::Unavailable(e.root_cause().to_string()))?;
        Ok(Self::new(db, exec))
    }
}

impl<E: StatementExecutor> MappedBackend<E> {
    pub fn new(db: DatabaseConnection, exec: E) -> Self {
        Self { db, exec }
    }

    #[cfg(test)]
    pub(crate) fn into_connection(self) -> DatabaseConnection {
        self.db
    }
}

fn rejected(op: &'static str) -> impl Fn(sea_orm::DbErr) -> FleetError {
    move |e| {
        let err = FleetError::from(e);
        warn!(op, code = err.code(), error = %err, "mapped operation failed");
        err
    }
}

#[async_trait]
impl<E: StatementExecutor> FleetService for MappedBackend<E> {
    fn kind(&self) -> BackendKind {
        BackendKind::Mapped
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FleetError> {
        let rows = vehicle::Entity::find()
            .order_by_asc(vehicle::Column::VehicleId)
            .all(&self.db)
            .await
            .map_err(rejected("list_vehicles"))?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn get_vehicle(&self, id: i32) -> Result<Option<Vehicle>, FleetError> {
        let found = vehicle::Entity::find_by_id(id).one(&self.db).await.map_err(rejected("get_vehicle"))?;
        Ok(found.map(Vehicle::from))
    }

    #[instrument(skip(self, input), fields(backend = "mapped", plate = %input.license_plate))]
    async fn add_vehicle(&self, input: &NewVehicle) -> Result<i32, FleetError> {
        let am = vehicle::ActiveModel {
            vehicle_id: NotSet,
            license_plate: Set(input.license_plate.clone()),
            make: Set(input.make.clone()),
            model: Set(input.model.clone()),
            mileage: Set(input.mileage),
            status: Set(input.status.clone()),
        };
        let created = am.insert(&self.db).await.map_err(rejected("add_vehicle"))?;
        info!(vehicle_id = created.vehicle_id, "vehicle_added");
        Ok(created.vehicle_id)
    }

    #[instrument(skip(self, input), fields(backend = "mapped"))]
    async fn add_driver(&self, input: &DriverInput) -> Result<i32, FleetError> {
        let values = defaults::driver_values(input, defaults::now().date());
        let am = driver::ActiveModel {
            driver_id: NotSet,
            first_name: Set(values.first_name),
            last_name: Set(values.last_name),
            cnic: Set(values.cnic),
            contact_number: Set(values.contact_number),
            license_expiry: Set(values.license_expiry),
            license_validity: NotSet,
        };
        let created = am.insert(&self.db).await.map_err(rejected("add_driver"))?;
        info!(driver_id = created.driver_id, "driver_added");
        Ok(created.driver_id)
    }

    #[instrument(skip(self, input), fields(backend = "mapped", vehicle_id = input.vehicle_id))]
    async fn add_trip(&self, input: &NewTrip) -> Result<i32, FleetError> {
        let values = defaults::trip_values(input, defaults::now());
        let am = trip::ActiveModel {
            trip_id: NotSet,
            vehicle_id: Set(values.vehicle_id),
            driver_id: Set(values.driver_id),
            start_time: Set(values.start_time),
            end_time: Set(values.end_time),
            start_mileage: Set(values.start_mileage),
            end_mileage: Set(values.end_mileage),
            purpose: Set(values.purpose),
        };
        let created = am.insert(&self.db).await.map_err(rejected("add_trip"))?;
        info!(trip_id = created.trip_id, "trip_added");
        Ok(created.trip_id)
    }

    #[instrument(skip(self, input), fields(backend = "mapped", vehicle_id = input.vehicle_id))]
    async fn add_maintenance_record(&self, input: &NewMaintenanceRecord) -> Result<i32, FleetError> {
        let values = defaults::maintenance_values(input, defaults::now());
        let am = maintenance_record::ActiveModel {
            record_id: NotSet,
            vehicle_id: Set(values.vehicle_id),
            service_date: Set(values.service_date),
            service_type: Set(values.service_type),
            cost: Set(values.cost),
            description: Set(values.description),
        };
        let created = am.insert(&self.db).await.map_err(rejected("add_maintenance_record"))?;
        info!(record_id = created.record_id, "maintenance_record_added");
        Ok(created.record_id)
    }

    async fn update_driver(&self, id: i32, input: &DriverInput) -> Result<(), FleetError> {
        let Some(existing) = driver::Entity::find_by_id(id).one(&self.db).await.map_err(rejected("update_driver"))?
        else {
            debug!(driver_id = id, "driver not found, nothing to update");
            return Ok(());
        };
        let values = defaults::driver_values(input, defaults::now().date());
        let mut am: driver::ActiveModel = existing.into();
        am.first_name = Set(values.first_name);
        am.last_name = Set(values.last_name);
        am.cnic = Set(values.cnic);
        am.contact_number = Set(values.contact_number);
        am.license_expiry = Set(values.license_expiry);
        am.update(&self.db).await.map_err(rejected("update_driver"))?;
        Ok(())
    }

    async fn delete_vehicle(&self, id: i32) -> Result<u64, FleetError> {
        let res = vehicle::Entity::delete_by_id(id).exec(&self.db).await.map_err(rejected("delete_vehicle"))?;
        debug!(vehicle_id = id, rows = res.rows_affected, "delete_vehicle");
        Ok(res.rows_affected)
    }

    async fn delete_driver(&self, id: i32) -> Result<u64, FleetError> {
        let res = driver::Entity::delete_by_id(id).exec(&self.db).await.map_err(rejected("delete_driver"))?;
        Ok(res.rows_affected)
    }

    async fn delete_trip(&self, id: i32) -> Result<u64, FleetError> {
        let res = trip::Entity::delete_by_id(id).exec(&self.db).await.map_err(rejected("delete_trip"))?;
        Ok(res.rows_affected)
    }

    async fn delete_maintenance_record(&self, id: i32) -> Result<u64, FleetError> {
        let res = maintenance_record::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(rejected("delete_maintenance_record"))?;
        Ok(res.rows_affected)
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
    use chrono::NaiveDate;
    use sea_orm::{DbBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};

    fn plate_model(id: i32) -> vehicle::Model {
        vehicle::Model {
            vehicle_id: id,
            license_plate: format!("LEA-{id:04}"),
            make: "Toyota".into(),
            model: "Corolla".into(),
            mileage: Decimal::new(12000, 0),
            status: "Available".into(),
        }
    }

    fn trip_model(input: &defaults::TripValues) -> trip::Model {
        trip::Model {
            trip_id: 31,
            vehicle_id: input.vehicle_id,
            driver_id: input.driver_id,
            start_time: input.start_time,
            end_time: input.end_time,
            start_mileage: input.start_mileage,
            end_mileage: input.end_mileage,
            purpose: input.purpose.clone(),
        }
    }

    #[tokio::test]
    async fn lists_and_gets_vehicles() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![plate_model(1), plate_model(2)]])
            .append_query_results([Vec::<vehicle::Model>::new()])
            .into_connection();
        let backend = MappedBackend::new(db, RecordingExecutor::new());
        let all = backend.list_vehicles().await.unwrap();
        assert_eq!(all.iter().map(|v| v.vehicle_id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(all[0].license_plate, "LEA-0001");
        assert!(backend.get_vehicle(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_vehicle_returns_store_id() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![plate_model(17)]])
            .into_connection();
        let backend = MappedBackend::new(db, RecordingExecutor::new());
        let input = NewVehicle {
            license_plate: "LEA-0017".into(),
            make: "Toyota".into(),
            model: "Corolla".into(),
            mileage: Decimal::new(12000, 0),
            status: "Available".into(),
        };
        assert_eq!(backend.add_vehicle(&input).await.unwrap(), 17);
    }

    #[tokio::test]
    async fn add_trip_submits_defaulted_values() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let input = NewTrip {
            vehicle_id: 4,
            driver_id: 9,
            start_time: Some(start),
            end_time: Some(start),
            start_mileage: Decimal::new(800, 0),
            end_mileage: Decimal::new(790, 0),
            purpose: Some("Delivery".into()),
        };
        let expected = defaults::trip_values(&input, start);
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![trip_model(&expected)]])
            .into_connection();
        let backend = MappedBackend::new(db, RecordingExecutor::new());
        assert_eq!(backend.add_trip(&input).await.unwrap(), 31);

        let log = format!("{:?}", backend.into_connection().into_transaction_log());
        assert!(log.contains("2024-03-01T08:30:00"), "{log}");
        assert!(log.contains("801"), "{log}");
    }

    #[tokio::test]
    async fn store_rejection_carries_root_message() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "Maintenance cost cannot be negative (got -10.00).".into(),
            ))])
            .into_connection();
        let backend = MappedBackend::new(db, RecordingExecutor::new());
        let input = NewMaintenanceRecord {
            vehicle_id: 1,
            service_type: "Oil change".into(),
            cost: Decimal::new(-10, 0),
            ..Default::default()
        };
        let err = backend.add_maintenance_record(&input).await.unwrap_err();
        assert_eq!(err, FleetError::StoreRejected("Maintenance cost cannot be negative (got -10.00).".into()));
    }

    #[tokio::test]
    async fn update_of_missing_driver_is_silent() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<driver::Model>::new()])
            .into_connection();
        let backend = MappedBackend::new(db, RecordingExecutor::new());
        backend.update_driver(404, &DriverInput::default()).await.unwrap();
        let log = backend.into_connection().into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();
        let backend = MappedBackend::new(db, RecordingExecutor::new());
        assert_eq!(backend.delete_vehicle(5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reporting_goes_through_the_executor() {
        let exec = RecordingExecutor::new();
        let db = MockDatabase::new(DbBackend::Postgres).into_connection();
        let backend = MappedBackend::new(db, exec.clone());
        backend.get_vehicle_history(3).await.unwrap();
        backend.get_high_maintenance_vehicles().await.unwrap();
        let texts: Vec<String> = exec.statements().iter().map(|s| s.text().to_string()).collect();
        assert_eq!(
            texts,
            vec![
                "SELECT * FROM fn_GetVehicleHistory(@VehicleID)",
                "SELECT * FROM vw_high_maintenance_vehicles ORDER BY vehicle_id",
            ]
        );
    }
}
