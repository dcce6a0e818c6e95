//! Route generic object-name requests to the matching contract operation.

use crate::catalog::{self, CatalogObject};
use crate::contract::FleetService;
use crate::errors::FleetError;
use crate::row_set::RowSet;

pub async fn search_object(service: &dyn FleetService, object_name: &str, term: &str) -> Result<RowSet, FleetError> {
    match catalog::resolve(object_name)? {
        CatalogObject::Vehicles => service.search_vehicles(term).await,
        CatalogObject::Drivers => service.search_drivers(term).await,
        CatalogObject::Trips => service.search_trips(term).await,
        CatalogObject::MaintenanceRecords => service.search_maintenance(term).await,
        view => Err(FleetError::NotSupported(format!("Search is not available for {view}."))),
    }
}

pub async fn delete_object(service: &dyn FleetService, object_name: &str, id: i32) -> Result<u64, FleetError> {
    match catalog::resolve(object_name)? {
        CatalogObject::Vehicles => service.delete_vehicle(id).await,
        CatalogObject::Drivers => service.delete_driver(id).await,
        CatalogObject::Trips => service.delete_trip(id).await,
        CatalogObject::MaintenanceRecords => service.delete_maintenance_record(id).await,
        view => Err(FleetError::NotSupported(format!("Deletion is not available for {view}."))),
    }
}

/// Key column a caller reads an id from when deleting a selected row.
pub fn key_column(object_name: &str) -> Result<&'static str, FleetError> {
    let object = catalog::resolve(object_name)?;
    object
        .key_column()
        .ok_or_else(|| FleetError::NotSupported(format!("Deletion is not available for {object}.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::RecordingExecutor;
    use crate::raw::RawBackend;

    #[tokio::test]
    async fn views_are_not_searchable_or_deletable() {
        let exec = RecordingExecutor::new();
        let service = RawBackend::new(exec.clone());
        let err = search_object(&service, "vw_FleetDashboard", "x").await.unwrap_err();
        assert_eq!(err, FleetError::NotSupported("Search is not available for vw_FleetDashboard.".into()));
        let err = delete_object(&service, "VW_DRIVERTRIPSTATS", 1).await.unwrap_err();
        assert_eq!(err, FleetError::NotSupported("Deletion is not available for vw_DriverTripStats.".into()));
        assert!(exec.statements().is_empty());
    }

    #[tokio::test]
    async fn routes_base_tables() {
        let exec = RecordingExecutor::new();
        let service = RawBackend::new(exec.clone());
        search_object(&service, "maintenancerecords", "brake").await.unwrap();
        delete_object(&service, "Drivers", 4).await.unwrap();
        let texts: Vec<String> = exec.statements().iter().map(|s| s.text().to_string()).collect();
        assert!(texts[0].starts_with("SELECT * FROM maintenance_records WHERE"));
        assert_eq!(texts[1], "DELETE FROM drivers WHERE driver_id = @DriverID");
    }

    #[test]
    fn key_columns() {
        assert_eq!(key_column("Trips").unwrap(), "trip_id");
        assert!(matches!(key_column("vw_HighMaintenanceVehicles"), Err(FleetError::NotSupported(_))));
        assert!(matches!(key_column("Users"), Err(FleetError::InvalidInput(_))));
    }
}
