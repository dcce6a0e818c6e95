//! Allow-list of store objects the preview and dispatch operations accept.

use std::fmt;

use crate::errors::FleetError;

/// A base table or reporting view callers may name by string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogObject {
    Vehicles,
    Drivers,
    Trips,
    MaintenanceRecords,
    FleetDashboard,
    HighMaintenanceVehicles,
    DriverTripStats,
}

impl CatalogObject {
    pub const ALL: [CatalogObject; 7] = [
        CatalogObject::Vehicles,
        CatalogObject::Drivers,
        CatalogObject::Trips,
        CatalogObject::MaintenanceRecords,
        CatalogObject::FleetDashboard,
        CatalogObject::HighMaintenanceVehicles,
        CatalogObject::DriverTripStats,
    ];

    /// Name as callers spell it.
    pub fn name(self) -> &'static str {
        match self {
            CatalogObject::Vehicles => "Vehicles",
            CatalogObject::Drivers => "Drivers",
            CatalogObject::Trips => "Trips",
            CatalogObject::MaintenanceRecords => "MaintenanceRecords",
            CatalogObject::FleetDashboard => "vw_FleetDashboard",
            CatalogObject::HighMaintenanceVehicles => "vw_HighMaintenanceVehicles",
            CatalogObject::DriverTripStats => "vw_DriverTripStats",
        }
    }

    /// Relation name in the store.
    pub fn relation(self) -> &'static str {
        match self {
            CatalogObject::Vehicles => "vehicles",
            CatalogObject::Drivers => "drivers",
            CatalogObject::Trips => "trips",
            CatalogObject::MaintenanceRecords => "maintenance_records",
            CatalogObject::FleetDashboard => "vw_fleet_dashboard",
            CatalogObject::HighMaintenanceVehicles => "vw_high_maintenance_vehicles",
            CatalogObject::DriverTripStats => "vw_driver_trip_stats",
        }
    }

    pub fn is_view(self) -> bool {
        matches!(
            self,
            CatalogObject::FleetDashboard | CatalogObject::HighMaintenanceVehicles | CatalogObject::DriverTripStats
        )
    }

    /// Primary-key column for base tables; views have none.
    pub fn key_column(self) -> Option<&'static str> {
        match self {
            CatalogObject::Vehicles => Some("vehicle_id"),
            CatalogObject::Drivers => Some("driver_id"),
            CatalogObject::Trips => Some("trip_id"),
            CatalogObject::MaintenanceRecords => Some("record_id"),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comma-separated allow-list, in declaration order.
pub fn allowed_names() -> String {
    CatalogObject::ALL.iter().map(|o| o.name()).collect::<Vec<_>>().join(", ")
}

/// Trim `name` and fail if it is empty or not on the allow-list.
pub fn normalize(name: &str) -> Result<String, FleetError> {
    resolve(name)?;
    Ok(name.trim().to_string())
}

/// Case-insensitive lookup against the allow-list.
pub fn resolve(name: &str) -> Result<CatalogObject, FleetError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FleetError::invalid("object name must be provided"));
    }
    CatalogObject::ALL
        .iter()
        .copied()
        .find(|o| o.name().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| {
            FleetError::invalid(format!("object '{trimmed}' is not recognized; allowed values: {}", allowed_names()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_any_casing_and_trims() {
        assert_eq!(resolve("  vehicles ").unwrap(), CatalogObject::Vehicles);
        assert_eq!(resolve("VW_FLEETDASHBOARD").unwrap(), CatalogObject::FleetDashboard);
        assert_eq!(normalize(" maintenancerecords\t").unwrap(), "maintenancerecords");
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert!(matches!(resolve("   "), Err(FleetError::InvalidInput(_))));
        let err = resolve("Vehicles; DROP TABLE Vehicles").unwrap_err();
        match err {
            FleetError::InvalidInput(msg) => assert!(msg.contains("vw_DriverTripStats"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn only_base_tables_have_keys() {
        for object in CatalogObject::ALL {
            assert_eq!(object.key_column().is_none(), object.is_view(), "{object}");
        }
    }
}
