//! Defaulting applied to inputs before either backend writes them.
//!
//! Both backends go through these functions so a given input and clock
//! reading always produce the same stored values.

use chrono::{Duration, Local, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::{DriverInput, NewMaintenanceRecord, NewTrip};

/// Length given to a trip whose end is missing or not after its start.
pub const DEFAULT_TRIP_MINUTES: i64 = 30;
/// Validity period given to a driver license with no expiry.
pub const DEFAULT_LICENSE_MONTHS: u32 = 12;

/// Local wall-clock time, the reference for every "now" default.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripValues {
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_mileage: Decimal,
    pub end_mileage: Decimal,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceValues {
    pub vehicle_id: i32,
    pub service_date: NaiveDateTime,
    pub service_type: String,
    pub cost: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverValues {
    pub first_name: String,
    pub last_name: String,
    pub cnic: String,
    pub contact_number: Option<String>,
    pub license_expiry: NaiveDate,
}

pub fn trip_values(input: &NewTrip, now: NaiveDateTime) -> TripValues {
    let start_time = input.start_time.unwrap_or(now);
    let end_time = match input.end_time {
        Some(end) if end > start_time => end,
        _ => start_time + Duration::minutes(DEFAULT_TRIP_MINUTES),
    };
    let end_mileage = if input.end_mileage > input.start_mileage {
        input.end_mileage
    } else {
        input.start_mileage + Decimal::ONE
    };
    TripValues {
        vehicle_id: input.vehicle_id,
        driver_id: input.driver_id,
        start_time,
        end_time,
        start_mileage: input.start_mileage,
        end_mileage,
        purpose: input.purpose.clone(),
    }
}

pub fn maintenance_values(input: &NewMaintenanceRecord, now: NaiveDateTime) -> MaintenanceValues {
    MaintenanceValues {
        vehicle_id: input.vehicle_id,
        service_date: input.service_date.unwrap_or(now),
        service_type: input.service_type.clone(),
        cost: input.cost,
        description: input.description.clone(),
    }
}

pub fn driver_values(input: &DriverInput, today: NaiveDate) -> DriverValues {
    let license_expiry = input.license_expiry.unwrap_or_else(|| {
        today.checked_add_months(Months::new(DEFAULT_LICENSE_MONTHS)).unwrap_or(today)
    });
    DriverValues {
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        cnic: input.cnic.clone(),
        contact_number: input.contact_number.clone(),
        license_expiry,
    }
}
