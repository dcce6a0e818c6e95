//! Fleet records and the inputs callers submit to create or change them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use models::{driver, maintenance_record, trip, vehicle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: i32,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub mileage: Decimal,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub mileage: Decimal,
    pub status: String,
}

/// `license_validity` is maintained by the store and never written by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub cnic: String,
    pub contact_number: Option<String>,
    pub license_expiry: NaiveDate,
    pub license_validity: Option<String>,
}

/// Driver fields accepted on add and update. A missing expiry is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverInput {
    pub first_name: String,
    pub last_name: String,
    pub cnic: String,
    pub contact_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_mileage: Decimal,
    pub end_mileage: Decimal,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTrip {
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub start_mileage: Decimal,
    pub end_mileage: Decimal,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub record_id: i32,
    pub vehicle_id: i32,
    pub service_date: NaiveDateTime,
    pub service_type: String,
    pub cost: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceRecord {
    pub vehicle_id: i32,
    pub service_date: Option<NaiveDateTime>,
    pub service_type: String,
    pub cost: Decimal,
    pub description: Option<String>,
}

impl From<vehicle::Model> for Vehicle {
    fn from(m: vehicle::Model) -> Self {
        Self {
            vehicle_id: m.vehicle_id,
            license_plate: m.license_plate,
            make: m.make,
            model: m.model,
            mileage: m.mileage,
            status: m.status,
        }
    }
}

impl From<driver::Model> for Driver {
    fn from(m: driver::Model) -> Self {
        Self {
            driver_id: m.driver_id,
            first_name: m.first_name,
            last_name: m.last_name,
            cnic: m.cnic,
            contact_number: m.contact_number,
            license_expiry: m.license_expiry,
            license_validity: m.license_validity,
        }
    }
}

impl From<trip::Model> for Trip {
    fn from(m: trip::Model) -> Self {
        Self {
            trip_id: m.trip_id,
            vehicle_id: m.vehicle_id,
            driver_id: m.driver_id,
            start_time: m.start_time,
            end_time: m.end_time,
            start_mileage: m.start_mileage,
            end_mileage: m.end_mileage,
            purpose: m.purpose,
        }
    }
}

impl From<maintenance_record::Model> for MaintenanceRecord {
    fn from(m: maintenance_record::Model) -> Self {
        Self {
            record_id: m.record_id,
            vehicle_id: m.vehicle_id,
            service_date: m.service_date,
            service_type: m.service_type,
            cost: m.cost,
            description: m.description,
        }
    }
}
