use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inserting a row fires `trg_UpdateMileage_AfterTrip` on the store.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub trip_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime,
    pub end_time: DateTime,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub start_mileage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub end_mileage: Decimal,
    pub purpose: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::VehicleId"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::DriverId"
    )]
    Driver,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef { Relation::Vehicle.def() }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef { Relation::Driver.def() }
}

impl ActiveModelBehavior for ActiveModel {}
