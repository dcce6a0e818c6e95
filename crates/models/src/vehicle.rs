use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub vehicle_id: i32,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub mileage: Decimal,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trip::Entity")]
    Trip,
    #[sea_orm(has_many = "super::maintenance_record::Entity")]
    MaintenanceRecord,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef { Relation::Trip.def() }
}

impl Related<super::maintenance_record::Entity> for Entity {
    fn to() -> RelationDef { Relation::MaintenanceRecord.def() }
}

impl ActiveModelBehavior for ActiveModel {}
