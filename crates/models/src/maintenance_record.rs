use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `cost` is validated by `trg_ValidateCost_AfterMaintenance`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    pub vehicle_id: i32,
    pub service_date: DateTime,
    pub service_type: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub cost: Decimal,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::VehicleId"
    )]
    Vehicle,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef { Relation::Vehicle.def() }
}

impl ActiveModelBehavior for ActiveModel {}
