//! Create `maintenance_records` table.
//!
//! Cost sign is checked by a trigger rather than a constraint so the store
//! reports a readable message.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240101_000001_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRecords::Table)
                    .if_not_exists()
                    .col(pk_auto(MaintenanceRecords::RecordId))
                    .col(integer(MaintenanceRecords::VehicleId).not_null())
                    .col(timestamp(MaintenanceRecords::ServiceDate).not_null())
                    .col(string_len(MaintenanceRecords::ServiceType, 50).not_null())
                    .col(ColumnDef::new(MaintenanceRecords::Cost).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(MaintenanceRecords::Description).string_len(500).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_vehicle")
                            .from(MaintenanceRecords::Table, MaintenanceRecords::VehicleId)
                            .to(Vehicles::Table, Vehicles::VehicleId)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_vehicle")
                    .table(MaintenanceRecords::Table)
                    .col(MaintenanceRecords::VehicleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MaintenanceRecords::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MaintenanceRecords { Table, RecordId, VehicleId, ServiceDate, ServiceType, Cost, Description }
