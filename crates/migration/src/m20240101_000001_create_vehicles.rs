//! Create `vehicles` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(pk_auto(Vehicles::VehicleId))
                    .col(string_len(Vehicles::LicensePlate, 20).unique_key().not_null())
                    .col(string_len(Vehicles::Make, 50).not_null())
                    .col(string_len(Vehicles::Model, 50).not_null())
                    .col(ColumnDef::new(Vehicles::Mileage).decimal_len(12, 2).not_null().default(0))
                    .col(string_len(Vehicles::Status, 20).not_null().default("Available"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vehicles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Vehicles { Table, VehicleId, LicensePlate, Make, Model, Mileage, Status }
