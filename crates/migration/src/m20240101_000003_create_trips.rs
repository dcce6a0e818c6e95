//! Create `trips` table with its ordering constraints.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240101_000001_create_vehicles::Vehicles;
use crate::m20240101_000002_create_drivers::Drivers;
use crate::sql::run_all;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(pk_auto(Trips::TripId))
                    .col(integer(Trips::VehicleId).not_null())
                    .col(integer(Trips::DriverId).not_null())
                    .col(timestamp(Trips::StartTime).not_null())
                    .col(timestamp(Trips::EndTime).not_null())
                    .col(ColumnDef::new(Trips::StartMileage).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Trips::EndMileage).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Trips::Purpose).string_len(200).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_vehicle")
                            .from(Trips::Table, Trips::VehicleId)
                            .to(Vehicles::Table, Vehicles::VehicleId)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_driver")
                            .from(Trips::Table, Trips::DriverId)
                            .to(Drivers::Table, Drivers::DriverId)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        run_all(
            manager,
            &[
                "ALTER TABLE trips ADD CONSTRAINT ck_trips_time CHECK (end_time > start_time)",
                "ALTER TABLE trips ADD CONSTRAINT ck_trips_mileage CHECK (end_mileage > start_mileage)",
            ],
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trips_vehicle")
                    .table(Trips::Table)
                    .col(Trips::VehicleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trips_driver")
                    .table(Trips::Table)
                    .col(Trips::DriverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Trips::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Trips { Table, TripId, VehicleId, DriverId, StartTime, EndTime, StartMileage, EndMileage, Purpose }
