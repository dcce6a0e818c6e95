//! Create `drivers` table.
//!
//! `license_validity` is left nullable; the validity trigger fills it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(pk_auto(Drivers::DriverId))
                    .col(string_len(Drivers::FirstName, 50).not_null())
                    .col(string_len(Drivers::LastName, 50).not_null())
                    .col(string_len(Drivers::Cnic, 15).unique_key().not_null())
                    .col(ColumnDef::new(Drivers::ContactNumber).string_len(20).null())
                    .col(date(Drivers::LicenseExpiry).not_null())
                    .col(ColumnDef::new(Drivers::LicenseValidity).string_len(10).null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Drivers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Drivers { Table, DriverId, FirstName, LastName, Cnic, ContactNumber, LicenseExpiry, LicenseValidity }
