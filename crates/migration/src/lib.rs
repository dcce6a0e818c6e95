//! Installs the fleet store contract: base tables first, then the views,
//! routines and triggers that sit on top of them.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_vehicles;
mod m20240101_000002_create_drivers;
mod m20240101_000003_create_trips;
mod m20240101_000004_create_maintenance_records;
mod m20240101_000005_create_views;
mod m20240101_000006_create_routines;
mod m20240101_000007_create_triggers;
mod sql;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_vehicles::Migration),
            Box::new(m20240101_000002_create_drivers::Migration),
            Box::new(m20240101_000003_create_trips::Migration),
            Box::new(m20240101_000004_create_maintenance_records::Migration),
            // Store-side objects depend on every base table
            Box::new(m20240101_000005_create_views::Migration),
            Box::new(m20240101_000006_create_routines::Migration),
            Box::new(m20240101_000007_create_triggers::Migration),
        ]
    }
}
