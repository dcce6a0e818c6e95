//! Read-only reporting views exposed through the preview allow-list.
use sea_orm_migration::prelude::*;

use crate::sql::run_all;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Total maintenance spend above which a vehicle is reported as high-maintenance.
pub(crate) const HIGH_MAINTENANCE_THRESHOLD: &str = "50000";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let high_maintenance = format!(
            r#"CREATE OR REPLACE VIEW vw_high_maintenance_vehicles AS
                SELECT v.vehicle_id, v.license_plate, v.make, v.model, v.status,
                       COUNT(m.record_id) AS service_count,
                       SUM(m.cost) AS total_maintenance_cost
                FROM vehicles v
                JOIN maintenance_records m ON m.vehicle_id = v.vehicle_id
                GROUP BY v.vehicle_id, v.license_plate, v.make, v.model, v.status
                HAVING SUM(m.cost) > {HIGH_MAINTENANCE_THRESHOLD}"#
        );
        run_all(
            manager,
            &[
                r#"CREATE OR REPLACE VIEW vw_fleet_dashboard AS
                    SELECT v.vehicle_id, v.license_plate, v.make, v.model, v.status, v.mileage,
                           (SELECT COUNT(*) FROM trips t WHERE t.vehicle_id = v.vehicle_id) AS trip_count,
                           (SELECT COALESCE(SUM(m.cost), 0) FROM maintenance_records m
                             WHERE m.vehicle_id = v.vehicle_id) AS maintenance_cost,
                           (SELECT MAX(m.service_date) FROM maintenance_records m
                             WHERE m.vehicle_id = v.vehicle_id) AS last_service_date
                    FROM vehicles v"#,
                high_maintenance.as_str(),
                r#"CREATE OR REPLACE VIEW vw_driver_trip_stats AS
                    SELECT d.driver_id, d.first_name, d.last_name, d.license_validity,
                           COUNT(t.trip_id) AS trip_count,
                           COALESCE(SUM(t.end_mileage - t.start_mileage), 0) AS total_distance,
                           MAX(t.end_time) AS last_trip_end
                    FROM drivers d
                    LEFT JOIN trips t ON t.driver_id = d.driver_id
                    GROUP BY d.driver_id, d.first_name, d.last_name, d.license_validity"#,
            ],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        run_all(
            manager,
            &[
                "DROP VIEW IF EXISTS vw_driver_trip_stats",
                "DROP VIEW IF EXISTS vw_high_maintenance_vehicles",
                "DROP VIEW IF EXISTS vw_fleet_dashboard",
            ],
        )
        .await
    }
}
