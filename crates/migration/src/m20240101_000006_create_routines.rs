//! Store routines the service calls by name.
//!
//! Identifiers are unquoted, so `sp_GetVehicleSummary` and
//! `sp_getvehiclesummary` resolve to the same function, parameter names
//! included (`VehicleID => $1`).
use sea_orm_migration::prelude::*;

use crate::sql::run_all;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        run_all(
            manager,
            &[
                r#"CREATE OR REPLACE FUNCTION sp_UpdateVehicleStatus(VehicleID INT, NewStatus VARCHAR)
                    RETURNS VOID LANGUAGE plpgsql AS $$
                    BEGIN
                        IF NewStatus IS NULL OR btrim(NewStatus) = '' THEN
                            RAISE EXCEPTION 'Vehicle status must be provided.';
                        END IF;
                        UPDATE vehicles SET status = btrim(NewStatus) WHERE vehicle_id = VehicleID;
                        IF NOT FOUND THEN
                            RAISE EXCEPTION 'Vehicle % does not exist.', VehicleID;
                        END IF;
                    END
                    $$"#,
                r#"CREATE OR REPLACE FUNCTION sp_GetVehicleSummary(VehicleID INT)
                    RETURNS TABLE (
                        vehicle_id INT, license_plate VARCHAR, make VARCHAR, model VARCHAR,
                        mileage NUMERIC, status VARCHAR, trip_count BIGINT,
                        total_distance NUMERIC, total_maintenance_cost NUMERIC
                    )
                    LANGUAGE sql STABLE AS $$
                        SELECT v.vehicle_id, v.license_plate, v.make, v.model, v.mileage, v.status,
                               (SELECT COUNT(*) FROM trips t WHERE t.vehicle_id = v.vehicle_id),
                               (SELECT COALESCE(SUM(t.end_mileage - t.start_mileage), 0)
                                  FROM trips t WHERE t.vehicle_id = v.vehicle_id),
                               (SELECT COALESCE(SUM(m.cost), 0)
                                  FROM maintenance_records m WHERE m.vehicle_id = v.vehicle_id)
                        FROM vehicles v
                        WHERE v.vehicle_id = $1
                    $$"#,
                r#"CREATE OR REPLACE FUNCTION fn_GetVehicleHistory(TargetVehicleID INT)
                    RETURNS TABLE (
                        event_type TEXT, event_id INT, event_date TIMESTAMP,
                        details TEXT, amount NUMERIC
                    )
                    LANGUAGE sql STABLE AS $$
                        SELECT 'Trip'::text, t.trip_id, t.start_time,
                               COALESCE(t.purpose, '')::text, t.end_mileage - t.start_mileage
                        FROM trips t WHERE t.vehicle_id = $1
                        UNION ALL
                        SELECT 'Maintenance'::text, m.record_id, m.service_date,
                               m.service_type::text, m.cost
                        FROM maintenance_records m WHERE m.vehicle_id = $1
                        ORDER BY 3 DESC, 2 DESC
                    $$"#,
                // 10 distance units per litre; NULL distance (unknown trip) yields NULL
                r#"CREATE OR REPLACE FUNCTION fn_CalculateFuelCost(Distance NUMERIC, FuelPricePerLiter NUMERIC)
                    RETURNS NUMERIC LANGUAGE sql IMMUTABLE STRICT AS $$
                        SELECT ROUND($1 / 10.0 * $2, 2)
                    $$"#,
            ],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        run_all(
            manager,
            &[
                "DROP FUNCTION IF EXISTS fn_CalculateFuelCost(NUMERIC, NUMERIC)",
                "DROP FUNCTION IF EXISTS fn_GetVehicleHistory(INT)",
                "DROP FUNCTION IF EXISTS sp_GetVehicleSummary(INT)",
                "DROP FUNCTION IF EXISTS sp_UpdateVehicleStatus(INT, VARCHAR)",
            ],
        )
        .await
    }
}
