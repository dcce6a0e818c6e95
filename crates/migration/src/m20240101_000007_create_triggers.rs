//! Trigger-governed rules: license validity, mileage propagation, cost
//! validation and vehicle deletion interception.
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
                r#"CREATE OR REPLACE FUNCTION trg_AutoUpdateDriverLicenseValidity()
                    RETURNS trigger LANGUAGE plpgsql AS $$
                    BEGIN
                        NEW.license_validity := CASE
                            WHEN NEW.license_expiry >= CURRENT_DATE THEN 'Valid'
                            ELSE 'Expired'
                        END;
                        RETURN NEW;
                    END
                    $$"#,
                r#"CREATE TRIGGER trg_AutoUpdateDriverLicenseValidity
                    BEFORE INSERT OR UPDATE ON drivers
                    FOR EACH ROW EXECUTE FUNCTION trg_AutoUpdateDriverLicenseValidity()"#,
                r#"CREATE OR REPLACE FUNCTION trg_UpdateMileage_AfterTrip()
                    RETURNS trigger LANGUAGE plpgsql AS $$
                    BEGIN
                        UPDATE vehicles SET mileage = NEW.end_mileage
                        WHERE vehicle_id = NEW.vehicle_id AND mileage < NEW.end_mileage;
                        RETURN NULL;
                    END
                    $$"#,
                r#"CREATE TRIGGER trg_UpdateMileage_AfterTrip
                    AFTER INSERT ON trips
                    FOR EACH ROW EXECUTE FUNCTION trg_UpdateMileage_AfterTrip()"#,
                r#"CREATE OR REPLACE FUNCTION trg_ValidateCost_AfterMaintenance()
                    RETURNS trigger LANGUAGE plpgsql AS $$
                    BEGIN
                        IF NEW.cost < 0 THEN
                            RAISE EXCEPTION 'Maintenance cost cannot be negative (got %).', NEW.cost;
                        END IF;
                        RETURN NULL;
                    END
                    $$"#,
                r#"CREATE TRIGGER trg_ValidateCost_AfterMaintenance
                    AFTER INSERT OR UPDATE ON maintenance_records
                    FOR EACH ROW EXECUTE FUNCTION trg_ValidateCost_AfterMaintenance()"#,
                // In-use vehicles are refused; vehicles with history are retired instead of removed
                r#"CREATE OR REPLACE FUNCTION trg_PreventDirectVehicleDeletion()
                    RETURNS trigger LANGUAGE plpgsql AS $$
                    BEGIN
                        IF OLD.status = 'In-Use' THEN
                            RAISE EXCEPTION 'Vehicle % is in use and cannot be deleted.', OLD.vehicle_id;
                        END IF;
                        IF EXISTS (SELECT 1 FROM trips WHERE vehicle_id = OLD.vehicle_id)
                           OR EXISTS (SELECT 1 FROM maintenance_records WHERE vehicle_id = OLD.vehicle_id) THEN
                            UPDATE vehicles SET status = 'Retired' WHERE vehicle_id = OLD.vehicle_id;
                            RETURN NULL;
                        END IF;
                        RETURN OLD;
                    END
                    $$"#,
                r#"CREATE TRIGGER trg_PreventDirectVehicleDeletion
                    BEFORE DELETE ON vehicles
                    FOR EACH ROW EXECUTE FUNCTION trg_PreventDirectVehicleDeletion()"#,
            ],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        run_all(
            manager,
            &[
                "DROP TRIGGER IF EXISTS trg_PreventDirectVehicleDeletion ON vehicles",
                "DROP FUNCTION IF EXISTS trg_PreventDirectVehicleDeletion()",
                "DROP TRIGGER IF EXISTS trg_ValidateCost_AfterMaintenance ON maintenance_records",
                "DROP FUNCTION IF EXISTS trg_ValidateCost_AfterMaintenance()",
                "DROP TRIGGER IF EXISTS trg_UpdateMileage_AfterTrip ON trips",
                "DROP FUNCTION IF EXISTS trg_UpdateMileage_AfterTrip()",
                "DROP TRIGGER IF EXISTS trg_AutoUpdateDriverLicenseValidity ON drivers",
                "DROP FUNCTION IF EXISTS trg_AutoUpdateDriverLicenseValidity()",
            ],
        )
        .await
    }
}
