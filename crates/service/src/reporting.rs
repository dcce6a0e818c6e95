//! Store routines, preview and search, shared by both backends.
//!
//! Both backends delegate here so their reporting output is row-for-row the same.

use rust_decimal::Decimal;
use tracing::debug;

use crate::catalog::{self, CatalogObject};
use crate::contract::DEFAULT_PREVIEW_ROWS;
use crate::errors::FleetError;
use crate::executor::StatementExecutor;
use crate::row_set::{Cell, RowSet};
use crate::statement::SqlStatement;

pub const UPDATE_VEHICLE_STATUS: &str = "sp_UpdateVehicleStatus";
pub const GET_VEHICLE_SUMMARY: &str = "sp_GetVehicleSummary";

const FUEL_COST_SQL: &str = "SELECT fn_CalculateFuelCost(\
    (SELECT CAST(end_mileage - start_mileage AS NUMERIC(10,2)) FROM trips WHERE trip_id = @TripID), \
    @FuelPricePerLiter) AS FuelCost";

pub async fn update_vehicle_status<E>(exec: &E, id: i32, status: &str) -> Result<(), FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let stmt = SqlStatement::new(UPDATE_VEHICLE_STATUS).bind("VehicleID", id).bind("NewStatus", status);
    exec.query(&stmt).await?;
    Ok(())
}

pub async fn vehicle_summary<E>(exec: &E, id: i32) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    exec.query(&SqlStatement::new(GET_VEHICLE_SUMMARY).bind("VehicleID", id)).await
}

pub async fn vehicle_history<E>(exec: &E, id: i32) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let stmt = SqlStatement::new("SELECT * FROM fn_GetVehicleHistory(@VehicleID)").bind("VehicleID", id);
    exec.query(&stmt).await
}

pub async fn high_maintenance_vehicles<E>(exec: &E) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let stmt = SqlStatement::new(format!(
        "SELECT * FROM {} ORDER BY vehicle_id",
        CatalogObject::HighMaintenanceVehicles.relation()
    ));
    exec.query(&stmt).await
}

/// The object name is checked against the allow-list before any statement exists.
pub async fn table_preview<E>(exec: &E, object_name: &str, top_rows: i32) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let object = catalog::resolve(object_name)?;
    let limit = if top_rows <= 0 { DEFAULT_PREVIEW_ROWS } else { top_rows };
    let stmt = SqlStatement::new(format!("SELECT * FROM {} LIMIT {limit}", object.relation()));
    exec.query(&stmt).await
}

async fn preview_default<E>(exec: &E, object: CatalogObject) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    table_preview(exec, object.name(), DEFAULT_PREVIEW_ROWS).await
}

/// `%term%` with LIKE wildcards in the term itself escaped.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

async fn pattern_search<E>(
    exec: &E,
    relation: &str,
    columns: &[&str],
    order_by: &str,
    term: &str,
) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let predicate = columns.iter().map(|c| format!("{c} ILIKE @Term")).collect::<Vec<_>>().join(" OR ");
    let stmt = SqlStatement::new(format!("SELECT * FROM {relation} WHERE {predicate} ORDER BY {order_by}"))
        .bind("Term", contains_pattern(term));
    exec.query(&stmt).await
}

pub async fn search_vehicles<E>(exec: &E, term: &str) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let term = term.trim();
    if term.is_empty() {
        return preview_default(exec, CatalogObject::Vehicles).await;
    }
    if let Ok(id) = term.parse::<i32>() {
        debug!(vehicle_id = id, "numeric vehicle search uses the summary report");
        return vehicle_summary(exec, id).await;
    }
    pattern_search(exec, "vehicles", &["license_plate", "make", "model", "status"], "vehicle_id", term).await
}

pub async fn search_drivers<E>(exec: &E, term: &str) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let term = term.trim();
    if term.is_empty() {
        return preview_default(exec, CatalogObject::Drivers).await;
    }
    pattern_search(exec, "drivers", &["first_name", "last_name", "cnic", "contact_number"], "driver_id", term).await
}

pub async fn search_trips<E>(exec: &E, term: &str) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    match term.trim().parse::<i32>() {
        Ok(id) => {
            let stmt = SqlStatement::new("SELECT * FROM trips WHERE trip_id = @TripID").bind("TripID", id);
            exec.query(&stmt).await
        }
        // Trips have no text columns to match, so anything else is a plain preview
        Err(_) => preview_default(exec, CatalogObject::Trips).await,
    }
}

pub async fn search_maintenance<E>(exec: &E, term: &str) -> Result<RowSet, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let term = term.trim();
    if term.is_empty() {
        return preview_default(exec, CatalogObject::MaintenanceRecords).await;
    }
    pattern_search(
        exec,
        "maintenance_records",
        &["CAST(record_id AS TEXT)", "CAST(vehicle_id AS TEXT)", "service_type", "description"],
        "record_id",
        term,
    )
    .await
}

pub async fn fuel_cost<E>(exec: &E, trip_id: i32, price_per_liter: Decimal) -> Result<Decimal, FleetError>
where
    E: StatementExecutor + ?Sized,
{
    let stmt = SqlStatement::new(FUEL_COST_SQL)
        .bind("TripID", trip_id)
        .bind("FuelPricePerLiter", price_per_liter);
    let rows = exec.query(&stmt).await?;
    match rows.value(0, "FuelCost") {
        None | Some(Cell::Null) => Err(FleetError::TripNotFound(trip_id)),
        Some(cell) => cell
            .as_decimal()
            .ok_or_else(|| FleetError::Schema(format!("fuel cost is not numeric: {cell:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::RecordingExecutor;
    use crate::statement::SqlParam;

    fn summary_rows() -> RowSet {
        RowSet::with_rows(
            &["vehicle_id", "license_plate", "trip_count"],
            vec![vec![7.into(), "LEA-7777".into(), Cell::Int(3)]],
        )
    }

    #[tokio::test]
    async fn preview_rejects_injection_before_any_statement() {
        let exec = RecordingExecutor::new();
        let err = table_preview(&exec, "Vehicles; DROP TABLE Vehicles", 10).await.unwrap_err();
        assert!(matches!(err, FleetError::InvalidInput(_)));
        assert!(exec.statements().is_empty());
    }

    #[tokio::test]
    async fn preview_non_positive_limit_falls_back() {
        let exec = RecordingExecutor::new();
        table_preview(&exec, "vw_HighMaintenanceVehicles", 0).await.unwrap();
        table_preview(&exec, " trips ", -4).await.unwrap();
        table_preview(&exec, "Drivers", 5).await.unwrap();
        let texts: Vec<String> = exec.statements().iter().map(|s| s.text().to_string()).collect();
        assert_eq!(
            texts,
            vec![
                "SELECT * FROM vw_high_maintenance_vehicles LIMIT 100",
                "SELECT * FROM trips LIMIT 100",
                "SELECT * FROM drivers LIMIT 5",
            ]
        );
    }

    #[tokio::test]
    async fn numeric_vehicle_search_is_the_summary() {
        let exec = RecordingExecutor::new();
        exec.respond(GET_VEHICLE_SUMMARY, summary_rows());
        let searched = search_vehicles(&exec, " 7 ").await.unwrap();
        let summary = vehicle_summary(&exec, 7).await.unwrap();
        assert_eq!(searched, summary);
        let stmts = exec.statements();
        assert_eq!(stmts[0], stmts[1]);
    }

    #[tokio::test]
    async fn text_vehicle_search_matches_every_column() {
        let exec = RecordingExecutor::new();
        search_vehicles(&exec, " toy ").await.unwrap();
        let stmt = exec.last().unwrap();
        assert_eq!(
            stmt.text(),
            "SELECT * FROM vehicles WHERE license_plate ILIKE @Term OR make ILIKE @Term \
             OR model ILIKE @Term OR status ILIKE @Term ORDER BY vehicle_id"
        );
        assert_eq!(stmt.param("Term"), Some(&SqlParam::Text(Some("%toy%".into()))));
    }

    #[tokio::test]
    async fn empty_terms_preview() {
        let exec = RecordingExecutor::new();
        search_vehicles(&exec, "").await.unwrap();
        search_drivers(&exec, "   ").await.unwrap();
        search_maintenance(&exec, "").await.unwrap();
        let texts: Vec<String> = exec.statements().iter().map(|s| s.text().to_string()).collect();
        assert_eq!(
            texts,
            vec![
                "SELECT * FROM vehicles LIMIT 100",
                "SELECT * FROM drivers LIMIT 100",
                "SELECT * FROM maintenance_records LIMIT 100",
            ]
        );
    }

    #[tokio::test]
    async fn text_trip_search_is_the_preview() {
        let exec = RecordingExecutor::new();
        let trips = RowSet::with_rows(&["trip_id"], vec![vec![1.into()], vec![2.into()]]);
        exec.respond("FROM trips LIMIT", trips);
        let searched = search_trips(&exec, "abc").await.unwrap();
        let preview = table_preview(&exec, "Trips", DEFAULT_PREVIEW_ROWS).await.unwrap();
        assert_eq!(searched, preview);
        assert_eq!(searched.len(), 2);
    }

    #[tokio::test]
    async fn numeric_trip_search_is_exact() {
        let exec = RecordingExecutor::new();
        search_trips(&exec, "12").await.unwrap();
        let stmt = exec.last().unwrap();
        assert_eq!(stmt.text(), "SELECT * FROM trips WHERE trip_id = @TripID");
        assert_eq!(stmt.param("TripID"), Some(&SqlParam::Int(12)));
    }

    #[tokio::test]
    async fn maintenance_search_casts_ids() {
        let exec = RecordingExecutor::new();
        search_maintenance(&exec, "oil").await.unwrap();
        let text = exec.last().unwrap().text().to_string();
        assert!(text.contains("CAST(record_id AS TEXT) ILIKE @Term"), "{text}");
        assert!(text.contains("description ILIKE @Term"), "{text}");
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn fuel_cost_for_unknown_trip_is_not_found() {
        let exec = RecordingExecutor::new();
        exec.respond("fn_CalculateFuelCost", RowSet::with_rows(&["fuelcost"], vec![vec![Cell::Null]]));
        let err = fuel_cost(&exec, 999, Decimal::new(250, 0)).await.unwrap_err();
        assert_eq!(err, FleetError::TripNotFound(999));
    }

    #[tokio::test]
    async fn fuel_cost_reads_scalar() {
        let exec = RecordingExecutor::new();
        exec.respond(
            "fn_CalculateFuelCost",
            RowSet::with_rows(&["fuelcost"], vec![vec![Decimal::new(300000, 2).into()]]),
        );
        let cost = fuel_cost(&exec, 4, Decimal::new(250, 0)).await.unwrap();
        assert_eq!(cost, Decimal::new(3000, 0));
        let stmt = exec.last().unwrap();
        assert_eq!(stmt.param("FuelPricePerLiter"), Some(&SqlParam::Decimal(Decimal::new(250, 0))));
    }

    #[tokio::test]
    async fn status_update_calls_the_procedure() {
        let exec = RecordingExecutor::new();
        update_vehicle_status(&exec, 3, "Maintenance").await.unwrap();
        let stmt = exec.last().unwrap();
        assert_eq!(stmt.text(), UPDATE_VEHICLE_STATUS);
        assert_eq!(stmt.render().unwrap().sql, "SELECT * FROM sp_UpdateVehicleStatus(VehicleID => $1, NewStatus => $2)");
    }
}
