//! Command-line front end for the fleet store.
//!
//! ```bash
//! fleetctl vehicles
//! fleetctl --backend raw search Vehicles toyota
//! fleetctl -o json preview vw_FleetDashboard --top 20
//! fleetctl add-trip --vehicle 3 --driver 1 --start-mileage 12000 --end-mileage 12085
//! ```

use std::process::ExitCode;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{ContentArrangement, Table};
use rust_decimal::Decimal;
use tracing::{error, info};

use configs::{AppConfig, BackendKind};
use service::catalog;
use service::dispatch;
use service::domain::{DriverInput, NewMaintenanceRecord, NewTrip, NewVehicle, Vehicle};
use service::{create_service, FleetService, RowSet, DEFAULT_PREVIEW_ROWS};

/// Fleet records command-line interface
#[derive(Parser, Debug)]
#[command(name = "fleetctl", version, about = "Browse and edit fleet records")]
struct Cli {
    /// Data-access strategy: mapped or raw (overrides config and FLEET_BACKEND)
    #[arg(short = 'b', long, value_parser = parse_backend)]
    backend: Option<BackendKind>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Emit JSON logs on stderr
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every vehicle
    Vehicles,
    /// Show one vehicle
    Vehicle { id: i32 },
    /// Names accepted by preview, search and delete
    Objects,
    /// First rows of a table or view
    Preview {
        object: String,
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        top: i32,
    },
    /// Search a base table; an empty term previews it
    Search {
        object: String,
        #[arg(default_value = "")]
        term: String,
    },
    /// Per-vehicle summary report
    Summary { vehicle_id: i32 },
    /// Trips and maintenance for one vehicle, newest first
    History { vehicle_id: i32 },
    /// Vehicles whose maintenance spend crossed the threshold
    HighMaintenance,
    /// Fuel cost of a trip at the given price per litre
    FuelCost { trip_id: i32, price_per_liter: Decimal },
    /// Set a vehicle's status (Available, In-Use, Maintenance)
    SetStatus { vehicle_id: i32, status: String },
    /// Delete a row from a base table by id
    Delete { object: String, id: i32 },
    AddVehicle(VehicleArgs),
    AddDriver(DriverArgs),
    UpdateDriver {
        id: i32,
        #[command(flatten)]
        driver: DriverArgs,
    },
    AddTrip(TripArgs),
    AddMaintenance(MaintenanceArgs),
}

#[derive(Args, Debug)]
struct VehicleArgs {
    #[arg(long)]
    plate: String,
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    #[arg(long, default_value = "0")]
    mileage: Decimal,
    #[arg(long, default_value = "Available")]
    status: String,
}

#[derive(Args, Debug)]
struct DriverArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    cnic: String,
    #[arg(long)]
    contact: Option<String>,
    /// YYYY-MM-DD; defaults to a year from today
    #[arg(long)]
    expiry: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct TripArgs {
    #[arg(long)]
    vehicle: i32,
    #[arg(long)]
    driver: i32,
    /// YYYY-MM-DDTHH:MM:SS; defaults to now
    #[arg(long)]
    start: Option<NaiveDateTime>,
    #[arg(long)]
    end: Option<NaiveDateTime>,
    #[arg(long, default_value = "0")]
    start_mileage: Decimal,
    #[arg(long, default_value = "0")]
    end_mileage: Decimal,
    #[arg(long)]
    purpose: Option<String>,
}

#[derive(Args, Debug)]
struct MaintenanceArgs {
    #[arg(long)]
    vehicle: i32,
    #[arg(long)]
    date: Option<NaiveDateTime>,
    #[arg(long)]
    service_type: String,
    #[arg(long)]
    cost: Decimal,
    #[arg(long)]
    description: Option<String>,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse::<BackendKind>().map_err(|e| e.to_string())
}

impl From<DriverArgs> for DriverInput {
    fn from(a: DriverArgs) -> Self {
        Self {
            first_name: a.first_name,
            last_name: a.last_name,
            cnic: a.cnic,
            contact_number: a.contact,
            license_expiry: a.expiry,
        }
    }
}

fn render_rows(rows: &RowSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .set_content_arrangement(ContentArrangement::Dynamic)
                .load_preset(comfy_table::presets::UTF8_FULL)
                .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            table.set_header(rows.columns());
            for row in rows.rows() {
                table.add_row(row.iter().map(|c| c.to_string()));
            }
            Ok(format!("{table}\n({} rows)", rows.len()))
        }
    }
}

fn render_vehicles(vehicles: &[Vehicle], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(vehicles)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(comfy_table::presets::UTF8_FULL)
                .set_header(["vehicle_id", "license_plate", "make", "model", "mileage", "status"]);
            for v in vehicles {
                table.add_row([
                    v.vehicle_id.to_string(),
                    v.license_plate.clone(),
                    v.make.clone(),
                    v.model.clone(),
                    v.mileage.to_string(),
                    v.status.clone(),
                ]);
            }
            Ok(table.to_string())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Objects = cli.command {
        for object in catalog::CatalogObject::ALL {
            let kind = if object.is_view() { "view" } else { "table" };
            println!("{:<28} {kind}", object.name());
        }
        return Ok(());
    }

    let cfg = AppConfig::load_and_validate()?;
    let kind = cli.backend.unwrap_or(cfg.fleet.backend);
    let format = cli.output;
    info!(backend = %kind, "using backend");

    let svc: Box<dyn FleetService> = create_service(kind, &cfg.database).await?;
    let svc = svc.as_ref();
    let out = match cli.command {
        Command::Objects => return Ok(()),
        Command::Vehicles => render_vehicles(&svc.list_vehicles().await?, format)?,
        Command::Vehicle { id } => match svc.get_vehicle(id).await? {
            Some(v) => render_vehicles(std::slice::from_ref(&v), format)?,
            None => return Err(anyhow!("vehicle {id} not found")),
        },
        Command::Preview { object, top } => render_rows(&svc.get_table_preview(&object, top).await?, format)?,
        Command::Search { object, term } => render_rows(&dispatch::search_object(svc, &object, &term).await?, format)?,
        Command::Summary { vehicle_id } => render_rows(&svc.get_vehicle_summary(vehicle_id).await?, format)?,
        Command::History { vehicle_id } => render_rows(&svc.get_vehicle_history(vehicle_id).await?, format)?,
        Command::HighMaintenance => render_rows(&svc.get_high_maintenance_vehicles().await?, format)?,
        Command::FuelCost { trip_id, price_per_liter } => {
            let cost = svc.calculate_fuel_cost(trip_id, price_per_liter).await?;
            format!("Fuel cost for trip {trip_id}: {cost}")
        }
        Command::SetStatus { vehicle_id, status } => {
            svc.update_vehicle_status(vehicle_id, &status).await?;
            format!("Vehicle {vehicle_id} status set to {status}")
        }
        Command::Delete { object, id } => {
            let key = dispatch::key_column(&object)?;
            let rows = dispatch::delete_object(svc, &object, id).await?;
            format!("{} {key}={id}: {rows} row(s) deleted", catalog::normalize(&object)?)
        }
        Command::AddVehicle(a) => {
            let id = svc
                .add_vehicle(&NewVehicle {
                    license_plate: a.plate,
                    make: a.make,
                    model: a.model,
                    mileage: a.mileage,
                    status: a.status,
                })
                .await?;
            format!("Added vehicle {id}")
        }
        Command::AddDriver(a) => format!("Added driver {}", svc.add_driver(&a.into()).await?),
        Command::UpdateDriver { id, driver } => {
            svc.update_driver(id, &driver.into()).await?;
            format!("Driver {id} updated")
        }
        Command::AddTrip(a) => {
            let id = svc
                .add_trip(&NewTrip {
                    vehicle_id: a.vehicle,
                    driver_id: a.driver,
                    start_time: a.start,
                    end_time: a.end,
                    start_mileage: a.start_mileage,
                    end_mileage: a.end_mileage,
                    purpose: a.purpose,
                })
                .await?;
            format!("Added trip {id}")
        }
        Command::AddMaintenance(a) => {
            let id = svc
                .add_maintenance_record(&NewMaintenanceRecord {
                    vehicle_id: a.vehicle,
                    service_date: a.date,
                    service_type: a.service_type,
                    cost: a.cost,
                    description: a.description,
                })
                .await?;
            format!("Added maintenance record {id}")
        }
    };
    println!("{out}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    common::env::load_dotenv();
    if cli.json_logs {
        common::logging::init_logging_json();
    } else {
        common::logging::init_logging_default();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<service::FleetError>().map(|f| f.code());
            info!(event = "command_failed", code, "fleetctl exiting with error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
