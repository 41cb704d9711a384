//! EVRoute command line front end.
//!
//! Usage:
//!   evroute resolve --file response.json
//!   evroute plan --origin 37.7749,-122.4194 --destination 34.0522,-118.2437 --soc 85
//!   evroute nearby --lat 37.0 --lng -121.5 --radius-km 15

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use evroute_cli::{format_plan, format_stations, history_path, load_history, save_history};
use evroute_core::{
    decode_polyline, parse_lat_lng, resolve_nearby_stations, RoutePlanRequestBuilder,
    RoutePlanResolver, SavedRoute, Vehicle,
};
use evroute_sdk::{ClientConfig, PlannerClient};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "EV route planning tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a raw webhook response from a file or stdin
    Resolve {
        /// Response file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Treat the body as a nearby-stations response
        #[arg(long)]
        nearby: bool,
        /// Print the canonical plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode an encoded polyline into lat,lng lines
    DecodePolyline { encoded: String },
    /// Request a route plan from the planning webhook
    Plan {
        /// Origin as "lat,lng"
        #[arg(long)]
        origin: String,
        /// Destination as "lat,lng"
        #[arg(long)]
        destination: String,
        /// Current state of charge, percent
        #[arg(long)]
        soc: f64,
        /// Built-in vehicle profile id
        #[arg(long, default_value = "tesla-model-3")]
        vehicle: String,
        /// Battery capacity override in kWh
        #[arg(long)]
        battery_kwh: Option<f64>,
        #[arg(long)]
        min_soc: Option<f64>,
        #[arg(long)]
        target_soc: Option<f64>,
        /// Amenity preference, repeatable
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        #[arg(long)]
        email: Option<String>,
        /// Planning webhook URL (overrides EVROUTE_PLAN_URL)
        #[arg(long)]
        url: Option<String>,
        /// Append the plan to the history file
        #[arg(long)]
        save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Find charging stations near a point
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, default_value_t = 10.0)]
        radius_km: f64,
        /// Nearby webhook URL (overrides EVROUTE_NEARBY_URL)
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show or edit saved routes
    History {
        /// Delete every saved route
        #[arg(long)]
        clear: bool,
        /// Delete one saved route by id
        #[arg(long)]
        remove: Option<Uuid>,
    },
    /// List built-in vehicle profiles
    Vehicles,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("evroute=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Resolve { file, nearby, json } => resolve(file, nearby, json),
        Command::DecodePolyline { encoded } => {
            let points = decode_polyline(&encoded).context("invalid polyline")?;
            for point in points {
                println!("{:.5},{:.5}", point.latitude, point.longitude);
            }
            Ok(())
        }
        Command::Plan {
            origin,
            destination,
            soc,
            vehicle,
            battery_kwh,
            min_soc,
            target_soc,
            amenities,
            email,
            url,
            save,
            json,
        } => {
            let profile = Vehicle::find_popular(&vehicle)
                .with_context(|| format!("unknown vehicle profile '{}'", vehicle))?;

            let mut builder = RoutePlanRequestBuilder::for_vehicle(&profile)
                .origin(parse_lat_lng(&origin)?)
                .destination(parse_lat_lng(&destination)?)
                .current_soc(soc)
                .amenities(amenities);
            if let Some(kwh) = battery_kwh {
                builder = builder.battery_capacity_kwh(kwh);
            }
            if let Some(min) = min_soc {
                builder = builder.min_soc(min);
            }
            if let Some(target) = target_soc {
                builder = builder.target_soc(target);
            }
            if let Some(email) = email {
                builder = builder.user_email(email);
            }
            let request = builder.build()?;

            let mut config = ClientConfig::from_env();
            if let Some(url) = url {
                config.plan_url = url;
            }
            let client = PlannerClient::new(config)?;
            let resolved = match client.plan_route_resolved(&request).await {
                Ok(resolved) => resolved,
                Err(err) => bail!("{} ({})", err.user_message(), err),
            };
            tracing::info!(shape = %resolved.shape, "plan received");

            if json {
                println!("{}", serde_json::to_string_pretty(&resolved.plan)?);
            } else {
                print!("{}", format_plan(&resolved.plan));
            }

            if save {
                let path = history_path();
                let mut history = load_history(&path)?;
                let entry = SavedRoute::from_plan(resolved.plan, Some(profile.id), Utc::now());
                let id = entry.id;
                history.record(entry);
                save_history(&path, &history)?;
                println!("Saved route {} to {}", id, path.display());
            }
            Ok(())
        }
        Command::Nearby {
            lat,
            lng,
            radius_km,
            url,
            json,
        } => {
            let mut config = ClientConfig::from_env();
            if let Some(url) = url {
                config.nearby_url = url;
            }
            let client = PlannerClient::new(config)?;
            let stations = match client.nearby_stations(lat, lng, radius_km).await {
                Ok(stations) => stations,
                Err(err) => bail!("{} ({})", err.user_message(), err),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&stations)?);
            } else {
                print!("{}", format_stations(&stations));
            }
            Ok(())
        }
        Command::History { clear, remove } => history(clear, remove),
        Command::Vehicles => {
            for vehicle in Vehicle::popular_models() {
                println!(
                    "{:<14} {:<28} {:>5.0} kWh {:>4.0} km {:>4.0} kW",
                    vehicle.id,
                    vehicle.display_name(),
                    vehicle.battery_capacity_kwh,
                    vehicle.range_km,
                    vehicle.max_charging_speed_kw
                );
            }
            Ok(())
        }
    }
}

fn resolve(file: Option<PathBuf>, nearby: bool, json: bool) -> Result<()> {
    let body = match file {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut body = Vec::new();
            std::io::stdin()
                .read_to_end(&mut body)
                .context("failed to read stdin")?;
            body
        }
    };

    if nearby {
        let stations = resolve_nearby_stations(&body)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&stations)?);
        } else {
            print!("{}", format_stations(&stations));
        }
        return Ok(());
    }

    let resolved = RoutePlanResolver::new().resolve(&body)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&resolved.plan)?);
    } else {
        println!("Shape: {} (envelope: {})", resolved.shape, resolved.envelope);
        print!("{}", format_plan(&resolved.plan));
    }
    Ok(())
}

fn history(clear: bool, remove: Option<Uuid>) -> Result<()> {
    let path = history_path();
    let mut history = load_history(&path)?;

    if clear {
        history.clear();
        save_history(&path, &history)?;
        println!("History cleared");
        return Ok(());
    }
    if let Some(id) = remove {
        if history.remove(id).is_none() {
            bail!("no saved route with id {}", id);
        }
        save_history(&path, &history)?;
        println!("Removed {}", id);
        return Ok(());
    }

    if history.is_empty() {
        println!("No saved routes");
        return Ok(());
    }
    for entry in history.iter() {
        println!(
            "{}  {}  {} -> {}  {:.1} km  {} stop(s)  {}",
            entry.id,
            entry.saved_at.format("%Y-%m-%d %H:%M"),
            entry.origin,
            entry.destination,
            entry.distance_km,
            entry.charging_stops,
            entry.vehicle.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
