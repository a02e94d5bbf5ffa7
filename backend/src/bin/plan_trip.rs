use std::{sync::Arc, time::Duration};

use clap::Parser;
use ride_planner::{
    config::AppConfig,
    models::{AttractionType, LodgingType, PlanRequest, RestaurantType, TripParameters},
    planner::TripPlanner,
    providers::{GooglePlacesClient, MapboxClient},
    resolver::PlacesResolver,
    stops::StopPlanner,
};
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Plan a motorcycle trip and print the itinerary as JSON"
)]
struct Args {
    /// Starting point, e.g. "Denver, CO"
    #[arg(long)]
    from: String,

    /// Destination, e.g. "Moab, UT"
    #[arg(long)]
    to: String,

    /// Miles the bike covers on a full tank
    #[arg(long, default_value_t = 150.0)]
    fuel_range: f64,

    /// Miles ridden per day
    #[arg(long, default_value_t = 300.0)]
    miles_per_day: f64,

    /// Lodging type (any, hotel, motel, inn, bed_and_breakfast, ...)
    #[arg(long, default_value = "any", value_parser = parse_choice::<LodgingType>)]
    lodging: LodgingType,

    /// Restaurant type (any, italian, mexican, diner, ...)
    #[arg(long, default_value = "any", value_parser = parse_choice::<RestaurantType>)]
    restaurant: RestaurantType,

    /// Attraction type (any, museum, historic_site, scenic_viewpoint, ...)
    #[arg(long, default_value = "any", value_parser = parse_choice::<AttractionType>)]
    attraction: AttractionType,

    /// Timeout for each external provider call, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Leave the base64 GPX payload out of the output
    #[arg(long)]
    no_gpx: bool,
}

/// Parses a preference the same way the JSON API does.
fn parse_choice<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown choice '{value}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;
    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(config.provider_timeout);

    let mapbox = Arc::new(MapboxClient::new(config.mapbox_access_token.clone(), timeout)?);
    let places = Arc::new(GooglePlacesClient::new(
        config.google_places_api_key.clone(),
        timeout,
    )?);
    let resolver = PlacesResolver::new(places).with_cache(config.places_cache_size);
    let planner = TripPlanner::new(mapbox.clone(), mapbox, Arc::new(StopPlanner::new(resolver)));

    let request = PlanRequest {
        trip: TripParameters {
            start_point: args.from,
            destination: args.to,
            fuel_range_miles: args.fuel_range,
            miles_per_day: args.miles_per_day,
            preferred_lodging: args.lodging,
            preferred_restaurant: args.restaurant,
            preferred_attraction: args.attraction,
        },
        start: None,
        end: None,
    };

    tracing::info!(
        "planning '{}' -> '{}'",
        request.trip.start_point,
        request.trip.destination
    );
    let mut plan = planner.plan(&request).await?;
    tracing::info!(
        "{:.0} mi, {:.1} h, {} stops",
        plan.route.total_distance_miles,
        plan.route.total_duration_hours,
        plan.stops.len()
    );

    if args.no_gpx {
        plan.gpx_base64.clear();
    }
    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
