use std::{net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use ride_planner::{
    AppState,
    config::AppConfig,
    create_router,
    planner::TripPlanner,
    providers::{GooglePlacesClient, MapboxClient},
    resolver::PlacesResolver,
    stops::StopPlanner,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about = "Motorcycle trip planning API")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Timeout for each external provider call, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ride_planner=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(secs) = args.timeout_secs {
        config.provider_timeout = Duration::from_secs(secs);
    }

    let mapbox = Arc::new(MapboxClient::new(
        config.mapbox_access_token.clone(),
        config.provider_timeout,
    )?);
    let places = Arc::new(GooglePlacesClient::new(
        config.google_places_api_key.clone(),
        config.provider_timeout,
    )?);
    let resolver = PlacesResolver::new(places).with_cache(config.places_cache_size);
    let planner = TripPlanner::new(
        mapbox.clone(),
        mapbox,
        Arc::new(StopPlanner::new(resolver)),
    );

    let app = create_router(AppState {
        planner: Arc::new(planner),
    });

    let addr = config.bind_addr;
    tracing::info!("starting ride planner on http://{addr}");
    tracing::info!("  POST /api/plan - plan a route with fuel, lodging, dining, camping and attraction stops");
    tracing::info!("  POST /api/stops - recompute stops for an existing route");
    tracing::info!("  POST /api/places/nearby - campground and point-of-interest search");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
