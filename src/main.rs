//! `VenueScout` command line
//!
//! Usage:
//!     venuescout nearby --lat -23.5505 --lon -46.6333 --radius 1000 --category Bares
//!     venuescout text --lat -23.5505 --lon -46.6333 "pizza napolitana"
//!     venuescout details ChIJN1t_tDeuEmsRUsoyG83frY4

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use venuescout::config::LoggingConfig;
use venuescout::coordinator::SearchOutcome;
use venuescout::{
    GeoPoint, PlaceResult, PlaceSearchClient, RequestCoordinator, SearchCategory, SearchPolicy,
    SearchRequest, VenueScoutConfig, VenueScoutError, distance_meters,
};

/// Find bars, restaurants and other venues around a point
#[derive(Parser)]
#[command(name = "venuescout")]
#[command(version)]
#[command(about = "Nightlife and dining venue search", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search venues of one or more categories around a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters (configured default when omitted)
        #[arg(short, long)]
        radius: Option<f64>,

        /// Category label or provider code; repeat for several
        #[arg(long = "category")]
        categories: Vec<SearchCategory>,

        /// Drop venues rated below this
        #[arg(long)]
        min_rating: Option<f64>,

        /// Map zoom level the search is issued from
        #[arg(long)]
        zoom: Option<u32>,
    },

    /// Free text search biased towards a point
    Text {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        query: String,
    },

    /// Show the full record of one place
    Details { place_id: String },
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{level},hyper_util=warn,reqwest=warn")))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
    Ok(())
}

fn print_results(origin: &GeoPoint, results: &[PlaceResult]) {
    println!("Found {} venues:", results.len());
    for place in results {
        let distance = place
            .location
            .map(|location| format!("{:.0} m", distance_meters(origin, &location)))
            .unwrap_or_else(|| "?".to_string());
        let rating = place
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  - {} [{}] {} | rating {} | {}",
            place.name,
            place.primary_category(),
            distance,
            rating,
            place.address.as_deref().unwrap_or("")
        );
    }
}

async fn run_search(coordinator: &RequestCoordinator, request: SearchRequest) -> Result<()> {
    let origin = request.origin;
    info!("Searching around {}", origin.format_coordinates());
    match coordinator.start_search(request).await {
        SearchOutcome::Committed { seq, count } => {
            debug!("Search {} committed {} results", seq, count);
            print_results(&origin, &coordinator.view().results);
        }
        SearchOutcome::Gated { advisory, .. } => println!("{advisory}"),
        SearchOutcome::Superseded { seq } => bail!("search {seq} was superseded"),
    }
    Ok(())
}

async fn run(cli: Cli, config: VenueScoutConfig) -> Result<()> {
    let client = PlaceSearchClient::from_config(&config.places)?;

    match cli.command {
        Commands::Nearby {
            lat,
            lon,
            radius,
            categories,
            min_rating,
            zoom,
        } => {
            let origin = GeoPoint::new(lat, lon)?;
            let coordinator = RequestCoordinator::new(client, SearchPolicy::from(&config.search));
            if let Some(zoom) = zoom {
                coordinator.update_zoom_level(zoom);
            }

            let mut request = SearchRequest::nearby(
                origin,
                radius.unwrap_or(config.search.default_radius_meters),
            )
            .with_categories(categories);
            if let Some(min_rating) = min_rating {
                request = request.with_min_rating(min_rating);
            }
            run_search(&coordinator, request).await
        }
        Commands::Text { lat, lon, query } => {
            let origin = GeoPoint::new(lat, lon)?;
            let coordinator = RequestCoordinator::new(client, SearchPolicy::from(&config.search));
            let request = SearchRequest::text(origin, query);
            if request.text_query().is_none() {
                bail!(VenueScoutError::validation("text query cannot be blank"));
            }
            run_search(&coordinator, request).await
        }
        Commands::Details { place_id } => {
            let details = client
                .get_details(&place_id)
                .await
                .ok_or_else(|| {
                    VenueScoutError::provider(format!("No details available for {place_id}"))
                })?;
            println!("{}", details.name);
            if let Some(address) = &details.address {
                println!("  {address}");
            }
            if let Some(phone) = &details.phone {
                println!("  phone: {phone}");
            }
            if let Some(website) = &details.website {
                println!("  web: {website}");
            }
            if let Some(rating) = details.rating {
                println!(
                    "  rating: {rating:.1} ({} reviews)",
                    details.rating_count.unwrap_or(0)
                );
            }
            for line in &details.opening_hours {
                println!("  {line}");
            }
            for review in &details.reviews {
                println!("  \"{}\" - {}", review.text, review.author);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = VenueScoutConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging, cli.verbose)?;
    info!("VenueScout {}", venuescout::VERSION);

    if let Err(e) = run(cli, config).await {
        if let Some(app_error) = e.downcast_ref::<VenueScoutError>() {
            eprintln!("{}", app_error.user_message());
        }
        return Err(e);
    }
    Ok(())
}
