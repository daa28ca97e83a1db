//! CLI entry point for the NYC rental affordability tool.
//!
//! Provides subcommands for enriching listings with amenity metrics,
//! scoring listings, aggregating scores by zip code for the heatmap, and
//! probing the scorers at a single coordinate.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nyc_affordability::{
    config::Settings,
    enrich::{Amenity, enrich_grocery, enrich_social, enrich_transit},
    error::ConfigError,
    fetch::{BasicClient, Throttled, auth::ApiKey, auth::UrlParam},
    infra::google::{
        DISTANCE_MATRIX_BASE_URL, DISTANCE_MATRIX_KEY_PARAM, DistanceMatrixClient,
        PLACES_BASE_URL, PLACES_KEY_HEADER, PlacesClient,
    },
    output::{Report, log_scored, log_summary, log_top_zips, write_json, write_zip_csv},
    scoring::{
        aggregate::{AggregateSummary, aggregate_by_zip, summarize},
        composer::{ReferenceRent, SortKey, score_listings, sort_listings},
        grocery::GroceryScorer,
        transit::{TransitScorer, default_destinations},
        venue::{DEFAULT_RADIUS_M, DensityStrategy, VenueDensityScorer},
        weights::ScoreWeights,
    },
    store::{CsvListingStore, ListingStore, LoadedListings},
    throttle::{FixedInterval, RateLimiter, Unlimited},
    types::{Coordinate, ScoredListing, ZipAggregate, ZipCode},
};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

type PlacesApi = PlacesClient<ApiKey<Throttled<BasicClient>>>;
type DistanceMatrixApi = DistanceMatrixClient<UrlParam<Throttled<BasicClient>>>;

#[derive(Parser)]
#[command(name = "nyc_affordability")]
#[command(about = "Scores NYC rental listings by affordability", long_about = None)]
struct Cli {
    /// Directory holding the "<zip> Rental Listings.csv" files (overrides LISTINGS_DIR)
    #[arg(short = 'd', long, global = true)]
    listings_dir: Option<PathBuf>,

    /// Minimum milliseconds between provider requests (overrides REQUEST_INTERVAL_MS)
    #[arg(long, global = true)]
    interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScoringArgs {
    #[arg(long, default_value_t = 0.6)]
    housing_weight: f64,

    #[arg(long, default_value_t = 0.2)]
    transit_weight: f64,

    #[arg(long, default_value_t = 0.1)]
    social_weight: f64,

    #[arg(long, default_value_t = 0.1)]
    grocery_weight: f64,

    /// Fixed reference rent for the housing score (default: median of the batch)
    #[arg(long)]
    median_rent: Option<f64>,
}

impl ScoringArgs {
    fn weights(&self) -> Result<ScoreWeights, ConfigError> {
        ScoreWeights::new(
            self.housing_weight,
            self.transit_weight,
            self.social_weight,
            self.grocery_weight,
        )
    }

    fn reference(&self) -> ReferenceRent {
        match self.median_rent {
            Some(rent) => ReferenceRent::Fixed(rent),
            None => ReferenceRent::BatchMedian,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    MultiTier,
    SingleRadius,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach transit, daily living and grocery metrics to every listing
    Enrich {
        /// Amenity to score; repeat for several (default: all)
        #[arg(short, long = "amenity", value_enum)]
        amenities: Vec<Amenity>,

        /// Daily living search strategy
        #[arg(long, value_enum, default_value_t = StrategyArg::MultiTier)]
        strategy: StrategyArg,

        /// Search radius in meters for the single-radius strategy
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: u32,
    },
    /// Score listings and log them in ranked order
    Score {
        #[command(flatten)]
        scoring: ScoringArgs,

        /// Only show listings in this zip code
        #[arg(long)]
        zip: Option<String>,

        #[arg(long, value_enum, default_value_t = SortKey::Index)]
        sort_by: SortKey,

        #[arg(long, default_value_t = false)]
        ascending: bool,

        /// Also export the scored listings as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Aggregate scores by zip code for the heatmap
    Aggregate {
        #[command(flatten)]
        scoring: ScoringArgs,

        /// CSV file to write zip aggregates to
        #[arg(short, long, default_value = "zipcode_scores.csv")]
        output: PathBuf,

        /// Also export the aggregates as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Run every amenity scorer for one coordinate and log the breakdown
    Probe {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
}

#[derive(Serialize)]
struct ScoredExport {
    listings: Vec<ScoredListing>,
}

#[derive(Serialize)]
struct ZipExport {
    zips: Vec<ZipAggregate>,
    summary: AggregateSummary,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/affordability.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("affordability.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.listings_dir {
        settings.listings_dir = dir;
    }
    if let Some(ms) = cli.interval_ms {
        settings.request_interval = Duration::from_millis(ms);
    }

    match cli.command {
        Commands::Enrich {
            amenities,
            strategy,
            radius,
        } => {
            let strategy = match strategy {
                StrategyArg::MultiTier => DensityStrategy::default(),
                StrategyArg::SingleRadius => DensityStrategy::SingleRadius { radius_m: radius },
            };
            enrich(&settings, amenities, strategy).await?;
        }
        Commands::Score {
            scoring,
            zip,
            sort_by,
            ascending,
            json,
        } => {
            let weights = scoring.weights()?;
            let listings = load_listings(&settings)?.listings;
            let reference = scoring.reference().resolve(&listings);
            info!(reference_rent = reference, "Reference rent");

            // Normalize against the whole batch before narrowing to one zip.
            let mut scored = score_listings(&listings, &weights, ReferenceRent::Fixed(reference));
            if let Some(zip) = zip.as_deref().and_then(ZipCode::parse) {
                scored.retain(|s| s.listing.zip == zip);
                info!(zip = %zip, count = scored.len(), "Filtered by zip");
            }
            sort_listings(&mut scored, sort_by, !ascending);
            log_scored(&scored);

            if let Some(path) = json {
                let report = Report::new(weights, reference, ScoredExport { listings: scored });
                write_json(&path, &report)?;
                info!(path = %path.display(), "Scored listings exported");
            }
        }
        Commands::Aggregate {
            scoring,
            output,
            json,
        } => {
            let weights = scoring.weights()?;
            let listings = load_listings(&settings)?.listings;
            let reference = scoring.reference().resolve(&listings);

            let scored = score_listings(&listings, &weights, ReferenceRent::Fixed(reference));
            let zips = aggregate_by_zip(&scored);
            let summary = summarize(&zips);

            write_zip_csv(&output, &zips)?;
            log_top_zips(&zips, 5);
            log_summary(&summary);

            if let Some(path) = json {
                let report = Report::new(weights, reference, ZipExport { zips, summary });
                write_json(&path, &report)?;
                info!(path = %path.display(), "Zip aggregates exported");
            }
        }
        Commands::Probe { lat, lng } => {
            let point = Coordinate::new(lat, lng)?;
            probe(&settings, point).await?;
        }
    }

    Ok(())
}

fn load_listings(settings: &Settings) -> Result<LoadedListings> {
    let store = CsvListingStore::new(&settings.listings_dir);
    let loaded = store
        .load()
        .with_context(|| format!("loading listings from {}", settings.listings_dir.display()))?;
    for rejected in &loaded.rejected {
        warn!(
            file = %rejected.file.display(),
            line = rejected.line,
            error = %rejected.error,
            "Rejected listing row"
        );
    }
    Ok(loaded)
}

fn rate_limiter(settings: &Settings) -> Arc<dyn RateLimiter> {
    if settings.request_interval.is_zero() {
        Arc::new(Unlimited)
    } else {
        Arc::new(FixedInterval::new(settings.request_interval))
    }
}

fn places_api(settings: &Settings, limiter: Arc<dyn RateLimiter>) -> Result<Arc<PlacesApi>> {
    let key = settings.require_places_key()?;
    let http = Throttled::new(BasicClient::new()?, limiter);
    let http = ApiKey::header(http, PLACES_KEY_HEADER, key)?;
    Ok(Arc::new(PlacesClient::new(http, PLACES_BASE_URL)?))
}

fn distance_matrix_api(
    settings: &Settings,
    limiter: Arc<dyn RateLimiter>,
) -> Result<DistanceMatrixApi> {
    let key = settings.require_distance_matrix_key()?;
    let http = Throttled::new(BasicClient::new()?, limiter);
    let http = UrlParam::new(http, DISTANCE_MATRIX_KEY_PARAM, key);
    Ok(DistanceMatrixClient::new(http, DISTANCE_MATRIX_BASE_URL)?)
}

/// Runs the selected enrichment jobs in order and saves the listings once.
#[tracing::instrument(skip_all)]
async fn enrich(
    settings: &Settings,
    amenities: Vec<Amenity>,
    strategy: DensityStrategy,
) -> Result<()> {
    let requested = if amenities.is_empty() {
        Amenity::ALL.to_vec()
    } else {
        amenities
    };
    let mut jobs: Vec<Amenity> = Vec::new();
    for amenity in requested {
        if !jobs.contains(&amenity) {
            jobs.push(amenity);
        }
    }
    info!(jobs = ?jobs, "Starting enrichment");

    // Resolve every credential before touching the data.
    let limiter = rate_limiter(settings);
    let places = if jobs.iter().any(|a| *a != Amenity::Transit) {
        Some(places_api(settings, limiter.clone())?)
    } else {
        None
    };
    let transit = if jobs.contains(&Amenity::Transit) {
        Some(TransitScorer::new(
            distance_matrix_api(settings, limiter)?,
            default_destinations(),
        ))
    } else {
        None
    };
    let social = places
        .clone()
        .map(|api| VenueDensityScorer::new(api, strategy));
    let grocery = match places {
        Some(api) => Some(GroceryScorer::new(api, settings.grocery_taxonomy()?)),
        None => None,
    };

    let store = CsvListingStore::new(&settings.listings_dir);
    let mut loaded = load_listings(settings)?;

    for job in jobs {
        let report = match (job, &transit, &social, &grocery) {
            (Amenity::Transit, Some(scorer), _, _) => enrich_transit(&mut loaded.listings, scorer).await,
            (Amenity::Social, _, Some(scorer), _) => enrich_social(&mut loaded.listings, scorer).await,
            (Amenity::Grocery, _, _, Some(scorer)) => enrich_grocery(&mut loaded.listings, scorer).await,
            _ => continue,
        };
        if report.degraded > 0 {
            warn!(
                amenity = %report.amenity,
                degraded = report.degraded,
                "Some listings fell back to a zero score"
            );
        }
    }

    store
        .save(&loaded)
        .with_context(|| format!("saving listings to {}", settings.listings_dir.display()))?;
    Ok(())
}

/// Scores a single coordinate with live providers.
#[tracing::instrument(skip(settings), fields(point = %point))]
async fn probe(settings: &Settings, point: Coordinate) -> Result<()> {
    let limiter = rate_limiter(settings);
    let places = places_api(settings, limiter.clone())?;
    let transit = TransitScorer::new(distance_matrix_api(settings, limiter)?, default_destinations());

    let density = VenueDensityScorer::new(places.clone(), DensityStrategy::default())
        .score(point)
        .await;
    for tier in &density.tiers {
        info!(
            radius_m = tier.radius_m,
            weight = tier.weight,
            returned = tier.returned,
            new_venues = tier.new_venues,
            points = tier.points,
            "Venue tier"
        );
    }
    info!(score = density.score, degraded = density.degraded, "Daily living");

    let grocery = GroceryScorer::new(places, settings.grocery_taxonomy()?)
        .score(point)
        .await;
    for store in &grocery.stores {
        info!(name = %store.venue.name, tier = %store.tier, "Grocery store");
    }
    info!(
        score = grocery.score,
        budget = grocery.breakdown.budget,
        regular = grocery.breakdown.regular,
        premium = grocery.breakdown.premium,
        degraded = grocery.degraded,
        "Grocery"
    );

    let outcome = transit.score(point).await;
    info!(
        avg_minutes = outcome.average_minutes,
        routed = outcome.routed,
        score = outcome.score,
        degraded = outcome.degraded,
        "Transit"
    );

    Ok(())
}
