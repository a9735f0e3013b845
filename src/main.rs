use anyhow::{Context, Result};
use hotel_insights::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH, DashboardConfig};
use hotel_insights::export::CsvExporter;
use hotel_insights::loader::{CsvLoader, DataSource, DatasetCache};
use hotel_insights::models::{Dataset, Feature};
use hotel_insights::processor::{
    AggregateResult, Aggregator, FilterEngine, SchemaNormalizer, directory_view, location_options,
    rate_slider,
};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let upload_path = flag_value(&args, "--upload");
    let output_override = flag_value(&args, "--output");

    let config_path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = DashboardConfig::from_file_or_default(&config_path)
        .context("Failed to load dashboard configuration")?;

    info!("🏝️ Starting World's Best Hotels insights (config: {})", config_path);

    let loader = CsvLoader::from_config(&config.data);
    let mut cache = DatasetCache::new(loader);

    let (raw, path_used) = match &upload_path {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read uploaded file: {}", path))?;
            let dataset = cache
                .load_source(DataSource::Upload(&bytes))
                .context("Failed to load uploaded CSV")?;
            (dataset, "(uploaded)".to_string())
        }
        None => {
            let path = Path::new(&config.data.default_path);
            let dataset = cache
                .load_source(DataSource::Path(path))
                .with_context(|| format!("Failed to load {}", path.display()))?;
            (dataset, config.data.default_path.clone())
        }
    };

    let dataset = SchemaNormalizer::new()
        .normalize(&raw)
        .context("Failed to normalize listings")?;
    info!(
        "📁 Data source: {} ({} hotels, columns: {:?})",
        path_used,
        dataset.height(),
        dataset.column_names()
    );

    log_filter_options(&dataset)?;

    let filtered = FilterEngine
        .apply(&dataset, &config.filters)
        .context("Failed to apply filters")?;

    let aggregator = Aggregator::from_config(&config.charts);
    let snapshot = aggregator
        .aggregate(&filtered)
        .context("Failed to aggregate filtered listings")?;
    log_snapshot(&snapshot);

    let directory = directory_view(&filtered).context("Failed to build directory view")?;
    info!(
        "🧳 Property directory: {} rows x {} columns",
        directory.height(),
        directory.column_names().len()
    );

    info!(
        "Snapshot JSON: {}",
        serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?
    );

    let output = output_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    CsvExporter.write_to(&filtered, &output)?;

    info!("🎉 Dashboard snapshot complete");
    Ok(())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn log_filter_options(dataset: &Dataset) -> Result<()> {
    match location_options(dataset)? {
        Feature::Available(options) => info!("🔎 {} destinations to pick from", options.len()),
        Feature::Unavailable(missing) => info!("Destination filter disabled: {}", missing),
    }

    match rate_slider(dataset)? {
        Feature::Available(Some(slider)) => info!(
            "🔎 Budget slider {:.0}..{:.0} step {:.0}, preset {:.0}..{:.0}",
            slider.min, slider.max, slider.step, slider.default.0, slider.default.1
        ),
        Feature::Available(None) => info!("Budget slider disabled: no rated hotels"),
        Feature::Unavailable(missing) => info!("Budget slider disabled: {}", missing),
    }

    Ok(())
}

fn log_snapshot(snapshot: &AggregateResult) {
    info!("\n=== 📊 Destination Snapshot ===");
    info!("Total hotels: {}", snapshot.count);

    match snapshot.mean_rate.available() {
        Some(Some(mean)) => info!("Avg. starting rate: ${:.0}", mean),
        _ => info!("Avg. starting rate: N/A"),
    }
    match snapshot.median_rate.available() {
        Some(Some(median)) => info!("Median starting rate: ${:.0}", median),
        _ => info!("Median starting rate: N/A"),
    }
    match snapshot.distinct_locations.available() {
        Some(count) => info!("Destinations covered: {}", count),
        None => info!("Destinations covered: N/A"),
    }

    info!("\n=== 📈 Tourism Insights ===");
    match &snapshot.top_by_rate {
        Feature::Available(top) if top.is_empty() => {
            info!("No data after filters for the top rated chart")
        }
        Feature::Available(top) => {
            for (i, listing) in top.iter().enumerate() {
                let rate = listing
                    .starting_rate
                    .map(|r| format!("${:.0}", r))
                    .unwrap_or_else(|| "N/A".to_string());
                info!("{:>2}. {} ({}) {}", i + 1, listing.name, listing.location.as_deref().unwrap_or(""), rate);
            }
        }
        Feature::Unavailable(missing) => info!("Top rated chart skipped: {}", missing),
    }

    match &snapshot.rate_histogram {
        Feature::Available(bins) if bins.is_empty() => {
            info!("No numeric data available for the budget distribution")
        }
        Feature::Available(bins) => {
            for bin in bins {
                info!("${:.0}-${:.0}: {}", bin.lower, bin.upper, bin.count);
            }
        }
        Feature::Unavailable(missing) => info!("Budget distribution skipped: {}", missing),
    }

    match &snapshot.location_counts {
        Feature::Available(counts) => {
            for entry in counts {
                info!("{}: {}", entry.location, entry.hotels);
            }
        }
        Feature::Unavailable(missing) => info!("Destination mix skipped: {}", missing),
    }
}
