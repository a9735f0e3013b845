use anyhow::{Context, Result};
use hotel_insights::config::DataSection;
use hotel_insights::loader::CsvLoader;
use hotel_insights::models::{Dataset, columns};
use hotel_insights::processor::SchemaNormalizer;
use std::path::Path;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let section = DataSection::default();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| section.default_path.clone());

    println!("=== DEBUGGING COLUMNS: {} ===\n", path);

    let loader = CsvLoader::from_config(&section);
    println!("Encodings tried in order: {}\n", loader.encodings().join(", "));
    let raw = loader
        .load_path(Path::new(&path))
        .with_context(|| format!("Failed to load {}", path))?;

    println!("1. Raw columns:");
    for name in raw.column_names() {
        println!("   {:?} ({:?})", name, raw.frame().column(&name)?.dtype());
    }

    let clean = SchemaNormalizer::new().normalize(&raw)?;

    println!("\n2. Normalized columns:");
    for name in clean.column_names() {
        println!("   {:?} ({:?})", name, clean.frame().column(&name)?.dtype());
    }

    println!("\n3. Recognized columns:");
    for name in columns::DIRECTORY {
        let marker = if clean.has_column(name) { "✅" } else { "❌" };
        println!("   {} {}", marker, name);
    }

    println!("\n4. Features:");
    report(&clean, "destination filter / destination mix", columns::LOCATION);
    report(&clean, "budget filter / rate charts", columns::STARTING_RATE);
    report(&clean, "name search", columns::NAME);
    report(&clean, "directory sort", columns::RANK);

    println!("\n5. First rows:");
    println!("{}", clean.frame().head(Some(5)));

    Ok(())
}

fn report(dataset: &Dataset, feature: &str, column: &str) {
    if dataset.has_column(column) {
        println!("   ✅ {} (uses '{}')", feature, column);
    } else {
        println!("   ⚠️ {} unavailable, '{}' missing", feature, column);
    }
}
