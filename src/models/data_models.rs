use serde::{Deserialize, Serialize};

/// Column names recognized in the hotel listings file (after whitespace trimming).
pub mod columns {
    pub const RANK: &str = "Rank";
    pub const NAME: &str = "Name";
    pub const LOCATION: &str = "Location";
    pub const STARTING_RATE: &str = "Starting Rate in ($)";
    pub const TOTAL_ROOMS: &str = "Total Rooms";
    pub const DINING_AREA: &str = "Dining Area";
    pub const DRINKING_AREA: &str = "Drinking Area";
    pub const AMENITIES: &str = "Hotel Ammenties";
    pub const ADDRESS: &str = "Address";
    pub const NUMBER: &str = "Number";

    /// Columns coerced to numbers during normalization.
    pub const NUMERIC: [&str; 3] = [RANK, STARTING_RATE, TOTAL_ROOMS];

    /// Columns shown in the property directory, in display order.
    pub const DIRECTORY: [&str; 10] = [
        RANK,
        NAME,
        LOCATION,
        STARTING_RATE,
        TOTAL_ROOMS,
        DINING_AREA,
        DRINKING_AREA,
        AMENITIES,
        ADDRESS,
        NUMBER,
    ];
}

/// One hotel row. Missing numbers stay `None`; text fields read as empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub rank: Option<f64>,
    pub name: String,
    pub location: Option<String>,
    pub starting_rate: Option<f64>,
    pub total_rooms: Option<f64>,
    pub dining_area: String,
    pub drinking_area: String,
    pub amenities: String,
    pub address: String,
    pub number: String,
}

/// Row count for one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub hotels: usize,
}

/// One equal-width bucket of the starting rate distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bounds for the budget slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSlider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: (f64, f64),
}
