use polars::prelude::PolarsResult;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::ChartSection;
use crate::models::{Dataset, Feature, HistogramBin, Listing, LocationCount, columns};

/// Everything the dashboard shows for one filtered dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub count: usize,
    /// `None` inside means no rated rows ("N/A" on the dashboard).
    pub mean_rate: Feature<Option<f64>>,
    pub median_rate: Feature<Option<f64>>,
    pub distinct_locations: Feature<usize>,
    pub top_by_rate: Feature<Vec<Listing>>,
    pub rate_histogram: Feature<Vec<HistogramBin>>,
    pub location_counts: Feature<Vec<LocationCount>>,
}

/// Summary statistics and chart data over a dataset. Never mutates its input.
pub struct Aggregator {
    top_n: usize,
    histogram_bins: usize,
}

impl Aggregator {
    pub fn new(top_n: usize, histogram_bins: usize) -> Self {
        Aggregator {
            top_n,
            histogram_bins,
        }
    }

    pub fn from_config(charts: &ChartSection) -> Self {
        Self::new(charts.top_n, charts.histogram_bins)
    }

    pub fn aggregate(&self, dataset: &Dataset) -> PolarsResult<AggregateResult> {
        let present = present_rates(dataset)?;

        let top_by_rate = match self.top_n_by_rate(dataset, self.top_n)? {
            Feature::Available(top) => Feature::Available(top.listings()?),
            Feature::Unavailable(missing) => Feature::Unavailable(missing),
        };

        let result = AggregateResult {
            count: dataset.height(),
            mean_rate: present.clone().map(|v| mean(&v)),
            median_rate: present.clone().map(|v| median(&v)),
            distinct_locations: self.distinct_locations(dataset)?,
            top_by_rate,
            rate_histogram: present.map(|v| histogram(&v, self.histogram_bins)),
            location_counts: self.group_count_by_location(dataset)?,
        };

        debug!("Aggregated {} rows", result.count);
        Ok(result)
    }

    pub fn mean_rate(&self, dataset: &Dataset) -> PolarsResult<Feature<Option<f64>>> {
        Ok(present_rates(dataset)?.map(|v| mean(&v)))
    }

    pub fn median_rate(&self, dataset: &Dataset) -> PolarsResult<Feature<Option<f64>>> {
        Ok(present_rates(dataset)?.map(|v| median(&v)))
    }

    pub fn distinct_locations(&self, dataset: &Dataset) -> PolarsResult<Feature<usize>> {
        let locations = dataset
            .texts(columns::LOCATION)?
            .reported("destination count");

        Ok(locations.map(|values| values.into_iter().flatten().collect::<BTreeSet<_>>().len()))
    }

    /// The `n` highest-rated rows, highest first. Ties keep row order and
    /// unrated rows rank below every rated one.
    pub fn top_n_by_rate(&self, dataset: &Dataset, n: usize) -> PolarsResult<Feature<Dataset>> {
        let rates = match dataset
            .numbers(columns::STARTING_RATE)?
            .reported("top rated chart")
        {
            Feature::Available(rates) => rates,
            Feature::Unavailable(missing) => return Ok(Feature::Unavailable(missing)),
        };

        let mut order: Vec<usize> = (0..rates.len()).collect();
        order.sort_by(|&a, &b| compare_rates_desc(rates[a], rates[b]));
        order.truncate(n);

        Ok(Feature::Available(dataset.take(&order)?))
    }

    pub fn rate_histogram(
        &self,
        dataset: &Dataset,
        bin_count: usize,
    ) -> PolarsResult<Feature<Vec<HistogramBin>>> {
        Ok(present_rates(dataset)?.map(|v| histogram(&v, bin_count)))
    }

    /// Hotels per destination, busiest first, ties by destination name.
    pub fn group_count_by_location(
        &self,
        dataset: &Dataset,
    ) -> PolarsResult<Feature<Vec<LocationCount>>> {
        let locations = dataset
            .texts(columns::LOCATION)?
            .reported("destination mix chart");

        Ok(locations.map(|values| {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for location in values.into_iter().flatten() {
                *counts.entry(location).or_default() += 1;
            }

            let mut grouped: Vec<LocationCount> = counts
                .into_iter()
                .map(|(location, hotels)| LocationCount { location, hotels })
                .collect();
            // BTreeMap already yields names ascending, a stable sort keeps that for ties
            grouped.sort_by(|a, b| b.hotels.cmp(&a.hotels));
            grouped
        }))
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::from_config(&ChartSection::default())
    }
}

fn present_rates(dataset: &Dataset) -> PolarsResult<Feature<Vec<f64>>> {
    Ok(dataset
        .numbers(columns::STARTING_RATE)?
        .reported("rate statistics")
        .map(|r| r.into_iter().flatten().collect()))
}

fn compare_rates_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Equal-width bins over `[min, max]`; the last bin includes `max`.
/// Non-finite values are not binned.
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width).floor() as usize).min(bin_count - 1);
        bins[index].count += 1;
    }

    bins
}
