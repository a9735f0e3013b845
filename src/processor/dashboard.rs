use polars::prelude::PolarsResult;
use std::collections::BTreeSet;

use crate::models::{Dataset, Feature, RateSlider, columns};

const SLIDER_FLOOR_MAX: f64 = 1000.0;
const SLIDER_STEP: f64 = 50.0;

/// Sorted distinct destinations for the destination picker.
pub fn location_options(dataset: &Dataset) -> PolarsResult<Feature<Vec<String>>> {
    Ok(dataset
        .texts(columns::LOCATION)?
        .reported("destination picker")
        .map(|values| {
            values
                .into_iter()
                .flatten()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }))
}

/// Budget slider bounds. The slider starts at 0 and reaches at least 1000,
/// with the observed rate range preselected. `None` when nothing is rated.
pub fn rate_slider(dataset: &Dataset) -> PolarsResult<Feature<Option<RateSlider>>> {
    Ok(dataset
        .numbers(columns::STARTING_RATE)?
        .reported("budget slider")
        .map(|values| {
            let rates: Vec<f64> = values.into_iter().flatten().collect();
            if rates.is_empty() {
                return None;
            }

            let min = rates.iter().copied().fold(f64::INFINITY, f64::min);
            let max = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            Some(RateSlider {
                min: 0.0,
                max: max.max(SLIDER_FLOOR_MAX),
                step: SLIDER_STEP,
                default: (min, max),
            })
        }))
}

/// The property directory: known columns in display order, sorted by rank
/// with unranked rows last.
pub fn directory_view(dataset: &Dataset) -> PolarsResult<Dataset> {
    let existing: Vec<&str> = columns::DIRECTORY
        .iter()
        .copied()
        .filter(|c| dataset.has_column(c))
        .collect();

    let view = dataset.select(&existing)?;

    match view.numbers(columns::RANK)? {
        Feature::Available(ranks) => {
            let mut order: Vec<usize> = (0..ranks.len()).collect();
            order.sort_by(|&a, &b| match (ranks[a], ranks[b]) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            view.take(&order)
        }
        Feature::Unavailable(_) => Ok(view),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn test_location_options_sorted_and_distinct() {
        let frame = df!(
            "Location" => [Some("Venice"), Some("Bangkok"), None, Some("Venice")],
        )
        .unwrap();
        let options = location_options(&Dataset::new(frame))
            .unwrap()
            .into_available()
            .unwrap();
        assert_eq!(options, vec!["Bangkok", "Venice"]);
    }

    #[test]
    fn test_rate_slider_bounds() {
        let frame = df!("Starting Rate in ($)" => [Some(350.0), None, Some(700.0)]).unwrap();
        let slider = rate_slider(&Dataset::new(frame))
            .unwrap()
            .into_available()
            .unwrap()
            .unwrap();
        assert_eq!(slider.min, 0.0);
        assert_eq!(slider.max, 1000.0);
        assert_eq!(slider.step, 50.0);
        assert_eq!(slider.default, (350.0, 700.0));

        let frame = df!("Starting Rate in ($)" => [2200.0, 1800.0]).unwrap();
        let slider = rate_slider(&Dataset::new(frame))
            .unwrap()
            .into_available()
            .unwrap()
            .unwrap();
        assert_eq!(slider.max, 2200.0);
    }

    #[test]
    fn test_rate_slider_without_rates() {
        let frame = df!("Starting Rate in ($)" => [None::<f64>, None]).unwrap();
        let slider = rate_slider(&Dataset::new(frame)).unwrap();
        assert_eq!(slider, Feature::Available(None));

        let frame = df!("Name" => ["Aman Venice"]).unwrap();
        assert!(!rate_slider(&Dataset::new(frame)).unwrap().is_available());
    }

    #[test]
    fn test_directory_view_sorts_by_rank() {
        let frame = df!(
            "Stars" => [5, 4, 5],
            "Name" => ["Rosewood NY", "Aman Venice", "Capella Bangkok"],
            "Rank" => [None, Some(1.0), Some(2.0)],
        )
        .unwrap();
        let view = directory_view(&Dataset::new(frame)).unwrap();

        assert_eq!(view.column_names(), vec!["Rank", "Name"]);
        assert_eq!(
            view.names().unwrap(),
            vec!["Aman Venice", "Capella Bangkok", "Rosewood NY"]
        );
    }

    #[test]
    fn test_directory_view_without_rank_keeps_order() {
        let frame = df!("Name" => ["B", "A"], "Location" => ["X", "Y"]).unwrap();
        let view = directory_view(&Dataset::new(frame)).unwrap();
        assert_eq!(view.names().unwrap(), vec!["B", "A"]);
    }
}
