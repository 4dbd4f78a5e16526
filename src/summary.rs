//! Trip-level statistics over a finished itinerary.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Category, Itinerary, TravelSummary};

/// Walk every day once and aggregate.
///
/// `review_applied` records whether a review pass ran over the draft.
pub fn build_summary(itinerary: &Itinerary, review_applied: bool) -> TravelSummary {
    let mut category_distribution: BTreeMap<Category, usize> = BTreeMap::new();
    let mut regions: BTreeSet<&str> = BTreeSet::new();
    let mut total_places = 0;
    let mut distance = 0.0;

    for day in itinerary.values() {
        total_places += day.places.len();
        distance += day.total_distance_km;
        for place in &day.places {
            *category_distribution.entry(place.candidate.category).or_insert(0) += 1;
            regions.insert(place.region.as_str());
        }
        regions.extend(day.regions.iter().map(String::as_str));
    }

    let total_days = itinerary.len();
    let average_regions_per_day = if total_days == 0 {
        0.0
    } else {
        regions.len() as f64 / total_days as f64
    };

    TravelSummary {
        total_days,
        total_places,
        total_regions: regions.len(),
        average_regions_per_day,
        category_distribution,
        estimated_total_distance_km: distance,
        review_applied,
    }
}
