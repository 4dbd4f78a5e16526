//! Day route assembly.
//!
//! Time-block order is fixed; only the stops inside one block may be
//! reordered, nearest-first from the previous stop. Distance is the
//! great-circle length of the resulting stop sequence.

use chrono::NaiveDate;

use crate::geo::{self, DistanceTier, Point};
use crate::model::{DailyItinerary, LegProfile, RestBreak, ScheduledPlace, TimeBlock};
use crate::options::SolveOptions;
use crate::polyline::Polyline;

/// Reorder the places of each block nearest-first, starting from `origin`
/// (or from the block's first place when there is none). Blocks stay in
/// chronological order.
pub fn order_within_blocks(
    places: Vec<ScheduledPlace>,
    origin: Option<Point>,
) -> Vec<ScheduledPlace> {
    let mut remaining = places;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut previous = origin;

    for block in TimeBlock::ORDER {
        let (mut group, rest): (Vec<ScheduledPlace>, Vec<ScheduledPlace>) =
            remaining.into_iter().partition(|p| p.block == block);
        remaining = rest;

        while !group.is_empty() {
            let next = match previous {
                Some(from) => {
                    let points: Vec<Point> = group.iter().map(|p| p.candidate.location).collect();
                    geo::nearest_of(from, &points).unwrap_or(0)
                }
                None => 0,
            };
            let place = group.remove(next);
            previous = Some(place.candidate.location);
            ordered.push(place);
        }
    }

    ordered
}

/// Build the day value from places already in their final order.
///
/// Places are stably sorted by block, so a reordering inside a block
/// survives. Breaks that follow a place no longer on this day are dropped.
pub fn assemble(
    day: u32,
    date: NaiveDate,
    mut places: Vec<ScheduledPlace>,
    breaks: Vec<RestBreak>,
    options: &SolveOptions,
) -> DailyItinerary {
    places.sort_by_key(|p| p.block);
    for place in &mut places {
        place.day = day;
    }

    let mut regions: Vec<String> = Vec::new();
    for place in &places {
        if !regions.contains(&place.region) {
            regions.push(place.region.clone());
        }
    }

    let breaks = breaks
        .into_iter()
        .filter(|b| places.iter().any(|p| p.candidate.id == b.after))
        .collect();

    let path = Polyline::new(places.iter().map(|p| p.candidate.location).collect());
    let mut legs = LegProfile::default();
    let mut travel_minutes = 0.0;
    for (from, to) in path.legs() {
        let km = geo::distance_km(from, to);
        let tier = DistanceTier::classify(km, &options.tiers);
        legs.record(tier);
        travel_minutes += km_to_minutes(km, tier, options);
    }

    DailyItinerary {
        day,
        date,
        regions,
        places,
        breaks,
        total_distance_km: path.length_km(),
        travel_minutes: travel_minutes.round() as u32,
        legs,
        path,
    }
}

/// Walking-tier legs are walked; longer ones use the default speed.
fn km_to_minutes(km: f64, tier: DistanceTier, options: &SolveOptions) -> f64 {
    let speed = match tier {
        DistanceTier::Walking => options.speeds.walking_kmh,
        _ => options.speeds.default_kmh,
    };
    km / speed * 60.0
}
