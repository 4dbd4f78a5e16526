//! Test fixtures for itinerary-planner.
//!
//! Provides realistic test data including:
//! - Real Seoul landmark locations grouped by district
//! - Builders that turn them into candidates with stable ratings

#![allow(dead_code)]

pub mod seoul_places;

use chrono::NaiveDate;
use itinerary_planner::{Candidate, Category};

pub use seoul_places::*;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

/// Candidate for a fixture location. Rating and review count derive from
/// `seq` so pools are varied but reproducible.
pub fn candidate(seq: usize, location: &Location, category: Category) -> Candidate {
    let rating = 3.6 + (seq % 15) as f64 * 0.1;
    let reviews = ((seq * 737) % 4000) as u32 + 50;
    Candidate::new(format!("seoul-{seq:03}"), location.name, category, location.point())
        .with_rating(rating)
        .with_reviews(reviews)
        .with_address(format!("{} {}", location.district, location.name))
}

/// Every fixture location except hotels, as candidates.
pub fn seoul_pool() -> Vec<Candidate> {
    let mut tagged: Vec<(&Location, Category)> = Vec::new();
    tagged.extend(JONGNO_SIGHTS.iter().map(|l| (l, Category::Attraction)));
    tagged.extend(JONGNO_RESTAURANTS.iter().map(|l| (l, Category::Restaurant)));
    tagged.extend(JONGNO_CAFES.iter().map(|l| (l, Category::Cafe)));
    tagged.extend(JUNG_SIGHTS.iter().map(|l| (l, Category::Attraction)));
    tagged.extend(JUNG_RESTAURANTS.iter().map(|l| (l, Category::Restaurant)));
    for group in [JUNG_OTHER, MAPO_PLACES, GANGNAM_PLACES, SONGPA_PLACES] {
        tagged.extend(group.iter().map(|(l, c)| (l, *c)));
    }

    tagged
        .into_iter()
        .enumerate()
        .map(|(seq, (location, category))| candidate(seq, location, category))
        .collect()
}

/// Candidates from the given districts only.
pub fn district_pool(districts: &[&str]) -> Vec<Candidate> {
    seoul_pool()
        .into_iter()
        .filter(|c| {
            c.address
                .as_deref()
                .and_then(|a| a.split_whitespace().next())
                .is_some_and(|d| districts.contains(&d))
        })
        .collect()
}

pub fn hotel(location: &Location) -> Candidate {
    Candidate::new(location.name, location.name, Category::Lodging, location.point())
        .with_rating(4.8)
}
