//! Great-circle geometry on latitude/longitude degrees.
//!
//! Pure functions only. Distances are straight-line estimates and ignore
//! roads, which is enough for grouping and ordering nearby places.

use serde::{Deserialize, Serialize};

use crate::options::DistanceTiers;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        distance_km(*self, other)
    }
}

impl From<(f64, f64)> for Point {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance between two points in kilometers.
pub fn distance_km(from: Point, to: Point) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Arithmetic mean of the coordinates, or `None` for an empty slice.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));

    Some(Point::new(lat_sum / n, lng_sum / n))
}

/// Sum of consecutive leg distances. Zero for fewer than two points.
pub fn total_path_distance(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|leg| distance_km(leg[0], leg[1]))
        .sum()
}

/// Index of the candidate nearest to `point`; the first one wins ties.
pub fn nearest_of(point: Point, candidates: &[Point]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let d = distance_km(point, *candidate);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Coarse distance class for a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceTier {
    Walking,
    Near,
    Far,
    Beyond,
}

impl DistanceTier {
    pub fn classify(km: f64, tiers: &DistanceTiers) -> Self {
        if km <= tiers.walking_km {
            Self::Walking
        } else if km <= tiers.near_km {
            Self::Near
        } else if km <= tiers.far_km {
            Self::Far
        } else {
            Self::Beyond
        }
    }
}
