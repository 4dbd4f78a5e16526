//! Day path geometry.
//!
//! A polyline is the ordered stop sequence of one day as plain coordinates,
//! ready for a map layer to draw. It carries no road geometry.

use serde::{Deserialize, Serialize};

use crate::geo::{self, Point};

/// Ordered stops of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Wrap points already in visiting order.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Stops in visiting order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consume the polyline, keeping its stops.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Number of stops, not legs.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a day without stops.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Great-circle length of the path.
    pub fn length_km(&self) -> f64 {
        geo::total_path_distance(&self.points)
    }

    /// Consecutive point pairs.
    pub fn legs(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|leg| (leg[0], leg[1]))
    }
}
