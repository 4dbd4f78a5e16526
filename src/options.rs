//! Optimization parameters.
//!
//! Every group derives serde with `#[serde(default)]`, so hosts can load
//! partial overrides from JSON or TOML and keep the defaults for the rest.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Every tunable of a planning run, grouped by concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    pub tiers: DistanceTiers,
    pub weights: ScoreWeights,
    pub capacity: Capacity,
    pub clustering: ClusteringOptions,
    pub speeds: TravelSpeeds,
    pub review: ReviewThresholds,
}

/// Distance tiers in kilometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceTiers {
    pub walking_km: f64,
    pub near_km: f64,
    /// Also the normalization span for the distance term of place scoring.
    pub far_km: f64,
    /// Small regions only merge into a day whose region lies within this radius.
    pub cluster_radius_km: f64,
}

impl Default for DistanceTiers {
    fn default() -> Self {
        Self {
            walking_km: 2.0,
            near_km: 5.0,
            far_km: 10.0,
            cluster_radius_km: 5.0,
        }
    }
}

/// Weights of the place and region scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Place-score weights. The defaults sum to 1.
    pub distance: f64,
    pub review: f64,
    pub rating: f64,
    /// Review volume past which more reviews stop adding score.
    pub review_threshold: u32,
    /// Weight of the normalized average rating in region ranking.
    pub region_base: f64,
    /// Weight of category diversity in region ranking.
    pub region_diversity: f64,
    /// Added to a candidate's block score when it is flagged trendy.
    pub trendy_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance: 0.4,
            review: 0.3,
            rating: 0.3,
            review_threshold: 1000,
            region_base: 0.6,
            region_diversity: 0.4,
            trendy_bonus: 0.05,
        }
    }
}

/// Hard caps on what a plan may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacity {
    /// Places per time block per day, bookings included.
    pub per_time_block: usize,
    pub per_category_per_region: usize,
    pub per_region: usize,
    pub min_trip_days: u32,
    pub max_trip_days: u32,
    /// Regions smaller than this try to share a day with a nearby region.
    pub small_region_size: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            per_time_block: 2,
            per_category_per_region: 10,
            per_region: 10,
            min_trip_days: 1,
            max_trip_days: 3,
            small_region_size: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringOptions {
    /// Lloyd iteration cap. Hitting it is reported, not an error.
    pub max_iterations: usize,
    /// Relative WCSS decrease below which adding clusters stops paying off.
    pub elbow_threshold: f64,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            elbow_threshold: 0.2,
        }
    }
}

/// Speeds used to estimate travel time, in km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelSpeeds {
    pub walking_kmh: f64,
    pub default_kmh: f64,
}

impl Default for TravelSpeeds {
    fn default() -> Self {
        Self {
            walking_kmh: 4.0,
            default_kmh: 25.0,
        }
    }
}

/// Limits past which a draft itinerary is worth sending to an external reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewThresholds {
    pub max_daily_distance_km: f64,
    pub min_places_per_day: usize,
    pub max_places_per_day: usize,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            max_daily_distance_km: 20.0,
            min_places_per_day: 4,
            max_places_per_day: 10,
        }
    }
}

impl SolveOptions {
    /// Check the parameters once, before any computation runs.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidOption`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let tiers = &self.tiers;
        positive("tiers.walking_km", tiers.walking_km)?;
        positive("tiers.near_km", tiers.near_km)?;
        positive("tiers.far_km", tiers.far_km)?;
        positive("tiers.cluster_radius_km", tiers.cluster_radius_km)?;
        if !(tiers.walking_km <= tiers.near_km && tiers.near_km <= tiers.far_km) {
            return Err(PlannerError::invalid_option(
                "tiers",
                "expected walking_km <= near_km <= far_km",
            ));
        }

        let weights = &self.weights;
        non_negative("weights.distance", weights.distance)?;
        non_negative("weights.review", weights.review)?;
        non_negative("weights.rating", weights.rating)?;
        non_negative("weights.region_base", weights.region_base)?;
        non_negative("weights.region_diversity", weights.region_diversity)?;
        non_negative("weights.trendy_bonus", weights.trendy_bonus)?;
        if weights.review_threshold == 0 {
            return Err(PlannerError::invalid_option(
                "weights.review_threshold",
                "must be at least 1",
            ));
        }

        let capacity = &self.capacity;
        for (field, value) in [
            ("capacity.per_time_block", capacity.per_time_block),
            ("capacity.per_category_per_region", capacity.per_category_per_region),
            ("capacity.per_region", capacity.per_region),
        ] {
            if value == 0 {
                return Err(PlannerError::invalid_option(field, "must be at least 1"));
            }
        }
        if capacity.min_trip_days == 0 {
            return Err(PlannerError::invalid_option(
                "capacity.min_trip_days",
                "must be at least 1",
            ));
        }
        if capacity.min_trip_days > capacity.max_trip_days {
            return Err(PlannerError::invalid_option(
                "capacity.max_trip_days",
                format!(
                    "{} is below min_trip_days {}",
                    capacity.max_trip_days, capacity.min_trip_days
                ),
            ));
        }

        if self.clustering.max_iterations == 0 {
            return Err(PlannerError::invalid_option(
                "clustering.max_iterations",
                "must be at least 1",
            ));
        }
        non_negative("clustering.elbow_threshold", self.clustering.elbow_threshold)?;

        positive("speeds.walking_kmh", self.speeds.walking_kmh)?;
        positive("speeds.default_kmh", self.speeds.default_kmh)?;

        non_negative("review.max_daily_distance_km", self.review.max_daily_distance_km)?;
        if self.review.min_places_per_day > self.review.max_places_per_day {
            return Err(PlannerError::invalid_option(
                "review.max_places_per_day",
                "is below min_places_per_day",
            ));
        }

        Ok(())
    }

    /// Clamp a requested trip length into the configured bounds.
    pub fn clamp_trip_days(&self, requested: i64) -> u32 {
        let min = i64::from(self.capacity.min_trip_days);
        let max = i64::from(self.capacity.max_trip_days);
        // Both bounds come from u32, so the clamped value fits.
        requested.clamp(min, max) as u32
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlannerError::invalid_option(
            field,
            format!("must be a positive finite number, got {value}"),
        ))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlannerError::invalid_option(
            field,
            format!("must be a non-negative finite number, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SolveOptions::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_block_capacity_rejected() {
        let mut options = SolveOptions::default();
        options.capacity.per_time_block = 0;

        let err = options.validate().unwrap_err();
        assert_eq!(
            err,
            PlannerError::invalid_option("capacity.per_time_block", "must be at least 1")
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut options = SolveOptions::default();
        options.weights.review = -0.1;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_inverted_day_bounds_rejected() {
        let mut options = SolveOptions::default();
        options.capacity.min_trip_days = 4;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_nan_tier_rejected() {
        let mut options = SolveOptions::default();
        options.tiers.far_km = f64::NAN;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_clamp_trip_days() {
        let options = SolveOptions::default();
        assert_eq!(options.clamp_trip_days(0), 1);
        assert_eq!(options.clamp_trip_days(-7), 1);
        assert_eq!(options.clamp_trip_days(2), 2);
        assert_eq!(options.clamp_trip_days(5), 3);
    }
}
