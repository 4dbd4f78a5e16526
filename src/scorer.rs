//! Place desirability scoring.
//!
//! `score = w_d * (1 - d / far) + w_r * reviews + w_q * rating`, where `d` is
//! the distance to the current anchor (previous stop or region center).
//! Block ranking layers the category/time-block affinity table on top.

use std::cmp::Ordering;

use chrono::NaiveTime;

use crate::geo::{self, Point};
use crate::model::{Candidate, Category, TimeBlock};
use crate::options::{ScoreWeights, SolveOptions};

const MAX_RATING: f64 = 5.0;
const REVIEW_LOG_BASE: f64 = 3.0;

/// A pool index with its score, ordered best-first by [`compare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub index: usize,
    pub score: f64,
}

/// Scores candidates against an anchor point with the configured weights.
#[derive(Debug, Clone)]
pub struct PlaceScorer {
    weights: ScoreWeights,
    far_km: f64,
}

impl PlaceScorer {
    pub fn new(options: &SolveOptions) -> Self {
        Self {
            weights: options.weights.clone(),
            far_km: options.tiers.far_km,
        }
    }

    /// Weighted sum of closeness to `anchor`, review volume and rating.
    pub fn score(&self, candidate: &Candidate, anchor: Point) -> f64 {
        let distance_term = 1.0 - self.normalized_distance(candidate.location, anchor);
        self.weights.distance * distance_term
            + self.weights.review * self.review_factor(candidate.review_count)
            + self.weights.rating * rating_factor(candidate.rating)
    }

    /// Distance to the anchor over the far tier, clamped to `[0, 1]`.
    pub fn normalized_distance(&self, location: Point, anchor: Point) -> f64 {
        let ratio = geo::distance_km(location, anchor) / self.far_km;
        if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 1.0 }
    }

    /// Log-3 review volume relative to the threshold, clamped to `[0, 1]`.
    pub fn review_factor(&self, review_count: u32) -> f64 {
        let reviews = (f64::from(review_count) + 1.0).log(REVIEW_LOG_BASE);
        let threshold = (f64::from(self.weights.review_threshold) + 1.0).log(REVIEW_LOG_BASE);
        (reviews / threshold).clamp(0.0, 1.0)
    }

    /// Score used to fill a time block: affinity-weighted with a trendy bonus.
    ///
    /// Returns `None` when the candidate may not be placed in the block at all.
    pub fn block_score(
        &self,
        candidate: &Candidate,
        block: TimeBlock,
        anchor: Point,
    ) -> Option<f64> {
        let affinity = affinity(candidate.category, block);
        if affinity <= 0.0 || !open_during(candidate.operating_hours.as_deref(), block) {
            return None;
        }
        let bonus = if candidate.trendy { self.weights.trendy_bonus } else { 0.0 };
        Some(affinity * self.score(candidate, anchor) + bonus)
    }

    /// Score and sort `indices` of `pool` best-first against `anchor`.
    pub fn rank(&self, pool: &[Candidate], indices: &[usize], anchor: Point) -> Vec<Scored> {
        let mut scored: Vec<Scored> = indices
            .iter()
            .map(|&index| Scored {
                index,
                score: self.score(&pool[index], anchor),
            })
            .collect();
        scored.sort_by(|a, b| compare(pool, a, b));
        scored
    }
}

pub fn rating_factor(rating: f64) -> f64 {
    if rating.is_finite() {
        (rating / MAX_RATING).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Best-first ordering: score, then rating, then review count, then pool order.
pub fn compare(pool: &[Candidate], a: &Scored, b: &Scored) -> Ordering {
    let (ca, cb) = (&pool[a.index], &pool[b.index]);
    b.score
        .total_cmp(&a.score)
        .then_with(|| cb.rating.total_cmp(&ca.rating))
        .then_with(|| cb.review_count.cmp(&ca.review_count))
        .then_with(|| a.index.cmp(&b.index))
}

/// How well a category fits a time block. `0.0` means never.
pub fn affinity(category: Category, block: TimeBlock) -> f64 {
    use Category as C;
    use TimeBlock as T;

    match (block, category) {
        (T::Breakfast, C::Cafe) => 1.0,
        (T::Breakfast, C::Restaurant) => 0.8,

        (T::MorningActivity, C::Attraction | C::Culture | C::Nature) => 1.0,
        (T::MorningActivity, C::ThemePark) => 0.8,
        (T::MorningActivity, C::Activity) => 0.7,
        (T::MorningActivity, C::Shopping) => 0.5,

        (T::Lunch, C::Restaurant) => 1.0,

        (T::Cafe, C::Cafe) => 1.0,

        (T::AfternoonActivity, C::Activity | C::ThemePark | C::Shopping) => 1.0,
        (T::AfternoonActivity, C::Attraction) => 0.9,
        (T::AfternoonActivity, C::Culture | C::Nature) => 0.8,

        (T::Dinner, C::Restaurant) => 1.0,

        (T::EveningActivity, C::NightView) => 1.0,
        (T::EveningActivity, C::Shopping | C::Activity) => 0.6,
        (T::EveningActivity, C::Attraction) => 0.5,

        _ => 0.0,
    }
}

/// Highest affinity `category` reaches in any block.
pub fn peak_affinity(category: Category) -> f64 {
    TimeBlock::ORDER
        .iter()
        .map(|&block| affinity(category, block))
        .fold(0.0, f64::max)
}

/// True when `block` is one of the blocks `category` fits best.
pub fn is_preferred(category: Category, block: TimeBlock) -> bool {
    let fit = affinity(category, block);
    fit > 0.0 && fit >= peak_affinity(category)
}

/// Parse `HH:MM-HH:MM` (en dash and `~` accepted as separators).
pub fn parse_hours(text: &str) -> Option<(NaiveTime, NaiveTime)> {
    let normalized = text.trim().replace(['~', '–'], "-");
    let (open, close) = normalized.split_once('-')?;
    let open = NaiveTime::parse_from_str(open.trim(), "%H:%M").ok()?;
    let close = NaiveTime::parse_from_str(close.trim(), "%H:%M").ok()?;
    Some((open, close))
}

/// Whether the hours overlap the block window. Unknown hours count as open.
pub fn open_during(hours: Option<&str>, block: TimeBlock) -> bool {
    let Some((open, close)) = hours.and_then(parse_hours) else {
        return true;
    };
    let (start, end) = block.window();
    if close <= open {
        // Past midnight: open from `open` to the end of the day and from
        // midnight to `close`.
        return end > open || start < close;
    }
    open < end && start < close
}
