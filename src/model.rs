//! Planner data model.
//!
//! Candidates come from an upstream collector and are only read. Scheduling
//! produces annotated copies ([`ScheduledPlace`]); the pool is never touched.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::geo::{DistanceTier, Point};
use crate::polyline::Polyline;

/// Kind of place. `Lodging` is never scheduled as a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Attraction,
    Restaurant,
    Cafe,
    Shopping,
    Activity,
    Culture,
    Nature,
    ThemePark,
    NightView,
    Lodging,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Attraction,
        Category::Restaurant,
        Category::Cafe,
        Category::Shopping,
        Category::Activity,
        Category::Culture,
        Category::Nature,
        Category::ThemePark,
        Category::NightView,
        Category::Lodging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Attraction => "attraction",
            Category::Restaurant => "restaurant",
            Category::Cafe => "cafe",
            Category::Shopping => "shopping",
            Category::Activity => "activity",
            Category::Culture => "culture",
            Category::Nature => "nature",
            Category::ThemePark => "theme-park",
            Category::NightView => "night-view",
            Category::Lodging => "lodging",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point of interest eligible for scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub location: Point,
    /// 0.0 to 5.0.
    pub rating: f64,
    pub review_count: u32,
    /// Free text; `HH:MM-HH:MM` is understood, anything else means "assume open".
    pub operating_hours: Option<String>,
    pub price_tier: Option<u8>,
    pub trendy: bool,
    /// Street address, used only to label regions.
    pub address: Option<String>,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        location: Point,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            location,
            rating: 0.0,
            review_count: 0,
            operating_hours: None,
            price_tier: None,
            trendy: false,
            address: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_reviews(mut self, review_count: u32) -> Self {
        self.review_count = review_count;
        self
    }

    pub fn with_hours(mut self, hours: impl Into<String>) -> Self {
        self.operating_hours = Some(hours.into());
        self
    }

    pub fn with_price_tier(mut self, tier: u8) -> Self {
        self.price_tier = Some(tier);
        self
    }

    pub fn trendy(mut self) -> Self {
        self.trendy = true;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// True when the reference names this candidate by id or display name.
    pub fn matches(&self, reference: &str) -> bool {
        self.id == reference || self.name == reference
    }
}

/// Named segment of a travel day, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeBlock {
    Breakfast,
    MorningActivity,
    Lunch,
    Cafe,
    AfternoonActivity,
    Dinner,
    EveningActivity,
}

impl TimeBlock {
    pub const ORDER: [TimeBlock; 7] = [
        TimeBlock::Breakfast,
        TimeBlock::MorningActivity,
        TimeBlock::Lunch,
        TimeBlock::Cafe,
        TimeBlock::AfternoonActivity,
        TimeBlock::Dinner,
        TimeBlock::EveningActivity,
    ];

    /// Start and end of the block. The cafe block overlaps the afternoon.
    pub fn window(&self) -> (NaiveTime, NaiveTime) {
        let (start, end) = match self {
            TimeBlock::Breakfast => (7, 9),
            TimeBlock::MorningActivity => (9, 12),
            TimeBlock::Lunch => (12, 14),
            TimeBlock::Cafe => (14, 16),
            TimeBlock::AfternoonActivity => (14, 18),
            TimeBlock::Dinner => (18, 20),
            TimeBlock::EveningActivity => (20, 22),
        };
        (hour(start), hour(end))
    }

    /// Block a booking starting at `time` falls into. Early-morning and
    /// late-night starts (before 06:00, from 23:00) have no block.
    pub fn for_time(time: NaiveTime) -> Option<TimeBlock> {
        let block = match time.hour() {
            6..=9 => TimeBlock::Breakfast,
            10..=11 => TimeBlock::MorningActivity,
            12..=13 => TimeBlock::Lunch,
            14..=15 => TimeBlock::Cafe,
            16..=17 => TimeBlock::AfternoonActivity,
            18..=19 => TimeBlock::Dinner,
            20..=22 => TimeBlock::EveningActivity,
            _ => return None,
        };
        Some(block)
    }

    pub fn is_meal(&self) -> bool {
        matches!(self, TimeBlock::Breakfast | TimeBlock::Lunch | TimeBlock::Dinner)
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// A candidate copied into a day's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPlace {
    pub candidate: Candidate,
    pub day: u32,
    pub block: TimeBlock,
    /// Name of the region the place was drawn from.
    pub region: String,
    /// Block score at the time of selection.
    pub score: f64,
}

/// A rest slot inserted by a review pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestBreak {
    pub block: TimeBlock,
    /// Id of the place the break follows.
    pub after: String,
    pub minutes: u32,
}

/// A confirmed booking pinned to a day and block.
///
/// Bookings are placed before any regular pick and close their block to
/// regular picks on that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSlot {
    /// 1-based trip day.
    pub day: u32,
    pub block: TimeBlock,
    pub candidate: Candidate,
}

impl FixedSlot {
    pub fn new(day: u32, block: TimeBlock, candidate: Candidate) -> Self {
        Self {
            day,
            block,
            candidate,
        }
    }

    /// Booking starting at `time` on `day`; `None` when no block covers it.
    pub fn starting_at(day: u32, time: NaiveTime, candidate: Candidate) -> Option<Self> {
        TimeBlock::for_time(time).map(|block| Self::new(day, block, candidate))
    }
}

/// Leg counts per distance tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegProfile {
    pub walking: usize,
    pub near: usize,
    pub far: usize,
    pub beyond: usize,
}

impl LegProfile {
    pub fn record(&mut self, tier: DistanceTier) {
        match tier {
            DistanceTier::Walking => self.walking += 1,
            DistanceTier::Near => self.near += 1,
            DistanceTier::Far => self.far += 1,
            DistanceTier::Beyond => self.beyond += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.walking + self.near + self.far + self.beyond
    }
}

/// One assembled day. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyItinerary {
    /// 1-based.
    pub day: u32,
    pub date: NaiveDate,
    /// Regions in order of first visit.
    pub regions: Vec<String>,
    /// Places in schedule order.
    pub places: Vec<ScheduledPlace>,
    pub breaks: Vec<RestBreak>,
    pub total_distance_km: f64,
    pub travel_minutes: u32,
    pub legs: LegProfile,
    pub path: Polyline,
}

impl DailyItinerary {
    /// A day with no stops.
    pub fn empty(day: u32, date: NaiveDate) -> Self {
        Self {
            day,
            date,
            regions: Vec::new(),
            places: Vec::new(),
            breaks: Vec::new(),
            total_distance_km: 0.0,
            travel_minutes: 0,
            legs: LegProfile::default(),
            path: Polyline::new(Vec::new()),
        }
    }

    /// Places scheduled in `block`, in visiting order.
    pub fn places_in(&self, block: TimeBlock) -> impl Iterator<Item = &ScheduledPlace> {
        self.places.iter().filter(move |p| p.block == block)
    }

    pub fn has_block(&self, block: TimeBlock) -> bool {
        self.places_in(block).next().is_some()
    }
}

/// Day number to itinerary, ordered by day.
pub type Itinerary = BTreeMap<u32, DailyItinerary>;

/// Aggregate statistics over a finished itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelSummary {
    pub total_days: usize,
    pub total_places: usize,
    /// Distinct region names across all days.
    pub total_regions: usize,
    /// `total_regions / total_days`, 0 for an empty itinerary.
    pub average_regions_per_day: f64,
    pub category_distribution: BTreeMap<Category, usize>,
    pub estimated_total_distance_km: f64,
    /// True when a review pass ran, even if it changed nothing.
    pub review_applied: bool,
}
