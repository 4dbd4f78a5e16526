//! itinerary-planner core
//!
//! Turns a pool of candidate places into a multi-day travel itinerary:
//! geographic clustering into regions, region ranking, per-day time-block
//! allocation, in-block route ordering and a trip summary. An optional
//! review pass applies structured edits from an external reviewer.
//!
//! The crate performs no I/O. Region labels and review suggestions come in
//! through the seams in [`traits`].

pub mod allocator;
pub mod cluster;
pub mod error;
pub mod geo;
pub mod model;
pub mod options;
pub mod polyline;
pub mod region;
pub mod review;
pub mod route;
pub mod scorer;
pub mod solver;
pub mod summary;
pub mod traits;

pub use error::{PlannerError, Result};
pub use geo::{distance_km, Point};
pub use model::{
    Candidate, Category, DailyItinerary, FixedSlot, Itinerary, ScheduledPlace, TimeBlock,
    TravelSummary,
};
pub use options::SolveOptions;
pub use review::{apply_adjustments, AdjustmentReport, Suggestion, SuggestionKind};
pub use solver::{draft, finalize, solve, solve_with_review, DraftPlan, PlanRequest, PlannerResult};
pub use traits::{AddressNamer, GeneratedNamer, RegionNamer, SuggestionSource};
