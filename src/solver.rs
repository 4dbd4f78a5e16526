//! Planning pipeline.
//!
//! `draft` runs clustering, region profiling and per-day allocation.
//! `finalize` applies review suggestions (if any) and builds the summary.
//! `solve` and `solve_with_review` chain the two.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::allocator::{self, DayContext};
use crate::cluster;
use crate::error::Result;
use crate::geo::Point;
use crate::model::{Candidate, DailyItinerary, FixedSlot, Itinerary, TravelSummary};
use crate::options::SolveOptions;
use crate::region::{self, RegionProfile};
use crate::review::{self, AdjustmentReport, Suggestion};
use crate::scorer::PlaceScorer;
use crate::summary;
use crate::traits::{RegionNamer, SuggestionSource};

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    /// Requested trip length; clamped into the configured bounds.
    pub trip_days: i64,
    pub start_date: NaiveDate,
    /// Fixed region count. Picked with the elbow method when absent.
    pub target_regions: Option<usize>,
    /// Starting point for each day's first block, e.g. the hotel.
    /// Ignored when its coordinates are out of range.
    pub anchor: Option<Point>,
    /// Confirmed bookings. They are scheduled as given and close their block.
    pub fixed: Vec<FixedSlot>,
    /// Ids or names of pool candidates that must be scheduled if at all possible.
    pub required: Vec<String>,
}

impl PlanRequest {
    pub fn new(trip_days: i64, start_date: NaiveDate) -> Self {
        Self {
            trip_days,
            start_date,
            target_regions: None,
            anchor: None,
            fixed: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn with_target_regions(mut self, regions: usize) -> Self {
        self.target_regions = Some(regions);
        self
    }

    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_booking(mut self, slot: FixedSlot) -> Self {
        self.fixed.push(slot);
        self
    }

    pub fn with_fixed(mut self, slots: impl IntoIterator<Item = FixedSlot>) -> Self {
        self.fixed.extend(slots);
        self
    }

    pub fn with_required(mut self, reference: impl Into<String>) -> Self {
        self.required.push(reference.into());
        self
    }
}

/// Observations about a planning run that did not stop it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDiagnostics {
    /// Day count after clamping.
    pub trip_days: u32,
    pub cluster_count: usize,
    pub iterations: usize,
    /// False when clustering stopped at the iteration cap.
    pub converged: bool,
    /// Ids of candidates skipped for malformed coordinates.
    pub excluded: Vec<String>,
    /// Candidates cut by the per-region cap.
    pub dropped_by_cap: usize,
    /// Regions best-first.
    pub regions: Vec<RegionProfile>,
    /// Bookings left out: day outside the trip, bad coordinates, or block
    /// already holding `per_time_block` bookings.
    pub unplaced_fixed: Vec<FixedSlot>,
    /// Required references that matched no candidate.
    pub unknown_required: Vec<String>,
    /// Ids of required candidates that still found no slot.
    pub unscheduled_required: Vec<String>,
}

/// Output of [`draft`]: the itinerary before any review pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPlan {
    pub itineraries: Itinerary,
    pub diagnostics: PlanDiagnostics,
}

/// Final output of a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerResult {
    /// Days keyed by day number, after any review edits.
    pub itineraries: Itinerary,
    pub summary: TravelSummary,
    pub diagnostics: PlanDiagnostics,
    /// Present when a review pass ran.
    pub adjustments: Option<AdjustmentReport>,
}

/// Cluster the pool, rank the regions and fill every day.
///
/// # Errors
///
/// Fails only when `options` does not validate. Data problems such as an
/// empty pool or malformed coordinates produce a smaller itinerary instead.
pub fn draft<N: RegionNamer>(
    pool: &[Candidate],
    request: &PlanRequest,
    namer: &N,
    options: &SolveOptions,
) -> Result<DraftPlan> {
    options.validate()?;

    let trip_days = options.clamp_trip_days(request.trip_days);
    if i64::from(trip_days) != request.trip_days {
        debug!(requested = request.trip_days, trip_days, "clamped trip length");
    }

    let anchor = request.anchor.filter(|point| {
        let valid = point.is_valid();
        if !valid {
            warn!(lat = point.lat, lng = point.lng, "ignoring anchor with invalid coordinates");
        }
        valid
    });
    let (fixed_by_day, unplaced_fixed) = group_bookings(&request.fixed, trip_days, options);
    let booked: Vec<bool> = pool
        .iter()
        .map(|c| fixed_by_day.values().flatten().any(|slot| slot.candidate.id == c.id))
        .collect();
    let (required, unknown_required) = resolve_required(pool, &request.required);

    let k = request
        .target_regions
        .unwrap_or_else(|| cluster::choose_k(pool, trip_days, options));
    let clustered = cluster::kmeans(pool, k, options.clustering.max_iterations);
    info!(
        candidates = pool.len(),
        k,
        iterations = clustered.iterations,
        converged = clustered.converged,
        "clustering finished"
    );

    let scorer = PlaceScorer::new(options);
    let (clusters, dropped_by_cap) =
        cluster::truncate(pool, clustered.clusters, &required, &scorer, options);
    let regions = region::profile_regions(pool, &clusters, namer, &options.weights);
    let priority: Vec<bool> = regions
        .iter()
        .map(|r| r.members.iter().any(|&i| required[i] && !booked[i]))
        .collect();
    let assigned = allocator::assign_regions(&regions, trip_days, &priority, options);

    let day_regions: Vec<Vec<&RegionProfile>> = assigned
        .iter()
        .map(|indices| indices.iter().map(|&i| &regions[i]).collect())
        .collect();

    let days: Vec<DailyItinerary> = day_regions
        .par_iter()
        .enumerate()
        .map(|(offset, regions)| {
            let day = offset as u32 + 1;
            allocator::allocate_day(DayContext {
                day,
                date: day_date(request.start_date, offset),
                pool,
                regions,
                anchor,
                fixed: fixed_by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]),
                required: &required,
                booked: &booked,
                scorer: &scorer,
                options,
            })
        })
        .collect();

    for day in &days {
        info!(
            day = day.day,
            places = day.places.len(),
            regions = day.regions.len(),
            distance_km = day.total_distance_km,
            "day allocated"
        );
    }

    let unscheduled_required: Vec<String> = pool
        .iter()
        .enumerate()
        .filter(|&(i, c)| {
            required[i]
                && !booked[i]
                && !days.iter().any(|d| d.places.iter().any(|p| p.candidate.id == c.id))
        })
        .map(|(_, c)| c.id.clone())
        .collect();
    for id in &unscheduled_required {
        warn!(id = %id, "required place could not be scheduled");
    }

    let diagnostics = PlanDiagnostics {
        trip_days,
        cluster_count: regions.len(),
        iterations: clustered.iterations,
        converged: clustered.converged,
        excluded: clustered
            .excluded
            .iter()
            .map(|&i| pool[i].id.clone())
            .collect(),
        dropped_by_cap,
        regions: regions.clone(),
        unplaced_fixed,
        unknown_required,
        unscheduled_required,
    };

    Ok(DraftPlan {
        itineraries: days.into_iter().map(|d| (d.day, d)).collect(),
        diagnostics,
    })
}

/// Split bookings by day, keeping at most `per_time_block` per block.
///
/// Returns the kept bookings per day in request order, and the rest.
fn group_bookings(
    fixed: &[FixedSlot],
    trip_days: u32,
    options: &SolveOptions,
) -> (BTreeMap<u32, Vec<FixedSlot>>, Vec<FixedSlot>) {
    let mut by_day: BTreeMap<u32, Vec<FixedSlot>> = BTreeMap::new();
    let mut unplaced = Vec::new();

    for slot in fixed {
        if slot.day == 0 || slot.day > trip_days {
            warn!(day = slot.day, trip_days, id = %slot.candidate.id, "booking outside the trip");
            unplaced.push(slot.clone());
            continue;
        }
        if !slot.candidate.location.is_valid() {
            warn!(id = %slot.candidate.id, "booking with invalid coordinates");
            unplaced.push(slot.clone());
            continue;
        }
        let day = by_day.entry(slot.day).or_default();
        let in_block = day.iter().filter(|kept| kept.block == slot.block).count();
        if in_block >= options.capacity.per_time_block {
            warn!(
                day = slot.day,
                block = ?slot.block,
                id = %slot.candidate.id,
                "block already fully booked"
            );
            unplaced.push(slot.clone());
            continue;
        }
        day.push(slot.clone());
    }

    (by_day, unplaced)
}

/// Flag pool entries named by `references`. Unmatched references come back
/// as the second value.
fn resolve_required(pool: &[Candidate], references: &[String]) -> (Vec<bool>, Vec<String>) {
    let mut flags = vec![false; pool.len()];
    let mut unknown = Vec::new();
    for reference in references {
        match pool.iter().position(|c| c.matches(reference)) {
            Some(index) => flags[index] = true,
            None => {
                warn!(reference = %reference, "required place not in the candidate pool");
                unknown.push(reference.clone());
            }
        }
    }
    (flags, unknown)
}

fn day_date(start: NaiveDate, offset: usize) -> NaiveDate {
    start
        .checked_add_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Apply `suggestions` when given, then summarize.
pub fn finalize(
    plan: DraftPlan,
    suggestions: Option<&[Suggestion]>,
    options: &SolveOptions,
) -> PlannerResult {
    let (itineraries, adjustments) = match suggestions {
        Some(suggestions) => {
            let (adjusted, report) =
                review::apply_adjustments(&plan.itineraries, suggestions, options);
            (adjusted, Some(report))
        }
        None => (plan.itineraries, None),
    };

    let summary = summary::build_summary(&itineraries, adjustments.is_some());
    info!(
        days = summary.total_days,
        places = summary.total_places,
        regions = summary.total_regions,
        distance_km = summary.estimated_total_distance_km,
        review_applied = summary.review_applied,
        "itinerary finalized"
    );

    PlannerResult {
        itineraries,
        summary,
        diagnostics: plan.diagnostics,
        adjustments,
    }
}

/// Plan without a review pass.
///
/// # Errors
///
/// See [`draft`].
pub fn solve<N: RegionNamer>(
    pool: &[Candidate],
    request: &PlanRequest,
    namer: &N,
    options: &SolveOptions,
) -> Result<PlannerResult> {
    let plan = draft(pool, request, namer, options)?;
    Ok(finalize(plan, None, options))
}

/// Plan, and let `reviewer` propose edits when the draft looks off.
///
/// The reviewer is consulted only if [`review::needs_review`] reports a
/// trigger for the draft.
///
/// # Errors
///
/// See [`draft`].
pub fn solve_with_review<N: RegionNamer, S: SuggestionSource>(
    pool: &[Candidate],
    request: &PlanRequest,
    namer: &N,
    reviewer: &S,
    options: &SolveOptions,
) -> Result<PlannerResult> {
    let plan = draft(pool, request, namer, options)?;

    let triggers = review::needs_review(&plan.itineraries, &options.review);
    if triggers.is_empty() {
        debug!("draft within review thresholds; skipping reviewer");
        return Ok(finalize(plan, None, options));
    }

    info!(triggers = triggers.len(), "requesting review of draft");
    let suggestions = reviewer.suggestions_for(&plan.itineraries);
    Ok(finalize(plan, Some(suggestions.as_slice()), options))
}
