//! Applying external review suggestions to a draft itinerary.
//!
//! Suggestions are applied in order against a working copy. A suggestion
//! that cannot be applied is recorded as ignored and the rest still run.
//! Days a suggestion touched are re-assembled; the others are carried over
//! unchanged.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{DailyItinerary, Itinerary, RestBreak, ScheduledPlace, TimeBlock};
use crate::options::{ReviewThresholds, SolveOptions};
use crate::route;

const DEFAULT_BREAK_MINUTES: u32 = 30;

/// Edit a reviewer may propose. Serialized as `MOVE`, `REMOVE`, `SWAP`
/// and `ADD_BREAK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    /// Move `place` from `day` to `target_day`.
    Move,
    /// Drop `place` from `day`.
    Remove,
    /// Exchange the slots of `place` and `swap_with`.
    Swap,
    /// Insert a rest slot after `place`.
    AddBreak,
}

/// One structured edit proposed by an external reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Day the referenced place is on.
    pub day: u32,
    /// Candidate id or display name.
    pub place: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: SuggestionKind,
    /// Required by `MOVE`.
    #[serde(default)]
    pub target_day: Option<u32>,
    /// Required by `SWAP`; id or name of the partner place.
    #[serde(default)]
    pub swap_with: Option<String>,
    /// Break length for `ADD_BREAK`; 30 minutes when absent.
    #[serde(default)]
    pub break_minutes: Option<u32>,
    /// Free text from the reviewer. Logged, never interpreted.
    #[serde(default)]
    pub reason: Option<String>,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, day: u32, place: impl Into<String>) -> Self {
        Self {
            day,
            place: place.into(),
            kind,
            target_day: None,
            swap_with: None,
            break_minutes: None,
            reason: None,
        }
    }

    pub fn remove(day: u32, place: impl Into<String>) -> Self {
        Self::new(SuggestionKind::Remove, day, place)
    }

    pub fn move_to(day: u32, place: impl Into<String>, target_day: u32) -> Self {
        Self {
            target_day: Some(target_day),
            ..Self::new(SuggestionKind::Move, day, place)
        }
    }

    pub fn swap(day: u32, place: impl Into<String>, other: impl Into<String>) -> Self {
        Self {
            swap_with: Some(other.into()),
            ..Self::new(SuggestionKind::Swap, day, place)
        }
    }

    pub fn add_break(day: u32, after: impl Into<String>, minutes: u32) -> Self {
        Self {
            break_minutes: Some(minutes),
            ..Self::new(SuggestionKind::AddBreak, day, after)
        }
    }
}

/// Why a suggestion was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// `day` or `target_day` is not part of the itinerary.
    UnknownDay,
    /// No place on the day matches the reference.
    UnknownPlace,
    /// `MOVE` without `target_day` or `SWAP` without `swap_with`.
    MissingTarget,
    /// `MOVE` onto the day the place is already on.
    SameDay,
    /// The target day already holds `per_time_block` places in that block.
    BlockFull,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredSuggestion {
    /// Position in the suggestion list.
    pub index: usize,
    pub reason: IgnoreReason,
}

/// What happened to each suggestion of one review pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentReport {
    /// Positions of the suggestions that changed the itinerary.
    pub applied: Vec<usize>,
    pub ignored: Vec<IgnoredSuggestion>,
}

/// Working copy of one day while suggestions are applied.
struct DayDraft {
    places: Vec<ScheduledPlace>,
    breaks: Vec<RestBreak>,
}

/// Apply `suggestions` to `draft`, returning a new itinerary set.
pub fn apply_adjustments(
    draft: &Itinerary,
    suggestions: &[Suggestion],
    options: &SolveOptions,
) -> (Itinerary, AdjustmentReport) {
    let mut work: BTreeMap<u32, DayDraft> = draft
        .iter()
        .map(|(&day, itinerary)| {
            (
                day,
                DayDraft {
                    places: itinerary.places.clone(),
                    breaks: itinerary.breaks.clone(),
                },
            )
        })
        .collect();
    let mut touched: BTreeSet<u32> = BTreeSet::new();
    let mut report = AdjustmentReport::default();
    let block_capacity = options.capacity.per_time_block;

    for (index, suggestion) in suggestions.iter().enumerate() {
        let outcome = match suggestion.kind {
            SuggestionKind::Remove => remove(&mut work, suggestion),
            SuggestionKind::Move => move_place(&mut work, suggestion, block_capacity),
            SuggestionKind::Swap => swap(&mut work, suggestion),
            SuggestionKind::AddBreak => add_break(&mut work, suggestion),
        };

        match outcome {
            Ok(days) => {
                touched.extend(days);
                report.applied.push(index);
            }
            Err(reason) => {
                warn!(
                    index,
                    kind = ?suggestion.kind,
                    day = suggestion.day,
                    place = %suggestion.place,
                    ?reason,
                    "ignoring review suggestion"
                );
                report.ignored.push(IgnoredSuggestion { index, reason });
            }
        }
    }

    let itinerary = draft
        .iter()
        .map(|(&day, original)| {
            if !touched.contains(&day) {
                return (day, original.clone());
            }
            let Some(DayDraft { places, breaks }) = work.remove(&day) else {
                return (day, original.clone());
            };
            (day, route::assemble(day, original.date, places, breaks, options))
        })
        .collect();

    info!(
        applied = report.applied.len(),
        ignored = report.ignored.len(),
        "review suggestions processed"
    );
    (itinerary, report)
}

fn position(
    work: &BTreeMap<u32, DayDraft>,
    day: u32,
    reference: &str,
) -> Result<usize, IgnoreReason> {
    let draft = work.get(&day).ok_or(IgnoreReason::UnknownDay)?;
    draft
        .places
        .iter()
        .position(|p| p.candidate.matches(reference))
        .ok_or(IgnoreReason::UnknownPlace)
}

fn remove(work: &mut BTreeMap<u32, DayDraft>, s: &Suggestion) -> Result<Vec<u32>, IgnoreReason> {
    let at = position(work, s.day, &s.place)?;
    if let Some(draft) = work.get_mut(&s.day) {
        draft.places.remove(at);
    }
    Ok(vec![s.day])
}

fn move_place(
    work: &mut BTreeMap<u32, DayDraft>,
    s: &Suggestion,
    block_capacity: usize,
) -> Result<Vec<u32>, IgnoreReason> {
    let target = s.target_day.ok_or(IgnoreReason::MissingTarget)?;
    let at = position(work, s.day, &s.place)?;
    if target == s.day {
        return Err(IgnoreReason::SameDay);
    }
    let block = work[&s.day].places[at].block;
    let target_draft = work.get(&target).ok_or(IgnoreReason::UnknownDay)?;
    if target_draft.places.iter().filter(|p| p.block == block).count() >= block_capacity {
        return Err(IgnoreReason::BlockFull);
    }

    let Some(source) = work.get_mut(&s.day) else {
        return Err(IgnoreReason::UnknownDay);
    };
    let mut place = source.places.remove(at);
    place.day = target;
    if let Some(target_draft) = work.get_mut(&target) {
        target_draft.places.push(place);
    }
    Ok(vec![s.day, target])
}

fn swap(work: &mut BTreeMap<u32, DayDraft>, s: &Suggestion) -> Result<Vec<u32>, IgnoreReason> {
    let other = s.swap_with.as_deref().ok_or(IgnoreReason::MissingTarget)?;
    let first = position(work, s.day, &s.place)?;

    // The partner is looked up on the same day first, then anywhere.
    let view: &BTreeMap<u32, DayDraft> = work;
    let partner = std::iter::once(s.day)
        .chain(view.keys().copied().filter(|&d| d != s.day))
        .find_map(|day| position(view, day, other).ok().map(|at| (day, at)))
        .ok_or(IgnoreReason::UnknownPlace)?;

    let (other_day, second) = partner;
    let first_block = work[&s.day].places[first].block;
    let second_block = work[&other_day].places[second].block;

    if other_day == s.day {
        if let Some(draft) = work.get_mut(&s.day) {
            draft.places.swap(first, second);
            draft.places[first].block = first_block;
            draft.places[second].block = second_block;
        }
        return Ok(vec![s.day]);
    }

    let a = work
        .get(&s.day)
        .map(|d| d.places[first].clone())
        .ok_or(IgnoreReason::UnknownDay)?;
    let b = work
        .get(&other_day)
        .map(|d| d.places[second].clone())
        .ok_or(IgnoreReason::UnknownDay)?;
    if let Some(draft) = work.get_mut(&s.day) {
        draft.places[first] = ScheduledPlace {
            block: first_block,
            day: s.day,
            ..b
        };
    }
    if let Some(draft) = work.get_mut(&other_day) {
        draft.places[second] = ScheduledPlace {
            block: second_block,
            day: other_day,
            ..a
        };
    }
    Ok(vec![s.day, other_day])
}

fn add_break(work: &mut BTreeMap<u32, DayDraft>, s: &Suggestion) -> Result<Vec<u32>, IgnoreReason> {
    let at = position(work, s.day, &s.place)?;
    if let Some(draft) = work.get_mut(&s.day) {
        let place = &draft.places[at];
        let rest = RestBreak {
            block: place.block,
            after: place.candidate.id.clone(),
            minutes: s.break_minutes.unwrap_or(DEFAULT_BREAK_MINUTES),
        };
        draft.breaks.push(rest);
    }
    Ok(vec![s.day])
}

/// Why a draft deserves a second look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum ReviewTrigger {
    /// Day distance above `max_daily_distance_km`.
    LongDistance { day: u32, distance_km: f64 },
    /// Lunch or dinner left empty.
    MissingMeal { day: u32, block: TimeBlock },
    /// Place count outside `[min_places_per_day, max_places_per_day]`.
    PlaceCount { day: u32, places: usize },
}

/// Conditions under which an external review is worth requesting.
pub fn needs_review(itinerary: &Itinerary, thresholds: &ReviewThresholds) -> Vec<ReviewTrigger> {
    itinerary
        .values()
        .flat_map(|day| day_triggers(day, thresholds))
        .collect()
}

fn day_triggers(day: &DailyItinerary, thresholds: &ReviewThresholds) -> Vec<ReviewTrigger> {
    let mut triggers = Vec::new();
    if day.total_distance_km > thresholds.max_daily_distance_km {
        triggers.push(ReviewTrigger::LongDistance {
            day: day.day,
            distance_km: day.total_distance_km,
        });
    }
    for block in [TimeBlock::Lunch, TimeBlock::Dinner] {
        if !day.has_block(block) {
            triggers.push(ReviewTrigger::MissingMeal { day: day.day, block });
        }
    }
    let count = day.places.len();
    if count < thresholds.min_places_per_day || count > thresholds.max_places_per_day {
        triggers.push(ReviewTrigger::PlaceCount {
            day: day.day,
            places: count,
        });
    }
    triggers
}
