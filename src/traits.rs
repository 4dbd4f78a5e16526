//! Seams to external collaborators.
//!
//! The planner never performs I/O. Labels for regions and review
//! suggestions come from the host through these traits, resolved before or
//! after the pure computation.

use crate::geo::Point;
use crate::model::{Candidate, Itinerary};
use crate::review::Suggestion;

/// Supplies a display name for a converged region.
pub trait RegionNamer {
    /// `ordinal` is 1-based in cluster order. Returning `None` falls back to
    /// a generated label.
    fn name_for(&self, ordinal: usize, center: Point, members: &[&Candidate]) -> Option<String>;
}

/// An external reviewer that proposes edits to a draft itinerary.
///
/// Implementations should fetch their suggestions up front and return
/// them here; the planner treats an empty list as "no changes".
pub trait SuggestionSource {
    fn suggestions_for(&self, draft: &Itinerary) -> Vec<Suggestion>;
}

/// Labels every region "Region N".
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedNamer;

impl RegionNamer for GeneratedNamer {
    fn name_for(&self, _ordinal: usize, _center: Point, _members: &[&Candidate]) -> Option<String> {
        None
    }
}

/// Labels a region by the most common first address token of its members.
///
/// Korean addresses lead with the district ("마포구 ..."), so the first token
/// is usually the neighbourhood a traveller would recognise.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressNamer;

impl RegionNamer for AddressNamer {
    fn name_for(&self, _ordinal: usize, _center: Point, members: &[&Candidate]) -> Option<String> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for token in members
            .iter()
            .filter_map(|c| c.address.as_deref())
            .filter_map(|address| address.split_whitespace().next())
        {
            match counts.iter_mut().find(|(seen, _)| *seen == token) {
                Some((_, n)) => *n += 1,
                None => counts.push((token, 1)),
            }
        }

        // Strictly greater keeps the first-seen token on ties.
        let mut best: Option<(&str, usize)> = None;
        for (token, n) in counts {
            if best.is_none_or(|(_, best_n)| n > best_n) {
                best = Some((token, n));
            }
        }
        best.map(|(token, _)| token.to_string())
    }
}

/// Label used when no namer supplies one.
pub fn generated_region_name(ordinal: usize) -> String {
    format!("Region {ordinal}")
}
