//! Day allocation.
//!
//! Regions are spread over the trip days first, then each day fills its
//! time blocks from the candidates of its own regions. A region belongs to
//! exactly one day, so days share no candidates and can be filled in
//! parallel.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::geo::{self, Point};
use crate::model::{Candidate, Category, DailyItinerary, FixedSlot, ScheduledPlace, TimeBlock};
use crate::options::{Capacity, SolveOptions};
use crate::region::RegionProfile;
use crate::route;
use crate::scorer::{self, PlaceScorer, Scored};

/// Region label for a booking on a day with no region of its own.
pub const BOOKED_REGION: &str = "Booked";

/// Spread ranked regions over `days` days.
///
/// Returns, per day, indices into `regions` in rank order. Regions flagged
/// in `priority` (those holding required places) are placed first so they
/// spread over the emptiest days. Each region goes to the least-loaded day
/// that still has room, except small regions, which first try to join a day
/// holding a region within the cluster radius.
pub fn assign_regions(
    regions: &[RegionProfile],
    days: u32,
    priority: &[bool],
    options: &SolveOptions,
) -> Vec<Vec<usize>> {
    let days = days.max(1) as usize;
    let max_per_day = regions.len().div_ceil(days).max(1);
    let mut assigned: Vec<Vec<usize>> = vec![Vec::new(); days];
    let mut loads = vec![0usize; days];

    let is_priority = |i: usize| priority.get(i).copied().unwrap_or(false);
    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.sort_by_key(|&i| !is_priority(i));

    for region_index in order {
        let region = &regions[region_index];
        let open: Vec<usize> = (0..days).filter(|&d| assigned[d].len() < max_per_day).collect();

        let nearby = if region.member_count < options.capacity.small_region_size {
            nearest_open_day(region, regions, &assigned, &open)
                .filter(|(_, km)| *km <= options.tiers.cluster_radius_km)
                .map(|(day, _)| day)
        } else {
            None
        };

        let day = nearby.unwrap_or_else(|| {
            // Strictly smaller keeps the earliest day on ties.
            let mut best = open[0];
            for &d in &open[1..] {
                if loads[d] < loads[best] {
                    best = d;
                }
            }
            best
        });

        debug!(
            region = %region.name,
            day = day + 1,
            members = region.member_count,
            merged = nearby.is_some(),
            priority = is_priority(region_index),
            "assigned region to day"
        );
        assigned[day].push(region_index);
        loads[day] += region.member_count;
    }

    for day in &mut assigned {
        day.sort_unstable();
    }
    assigned
}

fn nearest_open_day(
    region: &RegionProfile,
    regions: &[RegionProfile],
    assigned: &[Vec<usize>],
    open: &[usize],
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for &day in open {
        for &other in &assigned[day] {
            let km = geo::distance_km(region.center, regions[other].center);
            if best.is_none_or(|(_, best_km)| km < best_km) {
                best = Some((day, km));
            }
        }
    }
    best
}

/// Everything a single day needs, borrowed from the shared planning state.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    /// 1-based day number.
    pub day: u32,
    pub date: NaiveDate,
    /// The whole candidate pool; regions refer into it by index.
    pub pool: &'a [Candidate],
    /// This day's regions, best-ranked first.
    pub regions: &'a [&'a RegionProfile],
    /// Overrides the first region's center as the day's starting point.
    pub anchor: Option<Point>,
    /// Bookings for this day, at most `per_time_block` per block.
    pub fixed: &'a [FixedSlot],
    /// Pool flags: picked ahead of everything else where eligible.
    pub required: &'a [bool],
    /// Pool flags: already booked somewhere, never picked again.
    pub booked: &'a [bool],
    pub scorer: &'a PlaceScorer,
    pub options: &'a SolveOptions,
}

struct Slot {
    index: usize,
    region: usize,
    required: bool,
    taken: bool,
}

/// Running per-region and per-category counts for one day.
struct Usage {
    per_region: Vec<usize>,
    per_category: HashMap<(usize, Category), usize>,
}

impl Usage {
    fn admits(&self, slot: &Slot, category: Category, capacity: &Capacity) -> bool {
        let used = self
            .per_category
            .get(&(slot.region, category))
            .copied()
            .unwrap_or(0);
        !slot.taken
            && self.per_region[slot.region] < capacity.per_region
            && used < capacity.per_category_per_region
    }

    fn record(&mut self, slot: &Slot, category: Category) {
        self.per_region[slot.region] += 1;
        *self.per_category.entry((slot.region, category)).or_insert(0) += 1;
    }
}

/// Fill the seven time blocks of one day and assemble its route.
///
/// Bookings go in first and close their block. Each other block takes up
/// to `per_time_block` candidates whose category fits it, ranked against
/// the previous stop, required candidates first. A candidate outside its
/// best-fit blocks is only used when enough of its category remains for
/// the best-fit blocks later in the day, so restaurants are kept for lunch
/// and dinner. Blocks with nothing suitable stay empty.
pub fn allocate_day(ctx: DayContext<'_>) -> DailyItinerary {
    let Some(origin) = ctx
        .anchor
        .or_else(|| ctx.regions.first().map(|r| r.center))
        .or_else(|| ctx.fixed.first().map(|f| f.candidate.location))
    else {
        return DailyItinerary::empty(ctx.day, ctx.date);
    };
    let capacity = &ctx.options.capacity;
    let flag = |flags: &[bool], index: usize| flags.get(index).copied().unwrap_or(false);

    let mut places: Vec<ScheduledPlace> = ctx
        .fixed
        .iter()
        .map(|slot| ScheduledPlace {
            candidate: slot.candidate.clone(),
            day: ctx.day,
            block: slot.block,
            region: booking_region(ctx.regions, slot.candidate.location),
            score: ctx.scorer.score(&slot.candidate, origin),
        })
        .collect();
    let closed: Vec<TimeBlock> = ctx.fixed.iter().map(|f| f.block).collect();

    let mut slots: Vec<Slot> = ctx
        .regions
        .iter()
        .enumerate()
        .flat_map(|(region, profile)| {
            profile
                .members
                .iter()
                .filter(move |&&index| !flag(ctx.booked, index))
                .map(move |&index| Slot {
                    index,
                    region,
                    required: flag(ctx.required, index),
                    taken: false,
                })
        })
        .collect();
    let mut usage = Usage {
        per_region: vec![0; ctx.regions.len()],
        per_category: HashMap::new(),
    };

    let mut current = origin;
    for block in TimeBlock::ORDER {
        if closed.contains(&block) {
            if let Some(last) = ctx.fixed.iter().rev().find(|f| f.block == block) {
                current = last.candidate.location;
            }
            continue;
        }

        for filled in 0..capacity.per_time_block {
            let mut available: HashMap<Category, usize> = HashMap::new();
            for slot in &slots {
                let category = ctx.pool[slot.index].category;
                if usage.admits(slot, category, capacity) {
                    *available.entry(category).or_insert(0) += 1;
                }
            }

            let mut best: Option<(usize, Scored, bool)> = None;
            for (slot_index, slot) in slots.iter().enumerate() {
                let candidate = &ctx.pool[slot.index];
                if !usage.admits(slot, candidate.category, capacity) {
                    continue;
                }
                if !slot.required {
                    let reserve =
                        reserved_for_later(candidate.category, block, filled, &closed, capacity);
                    let left = available.get(&candidate.category).copied().unwrap_or(0);
                    if left <= reserve {
                        continue;
                    }
                }
                let Some(score) = ctx.scorer.block_score(candidate, block, current) else {
                    continue;
                };

                let scored = Scored {
                    index: slot.index,
                    score,
                };
                let better = match &best {
                    None => true,
                    Some((_, incumbent, incumbent_required)) => {
                        match (slot.required, *incumbent_required) {
                            (true, false) => true,
                            (false, true) => false,
                            _ => scorer::compare(ctx.pool, &scored, incumbent).is_lt(),
                        }
                    }
                };
                if better {
                    best = Some((slot_index, scored, slot.required));
                }
            }

            let Some((slot_index, scored, _)) = best else {
                break;
            };

            let candidate = &ctx.pool[slots[slot_index].index];
            usage.record(&slots[slot_index], candidate.category);
            let slot = &mut slots[slot_index];
            slot.taken = true;
            current = candidate.location;

            places.push(ScheduledPlace {
                candidate: candidate.clone(),
                day: ctx.day,
                block,
                region: ctx.regions[slot.region].name.clone(),
                score: scored.score,
            });
        }
    }

    let places = route::order_within_blocks(places, Some(origin));
    let itinerary = route::assemble(ctx.day, ctx.date, places, Vec::new(), ctx.options);

    debug!(
        day = ctx.day,
        places = itinerary.places.len(),
        booked = ctx.fixed.len(),
        distance_km = itinerary.total_distance_km,
        "allocated day"
    );
    itinerary
}

/// How many candidates of `category` must stay free for later blocks.
///
/// Outside its best-fit blocks a category keeps enough to fill every later
/// best-fit block. Inside one, a second pick still leaves one per later
/// best-fit block. Booked blocks take no regular picks and need nothing.
fn reserved_for_later(
    category: Category,
    block: TimeBlock,
    filled: usize,
    closed: &[TimeBlock],
    capacity: &Capacity,
) -> usize {
    let later = TimeBlock::ORDER
        .iter()
        .filter(|&&b| b > block && !closed.contains(&b) && scorer::is_preferred(category, b))
        .count();
    if !scorer::is_preferred(category, block) {
        later * capacity.per_time_block
    } else if filled > 0 {
        later
    } else {
        0
    }
}

fn booking_region(regions: &[&RegionProfile], location: Point) -> String {
    let centers: Vec<Point> = regions.iter().map(|r| r.center).collect();
    geo::nearest_of(location, &centers)
        .map(|i| regions[i].name.clone())
        .unwrap_or_else(|| BOOKED_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(cluster_id: usize, members: Vec<usize>, center: Point) -> RegionProfile {
        RegionProfile {
            cluster_id,
            name: format!("Region {}", cluster_id + 1),
            center,
            member_count: members.len(),
            average_rating: 4.0,
            diversity: 0.5,
            rank_score: 0.5,
            members,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    fn context<'a>(
        pool: &'a [Candidate],
        regions: &'a [&'a RegionProfile],
        scorer: &'a PlaceScorer,
        options: &'a SolveOptions,
    ) -> DayContext<'a> {
        DayContext {
            day: 1,
            date: date(),
            pool,
            regions,
            anchor: None,
            fixed: &[],
            required: &[],
            booked: &[],
            scorer,
            options,
        }
    }

    #[test]
    fn test_assign_balances_load() {
        let options = SolveOptions::default();
        let regions = vec![
            region(0, (0..8).collect(), Point::new(37.57, 126.98)),
            region(1, (8..14).collect(), Point::new(37.40, 127.11)),
            region(2, (14..18).collect(), Point::new(37.75, 127.07)),
            region(3, (18..21).collect(), Point::new(37.20, 127.30)),
        ];
        let assigned = assign_regions(&regions, 2, &[], &options);
        assert_eq!(assigned, vec![vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn test_small_region_joins_nearby_day() {
        let options = SolveOptions::default();
        let regions = vec![
            region(0, (0..8).collect(), Point::new(37.57, 126.98)),
            region(1, (8..14).collect(), Point::new(37.40, 127.11)),
            // 2 members, ~1.5 km from region 0
            region(2, vec![14, 15], Point::new(37.58, 126.99)),
        ];
        let assigned = assign_regions(&regions, 2, &[], &options);
        assert_eq!(assigned, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_priority_regions_placed_first() {
        let options = SolveOptions::default();
        let regions = vec![
            region(0, (0..8).collect(), Point::new(37.57, 126.98)),
            region(1, (8..14).collect(), Point::new(37.40, 127.11)),
            region(2, (14..18).collect(), Point::new(37.75, 127.07)),
            region(3, (18..21).collect(), Point::new(37.20, 127.30)),
        ];
        // Regions 2 and 3 hold required places and take the empty days.
        let assigned = assign_regions(&regions, 2, &[false, false, true, true], &options);
        assert_eq!(assigned, vec![vec![1, 2], vec![0, 3]]);
    }

    #[test]
    fn test_every_region_assigned_once() {
        let options = SolveOptions::default();
        let regions: Vec<RegionProfile> = (0..7)
            .map(|i| region(i, vec![i], Point::new(37.0 + i as f64, 127.0)))
            .collect();
        let assigned = assign_regions(&regions, 3, &[], &options);
        let mut all: Vec<usize> = assigned.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..7).collect::<Vec<_>>());
        assert!(assigned.iter().all(|day| day.len() <= 3));
    }

    #[test]
    fn test_allocate_day_respects_blocks() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let base = Point::new(37.5665, 126.9780);
        let pool = vec![
            Candidate::new("r1", "Restaurant 1", Category::Restaurant, base).with_rating(4.5),
            Candidate::new("r2", "Restaurant 2", Category::Restaurant, Point::new(37.567, 126.979))
                .with_rating(4.0),
            Candidate::new("r3", "Restaurant 3", Category::Restaurant, Point::new(37.568, 126.977))
                .with_rating(3.5),
            Candidate::new("a1", "Palace", Category::Attraction, Point::new(37.5796, 126.9770))
                .with_rating(4.7),
            Candidate::new("h1", "Hotel", Category::Lodging, base).with_rating(5.0),
        ];
        let profile = region(0, (0..pool.len()).collect(), base);
        let regions = [&profile];

        let day = allocate_day(context(&pool, &regions, &scorer, &options));

        for block in TimeBlock::ORDER {
            assert!(day.places_in(block).count() <= 2);
        }
        assert!(day.places.iter().all(|p| p.candidate.category != Category::Lodging));
        assert!(day.places_in(TimeBlock::MorningActivity).any(|p| p.candidate.id == "a1"));
        // Three restaurants are too few to spare one for breakfast.
        assert!(!day.has_block(TimeBlock::Breakfast));
        assert_eq!(day.places_in(TimeBlock::Lunch).count(), 2);
        assert_eq!(day.places_in(TimeBlock::Dinner).count(), 1);
        assert!(!day.has_block(TimeBlock::Cafe));
        let mut ids: Vec<&str> = day.places.iter().map(|p| p.candidate.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), day.places.len(), "no candidate scheduled twice");
    }

    #[test]
    fn test_scarce_restaurants_cover_lunch_and_dinner() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let base = Point::new(37.5665, 126.9780);
        let pool = vec![
            Candidate::new("r1", "Restaurant 1", Category::Restaurant, base).with_rating(4.5),
            Candidate::new("r2", "Restaurant 2", Category::Restaurant, Point::new(37.567, 126.979))
                .with_rating(4.0),
            Candidate::new("a1", "Palace", Category::Attraction, Point::new(37.5796, 126.9770))
                .with_rating(4.7),
        ];
        let profile = region(0, vec![0, 1, 2], base);
        let regions = [&profile];

        let day = allocate_day(context(&pool, &regions, &scorer, &options));

        assert!(!day.has_block(TimeBlock::Breakfast));
        assert_eq!(day.places_in(TimeBlock::MorningActivity).count(), 1);
        assert_eq!(day.places_in(TimeBlock::Lunch).count(), 1);
        assert_eq!(day.places_in(TimeBlock::Dinner).count(), 1);
    }

    #[test]
    fn test_plenty_of_restaurants_feed_breakfast() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let base = Point::new(37.5665, 126.9780);
        let pool: Vec<Candidate> = (0..6)
            .map(|i| {
                let location = Point::new(37.5665 + i as f64 * 1e-3, 126.9780);
                let name = format!("Restaurant {i}");
                Candidate::new(format!("r{i}"), name, Category::Restaurant, location)
                    .with_rating(4.0)
            })
            .collect();
        let profile = region(0, (0..6).collect(), base);
        let regions = [&profile];

        let day = allocate_day(context(&pool, &regions, &scorer, &options));

        // Six restaurants: two spare for breakfast, four left for the meals.
        assert_eq!(day.places_in(TimeBlock::Breakfast).count(), 2);
        assert_eq!(day.places_in(TimeBlock::Lunch).count(), 2);
        assert_eq!(day.places_in(TimeBlock::Dinner).count(), 2);
    }

    #[test]
    fn test_allocate_day_without_regions() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let mut ctx = context(&[], &[], &scorer, &options);
        ctx.day = 2;
        let day = allocate_day(ctx);
        assert_eq!(day.day, 2);
        assert!(day.places.is_empty());
        assert_eq!(day.total_distance_km, 0.0);
    }

    #[test]
    fn test_region_cap_limits_contribution() {
        let mut options = SolveOptions::default();
        options.capacity.per_region = 2;
        let scorer = PlaceScorer::new(&options);
        let base = Point::new(37.5665, 126.9780);
        let pool: Vec<Candidate> = (0..6)
            .map(|i| {
                Candidate::new(format!("a{i}"), format!("Sight {i}"), Category::Attraction, base)
                    .with_rating(4.0)
            })
            .collect();
        let profile = region(0, (0..6).collect(), base);
        let regions = [&profile];

        let day = allocate_day(context(&pool, &regions, &scorer, &options));
        assert_eq!(day.places.len(), 2);
    }

    #[test]
    fn test_booking_closes_its_block() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let base = Point::new(37.5665, 126.9780);
        let pool: Vec<Candidate> = (0..4)
            .map(|i| {
                let location = Point::new(37.5665 + i as f64 * 1e-3, 126.9780);
                let name = format!("Restaurant {i}");
                Candidate::new(format!("r{i}"), name, Category::Restaurant, location)
                    .with_rating(4.8)
            })
            .collect();
        let profile = region(0, (0..4).collect(), base);
        let regions = [&profile];
        let gangnam = Point::new(37.5253, 127.0410);
        let dinner = Candidate::new("jungsik", "Jungsik", Category::Restaurant, gangnam);
        let fixed = [FixedSlot::new(1, TimeBlock::Dinner, dinner)];

        let mut ctx = context(&pool, &regions, &scorer, &options);
        ctx.fixed = &fixed;
        let day = allocate_day(ctx);

        let dinners: Vec<&str> = day
            .places_in(TimeBlock::Dinner)
            .map(|p| p.candidate.id.as_str())
            .collect();
        assert_eq!(dinners, vec!["jungsik"]);
        let region = day.places_in(TimeBlock::Dinner).next().map(|p| p.region.as_str());
        assert_eq!(region, Some("Region 1"));
        // With dinner booked, lunch is the only meal left to reserve for.
        assert_eq!(day.places_in(TimeBlock::Lunch).count(), 2);
        assert_eq!(day.places_in(TimeBlock::Breakfast).count(), 2);
    }

    #[test]
    fn test_booking_on_day_without_regions() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let myeongdong = Point::new(37.5640, 126.9850);
        let show = Candidate::new("nanta", "Nanta Show", Category::Activity, myeongdong);
        let fixed = [FixedSlot::new(1, TimeBlock::EveningActivity, show)];

        let mut ctx = context(&[], &[], &scorer, &options);
        ctx.fixed = &fixed;
        let day = allocate_day(ctx);

        assert_eq!(day.places.len(), 1);
        assert_eq!(day.places[0].region, BOOKED_REGION);
        assert_eq!(day.regions, vec![BOOKED_REGION.to_string()]);
    }

    #[test]
    fn test_booked_and_required_flags() {
        let options = SolveOptions::default();
        let scorer = PlaceScorer::new(&options);
        let base = Point::new(37.5665, 126.9780);
        let pool = vec![
            Candidate::new("best", "Best Sight", Category::Attraction, base).with_rating(5.0),
            Candidate::new("good", "Good Sight", Category::Attraction, base).with_rating(4.5),
            Candidate::new("must", "Must See", Category::Attraction, Point::new(37.60, 127.02))
                .with_rating(2.0),
            Candidate::new("other", "Other Sight", Category::Attraction, base).with_rating(4.0),
        ];
        let profile = region(0, (0..4).collect(), base);
        let regions = [&profile];
        let required = [false, false, true, false];
        let booked = [true, false, false, false];

        let mut ctx = context(&pool, &regions, &scorer, &options);
        ctx.required = &required;
        ctx.booked = &booked;
        let day = allocate_day(ctx);

        let morning: Vec<&str> = day
            .places_in(TimeBlock::MorningActivity)
            .map(|p| p.candidate.id.as_str())
            .collect();
        assert!(morning.contains(&"must"), "required place goes to the first block it fits");
        assert!(day.places.iter().all(|p| p.candidate.id != "best"), "booked elsewhere");
    }
}
