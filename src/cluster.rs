//! Geographic k-means over the candidate pool.
//!
//! Clusters hold pool indices, never candidates. Seeding is farthest-first
//! from the first valid candidate, so identical input always yields
//! identical clusters.

use tracing::{debug, warn};

use crate::geo::{self, Point};
use crate::model::{Candidate, Category};
use crate::options::SolveOptions;
use crate::scorer::PlaceScorer;

/// One group of nearby candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Position in the cluster set; stable across iterations.
    pub id: usize,
    pub centroid: Point,
    /// Pool indices, in pool order.
    pub members: Vec<usize>,
}

impl Cluster {
    /// True when no candidate was assigned in the last pass.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Outcome of a [`kmeans`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSet {
    pub clusters: Vec<Cluster>,
    /// Assignment passes run.
    pub iterations: usize,
    /// False when the iteration cap stopped the loop.
    pub converged: bool,
    /// Pool indices skipped for malformed coordinates.
    pub excluded: Vec<usize>,
}

impl ClusterSet {
    fn empty(excluded: Vec<usize>) -> Self {
        Self {
            clusters: Vec::new(),
            iterations: 0,
            converged: true,
            excluded,
        }
    }

    pub fn non_empty(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| !c.is_empty())
    }

    /// Within-cluster sum of squared distances to each centroid.
    pub fn wcss(&self, pool: &[Candidate]) -> f64 {
        self.clusters
            .iter()
            .flat_map(|c| {
                c.members
                    .iter()
                    .map(move |&i| geo::distance_km(pool[i].location, c.centroid).powi(2))
            })
            .sum()
    }
}

/// Partition the valid candidates of `pool` into at most `k` clusters.
///
/// `k` is clamped to `[1, valid candidates]`. Candidates with out-of-range
/// coordinates are listed in [`ClusterSet::excluded`] and otherwise ignored.
pub fn kmeans(pool: &[Candidate], k: usize, max_iterations: usize) -> ClusterSet {
    let (valid, excluded): (Vec<usize>, Vec<usize>) =
        (0..pool.len()).partition(|&i| pool[i].location.is_valid());

    if !excluded.is_empty() {
        warn!(
            excluded = excluded.len(),
            "skipping candidates with malformed coordinates"
        );
    }
    if valid.is_empty() {
        return ClusterSet::empty(excluded);
    }

    let k = k.clamp(1, valid.len());
    let points: Vec<Point> = valid.iter().map(|&i| pool[i].location).collect();
    let mut centroids = seed_centroids(&points, k);
    let mut assignment: Vec<usize> = Vec::new();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        let next: Vec<usize> = points
            .iter()
            .map(|p| geo::nearest_of(*p, &centroids).unwrap_or(0))
            .collect();

        if next == assignment {
            converged = true;
            break;
        }
        assignment = next;
        centroids = recompute_centroids(&points, &assignment, &centroids);
    }

    if !converged {
        warn!(iterations, k, "k-means hit the iteration cap; keeping last state");
    }
    debug!(iterations, k, converged, "k-means finished");

    let mut clusters: Vec<Cluster> = centroids
        .into_iter()
        .enumerate()
        .map(|(id, centroid)| Cluster {
            id,
            centroid,
            members: Vec::new(),
        })
        .collect();
    for (slot, &cluster_id) in assignment.iter().enumerate() {
        clusters[cluster_id].members.push(valid[slot]);
    }

    ClusterSet {
        clusters,
        iterations,
        converged,
        excluded,
    }
}

/// Farthest-first seeds: start at the first point, then repeatedly take the
/// point farthest from its nearest seed. Earlier points win ties.
fn seed_centroids(points: &[Point], k: usize) -> Vec<Point> {
    let mut seeds = vec![points[0]];
    let mut nearest_seed_km: Vec<f64> = points
        .iter()
        .map(|p| geo::distance_km(*p, points[0]))
        .collect();

    while seeds.len() < k {
        let mut best = 0;
        for (i, d) in nearest_seed_km.iter().enumerate() {
            if *d > nearest_seed_km[best] {
                best = i;
            }
        }
        let seed = points[best];
        seeds.push(seed);
        for (i, p) in points.iter().enumerate() {
            nearest_seed_km[i] = nearest_seed_km[i].min(geo::distance_km(*p, seed));
        }
    }

    seeds
}

/// New centroid per cluster; a cluster with no members keeps its old one.
fn recompute_centroids(points: &[Point], assignment: &[usize], previous: &[Point]) -> Vec<Point> {
    previous
        .iter()
        .enumerate()
        .map(|(cluster_id, old)| {
            let members: Vec<Point> = assignment
                .iter()
                .zip(points)
                .filter(|(assigned, _)| **assigned == cluster_id)
                .map(|(_, p)| *p)
                .collect();
            geo::centroid(&members).unwrap_or(*old)
        })
        .collect()
}

/// Pick `k` with the elbow method over `[days, 2 * days]`.
///
/// Stops at the first `k` whose next step cuts WCSS by less than
/// `elbow_threshold`, then caps the answer at `1.5 * days`.
pub fn choose_k(pool: &[Candidate], days: u32, options: &SolveOptions) -> usize {
    let days = days.max(1) as usize;
    let valid = pool.iter().filter(|c| c.location.is_valid()).count();
    if valid <= 1 {
        return 1;
    }

    let candidates: Vec<usize> = (days..=days * 2).filter(|&k| k <= valid).collect();
    if candidates.is_empty() {
        return valid;
    }

    let wcss: Vec<f64> = candidates
        .iter()
        .map(|&k| kmeans(pool, k, options.clustering.max_iterations).wcss(pool))
        .collect();

    let mut chosen = candidates[candidates.len() - 1];
    for i in 1..wcss.len() {
        let previous = wcss[i - 1];
        let decrease = if previous > 0.0 {
            (previous - wcss[i]) / previous
        } else {
            0.0
        };
        if decrease < options.clustering.elbow_threshold {
            chosen = candidates[i - 1];
            break;
        }
    }

    let cap = ((days as f64) * 1.5).floor() as usize;
    let k = chosen.min(cap.max(1));
    debug!(k, days, "elbow method picked cluster count");
    k
}

/// Cap each cluster at `per_region` members.
///
/// Required members (flagged in `required`, indexed like `pool`) are kept
/// first. The rest are ranked against the centroid and taken round-robin
/// across categories, best first, so one dominant category cannot crowd out
/// the rest. No category keeps more than `per_category_per_region` members
/// beyond the required ones. Clusters that shrink get a fresh centroid.
pub fn truncate(
    pool: &[Candidate],
    clusters: Vec<Cluster>,
    required: &[bool],
    scorer: &PlaceScorer,
    options: &SolveOptions,
) -> (Vec<Cluster>, usize) {
    let per_region = options.capacity.per_region;
    let per_category = options.capacity.per_category_per_region;
    let is_required = |index: usize| required.get(index).copied().unwrap_or(false);
    let mut dropped = 0;

    let clusters = clusters
        .into_iter()
        .map(|cluster| {
            let ranked = scorer.rank(pool, &cluster.members, cluster.centroid);

            let mut kept: Vec<usize> = ranked
                .iter()
                .map(|s| s.index)
                .filter(|&i| is_required(i))
                .take(per_region)
                .collect();

            let mut by_category: Vec<(Category, Vec<usize>)> = Vec::new();
            for scored in ranked.iter().filter(|s| !is_required(s.index)) {
                let category = pool[scored.index].category;
                match by_category.iter_mut().find(|(c, _)| *c == category) {
                    Some((_, list)) if list.len() < per_category => list.push(scored.index),
                    Some(_) => {}
                    None => by_category.push((category, vec![scored.index])),
                }
            }

            let mut round = 0;
            while kept.len() < per_region {
                let before = kept.len();
                for (_, list) in &by_category {
                    if kept.len() == per_region {
                        break;
                    }
                    if let Some(&index) = list.get(round) {
                        kept.push(index);
                    }
                }
                if kept.len() == before {
                    break;
                }
                round += 1;
            }

            if kept.len() == cluster.len() {
                return cluster;
            }

            dropped += cluster.len() - kept.len();
            kept.sort_unstable();
            let points: Vec<Point> = kept.iter().map(|&i| pool[i].location).collect();
            Cluster {
                id: cluster.id,
                centroid: geo::centroid(&points).unwrap_or(cluster.centroid),
                members: kept,
            }
        })
        .collect();

    (clusters, dropped)
}
