//! Region profiles: named, scored snapshots of converged clusters.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::cluster::Cluster;
use crate::geo::Point;
use crate::model::{Candidate, Category};
use crate::options::ScoreWeights;
use crate::traits::{generated_region_name, RegionNamer};

#[derive(Debug, Clone, PartialEq)]
pub struct RegionProfile {
    /// Id of the source cluster; also the ranking tie-break.
    pub cluster_id: usize,
    pub name: String,
    pub center: Point,
    pub member_count: usize,
    pub average_rating: f64,
    /// Distinct member categories over distinct pool categories.
    pub diversity: f64,
    pub rank_score: f64,
    /// Pool indices.
    pub members: Vec<usize>,
}

/// Build profiles for every non-empty cluster, sorted best-first.
///
/// Names are unique: a label already taken by an earlier cluster gets a
/// numeric suffix (`"Jongno-gu 2"`), so two regions never merge by name.
pub fn profile_regions<N: RegionNamer>(
    pool: &[Candidate],
    clusters: &[Cluster],
    namer: &N,
    weights: &ScoreWeights,
) -> Vec<RegionProfile> {
    let pool_categories: BTreeSet<Category> = clusters
        .iter()
        .flat_map(|c| c.members.iter().map(|&i| pool[i].category))
        .collect();
    let mut seen_names: HashMap<String, usize> = HashMap::new();

    let mut profiles: Vec<RegionProfile> = clusters
        .iter()
        .filter(|c| !c.is_empty())
        .enumerate()
        .map(|(n, cluster)| {
            let ordinal = n + 1;
            let members: Vec<&Candidate> = cluster.members.iter().map(|&i| &pool[i]).collect();
            let label = namer
                .name_for(ordinal, cluster.centroid, &members)
                .unwrap_or_else(|| generated_region_name(ordinal));
            let name = unique_name(label, &mut seen_names);

            let average_rating = average_rating(&members);
            let categories: BTreeSet<Category> = members.iter().map(|c| c.category).collect();
            let diversity = if pool_categories.is_empty() {
                0.0
            } else {
                categories.len() as f64 / pool_categories.len() as f64
            };
            let rank_score = weights.region_base * (average_rating / 5.0).clamp(0.0, 1.0)
                + weights.region_diversity * diversity;

            debug!(
                region = %name,
                members = members.len(),
                average_rating,
                diversity,
                rank_score,
                "profiled region"
            );

            RegionProfile {
                cluster_id: cluster.id,
                name,
                center: cluster.centroid,
                member_count: members.len(),
                average_rating,
                diversity,
                rank_score,
                members: cluster.members.clone(),
            }
        })
        .collect();

    rank_regions(&mut profiles);
    profiles
}

fn unique_name(label: String, seen: &mut HashMap<String, usize>) -> String {
    let uses = seen.entry(label.clone()).or_insert(0);
    *uses += 1;
    if *uses == 1 {
        return label;
    }
    let mut n = *uses;
    loop {
        let candidate = format!("{label} {n}");
        if !seen.contains_key(&candidate) {
            seen.insert(candidate.clone(), 1);
            return candidate;
        }
        n += 1;
    }
}

/// Sort by rank score, highest first; equal scores keep cluster order.
pub fn rank_regions(profiles: &mut [RegionProfile]) {
    profiles.sort_by(|a, b| {
        b.rank_score
            .total_cmp(&a.rank_score)
            .then_with(|| a.cluster_id.cmp(&b.cluster_id))
    });
}

/// Mean of positive ratings; unrated members (0.0) do not drag it down.
fn average_rating(members: &[&Candidate]) -> f64 {
    let rated: Vec<f64> = members
        .iter()
        .map(|c| c.rating)
        .filter(|r| r.is_finite() && *r > 0.0)
        .collect();
    if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    }
}
