use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::InstId;

/// Weighted placement edges: (doctoral institution, hiring institution) -> count
pub type PlacementEdges = BTreeMap<(InstId, InstId), u32>;

/// A minimum violation ranking of the institutions in one field.
///
/// `order[0]` is rank 1. A violation is a placement whose hiring
/// institution is ranked above the doctoral institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MvrRanking {
    pub order: Vec<InstId>,
    pub violations: u32,
    #[serde(skip)]
    positions: HashMap<InstId, usize>,
}

impl MvrRanking {
    pub fn new(order: Vec<InstId>, violations: u32) -> Self {
        let positions = order.iter().enumerate().map(|(i, id)| (*id, i + 1)).collect();
        Self {
            order,
            violations,
            positions,
        }
    }

    /// 1-based rank of `id`
    pub fn rank_of(&self, id: InstId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Percentile of `id` in `[0, 100)`; the top institution is 0
    pub fn percentile_of(&self, id: InstId) -> Option<f64> {
        let n = self.order.len();
        self.rank_of(id).map(|rank| 100.0 * (rank - 1) as f64 / n as f64)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Gini coefficient of `values`; `None` when the values sum to zero
pub fn gini_coefficient(values: &[u32]) -> Option<f64> {
    let total: u64 = values.iter().map(|v| *v as u64).sum();
    if values.is_empty() || total == 0 {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64 + 1.0) * *v as f64)
        .sum();

    let gini = (2.0 * weighted) / (n * total as f64) - (n + 1.0) / n;
    Some(gini.max(0.0))
}

/// Rank `vertices` so that as few placements as possible go upward.
///
/// Seeds the order by placement power (out-weight over in-weight), then
/// swaps adjacent institutions while a swap strictly reduces violations.
pub fn minimum_violation_ranking(vertices: &[InstId], edges: &PlacementEdges) -> MvrRanking {
    let mut out_weight: HashMap<InstId, u32> = HashMap::new();
    let mut in_weight: HashMap<InstId, u32> = HashMap::new();
    for (&(src, dst), &weight) in edges {
        if src == dst {
            continue;
        }
        *out_weight.entry(src).or_default() += weight;
        *in_weight.entry(dst).or_default() += weight;
    }

    let power = |id: &InstId| {
        let out = out_weight.get(id).copied().unwrap_or(0) as f64;
        let inn = in_weight.get(id).copied().unwrap_or(0) as f64;
        (out + 1.0) / (inn + 1.0)
    };

    let mut order = vertices.to_vec();
    order.sort_by(|a, b| power(b).total_cmp(&power(a)).then(a.cmp(b)));

    let weight = |src: InstId, dst: InstId| edges.get(&(src, dst)).copied().unwrap_or(0);

    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..order.len().saturating_sub(1) {
            let (upper, lower) = (order[i], order[i + 1]);
            if weight(lower, upper) > weight(upper, lower) {
                order.swap(i, i + 1);
                improved = true;
            }
        }
    }

    let violations = count_violations(&order, edges);
    MvrRanking::new(order, violations)
}

/// Placements whose hiring institution sits above the doctoral one
pub fn count_violations(order: &[InstId], edges: &PlacementEdges) -> u32 {
    let positions: HashMap<InstId, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    edges
        .iter()
        .filter(|((src, dst), _)| match (positions.get(src), positions.get(dst)) {
            (Some(s), Some(d)) => d < s,
            _ => false,
        })
        .map(|(_, weight)| *weight)
        .sum()
}
