// src/core/balancer/mod.rs

//! The load balancer (spec.md §4.D): a pure function computing an advisory
//! move list under the mean-count policy. Grounded on `cluster::slot::get_slot`'s
//! pure, directly-testable style — no internal state, nothing here ever
//! mutates assignment state itself.

use crate::core::region::ServerName;
use std::collections::BTreeMap;

/// One proposed move: `region` should go from `source` to `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub region_name: String,
    pub source: ServerName,
    pub destination: ServerName,
}

/// Computes the mean-count rebalancing plan.
///
/// `server_regions` is the multimap server -> regions currently believed
/// open there. `locality_hint(region_name, server)` reports whether
/// `server`'s disk already hosts a replica of that region's data; ties
/// prefer a destination for which this returns `true`.
///
/// Tie-break order, exactly per spec.md §4.D: (a) the move that reduces the
/// standard deviation of per-server region counts the most, (b) locality
/// hint match, (c) lexicographically smallest region name.
pub fn compute_moves(
    server_regions: &BTreeMap<ServerName, Vec<String>>,
    locality_hint: impl Fn(&str, &ServerName) -> bool,
) -> Vec<Move> {
    let num_servers = server_regions.len();
    if num_servers <= 1 {
        return Vec::new();
    }

    let total_regions: usize = server_regions.values().map(Vec::len).sum();
    let floor = total_regions / num_servers;
    let ceil = if total_regions.is_multiple_of(num_servers) { floor } else { floor + 1 };

    let mut counts: BTreeMap<ServerName, usize> = server_regions
        .iter()
        .map(|(server, regions)| (server.clone(), regions.len()))
        .collect();

    // Candidate regions available to move off of over-ceiling servers,
    // lexicographically sorted so tie-break (c) is just "pick first".
    let mut movable: Vec<(ServerName, String)> = server_regions
        .iter()
        .filter(|(server, _)| counts[*server] > ceil)
        .flat_map(|(server, regions)| regions.iter().map(move |r| (server.clone(), r.clone())))
        .collect();
    movable.sort_by(|a, b| a.1.cmp(&b.1));

    let mut moves = Vec::new();

    for (source, region_name) in movable {
        if counts[&source] <= ceil {
            continue;
        }
        let Some(destination) = pick_destination(&counts, floor, &region_name, &locality_hint) else {
            continue;
        };
        *counts.get_mut(&source).unwrap() -= 1;
        *counts.get_mut(&destination).unwrap() += 1;
        moves.push(Move {
            region_name,
            source,
            destination,
        });
    }

    moves
}

fn pick_destination(
    counts: &BTreeMap<ServerName, usize>,
    floor: usize,
    region_name: &str,
    locality_hint: &impl Fn(&str, &ServerName) -> bool,
) -> Option<ServerName> {
    let candidates: Vec<&ServerName> = counts
        .iter()
        .filter(|&(_, &count)| count <= floor)
        .map(|(server, _)| server)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let current_stddev = stddev(counts.values().copied());

    let mut best: Option<(&ServerName, f64, bool)> = None;
    for &server in &candidates {
        let projected = project_counts(counts, server);
        let projected_stddev = stddev(projected.into_iter());
        let reduction = current_stddev - projected_stddev;
        let locality = locality_hint(region_name, server);

        let better = match &best {
            None => true,
            Some((_, best_reduction, best_locality)) => {
                reduction > *best_reduction || (reduction == *best_reduction && locality && !*best_locality)
            }
        };
        if better {
            best = Some((server, reduction, locality));
        }
    }

    best.map(|(server, _, _)| server.clone())
}

fn project_counts(counts: &BTreeMap<ServerName, usize>, destination: &ServerName) -> Vec<usize> {
    counts
        .iter()
        .map(|(s, &c)| if s == destination { c + 1 } else { c })
        .collect()
}

fn stddev(values: impl Iterator<Item = usize> + Clone) -> f64 {
    let values: Vec<f64> = values.map(|v| v as f64).collect();
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
