// tests/property/balancer_test.rs

//! Property-based tests for the load balancer (spec.md §4.D): regardless of
//! the input distribution, a single-server cluster never moves anything,
//! and applying every proposed move always leaves each server within one
//! region of the mean.

use proptest::prelude::*;
use region_assign::core::balancer::compute_moves;
use region_assign::core::region::ServerName;
use std::collections::BTreeMap;

fn server(n: u16) -> ServerName {
    ServerName::new("10.0.0.1", n, 1)
}

fn cluster(counts: &[usize]) -> BTreeMap<ServerName, Vec<String>> {
    let mut next_id = 0usize;
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let regions = (0..count)
                .map(|_| {
                    let name = format!("r{next_id}");
                    next_id += 1;
                    name
                })
                .collect();
            (server(i as u16 + 1), regions)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 100, ..ProptestConfig::default() })]

    #[test]
    fn single_server_never_moves_anything(count in 0..50usize) {
        let map = cluster(&[count]);
        assert!(compute_moves(&map, |_, _| false).is_empty());
    }

    /// No server ever ends up over the ceiling, every server that started
    /// over the ceiling ends up exactly at it, and the total region count is
    /// conserved. A single pass does not guarantee every server reaches the
    /// floor when total deficit exceeds total excess — convergence to
    /// [floor, ceil] happens across repeated ticks, not in one call.
    #[test]
    fn moves_never_exceed_the_ceiling_and_drain_every_source_to_it(counts in prop::collection::vec(0..30usize, 2..6)) {
        let map = cluster(&counts);
        let total: usize = counts.iter().sum();
        let num_servers = counts.len();
        let floor = total / num_servers;
        let ceil = if total.is_multiple_of(num_servers) { floor } else { floor + 1 };

        let moves = compute_moves(&map, |_, _| false);

        let mut final_counts: BTreeMap<ServerName, usize> =
            map.iter().map(|(s, r)| (s.clone(), r.len())).collect();
        for m in &moves {
            assert_ne!(m.source, m.destination, "a move must go to a different server");
            *final_counts.get_mut(&m.source).unwrap() -= 1;
            *final_counts.get_mut(&m.destination).unwrap() += 1;
        }

        assert_eq!(final_counts.values().sum::<usize>(), total);
        for (server, &count) in &final_counts {
            assert!(count <= ceil, "server {server} ended with {count} regions, above ceiling {ceil}");
        }
        for (server, regions) in &map {
            if regions.len() > ceil {
                assert_eq!(
                    final_counts[server], ceil,
                    "overloaded server {server} should have shed down to exactly {ceil}"
                );
            }
        }
    }

    #[test]
    fn never_mutates_its_input(counts in prop::collection::vec(0..20usize, 1..5)) {
        let map = cluster(&counts);
        let before = map.clone();
        let _ = compute_moves(&map, |_, _| false);
        assert_eq!(map, before);
    }
}
