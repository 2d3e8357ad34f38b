use std::collections::HashMap;

use proptest::prelude::*;

use agent_collab::dag::{TaskGraph, order};
use agent_collab_test_utils::TaskSpecBuilder;

// Acyclic by construction: task N may only depend on tasks 0..N-1. Titles
// that match nothing ("ghost_<n>") are sprinkled in as well.
fn acyclic_graph_strategy(max_tasks: usize) -> impl Strategy<Value = TaskGraph> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let tasks = proptest::collection::vec(
            (
                0i64..4,
                proptest::collection::vec(any::<usize>(), 0..4),
                any::<bool>(),
            ),
            num_tasks,
        );

        tasks.prop_map(|tasks| {
            let specs = tasks.into_iter().enumerate().map(|(i, (priority, raw_deps, ghost))| {
                let mut deps: Vec<String> = if i == 0 {
                    Vec::new()
                } else {
                    raw_deps.into_iter().map(|d| format!("t{}", d % i)).collect()
                };
                if ghost {
                    deps.push(format!("ghost_{i}"));
                }
                let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
                TaskSpecBuilder::new(&format!("t{i}"))
                    .priority(priority)
                    .after(&deps)
                    .build()
            });
            TaskGraph::build(specs.collect::<Vec<_>>())
        })
    })
}

proptest! {
    #[test]
    fn order_is_a_topological_permutation(g in acyclic_graph_strategy(12)) {
        let ord = order(&g);
        prop_assert_eq!(ord.len(), g.len());

        let position: HashMap<usize, usize> =
            ord.iter().enumerate().map(|(pos, &idx)| (idx, pos)).collect();

        for idx in 0..g.len() {
            for &dep in g.dependencies_of(idx) {
                prop_assert!(position[&dep] < position[&idx]);
            }
        }
    }

    #[test]
    fn independent_tasks_come_out_by_priority(priorities in proptest::collection::vec(-3i64..10, 1..10)) {
        let g = TaskGraph::build(
            priorities
                .iter()
                .enumerate()
                .map(|(i, &p)| TaskSpecBuilder::new(&format!("t{i}")).priority(p).build())
                .collect::<Vec<_>>(),
        );

        let ord = order(&g);
        let emitted: Vec<i64> = ord.iter().map(|&idx| g.task(idx).priority).collect();
        let mut expected = priorities.clone();
        expected.sort();
        prop_assert_eq!(emitted, expected);

        // Stable: equal priorities keep discovery order.
        for pair in ord.windows(2) {
            if g.task(pair[0]).priority == g.task(pair[1]).priority {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
