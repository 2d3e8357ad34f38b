mod common;

use agent_collab::dag::{TaskGraph, order, unschedulable};
use agent_collab_test_utils::{TaskSpecBuilder, graph};

use common::titles;

#[test]
fn dependents_follow_dependencies_even_with_lower_priority() {
    // A(2) <- B(1) <- C(1, also after A)
    let g = graph(&[("A", 2, &[]), ("B", 1, &["A"]), ("C", 1, &["A", "B"])]);
    assert_eq!(titles(&g, &order(&g)), ["A", "B", "C"]);
}

#[test]
fn ready_set_is_sorted_by_priority() {
    let g = graph(&[("X", 5, &[]), ("Y", 1, &[])]);
    assert_eq!(titles(&g, &order(&g)), ["Y", "X"]);
}

#[test]
fn equal_priorities_keep_discovery_order() {
    let g = graph(&[("first", 3, &[]), ("second", 3, &[]), ("third", 3, &[])]);
    assert_eq!(titles(&g, &order(&g)), ["first", "second", "third"]);
}

#[test]
fn newly_ready_tasks_compete_with_waiting_ones() {
    // After `root` (1) finishes, `child` (2) and `late` (3) are both ready.
    let g = graph(&[("late", 3, &[]), ("root", 1, &[]), ("child", 2, &["root"])]);
    assert_eq!(titles(&g, &order(&g)), ["root", "child", "late"]);
}

#[test]
fn ghost_dependencies_do_not_block_ordering() {
    let g = graph(&[("D", 5, &["ghost"])]);
    assert_eq!(titles(&g, &order(&g)), ["D"]);
}

#[test]
fn duplicate_titles_resolve_to_the_first_task() {
    let g = TaskGraph::build(vec![
        TaskSpecBuilder::new("build").priority(9).build(),
        TaskSpecBuilder::new("build").priority(1).after(&["test"]).build(),
        TaskSpecBuilder::new("test").priority(5).after(&["build"]).build(),
    ]);

    assert_eq!(g.resolve("build"), Some(0));
    assert_eq!(g.task(1).id, "task_2");

    // `test` waits on the first `build` only; the second `build` waits on `test`.
    let ids: Vec<_> = order(&g).into_iter().map(|i| g.task(i).id.clone()).collect();
    assert_eq!(ids, ["task_1", "task_3", "task_2"]);
}

#[test]
fn cycles_and_their_dependents_are_left_out() {
    let g = graph(&[
        ("ok", 1, &[]),
        ("ping", 1, &["pong"]),
        ("pong", 1, &["ping"]),
        ("after_cycle", 1, &["pong"]),
        ("self_loop", 1, &["self_loop"]),
    ]);

    let ord = order(&g);
    assert_eq!(titles(&g, &ord), ["ok"]);

    let skipped = unschedulable(&g, &ord);
    assert_eq!(
        titles(&g, &skipped),
        ["ping", "pong", "after_cycle", "self_loop"]
    );
    assert_eq!(titles(&g, &g.cycle_members()), ["ping", "pong", "self_loop"]);
}

#[test]
fn ids_follow_discovery_order() {
    let g = graph(&[("z", 9, &[]), ("a", 1, &[])]);
    let ids: Vec<_> = g.tasks().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["task_1", "task_2"]);
}
