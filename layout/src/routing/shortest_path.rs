//! Dijkstra's shortest path search over implicit graphs.

use crate::adt::priority_queue::BinaryHeapPriorityQueue;

/// Find the cheapest path from \p source to \p target in a graph with
/// \p num_nodes nodes. \p neighbors returns the outgoing (node, cost) pairs
/// of a node; costs must not be negative.
/// \returns the nodes on the path, including both ends, or None if the
/// target can't be reached.
pub fn dijkstra<F, I>(num_nodes: usize, source: usize, target: usize, neighbors: F) -> Option<Vec<usize>>
where
    F: Fn(usize) -> I,
    I: IntoIterator<Item = (usize, f64)>,
{
    assert!(source < num_nodes && target < num_nodes, "Invalid endpoint");
    let mut dist = vec![f64::INFINITY; num_nodes];
    let mut prev: Vec<Option<usize>> = vec![None; num_nodes];
    let mut done = vec![false; num_nodes];
    let mut queue = BinaryHeapPriorityQueue::new(num_nodes);

    dist[source] = 0.;
    queue.enqueue(source, 0.);

    while let Some((current, d)) = queue.dequeue_with_priority() {
        done[current] = true;
        if current == target {
            break;
        }
        for (next, cost) in neighbors(current) {
            debug_assert!(cost >= 0., "Negative edge cost");
            if done[next] {
                continue;
            }
            let nd = d + cost;
            if nd < dist[next] {
                dist[next] = nd;
                prev[next] = Some(current);
                if queue.contains(next) {
                    queue.decrease_priority(next, nd);
                } else {
                    queue.enqueue(next, nd);
                }
            }
        }
    }

    if !done[target] {
        return None;
    }

    let mut path = vec![target];
    let mut current = target;
    while let Some(p) = prev[current] {
        path.push(p);
        current = p;
    }
    path.reverse();
    Some(path)
}

#[test]
fn test_dijkstra() {
    // 0 -> 1 -> 3 is cheaper than 0 -> 3, and 4 is not reachable.
    let edges: Vec<(usize, usize, f64)> = vec![
        (0, 1, 1.),
        (1, 3, 1.),
        (0, 3, 5.),
        (0, 2, 0.5),
        (2, 3, 4.),
        (4, 0, 1.),
    ];
    let neighbors = |n: usize| {
        edges
            .iter()
            .filter(|e| e.0 == n)
            .map(|e| (e.1, e.2))
            .collect::<Vec<_>>()
    };
    assert_eq!(dijkstra(5, 0, 3, neighbors), Some(vec![0, 1, 3]));
    assert_eq!(dijkstra(5, 0, 0, neighbors), Some(vec![0]));
    assert_eq!(dijkstra(5, 0, 4, neighbors), None);
}
