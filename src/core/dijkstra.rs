use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::core::graph::Graph;

/// Shortest known distance from the source, per node key
pub type DistanceMap = HashMap<String, f64>;

/// Frontier entry, ordered so that `BinaryHeap` pops the smallest distance
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrontierEntry<'g> {
    distance: f64,
    node: &'g str,
}

impl Eq for FrontierEntry<'_> {}

impl Ord for FrontierEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap
        other.distance.total_cmp(&self.distance)
    }
}

impl PartialOrd for FrontierEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths (Dijkstra) over a non-negative weighted graph
///
/// Every node of the graph appears in the result; nodes with no path from
/// `source` keep `f64::INFINITY`. The source maps to 0 even when it is not a
/// node of the graph. Stale frontier entries are skipped on extraction
/// (lazy deletion) rather than decreased in place.
pub fn shortest_paths(graph: &Graph, source: &str) -> DistanceMap {
    let mut distances: HashMap<&str, f64> = graph
        .nodes()
        .map(|node| (node, f64::INFINITY))
        .collect();
    distances.insert(source, 0.0);

    let mut visited: HashSet<&str> = HashSet::with_capacity(distances.len());
    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry {
        distance: 0.0,
        node: source,
    });

    while let Some(FrontierEntry { distance, node }) = frontier.pop() {
        if !visited.insert(node) {
            continue;
        }

        for (neighbor, weight) in graph.neighbors(node) {
            let candidate = distance + weight;
            let known = distances.get(neighbor).copied().unwrap_or(f64::INFINITY);

            if candidate < known {
                distances.insert(neighbor, candidate);
                frontier.push(FrontierEntry {
                    distance: candidate,
                    node: neighbor,
                });
            }
        }
    }

    distances
        .into_iter()
        .map(|(node, distance)| (node.to_string(), distance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_graph_equals_direct_edges() {
        let mut graph = Graph::new();
        graph.add_edge("s", "a", 4.0).unwrap();
        graph.add_edge("s", "b", 0.0).unwrap();
        graph.add_edge("s", "c", 12.5).unwrap();

        let distances = shortest_paths(&graph, "s");

        assert_eq!(distances.len(), 4);
        assert_eq!(distances["s"], 0.0);
        assert_eq!(distances["a"], 4.0);
        assert_eq!(distances["b"], 0.0);
        assert_eq!(distances["c"], 12.5);
    }

    #[test]
    fn test_multi_hop_prefers_shorter_path() {
        let mut graph = Graph::new();
        graph.add_edge("s", "a", 1.0).unwrap();
        graph.add_edge("s", "b", 10.0).unwrap();
        graph.add_edge("a", "b", 2.0).unwrap();
        graph.add_edge("b", "c", 1.0).unwrap();

        let distances = shortest_paths(&graph, "s");

        assert_eq!(distances["b"], 3.0);
        assert_eq!(distances["c"], 4.0);
    }

    #[test]
    fn test_unreachable_node_is_infinite() {
        let mut graph = Graph::new();
        graph.add_edge("s", "a", 1.0).unwrap();
        graph.add_node("island");
        graph.add_edge("x", "y", 1.0).unwrap();

        let distances = shortest_paths(&graph, "s");

        assert_eq!(distances["a"], 1.0);
        assert!(distances["island"].is_infinite());
        assert!(distances["x"].is_infinite());
        assert!(distances["y"].is_infinite());
    }

    #[test]
    fn test_cycles_terminate() {
        let mut graph = Graph::new();
        graph.add_edge("s", "a", 1.0).unwrap();
        graph.add_edge("a", "s", 1.0).unwrap();
        graph.add_edge("a", "b", 1.0).unwrap();
        graph.add_edge("b", "a", 0.5).unwrap();

        let distances = shortest_paths(&graph, "s");

        assert_eq!(distances["s"], 0.0);
        assert_eq!(distances["a"], 1.0);
        assert_eq!(distances["b"], 2.0);
    }

    #[test]
    fn test_ties_do_not_change_distances() {
        let mut graph = Graph::new();
        graph.add_edge("s", "a", 2.0).unwrap();
        graph.add_edge("s", "b", 2.0).unwrap();
        graph.add_edge("a", "c", 1.0).unwrap();
        graph.add_edge("b", "c", 1.0).unwrap();

        let distances = shortest_paths(&graph, "s");

        assert_eq!(distances["c"], 3.0);
    }

    #[test]
    fn test_source_missing_from_graph() {
        let mut graph = Graph::new();
        graph.add_node("a");

        let distances = shortest_paths(&graph, "ghost");

        assert_eq!(distances["ghost"], 0.0);
        assert!(distances["a"].is_infinite());
    }
}
