use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::core::distance::distance_km;
use crate::models::{Coordinate, TeacherProfile};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight { from: String, to: String, weight: f64 },
}

/// Directed graph with non-negative edge weights (kilometres)
///
/// Nodes are keyed by string. A node with no outgoing edges is still
/// present with an empty adjacency map.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<String, HashMap<String, f64>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if it is not there yet
    pub fn add_node(&mut self, key: impl Into<String>) {
        self.adjacency.entry(key.into()).or_default();
    }

    /// Add or replace the edge `from -> to`, creating both nodes as needed
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        weight: f64,
    ) -> Result<(), GraphError> {
        let from = from.into();
        let to = to.into();

        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight { from, to, weight });
        }

        self.adjacency.entry(to.clone()).or_default();
        self.adjacency.entry(from).or_default().insert(to, weight);
        Ok(())
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.adjacency.contains_key(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Outgoing edges of `key`; empty for unknown nodes
    pub fn neighbors<'a>(&'a self, key: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.adjacency
            .get(key)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(to, weight)| (to.as_str(), *weight)))
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        self.adjacency.get(from).and_then(|edges| edges.get(to)).copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashMap::len).sum()
    }
}

/// Node key of the student, stable for a given coordinate pair
pub fn student_key(location: &Coordinate) -> String {
    format!("student_{}_{}", location.latitude, location.longitude)
}

/// Node key of a teacher
pub fn teacher_key(id: &Uuid) -> String {
    format!("teacher_{}", id)
}

/// Build the star graph: the student node with one edge to every candidate,
/// weighted by great-circle distance. Teacher nodes have no outgoing edges.
pub fn build_graph(
    student_location: &Coordinate,
    candidates: &[TeacherProfile],
) -> Result<Graph, GraphError> {
    let mut graph = Graph::new();
    let source = student_key(student_location);
    graph.add_node(source.clone());

    for teacher in candidates {
        let weight = distance_km(student_location, &teacher.location);
        graph.add_edge(source.clone(), teacher_key(&teacher.id), weight)?;
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectOffered;

    fn create_teacher(lat: f64, lon: f64) -> TeacherProfile {
        TeacherProfile {
            id: Uuid::new_v4(),
            fullname: "teacher".to_string(),
            location: Coordinate::new(lat, lon),
            degree: "ma".to_string(),
            phone_number: Uuid::new_v4().to_string(),
            about_me: "about".to_string(),
            education_information: vec![],
            subjects_offered: vec![SubjectOffered {
                level: 1,
                subject: "english".to_string(),
                price: 5.0,
            }],
            general_availability: vec![],
            profile_picture: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_star_graph_shape() {
        let student = Coordinate::new(27.7, 85.3);
        let teachers = vec![create_teacher(27.7, 85.3), create_teacher(27.8, 85.4)];

        let graph = build_graph(&student, &teachers).unwrap();
        let source = student_key(&student);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbors(&source).count(), 2);

        for teacher in &teachers {
            let key = teacher_key(&teacher.id);
            assert!(graph.contains(&key));
            assert_eq!(graph.neighbors(&key).count(), 0);
            assert_eq!(
                graph.edge_weight(&source, &key),
                Some(distance_km(&student, &teacher.location))
            );
        }
    }

    #[test]
    fn test_empty_candidates_yield_lone_source() {
        let student = Coordinate::new(0.0, 0.0);
        let graph = build_graph(&student, &[]).unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_student_key_is_stable() {
        let a = Coordinate::new(27.7, 85.3);
        assert_eq!(student_key(&a), "student_27.7_85.3");
        assert_eq!(student_key(&a), student_key(&Coordinate::new(27.7, 85.3)));
        assert_ne!(student_key(&a), student_key(&Coordinate::new(85.3, 27.7)));
    }

    #[test]
    fn test_rejects_invalid_weights() {
        let mut graph = Graph::new();
        assert!(graph.add_edge("a", "b", -1.0).is_err());
        assert!(graph.add_edge("a", "b", f64::NAN).is_err());
        assert!(graph.add_edge("a", "b", f64::INFINITY).is_err());
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        let graph = Graph::new();
        assert_eq!(graph.neighbors("missing").count(), 0);
    }
}
