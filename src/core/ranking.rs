use std::sync::Arc;

use thiserror::Error;

use crate::core::{
    dijkstra::{shortest_paths, DistanceMap},
    filters::{filter_candidates, SearchQuery},
    graph::{build_graph, student_key, teacher_key, GraphError},
};
use crate::models::{Coordinate, RankedTeacher, TeacherProfile};
use crate::services::{StoreError, TeacherProfileStore};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to fetch candidates: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build distance graph: {0}")]
    Graph(#[from] GraphError),
}

/// Ranked outcome of one search
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Ascending by distance
    pub teachers: Vec<RankedTeacher>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
    }

    pub fn nearest(&self) -> Option<&RankedTeacher> {
        self.teachers.first()
    }

    pub fn farthest(&self) -> Option<&RankedTeacher> {
        self.teachers.last()
    }
}

/// Attach each candidate's distance and sort ascending
///
/// Candidates missing from `distances` get `f64::INFINITY`. The sort is
/// stable, so equal distances keep candidate order.
pub fn assemble_results(
    candidates: Vec<TeacherProfile>,
    distances: &DistanceMap,
) -> Vec<RankedTeacher> {
    let mut ranked: Vec<RankedTeacher> = candidates
        .into_iter()
        .map(|profile| {
            let distance = distances
                .get(&teacher_key(&profile.id))
                .copied()
                .unwrap_or(f64::INFINITY);
            let ranked = RankedTeacher { profile, distance };

            if !ranked.is_reachable() {
                tracing::warn!("Teacher {} unreachable from student node", ranked.profile.id);
            }

            ranked
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

/// Graph build, shortest paths and assembly for an already-fetched candidate set
pub fn rank_candidates(
    student_location: &Coordinate,
    candidates: Vec<TeacherProfile>,
) -> Result<Vec<RankedTeacher>, GraphError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let graph = build_graph(student_location, &candidates)?;
    tracing::debug!(
        "Built distance graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let distances = shortest_paths(&graph, &student_key(student_location));
    Ok(assemble_results(candidates, &distances))
}

/// Teacher search pipeline
///
/// # Pipeline Stages
/// 1. Candidate filter against the profile store
/// 2. Star graph from the student to every candidate
/// 3. Shortest paths from the student node
/// 4. Assembly and ascending sort by distance
///
/// Every call is independent; nothing is cached between requests.
#[derive(Clone)]
pub struct TeacherSearch {
    store: Arc<dyn TeacherProfileStore>,
}

impl TeacherSearch {
    pub fn new(store: Arc<dyn TeacherProfileStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let candidates = filter_candidates(self.store.as_ref(), query).await?;
        tracing::debug!("Found {} candidates", candidates.len());

        if candidates.is_empty() {
            return Ok(SearchResult::default());
        }

        let teachers = rank_candidates(&query.student_location, candidates)?;
        Ok(SearchResult { teachers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectOffered;
    use crate::services::MemoryStore;
    use uuid::Uuid;

    fn create_teacher(name: &str, lat: f64, lon: f64, subject: &str) -> TeacherProfile {
        TeacherProfile {
            id: Uuid::new_v4(),
            fullname: name.to_string(),
            location: Coordinate::new(lat, lon),
            degree: "bed".to_string(),
            phone_number: format!("phone-{}", name),
            about_me: "about".to_string(),
            education_information: vec![],
            subjects_offered: vec![SubjectOffered {
                level: 5,
                subject: subject.to_string(),
                price: 10.0,
            }],
            general_availability: vec![],
            profile_picture: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_assemble_sorts_ascending() {
        let near = create_teacher("near", 0.0, 0.0, "math");
        let far = create_teacher("far", 0.0, 0.0, "math");
        let mut distances = DistanceMap::new();
        distances.insert(teacher_key(&near.id), 1.0);
        distances.insert(teacher_key(&far.id), 9.0);

        let ranked = assemble_results(vec![far, near], &distances);

        assert_eq!(ranked[0].profile.fullname, "near");
        assert_eq!(ranked[1].profile.fullname, "far");
    }

    #[test]
    fn test_assemble_missing_distance_goes_last() {
        let known = create_teacher("known", 0.0, 0.0, "math");
        let unknown = create_teacher("unknown", 0.0, 0.0, "math");
        let mut distances = DistanceMap::new();
        distances.insert(teacher_key(&known.id), 500.0);

        let ranked = assemble_results(vec![unknown, known], &distances);

        assert_eq!(ranked[0].profile.fullname, "known");
        assert!(ranked[1].distance.is_infinite());
    }

    #[test]
    fn test_assemble_ties_keep_candidate_order() {
        let first = create_teacher("first", 0.0, 0.0, "math");
        let second = create_teacher("second", 0.0, 0.0, "math");
        let third = create_teacher("third", 0.0, 0.0, "math");
        let mut distances = DistanceMap::new();
        for teacher in [&first, &second, &third] {
            distances.insert(teacher_key(&teacher.id), 2.0);
        }

        let ranked = assemble_results(vec![first, second, third], &distances);
        let names: Vec<_> = ranked.iter().map(|r| r.profile.fullname.as_str()).collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_candidates_scenario() {
        let student = Coordinate::new(27.7, 85.3);
        let b = create_teacher("b", 27.8, 85.4, "math");
        let a = create_teacher("a", 27.7, 85.3, "math");

        let ranked = rank_candidates(&student, vec![b, a]).unwrap();

        assert_eq!(ranked[0].profile.fullname, "a");
        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(ranked[1].profile.fullname, "b");
        assert!(ranked[1].distance > 0.0);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let search = TeacherSearch::new(Arc::new(MemoryStore::new()));
        let query = SearchQuery::new(Coordinate::new(27.7, 85.3));

        let result = search.search(&query).await.unwrap();

        assert!(result.is_empty());
        assert!(result.nearest().is_none());
        assert!(result.farthest().is_none());
    }

    #[tokio::test]
    async fn test_search_filters_then_ranks() {
        let store = MemoryStore::with_profiles(vec![
            create_teacher("far-math", 28.2, 83.9, "math"),
            create_teacher("science", 27.7, 85.3, "science"),
            create_teacher("near-math", 27.71, 85.31, "math"),
        ]);
        let search = TeacherSearch::new(Arc::new(store));

        let mut query = SearchQuery::new(Coordinate::new(27.7, 85.3));
        query.subject = Some("math".to_string());

        let result = search.search(&query).await.unwrap();
        let names: Vec<_> = result
            .teachers
            .iter()
            .map(|r| r.profile.fullname.as_str())
            .collect();

        assert_eq!(names, vec!["near-math", "far-math"]);
        assert_eq!(result.nearest().unwrap().profile.fullname, "near-math");
        assert_eq!(result.farthest().unwrap().profile.fullname, "far-math");
    }
}
