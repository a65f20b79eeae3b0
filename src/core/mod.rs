// Core algorithm exports
pub mod dijkstra;
pub mod distance;
pub mod filters;
pub mod graph;
pub mod ranking;
pub mod schedule;

pub use dijkstra::{shortest_paths, DistanceMap};
pub use distance::{distance_km, haversine_distance};
pub use filters::{filter_candidates, ProfileFilter, QueryError, SearchQuery, SubjectMatch};
pub use graph::{build_graph, student_key, teacher_key, Graph, GraphError};
pub use ranking::{assemble_results, rank_candidates, SearchError, SearchResult, TeacherSearch};
pub use schedule::{
    apply_decision, intervals_overlap, BookingWindow, ClockTime, Decision, ScheduleError,
};
