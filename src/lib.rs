//! Tutor Market - teacher search and booking service
//!
//! Students find teachers by subject, level and price, ranked by
//! great-circle distance through a shortest-path pass over a star graph
//! centred on the student. Teachers publish forms and accept or reject
//! the bookings students make.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::{distance_km, haversine_distance},
    SearchQuery, TeacherSearch,
};
pub use error::ApiError;
pub use models::{Coordinate, RankedTeacher, SearchParams, SearchResponse, TeacherProfile};
