use serde::{Deserialize, Serialize};
use crate::models::domain::{Booking, RankedTeacher, TeacherProfile, TeacherSummary};

/// Response for the teacher search endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_teacher: Option<RankedTeacher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farthest_teacher: Option<RankedTeacher>,
    pub teachers: Vec<RankedTeacher>,
}

pub const NO_TEACHERS_FOUND: &str = "No teachers found matching the criteria";

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherFormResponse {
    pub success: bool,
    pub teacher_form: TeacherProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherListResponse {
    pub success: bool,
    pub teachers: Vec<TeacherProfile>,
}

/// Booking returned after a create or a status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub booking: Booking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCheckResponse {
    pub success: bool,
    pub is_booked: bool,
}

/// Booking with the teacher it refers to, when that teacher still exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub teacher: Option<TeacherSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub success: bool,
    pub bookings: Vec<BookingView>,
}
