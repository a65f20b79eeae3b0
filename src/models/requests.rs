use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::domain::{Availability, Coordinate, EducationInfo, SubjectOffered};

/// Raw query string of the teacher search endpoint
///
/// Everything arrives as text and is coerced once into a
/// [`SearchQuery`](crate::core::filters::SearchQuery).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub level: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    /// JSON-encoded `{ "latitude": .., "longitude": .. }`
    #[serde(rename = "studentLocation")]
    pub student_location: Option<String>,
}

/// Request to publish a teacher form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacherFormRequest {
    #[validate(length(min = 1))]
    pub fullname: String,
    #[validate(nested)]
    pub location: Coordinate,
    #[validate(length(min = 1))]
    pub degree: String,
    #[validate(length(min = 1))]
    pub phone_number: String,
    #[validate(length(min = 1))]
    pub about_me: String,
    #[serde(default)]
    #[validate(nested)]
    pub education_information: Vec<EducationInfo>,
    #[validate(length(min = 1), nested)]
    pub subjects_offered: Vec<SubjectOffered>,
    #[serde(default)]
    #[validate(nested)]
    pub general_availability: Vec<Availability>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Request to book a teacher
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookTeacherRequest {
    pub teacher_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `HH:MM` or `hh:mm AM/PM`
    #[validate(length(min = 1))]
    pub start_time: String,
    #[validate(length(min = 1))]
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckBookingParams {
    #[serde(rename = "teacherId")]
    pub teacher_id: Uuid,
}
