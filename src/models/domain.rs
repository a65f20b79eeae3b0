use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;
use validator::Validate;

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One subject a teacher offers, at a given level and price
///
/// `level` is numeric everywhere (storage, queries and responses).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SubjectOffered {
    pub level: u16,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

impl SubjectOffered {
    /// Subjects are compared lowercased and trimmed
    pub fn normalized(self) -> Self {
        Self {
            subject: self.subject.trim().to_lowercase(),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EducationInfo {
    #[validate(length(min = 1))]
    pub board: String,
    #[validate(length(min = 1))]
    pub qualification: String,
}

/// Weekly availability window, times stored as `hh:mm AM/PM`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Availability {
    #[validate(length(min = 1))]
    pub day: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
}

/// Published teacher profile ("teacher form")
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub id: Uuid,
    #[validate(length(min = 1))]
    pub fullname: String,
    #[validate(nested)]
    pub location: Coordinate,
    pub degree: String,
    pub phone_number: String,
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
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Search result entry: the full profile plus its distance from the student
#[derive(Debug, Clone, Serialize)]
pub struct RankedTeacher {
    #[serde(flatten)]
    pub profile: TeacherProfile,
    /// Kilometres; `f64::INFINITY` when the teacher node was not reached
    #[serde(serialize_with = "serialize_distance")]
    pub distance: f64,
}

impl RankedTeacher {
    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Rendered in place of a non-finite distance, which JSON cannot carry
pub const UNREACHABLE: &str = "unreachable";

fn serialize_distance<S>(distance: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if distance.is_finite() {
        serializer.serialize_f64(*distance)
    } else {
        serializer.serialize_str(UNREACHABLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Canceled => "canceled",
        }
    }
}

/// A student's request for a teacher's time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub student_id: String,
    pub teacher_id: Uuid,
    #[serde(rename = "startDate")]
    pub start_at: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end_at: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Teacher fields shown next to a booking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub fullname: String,
    pub phone_number: String,
    pub degree: String,
    pub profile_picture: Option<String>,
    pub subjects_offered: Vec<SubjectOffered>,
}

impl From<&TeacherProfile> for TeacherSummary {
    fn from(profile: &TeacherProfile) -> Self {
        Self {
            fullname: profile.fullname.clone(),
            phone_number: profile.phone_number.clone(),
            degree: profile.degree.clone(),
            profile_picture: profile.profile_picture.clone(),
            subjects_offered: profile.subjects_offered.clone(),
        }
    }
}
