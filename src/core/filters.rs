use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::models::{Coordinate, SearchParams, SubjectOffered, TeacherProfile};
use crate::services::{StoreError, TeacherProfileStore};

/// Reasons a search request is rejected before any filtering happens
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Student location is required")]
    MissingLocation,

    #[error("Invalid student location format. Ensure it is a valid JSON object.")]
    MalformedLocation,

    #[error("Latitude and longitude must be valid numbers.")]
    NonNumericCoordinates,

    #[error("Latitude must be between -90 and 90 and longitude between -180 and 180.")]
    CoordinatesOutOfRange,

    #[error("{0} must be a valid number.")]
    InvalidNumber(&'static str),
}

/// Conditions that a single `subjectsOffered` entry must satisfy together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectMatch {
    pub level: Option<u16>,
    /// Lowercased
    pub subject: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SubjectMatch {
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.subject.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Check one offered subject against every present condition
    #[inline]
    pub fn matches(&self, offered: &SubjectOffered) -> bool {
        if let Some(level) = self.level {
            if offered.level != level {
                return false;
            }
        }

        if let Some(subject) = &self.subject {
            if offered.subject != *subject {
                return false;
            }
        }

        if let Some(min_price) = self.min_price {
            if offered.price < min_price {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if offered.price > max_price {
                return false;
            }
        }

        true
    }
}

/// Match condition handed to the profile store
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileFilter {
    /// Every stored profile
    All,
    /// Profiles with at least one offered subject satisfying the whole match
    ElemMatch(SubjectMatch),
}

impl ProfileFilter {
    pub fn matches(&self, profile: &TeacherProfile) -> bool {
        match self {
            ProfileFilter::All => true,
            ProfileFilter::ElemMatch(condition) => profile
                .subjects_offered
                .iter()
                .any(|offered| condition.matches(offered)),
        }
    }
}

/// Validated, coerced teacher search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub level: Option<u16>,
    pub subject: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub student_location: Coordinate,
}

impl SearchQuery {
    pub fn new(student_location: Coordinate) -> Self {
        Self {
            level: None,
            subject: None,
            min_price: None,
            max_price: None,
            student_location,
        }
    }

    /// Coerce raw query parameters. The location is checked first so a bad
    /// location is always the reported error.
    pub fn from_params(params: &SearchParams) -> Result<Self, QueryError> {
        let student_location = parse_student_location(params.student_location.as_deref())?;

        Ok(Self {
            level: present(&params.level).map(parse_level).transpose()?,
            subject: present(&params.subject).map(|s| s.to_lowercase()),
            min_price: present(&params.min_price)
                .map(|s| parse_number(s, "minPrice"))
                .transpose()?,
            max_price: present(&params.max_price)
                .map(|s| parse_number(s, "maxPrice"))
                .transpose()?,
            student_location,
        })
    }

    /// Build the store condition; no subject filters means no filtering at all
    pub fn filter(&self) -> ProfileFilter {
        let condition = SubjectMatch {
            level: self.level,
            subject: self.subject.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
        };

        if condition.is_empty() {
            ProfileFilter::All
        } else {
            ProfileFilter::ElemMatch(condition)
        }
    }
}

/// Fetch the teachers matching the query's subject conditions
pub async fn filter_candidates(
    store: &dyn TeacherProfileStore,
    query: &SearchQuery,
) -> Result<Vec<TeacherProfile>, StoreError> {
    store.find(&query.filter()).await
}

/// Parse the JSON-encoded `studentLocation` parameter
///
/// Latitude and longitude may be JSON numbers or numeric strings.
pub fn parse_student_location(raw: Option<&str>) -> Result<Coordinate, QueryError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or(QueryError::MissingLocation)?;

    let value: Value = serde_json::from_str(raw).map_err(|_| QueryError::MalformedLocation)?;
    let object = value.as_object().ok_or(QueryError::MalformedLocation)?;

    let latitude = object
        .get("latitude")
        .and_then(coordinate_component)
        .ok_or(QueryError::NonNumericCoordinates)?;
    let longitude = object
        .get("longitude")
        .and_then(coordinate_component)
        .ok_or(QueryError::NonNumericCoordinates)?;

    let location = Coordinate::new(latitude, longitude);
    location
        .validate()
        .map_err(|_| QueryError::CoordinatesOutOfRange)?;

    Ok(location)
}

fn coordinate_component(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

/// Empty parameters count as absent
fn present(param: &Option<String>) -> Option<&str> {
    param
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_number(raw: &str, field: &'static str) -> Result<f64, QueryError> {
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(QueryError::InvalidNumber(field))
}

/// Levels are whole numbers; "8" and "8.0" are the same level
fn parse_level(raw: &str) -> Result<u16, QueryError> {
    let number = parse_number(raw, "level")?;
    if number.fract() != 0.0 || number < 0.0 || number > f64::from(u16::MAX) {
        return Err(QueryError::InvalidNumber("level"));
    }
    Ok(number as u16)
}
