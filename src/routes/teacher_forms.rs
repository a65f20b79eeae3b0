use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::core::ClockTime;
use crate::error::ApiError;
use crate::models::{
    Availability, CreateTeacherFormRequest, EducationInfo, SubjectOffered, TeacherFormResponse,
    TeacherProfile,
};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/teacher-form", web::post().to(create_teacher_form))
        .service(
            web::resource("/teacher-form/{id}")
                .route(web::get().to(get_teacher_form))
                .route(web::put().to(update_teacher_form)),
        );
}

fn normalize_time(raw: &str) -> Result<String, ApiError> {
    Ok(ClockTime::parse(raw)?.to_12_hour())
}

/// Lowercase free text and normalise availability times
///
/// Subjects are stored lowercased so the search filter can compare exactly.
fn build_profile(
    req: CreateTeacherFormRequest,
    id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<TeacherProfile, ApiError> {
    let general_availability = req
        .general_availability
        .into_iter()
        .map(|slot| {
            Ok(Availability {
                day: slot.day.trim().to_lowercase(),
                start_time: normalize_time(&slot.start_time)?,
                end_time: normalize_time(&slot.end_time)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(TeacherProfile {
        id,
        fullname: req.fullname.trim().to_lowercase(),
        location: req.location,
        degree: req.degree.trim().to_lowercase(),
        phone_number: req.phone_number.trim().to_string(),
        about_me: req.about_me.trim().to_lowercase(),
        education_information: req
            .education_information
            .into_iter()
            .map(|e| EducationInfo {
                board: e.board.trim().to_lowercase(),
                qualification: e.qualification.trim().to_lowercase(),
            })
            .collect(),
        subjects_offered: req
            .subjects_offered
            .into_iter()
            .map(SubjectOffered::normalized)
            .collect(),
        general_availability,
        profile_picture: req.profile_picture,
        created_at: Some(created_at),
        updated_at: Some(Utc::now()),
    })
}

/// POST /api/v1/teacher-form
async fn create_teacher_form(
    state: web::Data<AppState>,
    req: web::Json<CreateTeacherFormRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let profile = build_profile(req.into_inner(), Uuid::new_v4(), Utc::now())?;
    state.profiles.insert(&profile).await?;

    tracing::info!("Created teacher form {}", profile.id);

    Ok(HttpResponse::Created().json(TeacherFormResponse {
        success: true,
        teacher_form: profile,
    }))
}

/// GET /api/v1/teacher-form/{id}
async fn get_teacher_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let profile = state
        .profiles
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Teacher form not found".to_string()))?;

    Ok(HttpResponse::Ok().json(TeacherFormResponse {
        success: true,
        teacher_form: profile,
    }))
}

/// PUT /api/v1/teacher-form/{id}
///
/// Replaces the form; id and creation time are kept.
async fn update_teacher_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CreateTeacherFormRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let id = path.into_inner();

    let existing = state
        .profiles
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Teacher form not found".to_string()))?;

    let created_at = existing.created_at.unwrap_or_else(Utc::now);
    let profile = build_profile(req.into_inner(), id, created_at)?;

    // A concurrent delete leaves nothing to update
    if !state.profiles.update(&profile).await? {
        return Err(ApiError::NotFound("Teacher form not found".to_string()));
    }

    tracing::info!("Updated teacher form {}", id);

    Ok(HttpResponse::Ok().json(TeacherFormResponse {
        success: true,
        teacher_form: profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn request() -> CreateTeacherFormRequest {
        CreateTeacherFormRequest {
            fullname: " Sita Sharma ".to_string(),
            location: Coordinate::new(27.7, 85.3),
            degree: "MSc".to_string(),
            phone_number: "9800000000".to_string(),
            about_me: "Patient Tutor".to_string(),
            education_information: vec![],
            subjects_offered: vec![SubjectOffered {
                level: 8,
                subject: "Math".to_string(),
                price: 12.5,
            }],
            general_availability: vec![Availability {
                day: "Monday".to_string(),
                start_time: "14:00".to_string(),
                end_time: "4:30 pm".to_string(),
            }],
            profile_picture: None,
        }
    }

    #[test]
    fn test_build_profile_normalizes() {
        let id = Uuid::new_v4();
        let created_at = Utc::now() - chrono::Duration::days(3);
        let profile = build_profile(request(), id, created_at).unwrap();

        assert_eq!(profile.fullname, "sita sharma");
        assert_eq!(profile.subjects_offered[0].subject, "math");
        assert_eq!(profile.general_availability[0].day, "monday");
        assert_eq!(profile.general_availability[0].start_time, "02:00 PM");
        assert_eq!(profile.general_availability[0].end_time, "04:30 PM");
        assert_eq!(profile.id, id);
        assert_eq!(profile.created_at, Some(created_at));
        assert!(profile.updated_at > profile.created_at);
    }

    #[test]
    fn test_build_profile_rejects_bad_time() {
        let mut req = request();
        req.general_availability[0].start_time = "noon".to_string();

        assert!(matches!(
            build_profile(req, Uuid::new_v4(), Utc::now()),
            Err(ApiError::BadRequest(_))
        ));
    }
}
