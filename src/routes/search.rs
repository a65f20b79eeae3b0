use actix_web::{web, HttpResponse};

use crate::core::SearchQuery;
use crate::error::ApiError;
use crate::models::{SearchParams, SearchResponse, NO_TEACHERS_FOUND};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/teachers/search", web::get().to(search_teachers));
}

/// Teacher search endpoint
///
/// GET /api/v1/teachers/search?subject=math&level=5&maxPrice=15&studentLocation={"latitude":27.7,"longitude":85.3}
async fn search_teachers(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let query = SearchQuery::from_params(&params)?;

    tracing::info!(
        "Searching teachers near ({}, {}), subject: {:?}, level: {:?}",
        query.student_location.latitude,
        query.student_location.longitude,
        query.subject,
        query.level
    );

    let result = state.search.search(&query).await?;

    if result.is_empty() {
        return Ok(HttpResponse::Ok().json(SearchResponse {
            success: true,
            message: Some(NO_TEACHERS_FOUND.to_string()),
            nearest_teacher: None,
            farthest_teacher: None,
            teachers: Vec::new(),
        }));
    }

    tracing::debug!("Ranked {} teachers", result.teachers.len());

    Ok(HttpResponse::Ok().json(SearchResponse {
        success: true,
        message: None,
        nearest_teacher: result.nearest().cloned(),
        farthest_teacher: result.farthest().cloned(),
        teachers: result.teachers,
    }))
}
