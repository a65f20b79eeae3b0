use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{MessageResponse, TeacherListResponse};
use crate::routes::AppState;
use crate::services::{AuthenticatedUser, Role};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/teachers", web::get().to(list_teachers))
            .route("/teachers/{id}", web::delete().to(delete_teacher)),
    );
}

/// GET /api/v1/admin/teachers
async fn list_teachers(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    user.require_role(Role::Admin)?;

    let teachers = state.profiles.list().await?;

    Ok(HttpResponse::Ok().json(TeacherListResponse {
        success: true,
        teachers,
    }))
}

/// DELETE /api/v1/admin/teachers/{id}
///
/// Bookings of the removed teacher go with it.
async fn delete_teacher(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let admin = user.require_role(Role::Admin)?;
    let id = path.into_inner();

    if !state.profiles.delete(id).await? {
        return Err(ApiError::NotFound("Teacher not found".to_string()));
    }

    tracing::info!("Admin {} deleted teacher {}", admin.email, id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Teacher deleted successfully".to_string(),
    }))
}
