use actix_web::{web, HttpResponse};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::{apply_decision, BookingWindow, Decision, ScheduleError};
use crate::error::ApiError;
use crate::models::{
    BookTeacherRequest, Booking, BookingCheckResponse, BookingListResponse, BookingResponse,
    BookingStatus, BookingView, CheckBookingParams, TeacherSummary,
};
use crate::routes::AppState;
use crate::services::{AuthenticatedUser, Role};

pub const ALREADY_BOOKED: &str = "You have already booked this teacher for the selected time.";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("/book", web::post().to(book_teacher))
            .route("/check", web::get().to(check_booking))
            .route("/student", web::get().to(student_bookings))
            .route("/teacher", web::get().to(teacher_bookings))
            .route("/accept/{id}", web::put().to(accept_booking))
            .route("/reject/{id}", web::put().to(reject_booking)),
    );
}

/// POST /api/v1/bookings/book
async fn book_teacher(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<BookTeacherRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let student_id = &user.claims().id;

    if state.profiles.get(req.teacher_id).await?.is_none() {
        return Err(ApiError::NotFound("Teacher not found".to_string()));
    }

    let window = BookingWindow::new(req.start_date, &req.start_time, req.end_date, &req.end_time)?;

    let booking = Booking {
        id: Uuid::new_v4(),
        student_id: student_id.clone(),
        teacher_id: req.teacher_id,
        start_at: window.start_at,
        end_at: window.end_at,
        start_time: window.start_time.to_12_hour(),
        end_time: window.end_time.to_12_hour(),
        status: BookingStatus::Pending,
        created_at: Utc::now(),
    };
    // The store rejects overlaps atomically with the insert
    if !state.bookings.insert_booking(&booking).await? {
        return Err(ApiError::BadRequest(ALREADY_BOOKED.to_string()));
    }

    tracing::info!(
        "Student {} booked teacher {} ({})",
        booking.student_id,
        booking.teacher_id,
        booking.id
    );

    Ok(HttpResponse::Created().json(BookingResponse {
        success: true,
        message: "Teacher booked successfully".to_string(),
        booking,
    }))
}

/// GET /api/v1/bookings/check?teacherId=
async fn check_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    params: web::Query<CheckBookingParams>,
) -> Result<HttpResponse, ApiError> {
    let is_booked = state
        .bookings
        .bookings_between(&user.claims().id, params.teacher_id)
        .await?
        .iter()
        .any(|b| b.status != BookingStatus::Canceled);

    Ok(HttpResponse::Ok().json(BookingCheckResponse {
        success: true,
        is_booked,
    }))
}

/// Attach the teacher summary to each booking
async fn with_teachers(
    state: &AppState,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingView>, ApiError> {
    let mut views = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let teacher = state
            .profiles
            .get(booking.teacher_id)
            .await?
            .as_ref()
            .map(TeacherSummary::from);
        views.push(BookingView { booking, teacher });
    }
    Ok(views)
}

/// GET /api/v1/bookings/student
async fn student_bookings(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let bookings = state.bookings.bookings_for_student(&user.claims().id).await?;

    Ok(HttpResponse::Ok().json(BookingListResponse {
        success: true,
        bookings: with_teachers(&state, bookings).await?,
    }))
}

/// A teacher account's id is the id of its teacher form
fn teacher_id_of(user: &AuthenticatedUser) -> Result<Uuid, ApiError> {
    let claims = user.require_role(Role::Teacher)?;
    Uuid::parse_str(&claims.id)
        .map_err(|_| ApiError::BadRequest("Teacher id must be a valid UUID".to_string()))
}

/// GET /api/v1/bookings/teacher
async fn teacher_bookings(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let teacher_id = teacher_id_of(&user)?;
    let bookings = state.bookings.bookings_for_teacher(teacher_id).await?;

    Ok(HttpResponse::Ok().json(BookingListResponse {
        success: true,
        bookings: with_teachers(&state, bookings).await?,
    }))
}

async fn decide(
    state: &AppState,
    user: &AuthenticatedUser,
    booking_id: Uuid,
    decision: Decision,
) -> Result<HttpResponse, ApiError> {
    let claims = user.require_role(Role::Teacher)?;

    let booking = state
        .bookings
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    if booking.teacher_id.to_string() != claims.id {
        return Err(ApiError::Forbidden(format!(
            "You are not allowed to {} this booking",
            match decision {
                Decision::Accept => "accept",
                Decision::Reject => "reject",
            }
        )));
    }

    let status = apply_decision(booking.status, decision)?;

    // Only succeeds if nobody decided on the booking since it was read
    let booking = state
        .bookings
        .set_booking_status(booking_id, booking.status, status)
        .await?
        .ok_or(ScheduleError::NotPending(decision.past_tense()))?;

    tracing::info!(
        "Booking {} {}, status now {}",
        booking.id,
        decision.past_tense(),
        booking.status.as_str()
    );

    Ok(HttpResponse::Ok().json(BookingResponse {
        success: true,
        message: format!("Booking {}", decision.past_tense()),
        booking,
    }))
}

/// PUT /api/v1/bookings/accept/{id}
async fn accept_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    decide(&state, &user, path.into_inner(), Decision::Accept).await
}

/// PUT /api/v1/bookings/reject/{id}
async fn reject_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    decide(&state, &user, path.into_inner(), Decision::Reject).await
}
