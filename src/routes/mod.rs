// Route exports
pub mod admin;
pub mod bookings;
pub mod health;
pub mod search;
pub mod teacher_forms;

use actix_web::web;
use std::sync::Arc;

use crate::core::TeacherSearch;
use crate::services::{BookingStore, JwtVerifier, TeacherProfileStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn TeacherProfileStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub search: TeacherSearch,
    pub verifier: JwtVerifier,
}

impl AppState {
    pub fn new(
        profiles: Arc<dyn TeacherProfileStore>,
        bookings: Arc<dyn BookingStore>,
        verifier: JwtVerifier,
    ) -> Self {
        Self {
            search: TeacherSearch::new(profiles.clone()),
            profiles,
            bookings,
            verifier,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(search::configure)
            .configure(teacher_forms::configure)
            .configure(bookings::configure)
            .configure(admin::configure),
    );
}
