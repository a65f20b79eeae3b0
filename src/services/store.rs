use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::core::filters::ProfileFilter;
use crate::models::{Booking, BookingStatus, TeacherProfile};

/// Errors that can occur when reading or writing persistent data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Seed data error: {0}")]
    SeedError(String),
}

/// Read/write access to published teacher profiles
#[async_trait]
pub trait TeacherProfileStore: Send + Sync {
    /// Profiles satisfying `filter`, in a stable order
    async fn find(&self, filter: &ProfileFilter) -> Result<Vec<TeacherProfile>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<TeacherProfile>, StoreError>;

    /// Fails with `Conflict` on a duplicate id or phone number
    async fn insert(&self, profile: &TeacherProfile) -> Result<(), StoreError>;

    /// Replace a stored profile. Returns `false` when `profile.id` is unknown,
    /// `Conflict` when the phone number belongs to another profile.
    async fn update(&self, profile: &TeacherProfile) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<TeacherProfile>, StoreError> {
        self.find(&ProfileFilter::All).await
    }

    /// Returns whether a profile was removed
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Read/write access to bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert unless a non-canceled booking of the same student and teacher
    /// overlaps it; returns whether the booking was stored
    async fn insert_booking(&self, booking: &Booking) -> Result<bool, StoreError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Move a booking from `from` to `to` atomically. `None` when no booking
    /// with that id is currently in `from`.
    async fn set_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, StoreError>;

    /// Ordered by start
    async fn bookings_for_student(&self, student_id: &str) -> Result<Vec<Booking>, StoreError>;

    /// Ordered by start
    async fn bookings_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// Ordered by start
    async fn bookings_between(
        &self,
        student_id: &str,
        teacher_id: Uuid,
    ) -> Result<Vec<Booking>, StoreError>;
}
