use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::core::filters::ProfileFilter;
use crate::models::{
    Availability, Booking, BookingStatus, Coordinate, EducationInfo, SubjectOffered,
    TeacherProfile,
};
use crate::services::store::{BookingStore, StoreError, TeacherProfileStore};

/// Booking status as stored in the `booking_status` enum type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum PgBookingStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl From<BookingStatus> for PgBookingStatus {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Pending => PgBookingStatus::Pending,
            BookingStatus::Confirmed => PgBookingStatus::Confirmed,
            BookingStatus::Canceled => PgBookingStatus::Canceled,
        }
    }
}

impl From<PgBookingStatus> for BookingStatus {
    fn from(value: PgBookingStatus) -> Self {
        match value {
            PgBookingStatus::Pending => BookingStatus::Pending,
            PgBookingStatus::Confirmed => BookingStatus::Confirmed,
            PgBookingStatus::Canceled => BookingStatus::Canceled,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TeacherFormRow {
    id: Uuid,
    fullname: String,
    latitude: f64,
    longitude: f64,
    degree: String,
    phone_number: String,
    about_me: String,
    education_information: Json<Vec<EducationInfo>>,
    subjects_offered: Json<Vec<SubjectOffered>>,
    general_availability: Json<Vec<Availability>>,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeacherFormRow> for TeacherProfile {
    fn from(row: TeacherFormRow) -> Self {
        Self {
            id: row.id,
            fullname: row.fullname,
            location: Coordinate::new(row.latitude, row.longitude),
            degree: row.degree,
            phone_number: row.phone_number,
            about_me: row.about_me,
            education_information: row.education_information.0,
            subjects_offered: row.subjects_offered.0,
            general_availability: row.general_availability.0,
            profile_picture: row.profile_picture,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    student_id: String,
    teacher_id: Uuid,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    start_time: String,
    end_time: String,
    status: PgBookingStatus,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            teacher_id: row.teacher_id,
            start_at: row.start_at,
            end_at: row.end_at,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.into(),
            created_at: row.created_at,
        }
    }
}

const SELECT_TEACHER_FORMS: &str = r#"
    SELECT id, fullname, latitude, longitude, degree, phone_number, about_me,
           education_information, subjects_offered, general_availability,
           profile_picture, created_at, updated_at
    FROM teacher_forms
"#;

const SELECT_BOOKINGS: &str = r#"
    SELECT id, student_id, teacher_id, start_at, end_at, start_time, end_time,
           status, created_at
    FROM bookings
"#;

/// Map a unique-constraint violation to `Conflict`
fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{} already exists", what))
        }
        _ => StoreError::SqlxError(err),
    }
}

/// Append the single-element subject match as an `EXISTS` over the JSONB array
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProfileFilter) {
    let ProfileFilter::ElemMatch(condition) = filter else {
        return;
    };

    builder.push(
        " WHERE EXISTS (SELECT 1 FROM jsonb_array_elements(subjects_offered) AS s WHERE TRUE",
    );
    if let Some(level) = condition.level {
        builder
            .push(" AND (s->>'level')::int = ")
            .push_bind(i32::from(level));
    }
    if let Some(subject) = &condition.subject {
        builder.push(" AND s->>'subject' = ").push_bind(subject.clone());
    }
    if let Some(min_price) = condition.min_price {
        builder
            .push(" AND (s->>'price')::float8 >= ")
            .push_bind(min_price);
    }
    if let Some(max_price) = condition.max_price {
        builder
            .push(" AND (s->>'price')::float8 <= ")
            .push_bind(max_price);
    }
    builder.push(")");
}

/// PostgreSQL-backed store for teacher forms and bookings
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections
        );

        Self::new(
            &settings.url,
            settings.max_connections,
            settings.min_connections,
            Duration::from_secs(settings.acquire_timeout_secs),
            Duration::from_secs(settings.idle_timeout_secs),
        )
        .await
    }

    async fn fetch_bookings(
        &self,
        builder: &mut QueryBuilder<'_, Postgres>,
    ) -> Result<Vec<Booking>, StoreError> {
        builder.push(" ORDER BY start_at, id");
        let rows = builder
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

#[async_trait]
impl TeacherProfileStore for PostgresStore {
    async fn find(&self, filter: &ProfileFilter) -> Result<Vec<TeacherProfile>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_TEACHER_FORMS);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at, id");

        let rows = builder
            .build_query_as::<TeacherFormRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Profile query returned {} rows", rows.len());
        Ok(rows.into_iter().map(TeacherProfile::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TeacherProfile>, StoreError> {
        let query = format!("{} WHERE id = $1", SELECT_TEACHER_FORMS);
        let row = sqlx::query_as::<_, TeacherFormRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TeacherProfile::from))
    }

    async fn insert(&self, profile: &TeacherProfile) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO teacher_forms (
                id, fullname, latitude, longitude, degree, phone_number, about_me,
                education_information, subjects_offered, general_availability,
                profile_picture, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    COALESCE($12, NOW()), COALESCE($13, NOW()))
        "#;

        sqlx::query(query)
            .bind(profile.id)
            .bind(&profile.fullname)
            .bind(profile.location.latitude)
            .bind(profile.location.longitude)
            .bind(&profile.degree)
            .bind(&profile.phone_number)
            .bind(&profile.about_me)
            .bind(Json(&profile.education_information))
            .bind(Json(&profile.subjects_offered))
            .bind(Json(&profile.general_availability))
            .bind(&profile.profile_picture)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "teacher form"))?;

        tracing::debug!("Inserted teacher form {}", profile.id);
        Ok(())
    }

    async fn update(&self, profile: &TeacherProfile) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE teacher_forms SET
                fullname = $2, latitude = $3, longitude = $4, degree = $5,
                phone_number = $6, about_me = $7, education_information = $8,
                subjects_offered = $9, general_availability = $10,
                profile_picture = $11, updated_at = COALESCE($12, NOW())
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(profile.id)
            .bind(&profile.fullname)
            .bind(profile.location.latitude)
            .bind(profile.location.longitude)
            .bind(&profile.degree)
            .bind(&profile.phone_number)
            .bind(&profile.about_me)
            .bind(Json(&profile.education_information))
            .bind(Json(&profile.subjects_offered))
            .bind(Json(&profile.general_availability))
            .bind(&profile.profile_picture)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "phone number"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM teacher_forms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl BookingStore for PostgresStore {
    async fn insert_booking(&self, booking: &Booking) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serialise bookings of one student/teacher pair until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
            .bind(&booking.student_id)
            .bind(booking.teacher_id.to_string())
            .execute(&mut *tx)
            .await?;

        let query = r#"
            INSERT INTO bookings (
                id, student_id, teacher_id, start_at, end_at, start_time, end_time,
                status, created_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE student_id = $2
                  AND teacher_id = $3
                  AND status <> 'canceled'
                  AND start_at <= $5
                  AND end_at >= $4
            )
        "#;

        let result = sqlx::query(query)
            .bind(booking.id)
            .bind(&booking.student_id)
            .bind(booking.teacher_id)
            .bind(booking.start_at)
            .bind(booking.end_at)
            .bind(&booking.start_time)
            .bind(&booking.end_time)
            .bind(PgBookingStatus::from(booking.status))
            .bind(booking.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, "booking"))?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let query = format!("{} WHERE id = $1", SELECT_BOOKINGS);
        let row = sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Booking::from))
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, StoreError> {
        let query = r#"
            UPDATE bookings SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING id, student_id, teacher_id, start_at, end_at, start_time, end_time,
                      status, created_at
        "#;

        let row = sqlx::query_as::<_, BookingRow>(query)
            .bind(id)
            .bind(PgBookingStatus::from(from))
            .bind(PgBookingStatus::from(to))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Booking::from))
    }

    async fn bookings_for_student(&self, student_id: &str) -> Result<Vec<Booking>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_BOOKINGS);
        builder.push(" WHERE student_id = ").push_bind(student_id.to_string());
        self.fetch_bookings(&mut builder).await
    }

    async fn bookings_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_BOOKINGS);
        builder.push(" WHERE teacher_id = ").push_bind(teacher_id);
        self.fetch_bookings(&mut builder).await
    }

    async fn bookings_between(
        &self,
        student_id: &str,
        teacher_id: Uuid,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_BOOKINGS);
        builder
            .push(" WHERE student_id = ")
            .push_bind(student_id.to_string())
            .push(" AND teacher_id = ")
            .push_bind(teacher_id);
        self.fetch_bookings(&mut builder).await
    }
}
