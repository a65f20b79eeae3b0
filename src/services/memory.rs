use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::core::{filters::ProfileFilter, schedule::intervals_overlap};
use crate::models::{Booking, BookingStatus, SubjectOffered, TeacherProfile};
use crate::services::store::{BookingStore, StoreError, TeacherProfileStore};

/// In-process store for tests and local development
///
/// Profiles keep insertion order, which is the order `find` returns.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: RwLock<Vec<TeacherProfile>>,
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<TeacherProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
            bookings: RwLock::new(Vec::new()),
        }
    }

    /// Load profiles from a JSON array file
    ///
    /// Every profile must validate; subjects are lowercased as on the
    /// create path.
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let seed_error = |e: &dyn std::fmt::Display| {
            StoreError::SeedError(format!("{}: {}", path.display(), e))
        };

        let raw = std::fs::read_to_string(path).map_err(|e| seed_error(&e))?;
        let mut profiles: Vec<TeacherProfile> =
            serde_json::from_str(&raw).map_err(|e| seed_error(&e))?;

        for profile in &mut profiles {
            profile
                .validate()
                .map_err(|e| seed_error(&format!("profile {}: {}", profile.id, e)))?;

            profile.subjects_offered = std::mem::take(&mut profile.subjects_offered)
                .into_iter()
                .map(SubjectOffered::normalized)
                .collect();
        }

        tracing::info!("Loaded {} teacher profiles from {}", profiles.len(), path.display());
        Ok(Self::with_profiles(profiles))
    }
}

fn sorted_by_start(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by_key(|b| b.start_at);
    bookings
}

#[async_trait]
impl TeacherProfileStore for MemoryStore {
    async fn find(&self, filter: &ProfileFilter) -> Result<Vec<TeacherProfile>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .iter()
            .filter(|profile| filter.matches(profile))
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TeacherProfile>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, profile: &TeacherProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;

        if profiles.iter().any(|p| p.id == profile.id) {
            return Err(StoreError::Conflict(format!("teacher form {} already exists", profile.id)));
        }
        if profiles.iter().any(|p| p.phone_number == profile.phone_number) {
            return Err(StoreError::Conflict(format!(
                "phone number {} is already registered",
                profile.phone_number
            )));
        }

        profiles.push(profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &TeacherProfile) -> Result<bool, StoreError> {
        let mut profiles = self.profiles.write().await;

        if profiles
            .iter()
            .any(|p| p.id != profile.id && p.phone_number == profile.phone_number)
        {
            return Err(StoreError::Conflict(format!(
                "phone number {} is already registered",
                profile.phone_number
            )));
        }

        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        let removed = profiles.len() != before;
        drop(profiles);

        if removed {
            self.bookings.write().await.retain(|b| b.teacher_id != id);
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_booking(&self, booking: &Booking) -> Result<bool, StoreError> {
        let mut bookings = self.bookings.write().await;
        if bookings.iter().any(|b| b.id == booking.id) {
            return Err(StoreError::Conflict(format!("booking {} already exists", booking.id)));
        }

        let overlapping = bookings.iter().any(|b| {
            b.student_id == booking.student_id
                && b.teacher_id == booking.teacher_id
                && b.status != BookingStatus::Canceled
                && intervals_overlap(b.start_at, b.end_at, booking.start_at, booking.end_at)
        });
        if overlapping {
            return Ok(false);
        }

        bookings.push(booking.clone());
        Ok(true)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.bookings.write().await;

        Ok(bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == from)
            .map(|booking| {
                booking.status = to;
                booking.clone()
            }))
    }

    async fn bookings_for_student(&self, student_id: &str) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(sorted_by_start(
            bookings
                .iter()
                .filter(|b| b.student_id == student_id)
                .cloned()
                .collect(),
        ))
    }

    async fn bookings_for_teacher(&self, teacher_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(sorted_by_start(
            bookings
                .iter()
                .filter(|b| b.teacher_id == teacher_id)
                .cloned()
                .collect(),
        ))
    }

    async fn bookings_between(
        &self,
        student_id: &str,
        teacher_id: Uuid,
    ) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(sorted_by_start(
            bookings
                .iter()
                .filter(|b| b.student_id == student_id && b.teacher_id == teacher_id)
                .cloned()
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::SubjectMatch;
    use crate::models::{Coordinate, SubjectOffered};
    use chrono::{Duration, Utc};

    fn create_profile(phone: &str, subject: &str) -> TeacherProfile {
        TeacherProfile {
            id: Uuid::new_v4(),
            fullname: format!("teacher {}", phone),
            location: Coordinate::new(27.7, 85.3),
            degree: "bsc".to_string(),
            phone_number: phone.to_string(),
            about_me: "about".to_string(),
            education_information: vec![],
            subjects_offered: vec![SubjectOffered {
                level: 5,
                subject: subject.to_string(),
                price: 10.0,
            }],
            general_availability: vec![],
            profile_picture: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn create_booking(student: &str, teacher_id: Uuid, offset_hours: i64) -> Booking {
        let start_at = Utc::now() + Duration::hours(offset_hours);
        Booking {
            id: Uuid::new_v4(),
            student_id: student.to_string(),
            teacher_id,
            start_at,
            end_at: start_at + Duration::hours(1),
            start_time: "10:00 AM".to_string(),
            end_time: "11:00 AM".to_string(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = MemoryStore::new();
        for (phone, subject) in [("1", "math"), ("2", "art"), ("3", "math")] {
            store.insert(&create_profile(phone, subject)).await.unwrap();
        }

        let filter = ProfileFilter::ElemMatch(SubjectMatch {
            subject: Some("math".to_string()),
            ..SubjectMatch::default()
        });
        let found = store.find(&filter).await.unwrap();
        let phones: Vec<_> = found.iter().map(|p| p.phone_number.as_str()).collect();

        assert_eq!(phones, vec!["1", "3"]);
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_phone_conflicts() {
        let store = MemoryStore::new();
        store.insert(&create_profile("1", "math")).await.unwrap();

        let result = store.insert(&create_profile("1", "art")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_bookings() {
        let profile = create_profile("1", "math");
        let store = MemoryStore::with_profiles(vec![profile.clone()]);
        store
            .insert_booking(&create_booking("student-1", profile.id, 1))
            .await
            .unwrap();

        assert!(store.delete(profile.id).await.unwrap());
        assert!(!store.delete(profile.id).await.unwrap());
        assert!(store.bookings_for_student("student-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_queries() {
        let store = MemoryStore::new();
        let teacher = Uuid::new_v4();
        let later = create_booking("student-1", teacher, 5);
        let earlier = create_booking("student-1", teacher, 1);
        let other = create_booking("student-2", Uuid::new_v4(), 2);

        for booking in [&later, &earlier, &other] {
            store.insert_booking(booking).await.unwrap();
        }

        let mine = store.bookings_for_student("student-1").await.unwrap();
        assert_eq!(mine[0].id, earlier.id);
        assert_eq!(mine[1].id, later.id);

        assert_eq!(store.bookings_for_teacher(teacher).await.unwrap().len(), 2);
        assert_eq!(store.bookings_between("student-2", teacher).await.unwrap().len(), 0);

        let updated = store
            .set_booking_status(earlier.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);

        let missing = store
            .set_booking_status(Uuid::new_v4(), BookingStatus::Pending, BookingStatus::Canceled)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_status_change_requires_expected_status() {
        let store = MemoryStore::new();
        let booking = create_booking("student-1", Uuid::new_v4(), 1);
        store.insert_booking(&booking).await.unwrap();

        let accepted = store
            .set_booking_status(booking.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap();
        let rejected = store
            .set_booking_status(booking.id, BookingStatus::Pending, BookingStatus::Canceled)
            .await
            .unwrap();

        assert!(accepted.is_some());
        assert!(rejected.is_none());
        let stored = store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_overlapping_booking_not_inserted() {
        let store = MemoryStore::new();
        let teacher = Uuid::new_v4();
        let first = create_booking("student-1", teacher, 1);

        let mut overlapping = create_booking("student-1", teacher, 1);
        overlapping.start_at = first.start_at + Duration::minutes(30);
        overlapping.end_at = first.end_at + Duration::minutes(30);

        assert!(store.insert_booking(&first).await.unwrap());
        assert!(!store.insert_booking(&overlapping).await.unwrap());

        // Another student, and a canceled booking, do not block the slot
        let mut other_student = overlapping.clone();
        other_student.id = Uuid::new_v4();
        other_student.student_id = "student-2".to_string();
        assert!(store.insert_booking(&other_student).await.unwrap());

        store
            .set_booking_status(first.id, BookingStatus::Pending, BookingStatus::Canceled)
            .await
            .unwrap();
        assert!(store.insert_booking(&overlapping).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_replaces_profile() {
        let original = create_profile("1", "math");
        let taken = create_profile("2", "art");
        let store = MemoryStore::with_profiles(vec![original.clone(), taken]);

        let mut edited = original.clone();
        edited.subjects_offered[0].subject = "science".to_string();
        assert!(store.update(&edited).await.unwrap());
        let stored = store.get(original.id).await.unwrap().unwrap();
        assert_eq!(stored.subjects_offered[0].subject, "science");

        let mut clash = edited.clone();
        clash.phone_number = "2".to_string();
        assert!(matches!(store.update(&clash).await, Err(StoreError::Conflict(_))));

        assert!(!store.update(&create_profile("3", "math")).await.unwrap());
    }

    fn write_seed(contents: &serde_json::Value) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("tutor-seed-{}.json", Uuid::new_v4()));
        std::fs::write(&path, contents.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_seed_file_is_normalized() {
        let seeded = create_profile("1", " Math");
        let path = write_seed(&serde_json::json!([seeded]));

        let store = MemoryStore::from_seed_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let filter = ProfileFilter::ElemMatch(SubjectMatch {
            subject: Some("math".to_string()),
            ..SubjectMatch::default()
        });
        assert_eq!(store.find(&filter).await.unwrap().len(), 1);
    }

    #[test]
    fn test_seed_file_rejects_invalid_profile() {
        let mut seeded = create_profile("1", "math");
        seeded.location = Coordinate::new(120.0, 85.3);
        let path = write_seed(&serde_json::json!([seeded]));

        let result = MemoryStore::from_seed_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(StoreError::SeedError(_))));
    }
}
