use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::models::BookingStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Invalid time '{0}'. Use HH:MM or hh:mm AM/PM.")]
    InvalidTime(String),

    #[error("Booking end must not be before its start")]
    EndBeforeStart,

    #[error("Only pending bookings can be {0}")]
    NotPending(&'static str),
}

/// Wall-clock time of day, minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Accepts 24-hour `HH:MM` and 12-hour `hh:mm AM/PM` (case-insensitive)
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidTime(raw.to_string());
        let trimmed = raw.trim();

        let (clock, meridiem) = match trimmed.rsplit_once(' ') {
            Some((clock, suffix)) => (clock.trim(), Some(suffix.to_ascii_uppercase())),
            None => (trimmed, None),
        };

        let (hour, minute) = clock.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;

        let hour = match meridiem.as_deref() {
            None => hour,
            Some(suffix) => {
                if !(1..=12).contains(&hour) {
                    return Err(invalid());
                }
                match suffix {
                    "AM" => hour % 12,
                    "PM" => hour % 12 + 12,
                    _ => return Err(invalid()),
                }
            }
        };

        Self::new(hour, minute).ok_or_else(invalid)
    }

    /// `hh:mm AM/PM`, zero-padded
    pub fn to_12_hour(&self) -> String {
        let suffix = if self.hour >= 12 { "PM" } else { "AM" };
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{:02}:{:02} {}", hour, self.minute, suffix)
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_12_hour())
    }
}

/// Resolved start/end instants of a booking request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl BookingWindow {
    pub fn new(
        start_date: NaiveDate,
        start_time: &str,
        end_date: NaiveDate,
        end_time: &str,
    ) -> Result<Self, ScheduleError> {
        let start_time = ClockTime::parse(start_time)?;
        let end_time = ClockTime::parse(end_time)?;

        let start_at = start_date.and_time(start_time.to_naive_time()).and_utc();
        let end_at = end_date.and_time(end_time.to_naive_time()).and_utc();

        if end_at < start_at {
            return Err(ScheduleError::EndBeforeStart);
        }

        Ok(Self {
            start_at,
            end_at,
            start_time,
            end_time,
        })
    }
}

/// Closed-interval overlap; touching endpoints count as overlapping
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// A teacher's answer to a pending booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Decision::Accept => "accepted",
            Decision::Reject => "rejected",
        }
    }
}

/// Next status of a booking after a teacher decision
pub fn apply_decision(
    status: BookingStatus,
    decision: Decision,
) -> Result<BookingStatus, ScheduleError> {
    if status != BookingStatus::Pending {
        return Err(ScheduleError::NotPending(decision.past_tense()));
    }

    Ok(match decision {
        Decision::Accept => BookingStatus::Confirmed,
        Decision::Reject => BookingStatus::Canceled,
    })
}
