use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Longest bookable slot; matches the DTO duration range
pub const MAX_APPOINTMENT_MINUTES: i32 = 480;

pub const APPOINTMENT_COLUMNS: &str = "id, organization_id, clinic_id, patient_id, dentist_id, \
     start_time, duration_minutes, appointment_type, status, notes, created_by, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Whether the front desk may move an appointment from `self` to `next`
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        matches!(
            (self, next),
            (Scheduled, Confirmed | InProgress | Cancelled | NoShow)
                | (Confirmed, InProgress | Cancelled | NoShow)
                | (InProgress, Completed)
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        end_time(self.start_time, self.duration_minutes)
    }
}

pub fn end_time(start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    start + Duration::minutes(i64::from(duration_minutes))
}

/// Half-open interval overlap: back-to-back slots do not collide
pub fn slots_overlap(
    a_start: DateTime<Utc>,
    a_minutes: i32,
    b_start: DateTime<Utc>,
    b_minutes: i32,
) -> bool {
    a_start < end_time(b_start, b_minutes) && b_start < end_time(a_start, a_minutes)
}

/// A live appointment already holding part of a dentist's day
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct BookedSlot {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// First booked slot colliding with the requested one
pub fn find_clash(
    booked: &[BookedSlot],
    start: DateTime<Utc>,
    duration_minutes: i32,
) -> Option<&BookedSlot> {
    booked
        .iter()
        .find(|slot| slots_overlap(slot.start_time, slot.duration_minutes, start, duration_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use AppointmentStatus::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(Scheduled.can_transition_to(Confirmed));
        assert!(Scheduled.can_transition_to(InProgress));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(InProgress));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Scheduled));
        assert!(!InProgress.can_transition_to(Cancelled));
        assert!(!Scheduled.can_transition_to(Scheduled));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let all = [Scheduled, Confirmed, InProgress, Completed, Cancelled, NoShow];
        for from in [Completed, Cancelled, NoShow] {
            assert!(from.is_terminal());
            for to in all {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    fn booked(hour: u32, minute: u32, minutes: i32) -> BookedSlot {
        BookedSlot {
            id: Uuid::new_v4(),
            start_time: at(hour, minute),
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_overlap() {
        assert!(slots_overlap(at(10, 0), 30, at(10, 15), 30));
        assert!(slots_overlap(at(10, 0), 60, at(10, 15), 15));
        assert!(!slots_overlap(at(10, 0), 30, at(10, 30), 30));
        assert!(!slots_overlap(at(11, 0), 30, at(10, 0), 60));
    }

    #[test]
    fn test_back_to_back_bookings_are_free() {
        let day = [booked(9, 0, 30), booked(10, 0, 60)];
        assert_eq!(find_clash(&day, at(9, 30), 30), None);
        assert_eq!(find_clash(&day, at(11, 0), 45), None);
        assert_eq!(find_clash(&day, at(8, 30), 30), None);
    }

    #[test]
    fn test_overlapping_booking_reports_clash() {
        let day = [booked(9, 0, 30), booked(10, 0, 60)];
        assert_eq!(find_clash(&day, at(10, 45), 30), Some(&day[1]));
        assert_eq!(find_clash(&day, at(8, 45), 30), Some(&day[0]));
        // a long slot swallowing a short one
        assert_eq!(find_clash(&day, at(8, 0), 180), Some(&day[0]));
    }

    #[test]
    fn test_longest_slot_reaches_back_one_window() {
        // the candidate query looks back MAX_APPOINTMENT_MINUTES from the new start
        let long = booked(2, 0, MAX_APPOINTMENT_MINUTES);
        assert!(find_clash(&[long], at(9, 59), 15).is_some());
        assert!(find_clash(&[long], at(10, 0), 15).is_none());
    }
}
