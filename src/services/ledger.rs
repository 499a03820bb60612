use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Appointment, Interval, WorkingHours};

/// Read access to a doctor's weekly open hours.
pub trait WorkingHoursStore {
    /// Ranges for `weekday` (Sunday = 0), ordered by start time.
    fn working_hours(&self, doctor_id: &str, weekday: u8) -> anyhow::Result<Vec<WorkingHours>>;
}

/// The set of appointments already on a doctor's calendar.
pub trait BookingLedger {
    /// Scheduled appointments on `date` whose `[start, end)` intersects
    /// `interval`. Completed, cancelled and rescheduled ones never match.
    fn find_overlapping(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        interval: &Interval,
    ) -> anyhow::Result<Vec<Appointment>> {
        self.find_overlapping_excluding(doctor_id, date, interval, None)
    }

    /// Same as [`find_overlapping`](Self::find_overlapping) but ignores the
    /// appointment with id `exclude`.
    fn find_overlapping_excluding(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        interval: &Interval,
        exclude: Option<&str>,
    ) -> anyhow::Result<Vec<Appointment>>;

    /// Only atomic with a preceding overlap check when both run inside the
    /// same write transaction.
    fn insert(&self, appointment: &Appointment) -> Result<(), rusqlite::Error>;
}

impl WorkingHoursStore for Connection {
    fn working_hours(&self, doctor_id: &str, weekday: u8) -> anyhow::Result<Vec<WorkingHours>> {
        queries::get_working_hours(self, doctor_id, Some(weekday))
    }
}

impl BookingLedger for Connection {
    fn find_overlapping_excluding(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        interval: &Interval,
        exclude: Option<&str>,
    ) -> anyhow::Result<Vec<Appointment>> {
        queries::find_scheduled_overlapping(self, doctor_id, &date, interval, exclude)
    }

    fn insert(&self, appointment: &Appointment) -> Result<(), rusqlite::Error> {
        queries::create_appointment(self, appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{AppointmentStatus, AppointmentType, Doctor, PatientInfo, TimeRange};
    use chrono::NaiveTime;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        let now = chrono::Utc::now().naive_utc();
        queries::create_doctor(
            &conn,
            &Doctor {
                id: "doc-1".to_string(),
                name: "Dr. Grey".to_string(),
                email: None,
                specialty: "Cardiology".to_string(),
                bio: None,
                image_url: None,
                languages: vec![],
                education: vec![],
                experience: vec![],
                consultation_fee: 100.0,
                rating: 4.5,
                review_count: 10,
                created_at: now,
            },
        )
        .unwrap();
        conn
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 17).unwrap()
    }

    fn interval(start: &str, end: &str) -> Interval {
        TimeRange::new(
            NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        )
        .on(date())
    }

    fn appointment(id: &str, start: &str, end: &str, status: AppointmentStatus) -> Appointment {
        let span = interval(start, end);
        let now = chrono::Utc::now().naive_utc();
        Appointment {
            id: id.to_string(),
            doctor_id: "doc-1".to_string(),
            patient: PatientInfo {
                name: Some("Alice".to_string()),
                ..Default::default()
            },
            date: date(),
            start_time: span.start,
            end_time: span.end,
            appointment_type: AppointmentType::Video,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_finds_partial_overlap() {
        let conn = setup_db();
        conn.insert(&appointment("a-1", "09:30", "10:00", AppointmentStatus::Scheduled))
            .unwrap();

        let hits = conn.find_overlapping("doc-1", date(), &interval("09:45", "10:15")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a-1");
    }

    #[test]
    fn test_adjacent_is_not_overlap() {
        let conn = setup_db();
        conn.insert(&appointment("a-1", "09:30", "10:00", AppointmentStatus::Scheduled))
            .unwrap();

        assert!(conn
            .find_overlapping("doc-1", date(), &interval("10:00", "10:30"))
            .unwrap()
            .is_empty());
        assert!(conn
            .find_overlapping("doc-1", date(), &interval("09:00", "09:30"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_non_scheduled_statuses_do_not_block() {
        let conn = setup_db();
        conn.insert(&appointment("a-1", "09:00", "09:30", AppointmentStatus::Cancelled))
            .unwrap();
        conn.insert(&appointment("a-2", "09:00", "09:30", AppointmentStatus::Completed))
            .unwrap();
        conn.insert(&appointment("a-3", "09:00", "09:30", AppointmentStatus::Rescheduled))
            .unwrap();

        assert!(conn
            .find_overlapping("doc-1", date(), &interval("09:00", "09:30"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_other_dates_ignored() {
        let conn = setup_db();
        conn.insert(&appointment("a-1", "09:00", "09:30", AppointmentStatus::Scheduled))
            .unwrap();

        let next_day = date().succ_opt().unwrap();
        let span = TimeRange::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
        .on(next_day);
        assert!(conn.find_overlapping("doc-1", next_day, &span).unwrap().is_empty());
    }

    #[test]
    fn test_exclude_self() {
        let conn = setup_db();
        conn.insert(&appointment("a-1", "09:00", "09:30", AppointmentStatus::Scheduled))
            .unwrap();

        let hits = conn
            .find_overlapping_excluding("doc-1", date(), &interval("09:00", "09:30"), Some("a-1"))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_duplicate_scheduled_interval_rejected_by_schema() {
        let conn = setup_db();
        conn.insert(&appointment("a-1", "09:00", "09:30", AppointmentStatus::Scheduled))
            .unwrap();

        let err = conn
            .insert(&appointment("a-2", "09:00", "09:30", AppointmentStatus::Scheduled))
            .unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
    }
}
