use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::doctor::DoctorSummary;
use super::working_hours::Interval;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    #[serde(flatten)]
    pub patient: PatientInfo,
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn blocks_slot(&self) -> bool {
        self.status.blocks_slot()
    }
}

/// Read model for appointment lookups: the stored row plus who it is with.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: DoctorSummary,
}

/// Whoever the appointment is for. Either an opaque patient reference or the
/// free-text contact details typed into the booking form, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientInfo {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default, rename = "patient_name")]
    pub name: Option<String>,
    #[serde(default, rename = "patient_email")]
    pub email: Option<String>,
    #[serde(default, rename = "patient_phone")]
    pub phone: Option<String>,
}

impl PatientInfo {
    pub fn is_identified(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.patient_id) || present(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    Video,
    Phone,
    InPerson,
}

impl AppointmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Video => "VIDEO",
            AppointmentType::Phone => "PHONE",
            AppointmentType::InPerson => "IN_PERSON",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VIDEO" => Some(AppointmentType::Video),
            "PHONE" => Some(AppointmentType::Phone),
            "IN_PERSON" => Some(AppointmentType::InPerson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Rescheduled => "RESCHEDULED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Some(AppointmentStatus::Scheduled),
            "COMPLETED" => Some(AppointmentStatus::Completed),
            "CANCELLED" => Some(AppointmentStatus::Cancelled),
            "RESCHEDULED" => Some(AppointmentStatus::Rescheduled),
            _ => None,
        }
    }

    /// Only scheduled appointments hold their interval. A rescheduled one has
    /// handed it over to its replacement.
    pub fn blocks_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parse() {
        assert_eq!(AppointmentType::parse("VIDEO"), Some(AppointmentType::Video));
        assert_eq!(AppointmentType::parse("in_person"), Some(AppointmentType::InPerson));
        assert_eq!(AppointmentType::parse("HOME_VISIT"), None);
    }

    #[test]
    fn test_only_scheduled_blocks() {
        assert!(AppointmentStatus::Scheduled.blocks_slot());
        assert!(!AppointmentStatus::Completed.blocks_slot());
        assert!(!AppointmentStatus::Cancelled.blocks_slot());
        assert!(!AppointmentStatus::Rescheduled.blocks_slot());
    }

    #[test]
    fn test_patient_identity() {
        assert!(!PatientInfo::default().is_identified());
        assert!(PatientInfo {
            patient_id: Some("p-1".to_string()),
            ..Default::default()
        }
        .is_identified());
        assert!(!PatientInfo {
            name: Some("   ".to_string()),
            phone: Some("+15550001111".to_string()),
            ..Default::default()
        }
        .is_identified());
    }

    #[test]
    fn test_appointment_serializes_flat_patient_fields() {
        let appt = Appointment {
            id: "a-1".to_string(),
            doctor_id: "d-1".to_string(),
            patient: PatientInfo {
                name: Some("Ada".to_string()),
                ..Default::default()
            },
            date: NaiveDate::from_ymd_opt(2030, 6, 17).unwrap(),
            start_time: NaiveDate::from_ymd_opt(2030, 6, 17).unwrap().and_hms_opt(9, 30, 0).unwrap(),
            end_time: NaiveDate::from_ymd_opt(2030, 6, 17).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            appointment_type: AppointmentType::InPerson,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            updated_at: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["patient_name"], "Ada");
        assert_eq!(json["type"], "IN_PERSON");
        assert_eq!(json["status"], "SCHEDULED");
        assert_eq!(json["date"], "2030-06-17");
    }
}
