pub mod appointment;
pub mod clock;
pub mod doctor;
pub mod slot;
pub mod working_hours;

pub use appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, AppointmentType, PatientInfo,
};
pub use doctor::{Doctor, DoctorSummary, EducationItem, ExperienceItem};
pub use slot::Slot;
pub use working_hours::{Interval, TimeRange, WorkingHours};
