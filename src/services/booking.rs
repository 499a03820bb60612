use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::clock::serde_clock;
use crate::models::{
    Appointment, AppointmentStatus, AppointmentType, PatientInfo, TimeRange,
};
use crate::services::availability::weekday_index;
use crate::services::ledger::{BookingLedger, WorkingHoursStore};

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub date: NaiveDate,
    #[serde(with = "serde_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_clock")]
    pub end_time: NaiveTime,
    #[serde(flatten)]
    pub patient: PatientInfo,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentUpdate {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
    #[serde(with = "serde_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_clock")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BookingPolicy {
    /// Reject intervals that do not sit inside one of the doctor's ranges.
    pub enforce_working_hours: bool,
}

fn validate_range(start: NaiveTime, end: NaiveTime) -> Result<TimeRange, AppError> {
    let range = TimeRange::new(start, end);
    if !range.is_chronological() {
        return Err(AppError::validation("start_time must be before end_time"));
    }
    Ok(range)
}

fn parse_type(raw: &str) -> Result<AppointmentType, AppError> {
    AppointmentType::parse(raw).ok_or_else(|| {
        AppError::validation(format!(
            "unrecognized appointment type: {raw} (expected VIDEO, PHONE or IN_PERSON)"
        ))
    })
}

fn ensure_within_working_hours<S>(
    store: &S,
    doctor_id: &str,
    date: NaiveDate,
    range: &TimeRange,
) -> Result<(), AppError>
where
    S: WorkingHoursStore + ?Sized,
{
    let hours = store.working_hours(doctor_id, weekday_index(date))?;
    if hours.iter().any(|h| h.range().contains(range)) {
        Ok(())
    } else {
        Err(AppError::validation(
            "requested time is outside the doctor's working hours",
        ))
    }
}

/// Overlap check followed by insert. Callers run this inside a write
/// transaction so nothing can commit between the two steps.
pub fn reserve<L>(ledger: &L, appointment: Appointment) -> Result<Appointment, AppError>
where
    L: BookingLedger + ?Sized,
{
    let conflicts = ledger.find_overlapping(
        &appointment.doctor_id,
        appointment.date,
        &appointment.interval(),
    )?;

    if let Some(existing) = conflicts.first() {
        tracing::warn!(
            doctor_id = %appointment.doctor_id,
            start = %appointment.start_time,
            conflicting_id = %existing.id,
            "slot already booked"
        );
        return Err(AppError::slot_taken());
    }

    ledger.insert(&appointment).map_err(AppError::from_insert)?;
    Ok(appointment)
}

/// Books a new appointment, or fails without writing anything.
///
/// The doctor lookup, the overlap check and the insert share one `IMMEDIATE`
/// transaction, so a second writer (another process on the same database
/// file) waits for the lock instead of interleaving.
pub fn book(
    conn: &mut Connection,
    request: BookingRequest,
    policy: BookingPolicy,
) -> Result<Appointment, AppError> {
    let range = validate_range(request.start_time, request.end_time)?;
    let appointment_type = parse_type(&request.appointment_type)?;
    if !request.patient.is_identified() {
        return Err(AppError::validation("patient_id or patient_name is required"));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if !queries::doctor_exists(&tx, &request.doctor_id)? {
        return Err(AppError::NotFound(format!("doctor {}", request.doctor_id)));
    }
    if policy.enforce_working_hours {
        ensure_within_working_hours(&*tx, &request.doctor_id, request.date, &range)?;
    }

    let interval = range.on(request.date);
    let now = Utc::now().naive_utc();
    let appointment = reserve(
        &*tx,
        Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            doctor_id: request.doctor_id,
            patient: request.patient,
            date: request.date,
            start_time: interval.start,
            end_time: interval.end,
            appointment_type,
            status: AppointmentStatus::Scheduled,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        },
    )?;

    tx.commit()?;

    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        start = %appointment.start_time,
        "appointment booked"
    );
    Ok(appointment)
}

/// Admin status/notes change. Moving an appointment back to `SCHEDULED`
/// re-checks its interval, since someone else may hold it by now.
pub fn update_appointment(
    conn: &mut Connection,
    id: &str,
    update: AppointmentUpdate,
) -> Result<Appointment, AppError> {
    let status = update
        .status
        .as_deref()
        .map(|s| {
            AppointmentStatus::parse(s)
                .ok_or_else(|| AppError::validation(format!("unrecognized status: {s}")))
        })
        .transpose()?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current = queries::get_appointment(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

    let new_status = status.unwrap_or(current.status);
    if new_status.blocks_slot() && !current.blocks_slot() {
        let taken = tx.find_overlapping_excluding(
            &current.doctor_id,
            current.date,
            &current.interval(),
            Some(id),
        )?;
        if !taken.is_empty() {
            return Err(AppError::slot_taken());
        }
    }

    let notes = update.notes.or_else(|| current.notes.clone());
    let now = Utc::now().naive_utc();
    queries::update_appointment(&tx, id, new_status, notes.as_deref(), &now)
        .map_err(AppError::from_insert)?;

    tx.commit()?;

    if new_status != current.status {
        tracing::info!(
            appointment_id = %id,
            from = current.status.as_str(),
            to = new_status.as_str(),
            "appointment status changed"
        );
    }

    Ok(Appointment {
        status: new_status,
        notes,
        updated_at: now,
        ..current
    })
}

/// Moves a scheduled appointment to a new interval. The original is marked
/// `RESCHEDULED` and a replacement carrying the same patient, type and notes
/// takes over; both writes commit together or not at all.
pub fn reschedule(
    conn: &mut Connection,
    id: &str,
    request: RescheduleRequest,
    policy: BookingPolicy,
) -> Result<Appointment, AppError> {
    let range = validate_range(request.start_time, request.end_time)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let original = queries::get_appointment(&tx, id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;
    if original.status != AppointmentStatus::Scheduled {
        return Err(AppError::Conflict(format!(
            "only scheduled appointments can be rescheduled (status is {})",
            original.status.as_str()
        )));
    }
    if policy.enforce_working_hours {
        ensure_within_working_hours(&*tx, &original.doctor_id, request.date, &range)?;
    }

    let now = Utc::now().naive_utc();
    queries::update_appointment(
        &tx,
        id,
        AppointmentStatus::Rescheduled,
        original.notes.as_deref(),
        &now,
    )?;

    let interval = range.on(request.date);
    let replacement = reserve(
        &*tx,
        Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            date: request.date,
            start_time: interval.start,
            end_time: interval.end,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
            ..original
        },
    )?;

    tx.commit()?;

    tracing::info!(
        appointment_id = %id,
        replacement_id = %replacement.id,
        start = %replacement.start_time,
        "appointment rescheduled"
    );
    Ok(replacement)
}
