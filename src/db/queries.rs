use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};

use crate::models::clock::{format_clock, parse_clock};
use crate::models::{
    Appointment, AppointmentDetails, AppointmentStatus, AppointmentType, Doctor, DoctorSummary,
    Interval, PatientInfo, WorkingHours,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

const APPOINTMENT_COLUMNS: &str = "id, doctor_id, patient_id, patient_name, patient_email, patient_phone, \
     date, start_time, end_time, type, status, notes, created_at, updated_at";

/// `APPOINTMENT_COLUMNS` qualified for the `appointments a JOIN doctors d`
/// read path, followed by the doctor's name and email.
const APPOINTMENT_DETAIL_COLUMNS: &str = "a.id, a.doctor_id, a.patient_id, a.patient_name, \
     a.patient_email, a.patient_phone, a.date, a.start_time, a.end_time, a.type, a.status, \
     a.notes, a.created_at, a.updated_at, d.name, d.email";

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("invalid stored date: {s}"))
}

// ── Doctors ──

const DOCTOR_COLUMNS: &str = "id, name, email, specialty, bio, image_url, languages, education, experience, \
     consultation_fee, rating, review_count, created_at";

pub fn create_doctor(conn: &Connection, doctor: &Doctor) -> anyhow::Result<()> {
    let languages = serde_json::to_string(&doctor.languages)?;
    let education = serde_json::to_string(&doctor.education)?;
    let experience = serde_json::to_string(&doctor.experience)?;
    conn.execute(
        &format!(
            "INSERT INTO doctors ({DOCTOR_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            doctor.id,
            doctor.name,
            doctor.email,
            doctor.specialty,
            doctor.bio,
            doctor.image_url,
            languages,
            education,
            experience,
            doctor.consultation_fee,
            doctor.rating,
            doctor.review_count,
            format_timestamp(&doctor.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &str) -> anyhow::Result<Option<Doctor>> {
    let result = conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
        params![id],
        |row| Ok(parse_doctor_row(row)),
    );

    match result {
        Ok(doctor) => Ok(Some(doctor?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn doctor_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM doctors WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Wraps `term` for a `LIKE ... ESCAPE '\'` substring match, so `%` and `_`
/// typed by a user match literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// `search` matches name or specialty, case-insensitively.
pub fn list_doctors(
    conn: &Connection,
    specialty: Option<&str>,
    search: Option<&str>,
) -> anyhow::Result<Vec<Doctor>> {
    let mut sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE 1 = 1");
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

    if let Some(specialty) = specialty {
        params_vec.push(Box::new(specialty.to_string()));
        sql.push_str(&format!(" AND specialty = ?{} COLLATE NOCASE", params_vec.len()));
    }
    if let Some(search) = search {
        params_vec.push(Box::new(like_pattern(&search.to_lowercase())));
        let n = params_vec.len();
        sql.push_str(&format!(
            " AND (lower(name) LIKE ?{n} ESCAPE '\\' OR lower(specialty) LIKE ?{n} ESCAPE '\\')"
        ));
    }
    sql.push_str(" ORDER BY name ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_doctor_row(row)))?;

    let mut doctors = vec![];
    for row in rows {
        doctors.push(row??);
    }
    Ok(doctors)
}

fn parse_json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
    column: &str,
) -> anyhow::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).with_context(|| format!("invalid stored {column}: {raw}"))
}

fn parse_doctor_row(row: &rusqlite::Row) -> anyhow::Result<Doctor> {
    let created_at_str: String = row.get(12)?;

    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        specialty: row.get(3)?,
        bio: row.get(4)?,
        image_url: row.get(5)?,
        languages: parse_json_column(row, 6, "languages")?,
        education: parse_json_column(row, 7, "education")?,
        experience: parse_json_column(row, 8, "experience")?,
        consultation_fee: row.get(9)?,
        rating: row.get(10)?,
        review_count: row.get(11)?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

// ── Working Hours ──

pub fn create_working_hours(conn: &Connection, hours: &WorkingHours) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO working_hours (id, doctor_id, weekday, start_time, end_time)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            hours.id,
            hours.doctor_id,
            hours.weekday,
            format_clock(&hours.start_time),
            format_clock(&hours.end_time),
        ],
    )?;
    Ok(())
}

pub fn get_working_hours(
    conn: &Connection,
    doctor_id: &str,
    weekday: Option<u8>,
) -> anyhow::Result<Vec<WorkingHours>> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, weekday, start_time, end_time
         FROM working_hours
         WHERE doctor_id = ?1 AND (?2 IS NULL OR weekday = ?2)
         ORDER BY weekday ASC, start_time ASC",
    )?;

    let rows = stmt.query_map(params![doctor_id, weekday], |row| {
        Ok(parse_working_hours_row(row))
    })?;

    let mut hours = vec![];
    for row in rows {
        hours.push(row??);
    }
    Ok(hours)
}

fn parse_working_hours_row(row: &rusqlite::Row) -> anyhow::Result<WorkingHours> {
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    Ok(WorkingHours {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        weekday: row.get(2)?,
        start_time: parse_clock(&start)?,
        end_time: parse_clock(&end)?,
    })
}

// ── Appointments ──

pub fn create_appointment(conn: &Connection, appt: &Appointment) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            appt.id,
            appt.doctor_id,
            appt.patient.patient_id,
            appt.patient.name,
            appt.patient.email,
            appt.patient.phone,
            format_date(&appt.date),
            format_timestamp(&appt.start_time),
            format_timestamp(&appt.end_time),
            appt.appointment_type.as_str(),
            appt.status.as_str(),
            appt.notes,
            format_timestamp(&appt.created_at),
            format_timestamp(&appt.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appt) => Ok(Some(appt?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_appointment_details(
    conn: &Connection,
    id: &str,
) -> anyhow::Result<Option<AppointmentDetails>> {
    let result = conn.query_row(
        &format!(
            "SELECT {APPOINTMENT_DETAIL_COLUMNS}
             FROM appointments a JOIN doctors d ON d.id = a.doctor_id
             WHERE a.id = ?1"
        ),
        params![id],
        |row| Ok(parse_appointment_details_row(row)),
    );

    match result {
        Ok(details) => Ok(Some(details?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Scheduled appointments of `doctor_id` on `date` intersecting the half-open
/// `interval`. Timestamps are stored in a lexically ordered format, so the
/// comparison runs in SQL.
pub fn find_scheduled_overlapping(
    conn: &Connection,
    doctor_id: &str,
    date: &NaiveDate,
    interval: &Interval,
    exclude_id: Option<&str>,
) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE doctor_id = ?1
           AND date = ?2
           AND status = 'SCHEDULED'
           AND start_time < ?4
           AND ?3 < end_time
           AND (?5 IS NULL OR id != ?5)
         ORDER BY start_time ASC"
    ))?;

    let rows = stmt.query_map(
        params![
            doctor_id,
            format_date(date),
            format_timestamp(&interval.start),
            format_timestamp(&interval.end),
            exclude_id,
        ],
        |row| Ok(parse_appointment_row(row)),
    )?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub date: Option<NaiveDate>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> anyhow::Result<Vec<AppointmentDetails>> {
    let mut sql = format!(
        "SELECT {APPOINTMENT_DETAIL_COLUMNS}
         FROM appointments a JOIN doctors d ON d.id = a.doctor_id
         WHERE 1 = 1"
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

    let mut push = |column: &str, value: Box<dyn ToSql>, sql: &mut String| {
        params_vec.push(value);
        sql.push_str(&format!(" AND a.{column} = ?{}", params_vec.len()));
    };

    if let Some(status) = filter.status {
        push("status", Box::new(status.as_str()), &mut sql);
    }
    if let Some(kind) = filter.appointment_type {
        push("type", Box::new(kind.as_str()), &mut sql);
    }
    if let Some(date) = filter.date {
        push("date", Box::new(format_date(&date)), &mut sql);
    }
    if let Some(doctor_id) = &filter.doctor_id {
        push("doctor_id", Box::new(doctor_id.clone()), &mut sql);
    }
    if let Some(patient_id) = &filter.patient_id {
        push("patient_id", Box::new(patient_id.clone()), &mut sql);
    }
    sql.push_str(" ORDER BY a.start_time ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok(parse_appointment_details_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn update_appointment(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
    notes: Option<&str>,
    updated_at: &NaiveDateTime,
) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET status = ?1, notes = ?2, updated_at = ?3 WHERE id = ?4",
        params![status.as_str(), notes, format_timestamp(updated_at), id],
    )?;
    Ok(count > 0)
}

pub fn delete_appointment(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let date_str: String = row.get(6)?;
    let start_str: String = row.get(7)?;
    let end_str: String = row.get(8)?;
    let type_str: String = row.get(9)?;
    let status_str: String = row.get(10)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    Ok(Appointment {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient: PatientInfo {
            patient_id: row.get(2)?,
            name: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
        },
        date: parse_date(&date_str)?,
        start_time: parse_timestamp(&start_str)?,
        end_time: parse_timestamp(&end_str)?,
        appointment_type: AppointmentType::parse(&type_str)
            .with_context(|| format!("unknown stored appointment type: {type_str}"))?,
        status: AppointmentStatus::parse(&status_str)
            .with_context(|| format!("unknown stored appointment status: {status_str}"))?,
        notes: row.get(11)?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn parse_appointment_details_row(row: &rusqlite::Row) -> anyhow::Result<AppointmentDetails> {
    Ok(AppointmentDetails {
        appointment: parse_appointment_row(row)?,
        doctor: DoctorSummary {
            name: row.get(14)?,
            email: row.get(15)?,
        },
    })
}
