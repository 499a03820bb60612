use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::check_auth;
use crate::db::queries::{self, AppointmentFilter};
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentDetails, AppointmentStatus, AppointmentType};
use crate::services::booking::{self, AppointmentUpdate, BookingRequest, RescheduleRequest};
use crate::state::AppState;

fn reject_past(date: NaiveDate) -> Result<(), AppError> {
    if date < Utc::now().date_naive() {
        return Err(AppError::validation("cannot book an appointment in the past"));
    }
    Ok(())
}

// GET /api/appointments
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

impl AppointmentsQuery {
    fn into_filter(self) -> Result<AppointmentFilter, AppError> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                AppointmentStatus::parse(s)
                    .ok_or_else(|| AppError::validation(format!("unrecognized status: {s}")))
            })
            .transpose()?;
        let appointment_type = self
            .appointment_type
            .as_deref()
            .map(|t| {
                AppointmentType::parse(t)
                    .ok_or_else(|| AppError::validation(format!("unrecognized appointment type: {t}")))
            })
            .transpose()?;

        Ok(AppointmentFilter {
            status,
            appointment_type,
            date: self.date,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
        })
    }
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<AppointmentsQuery>, QueryRejection>,
) -> Result<Json<Vec<AppointmentDetails>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let Query(query) = query?;
    let filter = query.into_filter()?;

    let appointments = {
        let db = state.conn()?;
        queries::list_appointments(&db, &filter)?
    };
    Ok(Json(appointments))
}

// POST /api/appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(body) = payload?;
    reject_past(body.date)?;

    let appointment = {
        let mut db = state.conn()?;
        booking::book(&mut db, body, state.booking_policy())?
    };
    Ok((StatusCode::CREATED, Json(appointment)))
}

// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentDetails>, AppError> {
    let db = state.conn()?;
    queries::get_appointment_details(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))
}

// PATCH /api/appointments/:id
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<AppointmentUpdate>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let Json(body) = payload?;

    let appointment = {
        let mut db = state.conn()?;
        booking::update_appointment(&mut db, &id, body)?
    };
    Ok(Json(appointment))
}

// POST /api/appointments/:id/reschedule
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<RescheduleRequest>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let Json(body) = payload?;
    reject_past(body.date)?;

    let appointment = {
        let mut db = state.conn()?;
        booking::reschedule(&mut db, &id, body, state.booking_policy())?
    };
    Ok(Json(appointment))
}

// DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let removed = {
        let db = state.conn()?;
        queries::delete_appointment(&db, &id)?
    };

    if removed {
        tracing::info!(appointment_id = %id, "appointment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("appointment {id}")))
    }
}
