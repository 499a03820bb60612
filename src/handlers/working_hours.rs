use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveTime;
use serde::Deserialize;

use super::check_auth;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::clock::serde_clock;
use crate::models::working_hours::validate_weekday;
use crate::models::WorkingHours;
use crate::state::AppState;

// GET /api/doctors/:id/working-hours
#[derive(Deserialize)]
pub struct WorkingHoursQuery {
    pub day: Option<i64>,
}

pub async fn list_working_hours(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    query: Result<Query<WorkingHoursQuery>, QueryRejection>,
) -> Result<Json<Vec<WorkingHours>>, AppError> {
    let Query(query) = query?;
    let weekday = query
        .day
        .map(validate_weekday)
        .transpose()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let db = state.conn()?;
    if !queries::doctor_exists(&db, &doctor_id)? {
        return Err(AppError::NotFound(format!("doctor {doctor_id}")));
    }
    Ok(Json(queries::get_working_hours(&db, &doctor_id, weekday)?))
}

// POST /api/doctors/:id/working-hours
#[derive(Deserialize)]
pub struct CreateWorkingHoursRequest {
    pub day: i64,
    #[serde(with = "serde_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_clock")]
    pub end_time: NaiveTime,
}

pub async fn create_working_hours(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(doctor_id): Path<String>,
    payload: Result<Json<CreateWorkingHoursRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkingHours>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let Json(body) = payload?;

    let weekday = validate_weekday(body.day).map_err(|e| AppError::validation(e.to_string()))?;
    if body.start_time >= body.end_time {
        return Err(AppError::validation("start_time must be before end_time"));
    }

    let hours = WorkingHours {
        id: uuid::Uuid::new_v4().to_string(),
        doctor_id,
        weekday,
        start_time: body.start_time,
        end_time: body.end_time,
    };

    {
        let db = state.conn()?;
        if !queries::doctor_exists(&db, &hours.doctor_id)? {
            return Err(AppError::NotFound(format!("doctor {}", hours.doctor_id)));
        }
        queries::create_working_hours(&db, &hours)?;
    }

    tracing::info!(
        doctor_id = %hours.doctor_id,
        weekday = hours.weekday,
        start = %hours.start_time,
        end = %hours.end_time,
        "working hours added"
    );
    Ok((StatusCode::CREATED, Json(hours)))
}
