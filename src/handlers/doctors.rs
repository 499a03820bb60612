use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::check_auth;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Doctor, EducationItem, ExperienceItem, Slot};
use crate::services::availability;
use crate::state::AppState;

// GET /api/doctors
#[derive(Deserialize)]
pub struct DoctorsQuery {
    pub specialty: Option<String>,
    pub q: Option<String>,
}

pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DoctorsQuery>, QueryRejection>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let Query(query) = query?;
    let specialty = query.specialty.as_deref().filter(|s| !s.trim().is_empty());
    let search = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let doctors = {
        let db = state.conn()?;
        queries::list_doctors(&db, specialty, search)?
    };
    Ok(Json(doctors))
}

// GET /api/doctors/:id
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    let db = state.conn()?;
    queries::get_doctor(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("doctor {id}")))
}

// POST /api/doctors
#[derive(Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: Option<String>,
    pub specialty: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub consultation_fee: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
}

pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CreateDoctorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let Json(body) = payload?;

    if body.name.trim().is_empty() || body.specialty.trim().is_empty() {
        return Err(AppError::validation("name and specialty are required"));
    }
    if body.consultation_fee < 0.0 || !(0.0..=5.0).contains(&body.rating) || body.review_count < 0 {
        return Err(AppError::validation(
            "consultation_fee and review_count must be non-negative, rating between 0 and 5",
        ));
    }

    let doctor = Doctor {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        email: body.email,
        specialty: body.specialty.trim().to_string(),
        bio: body.bio,
        image_url: body.image_url,
        languages: body.languages,
        education: body.education,
        experience: body.experience,
        consultation_fee: body.consultation_fee,
        rating: body.rating,
        review_count: body.review_count,
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.conn()?;
        queries::create_doctor(&db, &doctor)?;
    }

    tracing::info!(doctor_id = %doctor.id, specialty = %doctor.specialty, "doctor added");
    Ok((StatusCode::CREATED, Json(doctor)))
}

// GET /api/doctors/:id/available-slots?date=YYYY-MM-DD
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub only_available: bool,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<SlotsQuery>, QueryRejection>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let Query(query) = query?;

    let mut slots = {
        let db = state.conn()?;
        if !queries::doctor_exists(&db, &id)? {
            return Err(AppError::NotFound(format!("doctor {id}")));
        }
        availability::get_available_slots(&*db, &id, query.date, state.config.slot_duration())?
    };

    if query.only_available {
        slots.retain(|s| s.is_available);
    }
    Ok(Json(slots))
}
