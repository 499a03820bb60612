use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/doctors",
            get(handlers::doctors::list_doctors).post(handlers::doctors::create_doctor),
        )
        .route("/api/doctors/:id", get(handlers::doctors::get_doctor))
        .route(
            "/api/doctors/:id/available-slots",
            get(handlers::doctors::available_slots),
        )
        .route(
            "/api/doctors/:id/working-hours",
            get(handlers::working_hours::list_working_hours)
                .post(handlers::working_hours::create_working_hours),
        )
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment)
                .patch(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        .route(
            "/api/appointments/:id/reschedule",
            post(handlers::appointments::reschedule_appointment),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
