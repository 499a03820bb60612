use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::booking::BookingPolicy;

/// The connection mutex is what serialises booking transactions inside one
/// process. Handlers must not hold it across an `.await`.
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            enforce_working_hours: self.config.enforce_working_hours,
        }
    }
}
