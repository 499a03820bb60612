use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub slot_duration_minutes: i64,
    pub enforce_working_hours: bool,
}

pub const DEFAULT_SLOT_MINUTES: i64 = 30;
/// A slot never outlasts the day it starts in.
pub const MAX_SLOT_MINUTES: i64 = 24 * 60;

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "docbook.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            slot_duration_minutes: env::var("SLOT_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m| (1..=MAX_SLOT_MINUTES).contains(m))
                .unwrap_or(DEFAULT_SLOT_MINUTES),
            enforce_working_hours: env::var("ENFORCE_WORKING_HOURS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn slot_duration(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.slot_duration_minutes)
            .unwrap_or_else(|| chrono::Duration::minutes(DEFAULT_SLOT_MINUTES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test that touches SLOT_DURATION_MINUTES.
    #[test]
    fn test_slot_duration_from_env() {
        let read = |value: &str| {
            env::set_var("SLOT_DURATION_MINUTES", value);
            let minutes = AppConfig::from_env().slot_duration().num_minutes();
            env::remove_var("SLOT_DURATION_MINUTES");
            minutes
        };

        assert_eq!(read("15"), 15);
        assert_eq!(read("1440"), 1440);
        assert_eq!(read("1441"), DEFAULT_SLOT_MINUTES);
        assert_eq!(read("999999999999999"), DEFAULT_SLOT_MINUTES);
        assert_eq!(read("0"), DEFAULT_SLOT_MINUTES);
        assert_eq!(read("-30"), DEFAULT_SLOT_MINUTES);
        assert_eq!(read("half an hour"), DEFAULT_SLOT_MINUTES);
    }

    #[test]
    fn test_slot_duration_never_panics() {
        let mut config = AppConfig {
            port: 3000,
            database_url: ":memory:".to_string(),
            admin_token: "token".to_string(),
            slot_duration_minutes: i64::MAX,
            enforce_working_hours: false,
        };
        assert_eq!(config.slot_duration().num_minutes(), DEFAULT_SLOT_MINUTES);

        config.slot_duration_minutes = 45;
        assert_eq!(config.slot_duration().num_minutes(), 45);
    }
}
