//! Clock times (`HH:MM`) as they travel over the wire and into SQLite.

use chrono::NaiveTime;

pub const CLOCK_FORMAT: &str = "%H:%M";

/// Parses `HH:MM`, also accepting `HH:MM:SS` as the browser sometimes sends.
pub fn parse_clock(s: &str) -> anyhow::Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("invalid time format: {s}"))
}

pub fn format_clock(t: &NaiveTime) -> String {
    t.format(CLOCK_FORMAT).to_string()
}

/// `#[serde(with = "serde_clock")]` for `NaiveTime` fields.
pub mod serde_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_clock(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_formats() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(parse_clock("09:00").unwrap(), nine);
        assert_eq!(parse_clock("09:00:00").unwrap(), nine);
    }

    #[test]
    fn test_parse_clock_rejects_garbage() {
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("09:61").is_err());
        assert!(parse_clock("nine").is_err());
    }

    #[test]
    fn test_format_clock() {
        let t = NaiveTime::from_hms_opt(16, 30, 0).unwrap();
        assert_eq!(format_clock(&t), "16:30");
    }
}
