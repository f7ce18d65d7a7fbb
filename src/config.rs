//! Engine settings, loadable from JSON.

use crate::error::{Result, ReviewError};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cards offered by an extra-practice session.
    pub random_set_size: usize,
    /// Offset of the reference time zone that defines calendar days.
    pub utc_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            random_set_size: 5,
            utc_offset_minutes: 0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ReviewError::Validation(format!("invalid engine config: {e}")))?;
        config.zone()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    pub fn zone(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ReviewError::Validation(format!(
                    "utc offset of {} minutes is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Calendar date of `now` in the reference zone.
    pub fn today(&self, now: DateTime<Utc>) -> Result<NaiveDate> {
        Ok(now.with_timezone(&self.zone()?).date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.random_set_size, 5);
        assert_eq!(config.zone().unwrap(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "utc_offset_minutes": -300 }"#).unwrap();
        assert_eq!(config.random_set_size, 5);
        assert_eq!(config.utc_offset_minutes, -300);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json("{ this is not valid json }"),
            Err(ReviewError::Validation(_))
        ));
        assert!(EngineConfig::from_json(r#"{ "utc_offset_minutes": 100000 }"#).is_err());
    }

    #[test]
    fn test_today_in_reference_zone() {
        let config = EngineConfig {
            utc_offset_minutes: 120,
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        assert_eq!(config.today(now).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "random_set_size": 10 }}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.random_set_size, 10);
    }

    #[test]
    fn test_load_nonexistent_file() {
        assert!(matches!(
            EngineConfig::load("nonexistent_config_xyz123.json"),
            Err(ReviewError::Io(_))
        ));
    }
}
