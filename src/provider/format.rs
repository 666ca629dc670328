//! Display formatting for provider secondary labels
//!
//! Formatting settings are an explicit value handed to each provider rather
//! than shared global formatters.

use byte_unit::{Byte, UnitType};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::SystemTime;

/// Date format used when none is configured
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formatting settings for sizes and timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// `chrono` strftime pattern for modification times
    pub date_format: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl FormatConfig {
    #[must_use]
    pub fn with_date_format(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Human readable size in binary units, at most two decimals
    ///
    /// ```
    /// # use treepick::provider::FormatConfig;
    /// let format = FormatConfig::default();
    /// assert_eq!(format.format_size(512), "512 B");
    /// assert_eq!(format.format_size(1536), "1.5 KiB");
    /// ```
    #[must_use]
    pub fn format_size(&self, bytes: u64) -> String {
        if bytes < 1024 {
            return format!("{bytes} B");
        }
        let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
        let value = format!("{:.2}", adjusted.get_value());
        let value = value.trim_end_matches('0').trim_end_matches('.');
        format!("{value} {}", adjusted.get_unit())
    }

    /// Local-time rendering of `time`
    ///
    /// Falls back to [`DEFAULT_DATE_FORMAT`] when the configured pattern is
    /// not a valid strftime string.
    #[must_use]
    pub fn format_time(&self, time: SystemTime) -> String {
        let local: DateTime<Local> = time.into();
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.date_format)).is_ok() {
            return out;
        }
        out.clear();
        let _ = write!(out, "{}", local.format(DEFAULT_DATE_FORMAT));
        out
    }
}
