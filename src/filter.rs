use crate::records::{parse_timestamp, SensorRecord};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;

/// Time window selected in the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TimeFilter {
    LastHour,
    Last24Hours,
    Last7Days,
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Complete filter selection: time window plus the chart point cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub filter: TimeFilter,
    pub max_points: usize,
}

pub const DEFAULT_MAX_POINTS: usize = 50;

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            filter: TimeFilter::Last24Hours,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("unknown time filter: {0}")]
    UnknownFilter(String),

    #[error("custom range requires both start and end dates")]
    MissingCustomBounds,

    #[error("invalid {field} date: {value}")]
    InvalidDate { field: &'static str, value: String },
}

impl TimeFilter {
    /// Parse the dashboard's query values. `kind` is one of `1hour`,
    /// `24hours`, `7days`, `custom`; custom ranges carry explicit bounds.
    pub fn parse(
        kind: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, FilterError> {
        match kind {
            "1hour" => Ok(TimeFilter::LastHour),
            "24hours" => Ok(TimeFilter::Last24Hours),
            "7days" => Ok(TimeFilter::Last7Days),
            "custom" => {
                let (start, end) = match (start, end) {
                    (Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => (s, e),
                    _ => return Err(FilterError::MissingCustomBounds),
                };
                let start = parse_input_date(start).ok_or(FilterError::InvalidDate {
                    field: "start",
                    value: start.to_string(),
                })?;
                let end = parse_input_date(end).ok_or(FilterError::InvalidDate {
                    field: "end",
                    value: end.to_string(),
                })?;
                Ok(TimeFilter::Custom { start, end })
            }
            other => Err(FilterError::UnknownFilter(other.to_string())),
        }
    }

    fn window(self) -> Option<Duration> {
        match self {
            TimeFilter::LastHour => Some(Duration::hours(1)),
            TimeFilter::Last24Hours => Some(Duration::hours(24)),
            TimeFilter::Last7Days => Some(Duration::days(7)),
            TimeFilter::Custom { .. } => None,
        }
    }
}

/// Keep the records inside the selected window, preserving relative order.
///
/// Relative windows keep `timestamp >= now - window` with no upper bound;
/// custom ranges are inclusive on both ends. The input is not mutated, and
/// filtering an already-filtered set with the same criterion and `now` is a
/// no-op.
pub fn filter_records(
    records: &[SensorRecord],
    filter: &TimeFilter,
    now: DateTime<Utc>,
) -> Vec<SensorRecord> {
    match filter {
        TimeFilter::Custom { start, end } => records
            .iter()
            .filter(|r| r.timestamp >= *start && r.timestamp <= *end)
            .cloned()
            .collect(),
        relative => {
            // window() is always Some for the relative variants
            let cutoff = now - relative.window().unwrap_or_else(Duration::zero);
            records
                .iter()
                .filter(|r| r.timestamp >= cutoff)
                .cloned()
                .collect()
        }
    }
}

/// Accepts RFC 3339, naive ISO, or the `datetime-local` input format
/// (`2024-06-01T08:00`) the dashboard's date pickers produce.
fn parse_input_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(ts) = parse_timestamp(raw) {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
