// Reporting window for performance metrics

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRangeKind {
    #[default]
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeRangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeKind::Week => "week",
            TimeRangeKind::Month => "month",
            TimeRangeKind::Quarter => "quarter",
            TimeRangeKind::Year => "year",
        }
    }
}

impl std::str::FromStr for TimeRangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(TimeRangeKind::Week),
            "month" => Ok(TimeRangeKind::Month),
            "quarter" => Ok(TimeRangeKind::Quarter),
            "year" => Ok(TimeRangeKind::Year),
            other => Err(format!("unknown time range '{}'", other)),
        }
    }
}

/// `{type, start_date, end_date}` as sent to and returned by the metrics endpoint.
/// Dates are absent when the server picks the window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(rename = "type")]
    pub kind: TimeRangeKind,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl TimeRange {
    pub fn of_kind(kind: TimeRangeKind) -> Self {
        Self {
            kind,
            start_date: None,
            end_date: None,
        }
    }

    /// Window of `kind` that ends (inclusive) on `end`.
    pub fn ending_on(kind: TimeRangeKind, end: NaiveDate) -> Self {
        let start = match kind {
            TimeRangeKind::Week => end.checked_sub_days(Days::new(6)),
            TimeRangeKind::Month => end.checked_sub_months(Months::new(1)),
            TimeRangeKind::Quarter => end.checked_sub_months(Months::new(3)),
            TimeRangeKind::Year => end.checked_sub_months(Months::new(12)),
        };
        Self {
            kind,
            start_date: Some(start.unwrap_or(end)),
            end_date: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
    }
}
