// ── Range selector ──
//
// The coarse window a view is scoped to. Determines the backend query
// token and how history series are bucketed and labelled.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Raised for any range selector outside `1day|7days|1month|1year`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time range '{value}' (expected one of: 1day, 7days, 1month, 1year)")]
pub struct InvalidRange {
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum TimeRange {
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "1year")]
    OneYear,
}

/// How bucket labels are rendered for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// `HH:mm`
    HourMinute,
    /// `MMM dd`
    Day,
    /// `MMM yyyy`
    Month,
}

impl LabelFormat {
    /// `strftime` pattern for this label format.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::HourMinute => "%H:%M",
            Self::Day => "%b %d",
            Self::Month => "%b %Y",
        }
    }
}

impl TimeRange {
    /// Selector name as used by views and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1day",
            Self::SevenDays => "7days",
            Self::OneMonth => "1month",
            Self::OneYear => "1year",
        }
    }

    /// Range token understood by the backend KPI routes.
    pub fn backend_token(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::SevenDays => "7D",
            Self::OneMonth => "30D",
            Self::OneYear => "1Y",
        }
    }

    /// Parse a backend range token (`1D`, `7D`, `30D`, `1Y`).
    pub fn from_backend_token(token: &str) -> Result<Self, InvalidRange> {
        Self::iter()
            .find(|r| r.backend_token() == token)
            .ok_or_else(|| InvalidRange {
                value: token.to_owned(),
            })
    }

    /// Number of display buckets a chart expects.
    pub fn bucket_count(self) -> usize {
        match self {
            Self::OneDay => 24,
            Self::SevenDays => 7,
            Self::OneMonth => 30,
            Self::OneYear => 12,
        }
    }

    pub fn label_format(self) -> LabelFormat {
        match self {
            Self::OneDay => LabelFormat::HourMinute,
            Self::SevenDays | Self::OneMonth => LabelFormat::Day,
            Self::OneYear => LabelFormat::Month,
        }
    }

    /// Render a bucket label for `ts`.
    pub fn label(self, ts: DateTime<Utc>) -> String {
        ts.format(self.label_format().pattern()).to_string()
    }

    /// Start of the window ending at `now`. Months and years are calendar
    /// based, so `1month` before March 31st is February 28th/29th.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::OneDay => now - TimeDelta::days(1),
            Self::SevenDays => now - TimeDelta::days(7),
            Self::OneMonth => sub_months(now, 1),
            Self::OneYear => sub_months(now, 12),
        }
    }

    /// `bucket_count() + 1` ascending edges from `cutoff(now)` to `now`.
    pub fn bucket_edges(self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let count = self.bucket_count();
        let mut edges: Vec<DateTime<Utc>> = match self {
            Self::OneDay => (0..=24).rev().map(|h| now - TimeDelta::hours(h)).collect(),
            Self::SevenDays => (0..=7).rev().map(|d| now - TimeDelta::days(d)).collect(),
            Self::OneMonth => {
                let start = self.cutoff(now);
                let step = (now - start) / 30;
                (0..=30).map(|i| start + step * i).collect()
            }
            Self::OneYear => (0..=12).rev().map(|m| sub_months(now, m)).collect(),
        };
        debug_assert_eq!(edges.len(), count + 1);
        // Integer division of the month window can leave the last edge short.
        if let Some(last) = edges.last_mut() {
            *last = now;
        }
        edges
    }
}

fn sub_months(ts: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    ts.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = InvalidRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| InvalidRange { value: s.to_owned() })
    }
}
