// Resolution and period selection
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resolution {
    Day,
    Month,
    Year,
    Total,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::Day,
        Resolution::Month,
        Resolution::Year,
        Resolution::Total,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Day => "day",
            Resolution::Month => "month",
            Resolution::Year => "year",
            Resolution::Total => "total",
        }
    }

    /// Position in `Resolution::ALL`, used for fixed-size per-resolution tables.
    pub fn index(&self) -> usize {
        match self {
            Resolution::Day => 0,
            Resolution::Month => 1,
            Resolution::Year => 2,
            Resolution::Total => 3,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Resolution::Day),
            "month" => Ok(Resolution::Month),
            "year" => Ok(Resolution::Year),
            "total" => Ok(Resolution::Total),
            other => Err(PeriodError::UnknownResolution(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("unknown resolution '{0}' (expected day, month, year or total)")]
    UnknownResolution(String),
    #[error("a period is required for {0} resolution")]
    Missing(Resolution),
    #[error("invalid {resolution} period '{value}'")]
    Invalid { resolution: Resolution, value: String },
}

/// The calendar window a fetch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
    Total,
}

impl Period {
    /// Parse the wire form of a period for the given resolution.
    ///
    /// Day takes `YYYY-MM-DD`, Month `YYYY-MM`, Year `YYYY`. Total has no
    /// period and ignores whatever is passed.
    pub fn parse(resolution: Resolution, value: Option<&str>) -> Result<Self, PeriodError> {
        if resolution == Resolution::Total {
            return Ok(Period::Total);
        }

        let raw = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(PeriodError::Missing(resolution))?;
        let invalid = || PeriodError::Invalid {
            resolution,
            value: raw.to_string(),
        };

        match resolution {
            Resolution::Day => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Period::Day)
                .map_err(|_| invalid()),
            Resolution::Month => {
                let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
                let year = parse_year(year).ok_or_else(invalid)?;
                let month = fixed_digits(month, 2).ok_or_else(invalid)?;
                if !(1..=12).contains(&month) {
                    return Err(invalid());
                }
                Ok(Period::Month { year, month })
            }
            Resolution::Year => parse_year(raw).map(Period::Year).ok_or_else(invalid),
            Resolution::Total => Ok(Period::Total),
        }
    }

    /// Derive the period a resolution tab shows for one selected date.
    pub fn anchored(resolution: Resolution, date: NaiveDate) -> Self {
        match resolution {
            Resolution::Day => Period::Day(date),
            Resolution::Month => Period::Month {
                year: date.year(),
                month: date.month(),
            },
            Resolution::Year => Period::Year(date.year()),
            Resolution::Total => Period::Total,
        }
    }

    pub fn resolution(&self) -> Resolution {
        match self {
            Period::Day(_) => Resolution::Day,
            Period::Month { .. } => Resolution::Month,
            Period::Year(_) => Resolution::Year,
            Period::Total => Resolution::Total,
        }
    }

    /// Query-string form sent upstream; `None` for Total.
    pub fn query_value(&self) -> Option<String> {
        match self {
            Period::Total => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Year(year) => write!(f, "{:04}", year),
            Period::Total => f.write_str("all-time"),
        }
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    fixed_digits(raw, 4)
        .and_then(|year| i32::try_from(year).ok())
        .filter(|year| *year > 0)
}

// Exactly `width` ASCII digits, no sign.
fn fixed_digits(raw: &str, width: usize) -> Option<u32> {
    if raw.len() != width || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Number of days in a calendar month, 28 through 31.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_resolution() {
        assert_eq!(
            Period::parse(Resolution::Day, Some("2024-05-17")).unwrap(),
            Period::Day(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
        );
        assert_eq!(
            Period::parse(Resolution::Month, Some("2024-02")).unwrap(),
            Period::Month { year: 2024, month: 2 }
        );
        assert_eq!(
            Period::parse(Resolution::Year, Some("2023")).unwrap(),
            Period::Year(2023)
        );
        assert_eq!(Period::parse(Resolution::Total, None).unwrap(), Period::Total);
        assert_eq!(
            Period::parse(Resolution::Total, Some("ignored")).unwrap(),
            Period::Total
        );
    }

    #[test]
    fn test_parse_rejects_bad_periods() {
        assert_eq!(
            Period::parse(Resolution::Day, None),
            Err(PeriodError::Missing(Resolution::Day))
        );
        assert!(Period::parse(Resolution::Day, Some("2024-02-30")).is_err());
        assert!(Period::parse(Resolution::Month, Some("2024-13")).is_err());
        assert!(Period::parse(Resolution::Month, Some("2024")).is_err());
        assert!(Period::parse(Resolution::Year, Some("24")).is_err());
        assert!(Period::parse(Resolution::Year, Some("0000")).is_err());
    }

    #[test]
    fn test_parse_requires_fixed_width_digits() {
        assert!(Period::parse(Resolution::Month, Some("2024-1")).is_err());
        assert!(Period::parse(Resolution::Month, Some("2024-+1")).is_err());
        assert!(Period::parse(Resolution::Month, Some("+202-01")).is_err());
        assert!(Period::parse(Resolution::Year, Some("+202")).is_err());
        assert!(Period::parse(Resolution::Year, Some("-202")).is_err());
        assert!(Period::parse(Resolution::Year, Some("２０２４")).is_err());
        assert_eq!(
            Period::parse(Resolution::Month, Some("2024-01")).unwrap(),
            Period::Month { year: 2024, month: 1 }
        );
    }

    #[test]
    fn test_period_display_round_trips_query_value() {
        let period = Period::Month { year: 2024, month: 3 };
        assert_eq!(period.query_value().as_deref(), Some("2024-03"));
        assert_eq!(Period::Total.query_value(), None);
    }

    #[test]
    fn test_anchored_periods() {
        let date = NaiveDate::from_ymd_opt(2023, 11, 4).unwrap();
        assert_eq!(Period::anchored(Resolution::Day, date), Period::Day(date));
        assert_eq!(
            Period::anchored(Resolution::Month, date),
            Period::Month { year: 2023, month: 11 }
        );
        assert_eq!(Period::anchored(Resolution::Year, date), Period::Year(2023));
        assert_eq!(Period::anchored(Resolution::Total, date), Period::Total);
    }

    #[test]
    fn test_resolution_from_str() {
        assert_eq!("Month".parse::<Resolution>().unwrap(), Resolution::Month);
        assert!("week".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
    }
}
