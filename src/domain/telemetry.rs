// Telemetry domain models
use super::resolution::Period;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// One upstream record as delivered, before field names are resolved.
pub type RawRecord = Map<String, Value>;

pub const MINUTES_PER_DAY: u16 = 1440;

/// Upstream rows for one fetch, tagged with the wire shape they arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTelemetry {
    /// Per-reading rows: a minute-of-day and a power value.
    Day { date: NaiveDate, records: Vec<RawRecord> },
    /// Daily totals keyed by day-of-month.
    Month { year: i32, month: u32, records: Vec<RawRecord> },
    /// Monthly totals keyed by month number (1-12).
    Year { year: i32, records: Vec<RawRecord> },
    /// Yearly totals keyed by year.
    Total { records: Vec<RawRecord> },
}

impl RawTelemetry {
    pub fn new(period: Period, records: Vec<RawRecord>) -> Self {
        match period {
            Period::Day(date) => RawTelemetry::Day { date, records },
            Period::Month { year, month } => RawTelemetry::Month {
                year,
                month,
                records,
            },
            Period::Year(year) => RawTelemetry::Year { year, records },
            Period::Total => RawTelemetry::Total { records },
        }
    }

    pub fn period(&self) -> Period {
        match self {
            RawTelemetry::Day { date, .. } => Period::Day(*date),
            RawTelemetry::Month { year, month, .. } => Period::Month {
                year: *year,
                month: *month,
            },
            RawTelemetry::Year { year, .. } => Period::Year(*year),
            RawTelemetry::Total { .. } => Period::Total,
        }
    }

    pub fn records(&self) -> &[RawRecord] {
        match self {
            RawTelemetry::Day { records, .. }
            | RawTelemetry::Month { records, .. }
            | RawTelemetry::Year { records, .. }
            | RawTelemetry::Total { records } => records,
        }
    }
}

/// A single power sample within one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub time_offset_minutes: u16,
    pub power_watts: Option<f64>,
}

impl Reading {
    pub fn new(time_offset_minutes: u16, power_watts: Option<f64>) -> Self {
        Self {
            time_offset_minutes,
            power_watts,
        }
    }

    pub fn hour(&self) -> usize {
        (self.time_offset_minutes / 60) as usize
    }

    /// The power value if it is present and finite.
    pub fn valid_power(&self) -> Option<f64> {
        self.power_watts.filter(|p| p.is_finite())
    }
}

/// A pre-aggregated upstream row keyed by day-of-month, month or year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodRow {
    pub key: i64,
    pub value: Option<f64>,
}

impl PeriodRow {
    pub fn new(key: i64, value: Option<f64>) -> Self {
        Self { key, value }
    }
}

/// Accumulator for one position of an aggregated series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub index: usize,
    pub sum: f64,
    pub count: u32,
}

impl Bucket {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            sum: 0.0,
            count: 0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn average(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub kind: ChartKind,
    /// `None` marks a gap: no measurement at that position.
    pub values: Vec<Option<f64>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, kind: ChartKind, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }
}

/// Labels plus parallel datasets, ready for a chart once validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl Series {
    pub fn new(labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Self { labels, datasets }
    }

    pub fn single(labels: Vec<String>, dataset: Dataset) -> Self {
        Self::new(labels, vec![dataset])
    }

    /// Values of the first dataset, the one every resolution produces.
    pub fn values(&self) -> &[Option<f64>] {
        self.datasets
            .first()
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }
}
