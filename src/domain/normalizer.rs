// Reading normalizer - resolves heterogeneous upstream field names
use super::telemetry::{PeriodRow, RawRecord, Reading, MINUTES_PER_DAY};
use serde_json::Value;

/// Candidate field names for one canonical field, highest priority first.
pub type FieldCandidates = &'static [&'static str];

pub const POWER_FIELDS: FieldCandidates = &["PvProduction", "solarPower"];
pub const TIME_FIELDS: FieldCandidates = &["timeMinutes", "timeOffsetMinutes"];
pub const DAY_OF_MONTH_FIELDS: FieldCandidates = &["date", "day"];
pub const MONTH_FIELDS: FieldCandidates = &["month"];
pub const YEAR_FIELDS: FieldCandidates = &["year"];

/// Convert one day of raw records into readings.
///
/// Records without a usable minute-of-day are dropped. A record whose power
/// cannot be read is kept with `power_watts: None`.
pub fn normalize_day(records: &[RawRecord]) -> Vec<Reading> {
    let readings: Vec<Reading> = records
        .iter()
        .filter_map(|record| {
            let minute = resolve_integer(record, TIME_FIELDS)?;
            if minute < 0 || minute >= MINUTES_PER_DAY as i64 {
                return None;
            }
            Some(Reading::new(minute as u16, resolve_number(record, POWER_FIELDS)))
        })
        .collect();

    if readings.len() < records.len() {
        tracing::debug!(
            "Dropped {} of {} day records without a usable time",
            records.len() - readings.len(),
            records.len()
        );
    }

    readings
}

/// Convert pre-aggregated rows, keyed by one of `key_fields`.
pub fn normalize_period_rows(
    records: &[RawRecord],
    key_fields: FieldCandidates,
) -> Vec<PeriodRow> {
    records
        .iter()
        .filter_map(|record| {
            let key = resolve_integer(record, key_fields)?;
            Some(PeriodRow::new(key, resolve_number(record, POWER_FIELDS)))
        })
        .collect()
}

/// First candidate holding a finite number (or a numeric string).
pub fn resolve_number(record: &RawRecord, candidates: FieldCandidates) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find_map(parse_number)
}

/// First candidate holding an integral number.
pub fn resolve_integer(record: &RawRecord, candidates: FieldCandidates) -> Option<i64> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find_map(parse_integer)
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

// Numbers and numeric strings follow the same rule: integral values only.
fn parse_integer(value: &Value) -> Option<i64> {
    let exact = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    exact.or_else(|| {
        parse_number(value)
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}
