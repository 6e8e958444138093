// Resolution bucketers
//
// Each bucketer keeps its accumulators local to one call and returns a fresh
// series. Day produces gaps for hours without production; Month, Year and
// Total produce sums where an absent key is a real zero.
use super::resolution::days_in_month;
use super::telemetry::{Bucket, ChartKind, Dataset, PeriodRow, Reading, Series};

pub const HOURS_PER_DAY: usize = 24;
pub const MONTHS_PER_YEAR: usize = 12;

const MONTH_LABELS: [&str; MONTHS_PER_YEAR] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Average power per hour. Always 24 values.
///
/// Hours with no readings, or whose average is not positive, are gaps so the
/// night is drawn as a break rather than a flat line.
pub fn bucket_day(readings: &[Reading]) -> Series {
    let mut buckets: Vec<Bucket> = (0..HOURS_PER_DAY).map(Bucket::new).collect();

    for reading in readings {
        if let Some(power) = reading.valid_power() {
            if let Some(bucket) = buckets.get_mut(reading.hour()) {
                bucket.add(power);
            }
        }
    }

    let labels = (0..HOURS_PER_DAY).map(|h| format!("{:02}:00", h)).collect();
    let values = buckets
        .iter()
        .map(|b| Some(b.average()).filter(|avg| !b.is_empty() && *avg > 0.0))
        .collect();

    Series::single(labels, Dataset::new("Power (W)", ChartKind::Line, values))
}

/// Daily production totals for one calendar month.
pub fn bucket_month(rows: &[PeriodRow], year: i32, month: u32) -> Series {
    let days = days_in_month(year, month) as usize;
    let mut buckets: Vec<Bucket> = (0..days).map(Bucket::new).collect();

    for row in rows {
        let Some(value) = row.value else { continue };
        if row.key < 1 || row.key as usize > days {
            tracing::debug!("Ignoring month row for day {} (month has {} days)", row.key, days);
            continue;
        }
        // Partial-day rows for the same date add up.
        buckets[row.key as usize - 1].add(value);
    }

    let labels = (1..=days).map(|d| d.to_string()).collect();
    let values = buckets.iter().map(|b| Some(b.sum)).collect();

    Series::single(labels, Dataset::new("Production", ChartKind::Bar, values))
}

/// Monthly production totals for one year. Missing months are zero.
pub fn bucket_year(rows: &[PeriodRow]) -> Series {
    let mut buckets: Vec<Bucket> = (0..MONTHS_PER_YEAR).map(Bucket::new).collect();

    for row in rows {
        let Some(value) = row.value else { continue };
        if !(1..=MONTHS_PER_YEAR as i64).contains(&row.key) {
            continue;
        }
        buckets[row.key as usize - 1].add(value);
    }

    let labels = MONTH_LABELS.iter().map(|m| m.to_string()).collect();
    let values = buckets.iter().map(|b| Some(b.sum)).collect();

    Series::single(labels, Dataset::new("Production", ChartKind::Bar, values))
}

/// Yearly production totals, one bucket per reported year in ascending order.
pub fn bucket_total(rows: &[PeriodRow]) -> Series {
    let mut buckets: Vec<Bucket> = Vec::new();

    for row in rows.iter().filter(|r| r.key > 0) {
        let Some(value) = row.value else { continue };
        let year = row.key as usize;
        match buckets.iter_mut().find(|b| b.index == year) {
            Some(bucket) => bucket.add(value),
            None => {
                let mut bucket = Bucket::new(year);
                bucket.add(value);
                buckets.push(bucket);
            }
        }
    }

    buckets.sort_by_key(|b| b.index);

    let labels = buckets.iter().map(|b| b.index.to_string()).collect();
    let values = buckets.iter().map(|b| Some(b.sum)).collect();

    Series::single(labels, Dataset::new("Production", ChartKind::Bar, values))
}

/// Power of the latest reading with a positive value.
///
/// Readings that exist but are never positive give `Some(0.0)`; no usable
/// reading at all gives `None`.
pub fn latest_positive_power(readings: &[Reading]) -> Option<f64> {
    let mut any_valid = false;
    let mut latest: Option<Reading> = None;

    for reading in readings {
        let Some(power) = reading.valid_power() else { continue };
        any_valid = true;
        if power <= 0.0 {
            continue;
        }
        match latest {
            Some(current) if current.time_offset_minutes >= reading.time_offset_minutes => {}
            _ => latest = Some(*reading),
        }
    }

    match latest {
        Some(reading) => reading.valid_power(),
        None if any_valid => Some(0.0),
        None => None,
    }
}
