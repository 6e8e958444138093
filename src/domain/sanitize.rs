// Series sanitizer - repairs values instead of rejecting the series
use super::telemetry::{ChartKind, Dataset, Series};

pub const CLAMP_MAGNITUDE: f64 = 1e12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Leave `None` entries in place so line charts draw a break.
    pub keep_gaps: bool,
}

impl SanitizeOptions {
    pub fn keep_gaps() -> Self {
        Self { keep_gaps: true }
    }
}

pub fn sanitize(series: &Series, options: SanitizeOptions) -> Series {
    let datasets = series
        .datasets
        .iter()
        .map(|dataset| sanitize_dataset(dataset, options))
        .collect();

    Series::new(series.labels.clone(), datasets)
}

fn sanitize_dataset(dataset: &Dataset, options: SanitizeOptions) -> Dataset {
    let non_negative = dataset.kind == ChartKind::Bar;
    let values = dataset
        .values
        .iter()
        .map(|value| match value {
            None if options.keep_gaps => None,
            None => Some(0.0),
            Some(v) => Some(sanitize_value(*v, non_negative)),
        })
        .collect();

    Dataset::new(dataset.name.clone(), dataset.kind, values)
}

fn sanitize_value(value: f64, non_negative: bool) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let clamped = value.clamp(-CLAMP_MAGNITUDE, CLAMP_MAGNITUDE);
    if non_negative && clamped < 0.0 {
        0.0
    } else {
        clamped
    }
}
