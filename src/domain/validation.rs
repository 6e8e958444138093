// Series validation - decides whether a series may reach a renderer
use super::telemetry::Series;
use thiserror::Error;

pub const MIN_POINTS: usize = 2;
pub const MAX_MAGNITUDE: f64 = 1e15;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationFailure {
    #[error("series has no datasets")]
    NoDatasets,
    #[error("series has {0} labels, at least 2 are required")]
    TooFewPoints(usize),
    #[error("dataset {dataset} has {values} values for {labels} labels")]
    LengthMismatch {
        dataset: usize,
        values: usize,
        labels: usize,
    },
    #[error("dataset {dataset} has {run} consecutive gaps in {len} points")]
    TooSparse { dataset: usize, run: usize, len: usize },
    #[error("dataset {dataset} has an out-of-range value at position {position}")]
    BadValue { dataset: usize, position: usize },
}

/// Check the structural rules a chartable series must satisfy.
pub fn validate(series: &Series) -> Result<(), ValidationFailure> {
    if series.datasets.is_empty() {
        return Err(ValidationFailure::NoDatasets);
    }

    let labels = series.labels.len();
    if labels < MIN_POINTS {
        return Err(ValidationFailure::TooFewPoints(labels));
    }

    for (dataset, data) in series.datasets.iter().enumerate() {
        if data.values.len() != labels {
            return Err(ValidationFailure::LengthMismatch {
                dataset,
                values: data.values.len(),
                labels,
            });
        }

        let run = longest_gap_run(&data.values);
        if run > labels / 2 {
            return Err(ValidationFailure::TooSparse {
                dataset,
                run,
                len: labels,
            });
        }

        if let Some(position) = data
            .values
            .iter()
            .position(|v| v.is_some_and(|v| !v.is_finite() || v.abs() > MAX_MAGNITUDE))
        {
            return Err(ValidationFailure::BadValue { dataset, position });
        }
    }

    Ok(())
}

pub fn is_valid(series: &Series) -> bool {
    validate(series).is_ok()
}

fn longest_gap_run(values: &[Option<f64>]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for value in values {
        if value.is_none() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
