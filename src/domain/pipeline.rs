// Resolution pipeline: normalize -> bucket -> validate -> sanitize
use super::bucketing::{bucket_day, bucket_month, bucket_total, bucket_year, latest_positive_power};
use super::energy::{find_peak, integrate_energy, DailyEnergy, PeakInfo};
use super::normalizer::{
    normalize_day, normalize_period_rows, DAY_OF_MONTH_FIELDS, MONTH_FIELDS, YEAR_FIELDS,
};
use super::plant::PlantSummary;
use super::resolution::{Period, Resolution};
use super::sanitize::{sanitize, SanitizeOptions};
use super::telemetry::{RawTelemetry, Series};
use super::units::Headline;
use super::validation::{validate, ValidationFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Ready(Series),
    /// The bucketed series was rejected; show the empty state instead.
    NoData(ValidationFailure),
}

impl ChartState {
    pub fn series(&self) -> Option<&Series> {
        match self {
            ChartState::Ready(series) => Some(series),
            ChartState::NoData(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayInsights {
    pub peak: Option<PeakInfo>,
    pub energy: DailyEnergy,
}

impl DayInsights {
    pub fn energy_headline(&self) -> Headline {
        Headline::energy_kwh(Some(self.energy.kwh()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub period: Period,
    pub chart: ChartState,
    pub summary: Headline,
    pub day: Option<DayInsights>,
}

impl ResolutionResult {
    pub fn resolution(&self) -> Resolution {
        self.period.resolution()
    }
}

/// Turn one fetch's raw rows into a chart-safe result.
///
/// `summary` supplies the Month/Year/Total headline verbatim; Day derives
/// its headline from the readings and ignores it.
pub fn process(telemetry: &RawTelemetry, summary: Option<&PlantSummary>) -> ResolutionResult {
    let period = telemetry.period();
    let records = telemetry.records();

    match telemetry {
        RawTelemetry::Day { .. } => {
            let readings = normalize_day(records);
            let series = bucket_day(&readings);
            let day = DayInsights {
                peak: find_peak(&readings),
                energy: integrate_energy(&readings),
            };
            ResolutionResult {
                period,
                chart: chart_state(series, SanitizeOptions::keep_gaps()),
                summary: Headline::power_watts(latest_positive_power(&readings)),
                day: Some(day),
            }
        }
        RawTelemetry::Month { year, month, .. } => {
            let rows = normalize_period_rows(records, DAY_OF_MONTH_FIELDS);
            period_result(period, bucket_month(&rows, *year, *month), summary)
        }
        RawTelemetry::Year { .. } => {
            let rows = normalize_period_rows(records, MONTH_FIELDS);
            period_result(period, bucket_year(&rows), summary)
        }
        RawTelemetry::Total { .. } => {
            let rows = normalize_period_rows(records, YEAR_FIELDS);
            period_result(period, bucket_total(&rows), summary)
        }
    }
}

fn period_result(
    period: Period,
    series: Series,
    summary: Option<&PlantSummary>,
) -> ResolutionResult {
    let production = summary.and_then(|s| s.production_for(period.resolution()));
    ResolutionResult {
        period,
        chart: chart_state(series, SanitizeOptions::default()),
        summary: Headline::energy_kwh(production),
        day: None,
    }
}

fn chart_state(series: Series, options: SanitizeOptions) -> ChartState {
    match validate(&series) {
        Ok(()) => ChartState::Ready(sanitize(&series, options)),
        Err(failure) => {
            tracing::debug!("Series rejected: {}", failure);
            ChartState::NoData(failure)
        }
    }
}
