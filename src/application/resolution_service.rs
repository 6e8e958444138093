// Resolution service - Fetches one tab's data and runs the pipeline
use crate::application::plant_repository::{BackendError, PlantRepository};
use crate::domain::pipeline::{process, ResolutionResult};
use crate::domain::resolution::{Period, Resolution};
use std::sync::Arc;

#[derive(Clone)]
pub struct ResolutionService {
    repository: Arc<dyn PlantRepository>,
}

impl ResolutionService {
    pub fn new(repository: Arc<dyn PlantRepository>) -> Self {
        Self { repository }
    }

    /// Fetch and aggregate one resolution.
    ///
    /// Month, Year and Total also ask for the plant summary, whose figure
    /// becomes the headline. A summary failure only blanks the headline.
    pub async fn load(
        &self,
        plant_id: &str,
        period: Period,
    ) -> Result<ResolutionResult, BackendError> {
        let resolution = period.resolution();
        tracing::debug!("Loading {} data for plant {} ({})", resolution, plant_id, period);

        if resolution == Resolution::Day {
            let telemetry = self.repository.fetch_telemetry(plant_id, &period).await?;
            return Ok(process(&telemetry, None));
        }

        let (telemetry, summary) = tokio::join!(
            self.repository.fetch_telemetry(plant_id, &period),
            self.repository.fetch_summary(plant_id, &period)
        );
        let telemetry = telemetry?;
        let summary = match summary {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Plant summary unavailable for {} ({}): {}", plant_id, period, e);
                None
            }
        };

        Ok(process(&telemetry, summary.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{records, FakeRepository};
    use crate::domain::pipeline::ChartState;
    use crate::domain::plant::PlantSummary;
    use chrono::NaiveDate;
    use serde_json::json;

    #[tokio::test]
    async fn test_day_load() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let repository = FakeRepository::default().with_records(
            Period::Day(date),
            records(json!([
                {"timeMinutes": 600, "solarPower": 1200},
                {"timeMinutes": 660, "solarPower": 1800}
            ])),
        );
        let service = ResolutionService::new(Arc::new(repository));

        let result = service.load("plant-1", Period::Day(date)).await.unwrap();
        assert_eq!(result.summary.value, Some(1800.0));
        assert_eq!(result.day.unwrap().peak.unwrap().time_label(), "11:00");
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_chart() {
        let period = Period::Year(2023);
        let repository = FakeRepository::default()
            .with_records(
                period,
                records(json!([
                    {"month": 1, "PvProduction": 10},
                    {"month": 2, "PvProduction": 20}
                ])),
            )
            .failing_summary();
        let service = ResolutionService::new(Arc::new(repository));

        let result = service.load("plant-1", period).await.unwrap();
        assert!(matches!(result.chart, ChartState::Ready(_)));
        assert_eq!(result.summary.value, None);
    }

    #[tokio::test]
    async fn test_summary_headline_is_verbatim() {
        let period = Period::Total;
        let repository = FakeRepository::default()
            .with_records(
                period,
                records(json!([
                    {"year": 2021, "PvProduction": 100},
                    {"year": 2022, "PvProduction": 200}
                ])),
            )
            .with_summary(PlantSummary {
                total_production_kwh: Some(2_750_000.0),
                ..Default::default()
            });
        let service = ResolutionService::new(Arc::new(repository));

        let result = service.load("plant-1", period).await.unwrap();
        assert_eq!(result.summary.unit, "GWh");
        assert!((result.summary.value.unwrap() - 2.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_telemetry_failure_propagates() {
        let repository = FakeRepository::default().failing(Resolution::Month);
        let service = ResolutionService::new(Arc::new(repository));

        let err = service
            .load("plant-1", Period::Month { year: 2024, month: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
    }
}
