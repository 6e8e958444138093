// In-memory repository for service tests
use crate::application::plant_repository::{BackendError, PlantRepository};
use crate::domain::plant::{Plant, PlantSummary};
use crate::domain::resolution::{Period, Resolution};
use crate::domain::telemetry::{RawRecord, RawTelemetry};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

pub fn records(value: Value) -> Vec<RawRecord> {
    serde_json::from_value(value).expect("test records must be an array of objects")
}

#[derive(Default)]
pub struct FakeRepository {
    plants: Vec<Plant>,
    records: HashMap<Period, Vec<RawRecord>>,
    summary: PlantSummary,
    summary_fails: bool,
    failing: HashSet<Resolution>,
    delays: HashMap<Period, Duration>,
}

impl FakeRepository {
    pub fn with_plants(mut self, plants: Vec<Plant>) -> Self {
        self.plants = plants;
        self
    }

    pub fn with_records(mut self, period: Period, records: Vec<RawRecord>) -> Self {
        self.records.insert(period, records);
        self
    }

    pub fn with_summary(mut self, summary: PlantSummary) -> Self {
        self.summary = summary;
        self
    }

    pub fn failing_summary(mut self) -> Self {
        self.summary_fails = true;
        self
    }

    pub fn failing(mut self, resolution: Resolution) -> Self {
        self.failing.insert(resolution);
        self
    }

    pub fn with_delay(mut self, period: Period, delay: Duration) -> Self {
        self.delays.insert(period, delay);
        self
    }
}

#[async_trait]
impl PlantRepository for FakeRepository {
    async fn list_plants(&self) -> Result<Vec<Plant>, BackendError> {
        Ok(self.plants.clone())
    }

    async fn fetch_telemetry(
        &self,
        _plant_id: &str,
        period: &Period,
    ) -> Result<RawTelemetry, BackendError> {
        if let Some(delay) = self.delays.get(period) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&period.resolution()) {
            return Err(BackendError::Request(format!("{} backend offline", period.resolution())));
        }
        let records = self.records.get(period).cloned().unwrap_or_default();
        Ok(RawTelemetry::new(*period, records))
    }

    async fn fetch_summary(
        &self,
        _plant_id: &str,
        _period: &Period,
    ) -> Result<PlantSummary, BackendError> {
        if self.summary_fails {
            return Err(BackendError::Timeout);
        }
        Ok(self.summary.clone())
    }
}
