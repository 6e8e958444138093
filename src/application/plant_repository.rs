// Repository trait for plant telemetry access
use crate::domain::plant::{Plant, PlantSummary};
use crate::domain::resolution::Period;
use crate::domain::telemetry::RawTelemetry;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("upstream request failed: {0}")]
    Request(String),
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode upstream response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PlantRepository: Send + Sync {
    /// List all plants visible to the configured account
    async fn list_plants(&self) -> Result<Vec<Plant>, BackendError>;

    /// Raw rows for one plant and period, in the wire shape of its resolution
    async fn fetch_telemetry(
        &self,
        plant_id: &str,
        period: &Period,
    ) -> Result<RawTelemetry, BackendError>;

    /// Plant-level aggregates from the dashboard endpoint
    async fn fetch_summary(
        &self,
        plant_id: &str,
        period: &Period,
    ) -> Result<PlantSummary, BackendError>;
}
