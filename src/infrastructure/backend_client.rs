// Upstream REST repository implementation
use crate::application::plant_repository::{BackendError, PlantRepository};
use crate::domain::normalizer::{resolve_number, FieldCandidates};
use crate::domain::plant::{Plant, PlantSummary};
use crate::domain::resolution::Period;
use crate::domain::telemetry::{RawRecord, RawTelemetry};
use crate::infrastructure::config::{prepare_path, BackendSettings, EndpointTemplates};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const MONTHLY_FIELDS: FieldCandidates = &["monthlyProduction", "monthProduction"];
const YEARLY_FIELDS: FieldCandidates = &["yearlyProduction", "yearProduction"];
const TOTAL_FIELDS: FieldCandidates = &["totalProduction", "lifetimeProduction"];

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    token: Option<String>,
    endpoints: EndpointTemplates,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

#[derive(Debug, Deserialize)]
struct PlantPayload {
    #[serde(alias = "plantId")]
    id: String,
    #[serde(default, alias = "plantName")]
    name: Option<String>,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
            endpoints: settings.endpoints.clone(),
            client,
        })
    }

    fn build_url(&self, template: &str, plant_id: Option<&str>, period: Option<&Period>) -> String {
        let mut vars = HashMap::new();
        if let Some(plant_id) = plant_id {
            vars.insert("plant", urlencoding::encode(plant_id).into_owned());
        }
        if let Some(period) = period {
            vars.insert("resolution", period.resolution().as_str().to_string());
        }
        format!("{}{}", self.base_url, prepare_path(template, &vars))
    }

    async fn get_json(&self, url: &str, period: Option<&Period>) -> Result<Value, BackendError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(value) = period.and_then(Period::query_value) {
            request = request.query(&[("period", value)]);
        }

        tracing::debug!("GET {}", url);
        let response = request.send().await.map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn map_request_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Request(err.to_string())
    }
}

/// Rows from a bare array or a `{ "data": [...] }` wrapper. Non-object
/// elements are skipped.
fn records_from(value: Value) -> Result<Vec<RawRecord>, BackendError> {
    let rows = match serde_json::from_value::<Envelope>(value) {
        Ok(Envelope::Bare(rows)) | Ok(Envelope::Wrapped { data: rows }) => rows,
        Err(e) => return Err(BackendError::Decode(e.to_string())),
    };

    let total = rows.len();
    let records: Vec<RawRecord> = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Skipped {} non-object telemetry rows", total - records.len());
    }
    Ok(records)
}

fn plants_from(value: Value) -> Result<Vec<Plant>, BackendError> {
    let rows = match serde_json::from_value::<Envelope>(value) {
        Ok(Envelope::Bare(rows)) | Ok(Envelope::Wrapped { data: rows }) => rows,
        Err(e) => return Err(BackendError::Decode(e.to_string())),
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<PlantPayload>(row) {
            Ok(payload) => Some(Plant::new(payload.id, payload.name)),
            Err(e) => {
                tracing::warn!("Skipping malformed plant entry: {}", e);
                None
            }
        })
        .collect())
}

fn summary_from(value: Value) -> Result<PlantSummary, BackendError> {
    let object = match value {
        Value::Object(map) => match map.get("data") {
            Some(Value::Object(inner)) => inner.clone(),
            _ => map,
        },
        other => {
            return Err(BackendError::Decode(format!(
                "expected a summary object, got {}",
                other
            )));
        }
    };

    Ok(PlantSummary {
        monthly_production_kwh: resolve_number(&object, MONTHLY_FIELDS),
        yearly_production_kwh: resolve_number(&object, YEARLY_FIELDS),
        total_production_kwh: resolve_number(&object, TOTAL_FIELDS),
    })
}

#[async_trait]
impl PlantRepository for BackendClient {
    async fn list_plants(&self) -> Result<Vec<Plant>, BackendError> {
        let url = self.build_url(&self.endpoints.plants, None, None);
        plants_from(self.get_json(&url, None).await?)
    }

    async fn fetch_telemetry(
        &self,
        plant_id: &str,
        period: &Period,
    ) -> Result<RawTelemetry, BackendError> {
        let url = self.build_url(&self.endpoints.telemetry, Some(plant_id), Some(period));
        let records = records_from(self.get_json(&url, Some(period)).await?)?;

        tracing::debug!(
            "Fetched {} {} rows for plant {}",
            records.len(),
            period.resolution(),
            plant_id
        );
        Ok(RawTelemetry::new(*period, records))
    }

    async fn fetch_summary(
        &self,
        plant_id: &str,
        period: &Period,
    ) -> Result<PlantSummary, BackendError> {
        let url = self.build_url(&self.endpoints.summary, Some(plant_id), Some(period));
        summary_from(self.get_json(&url, Some(period)).await?)
    }
}
