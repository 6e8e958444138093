// HTTP request handlers
use crate::domain::resolution::{Period, PeriodError, Resolution};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::ApiError;
use crate::infrastructure::json_mapper::{
    plant_to_json, result_to_json, state_to_json, tag_to_json, PlantDto, RequestTagDto,
    ResolutionResultDto, ResolutionStateDto,
};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Deserialize)]
pub struct OverviewQuery {
    pub date: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all plants
pub async fn list_plants(State(state): State<Arc<AppState>>) -> Json<Vec<PlantDto>> {
    match state.plant_service.list_plants().await {
        Ok(plants) => Json(plants.into_iter().map(plant_to_json).collect()),
        Err(e) => {
            tracing::error!("Error fetching plants: {}", e);
            // Return empty list on error
            Json(Vec::new())
        }
    }
}

/// One resolution for one plant
pub async fn get_resolution(
    Path((id, resolution)): Path<(String, String)>,
    Query(query): Query<PeriodQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResolutionResultDto>, ApiError> {
    let period = parse_period(&resolution, query.period.as_deref())?;
    let result = state.resolution_service.load(&id, period).await?;
    Ok(Json(result_to_json(result)))
}

/// Stream all four resolutions around one date (progressive loading)
pub async fn stream_overview(
    Path(id): Path<String>,
    Query(query): Query<OverviewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let date = match query.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            PeriodError::Invalid {
                resolution: Resolution::Day,
                value: raw.to_string(),
            }
        })?,
        None => today(),
    };

    let rx = state.streaming_service.stream_overview(&id, date);
    Ok(stream_from_receiver(rx))
}

/// Switch a tab's selection; the fetch completes in the background
pub async fn select_view(
    Path((id, resolution)): Path<(String, String)>,
    Query(query): Query<PeriodQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<RequestTagDto>), ApiError> {
    let period = parse_period(&resolution, query.period.as_deref())?;
    let tag = state.selection_service.select(&id, period).await;
    Ok((StatusCode::ACCEPTED, Json(tag_to_json(tag))))
}

/// Current state of every tab for a plant
pub async fn view_snapshot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ResolutionStateDto>> {
    let snapshot = state.selection_service.snapshot(&id).await;
    Json(
        snapshot
            .into_iter()
            .map(|(resolution, s)| state_to_json(resolution, s))
            .collect(),
    )
}

fn parse_period(resolution: &str, period: Option<&str>) -> Result<Period, PeriodError> {
    let resolution: Resolution = resolution.parse()?;
    Period::parse(resolution, period)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_from_path() {
        assert_eq!(
            parse_period("year", Some("2022")).unwrap(),
            Period::Year(2022)
        );
        assert!(matches!(
            parse_period("week", Some("2022")),
            Err(PeriodError::UnknownResolution(_))
        ));
        assert!(matches!(
            parse_period("month", None),
            Err(PeriodError::Missing(Resolution::Month))
        ));
    }
}
