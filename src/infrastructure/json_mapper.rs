// Mapper to convert domain models to JSON wire types
use crate::application::selection::{RequestTag, ResolutionState};
use crate::application::streaming_service::StreamMessage;
use crate::domain::pipeline::{ChartState, DayInsights, ResolutionResult};
use crate::domain::plant::Plant;
use crate::domain::resolution::Resolution;
use crate::domain::telemetry::{ChartKind, Dataset, Series};
use crate::domain::units::Headline;
use serde::Serialize;

/// Shown wherever a figure has no data behind it.
pub const NO_DATA: &str = "--";

#[derive(Debug, Serialize)]
pub struct PlantDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ScalarDto {
    pub value: String,
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetDto {
    pub name: String,
    pub kind: &'static str,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChartDto {
    Ready {
        labels: Vec<String>,
        datasets: Vec<DatasetDto>,
    },
    NoData {
        reason: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayInsightsDto {
    pub peak_power: ScalarDto,
    pub peak_time: String,
    pub energy: ScalarDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResultDto {
    pub resolution: &'static str,
    pub period: String,
    pub chart: ChartDto,
    pub summary: ScalarDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<DayInsightsDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTagDto {
    pub resolution: &'static str,
    pub generation: u64,
    pub period: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ResolutionStateDto {
    Idle {
        resolution: &'static str,
    },
    Loading {
        resolution: &'static str,
        period: String,
    },
    Ready {
        resolution: &'static str,
        result: ResolutionResultDto,
    },
    Failed {
        resolution: &'static str,
        period: String,
        error: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessageDto {
    #[serde(rename_all = "camelCase")]
    Skeleton {
        plant_id: String,
        periods: Vec<PeriodDto>,
    },
    ResolutionReady {
        result: ResolutionResultDto,
    },
    ResolutionFailed {
        resolution: &'static str,
        period: String,
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        resolutions: usize,
        failed: usize,
        duration_ms: i64,
    },
}

#[derive(Debug, Serialize)]
pub struct PeriodDto {
    pub resolution: &'static str,
    pub period: String,
}

pub fn plant_to_json(plant: Plant) -> PlantDto {
    PlantDto {
        id: plant.id,
        name: plant.name,
    }
}

pub fn headline_to_json(headline: &Headline) -> ScalarDto {
    ScalarDto {
        value: headline
            .value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| NO_DATA.to_string()),
        unit: headline.unit.clone(),
    }
}

pub fn result_to_json(result: ResolutionResult) -> ResolutionResultDto {
    ResolutionResultDto {
        resolution: result.resolution().as_str(),
        period: result.period.to_string(),
        chart: chart_to_json(result.chart),
        summary: headline_to_json(&result.summary),
        day: result.day.as_ref().map(day_to_json),
    }
}

pub fn tag_to_json(tag: RequestTag) -> RequestTagDto {
    RequestTagDto {
        resolution: tag.resolution.as_str(),
        generation: tag.generation,
        period: tag.period.to_string(),
    }
}

pub fn state_to_json(resolution: Resolution, state: ResolutionState) -> ResolutionStateDto {
    let resolution = resolution.as_str();
    match state {
        ResolutionState::Idle => ResolutionStateDto::Idle { resolution },
        ResolutionState::Loading { period } => ResolutionStateDto::Loading {
            resolution,
            period: period.to_string(),
        },
        ResolutionState::Ready(result) => ResolutionStateDto::Ready {
            resolution,
            result: result_to_json(result),
        },
        ResolutionState::Failed { period, message } => ResolutionStateDto::Failed {
            resolution,
            period: period.to_string(),
            error: message,
        },
    }
}

pub fn stream_message_to_json(msg: StreamMessage) -> StreamMessageDto {
    match msg {
        StreamMessage::Skeleton { plant_id, periods } => StreamMessageDto::Skeleton {
            plant_id,
            periods: periods
                .into_iter()
                .map(|p| PeriodDto {
                    resolution: p.resolution().as_str(),
                    period: p.to_string(),
                })
                .collect(),
        },
        StreamMessage::ResolutionReady(result) => StreamMessageDto::ResolutionReady {
            result: result_to_json(result),
        },
        StreamMessage::ResolutionFailed { period, message } => StreamMessageDto::ResolutionFailed {
            resolution: period.resolution().as_str(),
            period: period.to_string(),
            error: message,
        },
        StreamMessage::Complete {
            resolutions,
            failed,
            duration_ms,
        } => StreamMessageDto::Complete {
            resolutions,
            failed,
            duration_ms,
        },
    }
}

fn chart_to_json(chart: ChartState) -> ChartDto {
    match chart {
        ChartState::Ready(series) => series_to_json(series),
        ChartState::NoData(failure) => ChartDto::NoData {
            reason: failure.to_string(),
        },
    }
}

fn series_to_json(series: Series) -> ChartDto {
    ChartDto::Ready {
        labels: series.labels,
        datasets: series.datasets.into_iter().map(dataset_to_json).collect(),
    }
}

fn dataset_to_json(dataset: Dataset) -> DatasetDto {
    let kind = match dataset.kind {
        ChartKind::Line => "line",
        ChartKind::Bar => "bar",
    };

    DatasetDto {
        name: dataset.name,
        kind,
        data: dataset.values,
    }
}

fn day_to_json(day: &DayInsights) -> DayInsightsDto {
    DayInsightsDto {
        peak_power: headline_to_json(&Headline::power_watts(day.peak.map(|p| p.power_watts))),
        peak_time: day
            .peak
            .map(|p| p.time_label())
            .unwrap_or_else(|| NO_DATA.to_string()),
        energy: headline_to_json(&day.energy_headline()),
    }
}
