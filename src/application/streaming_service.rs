// Streaming overview service - Progressive loading of all four resolutions
use crate::application::resolution_service::ResolutionService;
use crate::domain::pipeline::ResolutionResult;
use crate::domain::resolution::{Period, Resolution};
use chrono::NaiveDate;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Sent first so the client can lay out every tab before data arrives.
    Skeleton { plant_id: String, periods: Vec<Period> },
    ResolutionReady(ResolutionResult),
    ResolutionFailed { period: Period, message: String },
    Complete {
        resolutions: usize,
        failed: usize,
        duration_ms: i64,
    },
}

#[derive(Clone)]
pub struct StreamingOverviewService {
    resolution_service: ResolutionService,
}

impl StreamingOverviewService {
    pub fn new(resolution_service: ResolutionService) -> Self {
        Self { resolution_service }
    }

    /// Load every resolution around `date` concurrently.
    ///
    /// Each resolution reports on its own as soon as it finishes; a failure
    /// in one never cancels the others.
    pub fn stream_overview(
        &self,
        plant_id: &str,
        date: NaiveDate,
    ) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(16);
        let start_time = Instant::now();

        let periods: Vec<Period> = Resolution::ALL
            .iter()
            .map(|resolution| Period::anchored(*resolution, date))
            .collect();

        // 1. Skeleton goes out before any fetch is issued
        let skeleton = StreamMessage::Skeleton {
            plant_id: plant_id.to_string(),
            periods: periods.clone(),
        };
        if tx.try_send(skeleton).is_err() {
            tracing::warn!("Overview receiver for {} closed before skeleton", plant_id);
        }

        // 2. One task per resolution
        let mut handles = Vec::with_capacity(periods.len());
        for period in periods {
            let tx = tx.clone();
            let service = self.resolution_service.clone();
            let plant_id = plant_id.to_string();

            handles.push(tokio::spawn(async move {
                let (msg, ok) = match service.load(&plant_id, period).await {
                    Ok(result) => (StreamMessage::ResolutionReady(result), true),
                    Err(e) => {
                        tracing::error!("Overview {} fetch failed for {}: {}", period, plant_id, e);
                        let msg = StreamMessage::ResolutionFailed {
                            period,
                            message: e.to_string(),
                        };
                        (msg, false)
                    }
                };
                let _ = tx.send(msg).await;
                ok
            }));
        }

        // 3. Completion once every resolution has reported
        tokio::spawn(async move {
            let resolutions = handles.len();
            let outcomes = futures::future::join_all(handles).await;
            let failed = outcomes
                .into_iter()
                .filter(|outcome| !matches!(outcome, Ok(true)))
                .count();

            let complete = StreamMessage::Complete {
                resolutions,
                failed,
                duration_ms: start_time.elapsed().as_millis() as i64,
            };
            let _ = tx.send(complete).await;
        });

        rx
    }
}
