// Selection service - Latest-request-wins state per plant and resolution
use crate::application::resolution_service::ResolutionService;
use crate::domain::pipeline::ResolutionResult;
use crate::domain::resolution::{Period, Resolution};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Identifies one fetch: which tab, which period, and how new it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag {
    pub resolution: Resolution,
    pub generation: u64,
    pub period: Period,
}

/// Per-resolution request counters. Only the newest tag is current.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    generations: [AtomicU64; 4],
}

impl GenerationTracker {
    pub fn begin(&self, period: Period) -> RequestTag {
        let resolution = period.resolution();
        let generation = self.generations[resolution.index()].fetch_add(1, Ordering::SeqCst) + 1;
        RequestTag {
            resolution,
            generation,
            period,
        }
    }

    pub fn is_current(&self, tag: &RequestTag) -> bool {
        self.generations[tag.resolution.index()].load(Ordering::SeqCst) == tag.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState {
    Idle,
    Loading { period: Period },
    Ready(ResolutionResult),
    Failed { period: Period, message: String },
}

#[derive(Default)]
struct SessionInner {
    states: HashMap<Resolution, ResolutionState>,
    tasks: HashMap<Resolution, AbortHandle>,
}

/// Screen state for one plant.
#[derive(Default)]
pub struct ViewSession {
    tracker: GenerationTracker,
    inner: Mutex<SessionInner>,
}

impl ViewSession {
    /// Store a finished fetch unless a newer one was issued since.
    pub async fn commit(&self, tag: RequestTag, state: ResolutionState) -> bool {
        let mut inner = self.inner.lock().await;
        if !self.tracker.is_current(&tag) {
            tracing::debug!(
                "Discarding stale {} result (generation {}, period {})",
                tag.resolution,
                tag.generation,
                tag.period
            );
            return false;
        }
        inner.states.insert(tag.resolution, state);
        inner.tasks.remove(&tag.resolution);
        true
    }

    /// Abort every fetch still running for this plant.
    async fn abort_pending(&self) {
        let mut inner = self.inner.lock().await;
        for (_, task) in inner.tasks.drain() {
            task.abort();
        }
    }

    pub async fn snapshot(&self) -> Vec<(Resolution, ResolutionState)> {
        let inner = self.inner.lock().await;
        Resolution::ALL
            .iter()
            .map(|resolution| {
                let state = inner
                    .states
                    .get(resolution)
                    .cloned()
                    .unwrap_or(ResolutionState::Idle);
                (*resolution, state)
            })
            .collect()
    }
}

/// How many plant views are remembered and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_ttl: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 256,
            idle_ttl: Duration::from_secs(30 * 60),
        }
    }
}

struct SessionEntry {
    session: Arc<ViewSession>,
    last_selected: Instant,
}

#[derive(Clone)]
pub struct SelectionService {
    resolution_service: ResolutionService,
    limits: SessionLimits,
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl SelectionService {
    pub fn new(resolution_service: ResolutionService, limits: SessionLimits) -> Self {
        Self {
            resolution_service,
            limits,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Switch a plant's tab to `period` and start fetching it.
    ///
    /// Any fetch still running for the same resolution is aborted, and its
    /// result would be discarded on arrival anyway. Other resolutions are
    /// left alone.
    pub async fn select(&self, plant_id: &str, period: Period) -> RequestTag {
        let session = self.session(plant_id).await;
        let mut inner = session.inner.lock().await;

        let tag = session.tracker.begin(period);
        inner
            .states
            .insert(tag.resolution, ResolutionState::Loading { period });

        let service = self.resolution_service.clone();
        let task_session = session.clone();
        let plant = plant_id.to_string();
        let handle = tokio::spawn(async move {
            let state = match service.load(&plant, period).await {
                Ok(result) => ResolutionState::Ready(result),
                Err(e) => {
                    tracing::error!("{} fetch for {} failed: {}", period, plant, e);
                    ResolutionState::Failed {
                        period,
                        message: e.to_string(),
                    }
                }
            };
            task_session.commit(tag, state).await;
        });

        if let Some(previous) = inner.tasks.insert(tag.resolution, handle.abort_handle()) {
            previous.abort();
        }

        tracing::debug!(
            "Selected {} for plant {} (generation {})",
            period,
            plant_id,
            tag.generation
        );
        tag
    }

    /// Per-resolution state of a plant's view. Views idle past the TTL read
    /// as idle even before they are evicted.
    pub async fn snapshot(&self, plant_id: &str) -> Vec<(Resolution, ResolutionState)> {
        let now = Instant::now();
        let existing = self
            .sessions
            .read()
            .await
            .get(plant_id)
            .filter(|entry| !self.expired(entry, now))
            .map(|entry| entry.session.clone());
        match existing {
            Some(session) => session.snapshot().await,
            None => Resolution::ALL
                .iter()
                .map(|resolution| (*resolution, ResolutionState::Idle))
                .collect(),
        }
    }

    async fn session(&self, plant_id: &str) -> Arc<ViewSession> {
        let now = Instant::now();
        let (session, evicted) = {
            let mut sessions = self.sessions.write().await;
            let current = sessions
                .get_mut(plant_id)
                .filter(|entry| !self.expired(entry, now))
                .map(|entry| {
                    entry.last_selected = now;
                    entry.session.clone()
                });
            match current {
                Some(session) => (session, Vec::new()),
                None => {
                    let expired = sessions.remove(plant_id);
                    let mut evicted = self.evict(&mut sessions, now);
                    evicted.extend(expired.map(|entry| entry.session));
                    let session = Arc::new(ViewSession::default());
                    sessions.insert(
                        plant_id.to_string(),
                        SessionEntry {
                            session: session.clone(),
                            last_selected: now,
                        },
                    );
                    (session, evicted)
                }
            }
        };

        for stale in evicted {
            stale.abort_pending().await;
        }
        session
    }

    fn expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.duration_since(entry.last_selected) >= self.limits.idle_ttl
    }

    /// Drop idle views, then the least recently selected ones until there
    /// is room for one more.
    fn evict(
        &self,
        sessions: &mut HashMap<String, SessionEntry>,
        now: Instant,
    ) -> Vec<Arc<ViewSession>> {
        let mut evicted = Vec::new();
        sessions.retain(|_, entry| {
            let keep = !self.expired(entry, now);
            if !keep {
                evicted.push(entry.session.clone());
            }
            keep
        });

        while !sessions.is_empty() && sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_selected)
                .map(|(id, _)| id.clone());
            match oldest.and_then(|id| sessions.remove(&id)) {
                Some(entry) => evicted.push(entry.session),
                None => break,
            }
        }

        if !evicted.is_empty() {
            tracing::debug!(
                "Evicted {} plant views ({} remain)",
                evicted.len(),
                sessions.len()
            );
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{records, FakeRepository};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn day(d: u32) -> Period {
        Period::Day(NaiveDate::from_ymd_opt(2024, 6, d).unwrap())
    }

    fn service_with(repository: FakeRepository, limits: SessionLimits) -> SelectionService {
        SelectionService::new(ResolutionService::new(Arc::new(repository)), limits)
    }

    async fn remembered(service: &SelectionService) -> Vec<String> {
        let mut ids: Vec<String> = service.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn wait_until_settled(
        service: &SelectionService,
        plant_id: &str,
    ) -> Vec<(Resolution, ResolutionState)> {
        for _ in 0..200 {
            let snapshot = service.snapshot(plant_id).await;
            if !snapshot
                .iter()
                .any(|(_, s)| matches!(s, ResolutionState::Loading { .. }))
            {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("selection never settled");
    }

    fn state_of(
        snapshot: &[(Resolution, ResolutionState)],
        resolution: Resolution,
    ) -> &ResolutionState {
        &snapshot.iter().find(|(r, _)| *r == resolution).unwrap().1
    }

    #[test]
    fn test_tracker_only_latest_is_current() {
        let tracker = GenerationTracker::default();
        let first = tracker.begin(day(1));
        let second = tracker.begin(day(2));
        let month = tracker.begin(Period::Month { year: 2024, month: 6 });

        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(tracker.is_current(&month));
        assert_eq!(second.generation, 2);
        assert_eq!(month.generation, 1);
    }

    #[tokio::test]
    async fn test_stale_commit_is_discarded() {
        let session = ViewSession::default();
        let first = session.tracker.begin(day(1));
        let second = session.tracker.begin(day(2));

        let stale = ResolutionState::Failed {
            period: day(1),
            message: "late".to_string(),
        };
        assert!(!session.commit(first, stale).await);
        assert!(session.commit(second, ResolutionState::Loading { period: day(2) }).await);

        let snapshot = session.snapshot().await;
        assert_eq!(
            state_of(&snapshot, Resolution::Day),
            &ResolutionState::Loading { period: day(2) }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_selection_wins() {
        let repository = FakeRepository::default()
            .with_records(day(1), records(json!([{"timeMinutes": 600, "PvProduction": 111}])))
            .with_records(day(2), records(json!([{"timeMinutes": 600, "PvProduction": 222}])))
            .with_delay(day(1), Duration::from_millis(150));
        let service = service_with(repository, SessionLimits::default());

        service.select("plant-1", day(1)).await;
        let latest = service.select("plant-1", day(2)).await;
        assert_eq!(latest.generation, 2);

        tokio::time::sleep(Duration::from_millis(250)).await;
        let snapshot = wait_until_settled(&service, "plant-1").await;
        match state_of(&snapshot, Resolution::Day) {
            ResolutionState::Ready(result) => {
                assert_eq!(result.period, day(2));
                assert_eq!(result.summary.value, Some(222.0));
            }
            other => panic!("unexpected day state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolutions_are_independent() {
        let repository = FakeRepository::default()
            .with_records(day(3), records(json!([{"timeMinutes": 600, "PvProduction": 50}])))
            .failing(Resolution::Month);
        let service = service_with(repository, SessionLimits::default());

        service.select("plant-1", day(3)).await;
        service
            .select("plant-1", Period::Month { year: 2024, month: 6 })
            .await;

        let snapshot = wait_until_settled(&service, "plant-1").await;
        assert!(matches!(state_of(&snapshot, Resolution::Day), ResolutionState::Ready(_)));
        assert!(matches!(
            state_of(&snapshot, Resolution::Month),
            ResolutionState::Failed { .. }
        ));
        assert_eq!(state_of(&snapshot, Resolution::Year), &ResolutionState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_plant_is_idle() {
        let service = service_with(FakeRepository::default(), SessionLimits::default());
        let snapshot = service.snapshot("nowhere").await;
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.iter().all(|(_, s)| *s == ResolutionState::Idle));
        assert!(remembered(&service).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_views_expire() {
        let limits = SessionLimits {
            max_sessions: 16,
            idle_ttl: Duration::from_secs(60),
        };
        let service = service_with(FakeRepository::default(), limits);

        service.select("plant-a", Period::Total).await;
        let settled = wait_until_settled(&service, "plant-a").await;
        assert!(matches!(state_of(&settled, Resolution::Total), ResolutionState::Ready(_)));

        tokio::time::advance(Duration::from_secs(61)).await;
        let expired = service.snapshot("plant-a").await;
        assert!(expired.iter().all(|(_, s)| *s == ResolutionState::Idle));

        service.select("plant-b", Period::Total).await;
        assert_eq!(remembered(&service).await, vec!["plant-b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_count_is_capped() {
        let limits = SessionLimits {
            max_sessions: 2,
            idle_ttl: Duration::from_secs(3600),
        };
        let service = service_with(FakeRepository::default(), limits);

        for i in 0..1000 {
            service.select(&format!("unknown-{i}"), Period::Total).await;
            tokio::time::advance(Duration::from_millis(1)).await;
        }
        assert_eq!(
            remembered(&service).await,
            vec!["unknown-998".to_string(), "unknown-999".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cap_evicts_least_recently_selected() {
        let limits = SessionLimits {
            max_sessions: 2,
            idle_ttl: Duration::from_secs(3600),
        };
        let service = service_with(FakeRepository::default(), limits);

        service.select("plant-a", Period::Total).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        service.select("plant-b", Period::Total).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        service.select("plant-a", Period::Year(2024)).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        service.select("plant-c", Period::Total).await;

        assert_eq!(
            remembered(&service).await,
            vec!["plant-a".to_string(), "plant-c".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_view_stops_fetching() {
        let limits = SessionLimits {
            max_sessions: 1,
            idle_ttl: Duration::from_secs(3600),
        };
        let repository = FakeRepository::default().with_delay(day(4), Duration::from_secs(30));
        let service = service_with(repository, limits);

        service.select("plant-a", day(4)).await;
        let evicted = service.sessions.read().await["plant-a"].session.clone();
        service.select("plant-b", Period::Total).await;

        tokio::time::advance(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        let snapshot = evicted.snapshot().await;
        assert_eq!(
            state_of(&snapshot, Resolution::Day),
            &ResolutionState::Loading { period: day(4) }
        );
        assert!(evicted.inner.lock().await.tasks.is_empty());
    }
}
