//! Search lifecycle coordinator: tracks one search from submission to a terminal state.
//!
//! State lives in a `watch` channel and every transition replaces the whole snapshot, so a
//! subscriber never sees a status without the matches that belong to it. Each submit or reset
//! bumps a generation counter under the same lock that guards the poll timer; results from an
//! older generation are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::models::job_match::JobMatch;
use crate::models::search::SearchStatus;
use crate::search::backend::SearchBackend;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const TERMINAL_FAILURE_MESSAGE: &str = "Search failed. Please try again.";
pub const SUBMIT_FAILURE_MESSAGE: &str = "Failed to start search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    Idle,
    Pending,
    Completed,
    Failed,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPhase::Idle => "idle",
            SearchPhase::Pending => "pending",
            SearchPhase::Completed => "completed",
            SearchPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchPhase::Completed | SearchPhase::Failed)
    }
}

/// What callers observe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub search_id: Option<String>,
    pub status: SearchPhase,
    pub matches: Vec<JobMatch>,
    pub error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::idle()
    }
}

impl SearchState {
    pub fn idle() -> Self {
        Self {
            search_id: None,
            status: SearchPhase::Idle,
            matches: Vec::new(),
            error: None,
        }
    }

    fn pending(search_id: Option<String>) -> Self {
        Self {
            search_id,
            status: SearchPhase::Pending,
            ..Self::idle()
        }
    }

    fn completed(search_id: String, matches: Vec<JobMatch>) -> Self {
        Self {
            search_id: Some(search_id),
            status: SearchPhase::Completed,
            matches,
            error: None,
        }
    }

    fn failed(search_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            search_id,
            status: SearchPhase::Failed,
            matches: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("Search query cannot be empty")]
    EmptyQuery,
}

struct Timer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

struct Core<B> {
    backend: Arc<B>,
    state: watch::Sender<SearchState>,
    timer: Mutex<Timer>,
    poll_interval: Duration,
}

impl<B: SearchBackend> Core<B> {
    fn lock(&self) -> MutexGuard<'_, Timer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Cancels whatever is running and opens a new generation in `next`.
    fn restart(&self, next: SearchState) -> u64 {
        let mut timer = self.lock();
        timer.cancel();
        timer.generation += 1;
        self.state.send_replace(next);
        timer.generation
    }

    /// Applies `next` if `generation` is still current and the search has not settled.
    /// Terminal states stop the poll timer in the same step.
    fn commit(&self, generation: u64, next: SearchState) -> bool {
        let mut timer = self.lock();
        if timer.generation != generation || self.state.borrow().status != SearchPhase::Pending {
            debug!("Discarding stale search result (generation {generation})");
            return false;
        }
        if next.status.is_terminal() {
            timer.cancel();
        }
        info!(
            "Search {} is {}",
            next.search_id.as_deref().unwrap_or("-"),
            next.status.as_str()
        );
        self.state.send_replace(next);
        true
    }

    fn start_polling(core: &Arc<Self>, generation: u64, search_id: String) {
        let mut timer = core.lock();
        if timer.generation != generation || core.state.borrow().status != SearchPhase::Pending {
            return;
        }
        core.state
            .send_modify(|state| state.search_id = Some(search_id.clone()));
        timer.cancel();
        debug!(
            "Polling search {search_id} every {}ms",
            core.poll_interval.as_millis()
        );
        timer.handle = Some(tokio::spawn(run_poller(
            Arc::downgrade(core),
            generation,
            search_id,
            core.poll_interval,
        )));
    }

    async fn poll_once(&self, generation: u64, search_id: &str) {
        let next = match self.backend.poll(search_id).await {
            Ok(reply) => match reply.status {
                SearchStatus::Pending => {
                    debug!("Search {search_id} still pending");
                    return;
                }
                SearchStatus::Completed => {
                    SearchState::completed(search_id.to_string(), reply.matches.unwrap_or_default())
                }
                SearchStatus::Failed => {
                    SearchState::failed(Some(search_id.to_string()), TERMINAL_FAILURE_MESSAGE)
                }
            },
            Err(e) => {
                warn!("Polling search {search_id} failed: {e}");
                SearchState::failed(Some(search_id.to_string()), e.user_message())
            }
        };
        self.commit(generation, next);
    }
}

/// Ticks every `interval`, spawning each status request so a slow one never holds back the
/// next tick. Aborting this task drops the `JoinSet` and with it every in-flight request.
async fn run_poller<B: SearchBackend>(
    core: Weak<Core<B>>,
    generation: u64,
    search_id: String,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(core) = core.upgrade() else { break };
                if !core.is_current(generation) {
                    break;
                }
                let search_id = search_id.clone();
                in_flight.spawn(async move { core.poll_once(generation, &search_id).await });
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
}

/// Drives one search at a time against a [`SearchBackend`].
///
/// Dropping the coordinator cancels its poll timer.
pub struct SearchCoordinator<B: SearchBackend> {
    core: Arc<Core<B>>,
}

impl<B: SearchBackend> SearchCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self::with_interval(backend, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(backend: B, poll_interval: Duration) -> Self {
        Self::from_shared(Arc::new(backend), poll_interval)
    }

    pub fn from_shared(backend: Arc<B>, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::idle());
        Self {
            core: Arc::new(Core {
                backend,
                state,
                timer: Mutex::new(Timer {
                    generation: 0,
                    handle: None,
                }),
                poll_interval,
            }),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> SearchState {
        self.core.state.borrow().clone()
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.core.state.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.core
            .lock()
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Starts a new search, abandoning any previous one.
    ///
    /// Returns the state once the submission settles: terminal if the job store resolved or
    /// rejected it, `pending` if polling has started.
    pub async fn submit(
        &self,
        query: &str,
        filters: Option<Value>,
    ) -> Result<SearchState, CoordinatorError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoordinatorError::EmptyQuery);
        }

        let generation = self.core.restart(SearchState::pending(None));
        info!("Submitting search for '{query}'");

        let response = match self.core.backend.submit(query, filters.as_ref()).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Search submission failed: {e}");
                self.core
                    .commit(generation, SearchState::failed(None, e.user_message()));
                return Ok(self.state());
            }
        };

        let search_id = response.search_id.filter(|id| !id.trim().is_empty());
        if !response.success {
            let message = response
                .error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| SUBMIT_FAILURE_MESSAGE.to_string());
            warn!("Job store rejected search: {message}");
            self.core
                .commit(generation, SearchState::failed(search_id, message));
            return Ok(self.state());
        }
        let Some(search_id) = search_id else {
            warn!("Job store accepted search without an id");
            self.core
                .commit(generation, SearchState::failed(None, SUBMIT_FAILURE_MESSAGE));
            return Ok(self.state());
        };

        match response.status.unwrap_or(SearchStatus::Pending) {
            SearchStatus::Completed => {
                let next = match self.core.backend.fetch_matches(&search_id).await {
                    Ok(matches) => SearchState::completed(search_id, matches),
                    Err(e) => {
                        warn!("Fetching matches for search {search_id} failed: {e}");
                        SearchState::failed(Some(search_id), e.user_message())
                    }
                };
                self.core.commit(generation, next);
            }
            SearchStatus::Failed => {
                self.core.commit(
                    generation,
                    SearchState::failed(Some(search_id), TERMINAL_FAILURE_MESSAGE),
                );
            }
            SearchStatus::Pending => Core::start_polling(&self.core, generation, search_id),
        }

        Ok(self.state())
    }

    /// Back to idle. Safe to call in any state, any number of times.
    pub fn reset(&self) {
        self.core.restart(SearchState::idle());
    }
}

impl<B: SearchBackend> Drop for SearchCoordinator<B> {
    fn drop(&mut self) {
        let mut timer = self.core.lock();
        timer.cancel();
        timer.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::search::backend::BackendError;
    use crate::search::wire::{PollReply, SubmitResponse};

    const INTERVAL: Duration = Duration::from_secs(3);

    fn job(title: &str) -> JobMatch {
        JobMatch {
            id: "m1".to_string(),
            search_id: "s1".to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: None,
            url: None,
            posted_date: None,
            description: None,
            keyword_score: 80.0,
            semantic_score: None,
            composite_score: 80,
            gap_analysis: None,
        }
    }

    fn accepted(id: &str, status: SearchStatus) -> Result<SubmitResponse, BackendError> {
        Ok(SubmitResponse {
            success: true,
            search_id: Some(id.to_string()),
            status: Some(status),
            error: None,
        })
    }

    fn reply(status: SearchStatus, matches: Option<Vec<JobMatch>>) -> Result<PollReply, BackendError> {
        Ok(PollReply { status, matches })
    }

    #[derive(Default)]
    struct MockBackend {
        submits: Mutex<HashMap<String, Result<SubmitResponse, BackendError>>>,
        polls: Mutex<HashMap<String, VecDeque<Result<PollReply, BackendError>>>>,
        poll_counts: Mutex<HashMap<String, usize>>,
        poll_delay: Mutex<Option<Duration>>,
        matches: Mutex<Option<Result<Vec<JobMatch>, BackendError>>>,
    }

    impl MockBackend {
        fn on_submit(&self, query: &str, response: Result<SubmitResponse, BackendError>) {
            self.submits.lock().unwrap().insert(query.to_string(), response);
        }

        fn on_poll(&self, id: &str, replies: Vec<Result<PollReply, BackendError>>) {
            self.polls.lock().unwrap().insert(id.to_string(), replies.into());
        }

        fn polls_for(&self, id: &str) -> usize {
            self.poll_counts.lock().unwrap().get(id).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn submit(
            &self,
            query: &str,
            _filters: Option<&Value>,
        ) -> Result<SubmitResponse, BackendError> {
            self.submits
                .lock()
                .unwrap()
                .get(query)
                .cloned()
                .unwrap_or_else(|| Err(BackendError::Network("no route".into())))
        }

        async fn poll(&self, search_id: &str) -> Result<PollReply, BackendError> {
            *self
                .poll_counts
                .lock()
                .unwrap()
                .entry(search_id.to_string())
                .or_default() += 1;
            let delay = *self.poll_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.polls
                .lock()
                .unwrap()
                .get_mut(search_id)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| reply(SearchStatus::Pending, None))
        }

        async fn fetch_matches(&self, _search_id: &str) -> Result<Vec<JobMatch>, BackendError> {
            self.matches
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn coordinator(backend: &Arc<MockBackend>) -> SearchCoordinator<MockBackend> {
        SearchCoordinator::from_shared(Arc::clone(backend), INTERVAL)
    }

    /// Lets the paused clock run forward, executing every timer and task due on the way.
    async fn wait(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolved_submit_commits_status_with_matches() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("react developer", accepted("s1", SearchStatus::Completed));
        *backend.matches.lock().unwrap() = Some(Ok(vec![job("Senior Developer")]));
        let coordinator = coordinator(&backend);

        let mut rx = coordinator.subscribe();
        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                let done = state.status.is_terminal();
                seen.push(state);
                if done {
                    break;
                }
            }
            seen
        });

        let state = coordinator
            .submit("react developer", Some(json!({"remote": true})))
            .await
            .unwrap();

        assert_eq!(state.status, SearchPhase::Completed);
        assert_eq!(state.search_id.as_deref(), Some("s1"));
        assert_eq!(state.matches.len(), 1);
        assert_eq!(state.matches[0].title, "Senior Developer");
        assert!(state.error.is_none());
        assert!(!coordinator.is_polling());
        assert_eq!(backend.polls_for("s1"), 0);

        let seen = observer.await.unwrap();
        assert!(seen
            .iter()
            .all(|s| s.status != SearchPhase::Completed || !s.matches.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_on_submit_fails_without_polling() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit(
            "rust",
            Err(BackendError::Network("connection refused".into())),
        );
        let coordinator = coordinator(&backend);

        let state = coordinator.submit("rust", None).await.unwrap();

        assert_eq!(state.status, SearchPhase::Failed);
        assert!(state.error.as_deref().unwrap().starts_with("Network error"));
        assert!(state.matches.is_empty());
        assert!(!coordinator.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsuccessful_payload_uses_job_store_message() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit(
            "rust",
            Ok(SubmitResponse {
                success: false,
                error: Some("Quota exceeded".into()),
                ..Default::default()
            }),
        );
        backend.on_submit("go", Ok(SubmitResponse::default()));
        let coordinator = coordinator(&backend);

        let state = coordinator.submit("rust", None).await.unwrap();
        assert_eq!(state.error.as_deref(), Some("Quota exceeded"));

        let state = coordinator.submit("go", None).await.unwrap();
        assert_eq!(state.status, SearchPhase::Failed);
        assert_eq!(state.error.as_deref(), Some(SUBMIT_FAILURE_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_error_carries_job_store_message() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit(
            "rust",
            Err(BackendError::Status {
                status: 502,
                message: Some("Job store unavailable".into()),
            }),
        );
        let coordinator = coordinator(&backend);

        let state = coordinator.submit("rust", None).await.unwrap();
        assert_eq!(state.error.as_deref(), Some("Job store unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_match_fetch_marks_search_failed() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Completed));
        *backend.matches.lock().unwrap() = Some(Err(BackendError::Network("reset".into())));
        let coordinator = coordinator(&backend);

        let state = coordinator.submit("rust", None).await.unwrap();
        assert_eq!(state.status, SearchPhase::Failed);
        assert_eq!(state.search_id.as_deref(), Some("s1"));
        assert!(state.matches.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_pending_completed_stops_polling() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        backend.on_poll(
            "s1",
            vec![
                reply(SearchStatus::Pending, None),
                reply(SearchStatus::Pending, None),
                reply(SearchStatus::Completed, Some(vec![job("Rust Engineer")])),
            ],
        );
        let coordinator = coordinator(&backend);

        let state = coordinator.submit("rust", None).await.unwrap();
        assert_eq!(state.status, SearchPhase::Pending);
        assert_eq!(state.search_id.as_deref(), Some("s1"));
        assert!(coordinator.is_polling());

        wait(Duration::from_millis(3100)).await;
        assert_eq!(backend.polls_for("s1"), 1);
        assert_eq!(coordinator.state().status, SearchPhase::Pending);

        wait(Duration::from_secs(6)).await;
        assert_eq!(backend.polls_for("s1"), 3);
        let state = coordinator.state();
        assert_eq!(state.status, SearchPhase::Completed);
        assert_eq!(state.matches.len(), 1);
        assert!(!coordinator.is_polling());

        wait(Duration::from_secs(9)).await;
        assert_eq!(backend.polls_for("s1"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_poll_without_matches_is_empty() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        backend.on_poll("s1", vec![reply(SearchStatus::Completed, None)]);
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        wait(Duration::from_millis(3100)).await;

        let state = coordinator.state();
        assert_eq!(state.status, SearchPhase::Completed);
        assert!(state.matches.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_uses_terminal_message() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        backend.on_poll("s1", vec![reply(SearchStatus::Failed, None)]);
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        wait(Duration::from_millis(3100)).await;

        let state = coordinator.state();
        assert_eq!(state.status, SearchPhase::Failed);
        assert_eq!(state.error.as_deref(), Some(TERMINAL_FAILURE_MESSAGE));
        assert!(!coordinator.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_transport_failure_is_terminal() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        backend.on_poll(
            "s1",
            vec![Err(BackendError::Network("connection reset".into()))],
        );
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        wait(Duration::from_secs(10)).await;

        let state = coordinator.state();
        assert_eq!(state.status, SearchPhase::Failed);
        assert_eq!(state.error.as_deref(), Some("Network error: connection reset"));
        assert_eq!(backend.polls_for("s1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_leaves_one_timer() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("first", accepted("a", SearchStatus::Pending));
        backend.on_submit("second", accepted("b", SearchStatus::Pending));
        let coordinator = coordinator(&backend);

        coordinator.submit("first", None).await.unwrap();
        wait(Duration::from_millis(3100)).await;
        assert_eq!(backend.polls_for("a"), 1);

        let state = coordinator.submit("second", None).await.unwrap();
        assert_eq!(state.search_id.as_deref(), Some("b"));

        wait(Duration::from_millis(6500)).await;
        assert_eq!(backend.polls_for("a"), 1);
        assert_eq!(backend.polls_for("b"), 2);
        assert!(coordinator.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_poll_does_not_block_next_tick() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        *backend.poll_delay.lock().unwrap() = Some(Duration::from_secs(10));
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        wait(Duration::from_millis(6100)).await;

        assert_eq!(backend.polls_for("s1"), 2);
        assert_eq!(coordinator.state().status, SearchPhase::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_returns_to_idle_and_stops_polling() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        wait(Duration::from_millis(3100)).await;
        coordinator.reset();

        assert_eq!(coordinator.state(), SearchState::idle());
        assert!(!coordinator.is_polling());

        wait(Duration::from_secs(9)).await;
        assert_eq!(backend.polls_for("s1"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_in_flight_result() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        backend.on_poll(
            "s1",
            vec![reply(SearchStatus::Completed, Some(vec![job("Late")]))],
        );
        *backend.poll_delay.lock().unwrap() = Some(Duration::from_secs(1));
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        wait(Duration::from_millis(3500)).await;
        assert_eq!(backend.polls_for("s1"), 1);
        coordinator.reset();

        wait(Duration::from_secs(2)).await;
        assert_eq!(coordinator.state(), SearchState::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_is_idempotent() {
        let backend = Arc::new(MockBackend::default());
        let coordinator = coordinator(&backend);

        coordinator.reset();
        coordinator.reset();

        let state = coordinator.state();
        assert!(state.search_id.is_none());
        assert_eq!(state.status, SearchPhase::Idle);
        assert!(state.matches.is_empty());
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_polling() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Pending));
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        drop(coordinator);

        wait(Duration::from_secs(10)).await;
        assert_eq!(backend.polls_for("s1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_is_rejected_without_state_change() {
        let backend = Arc::new(MockBackend::default());
        let coordinator = coordinator(&backend);

        assert_eq!(
            coordinator.submit("   ", None).await,
            Err(CoordinatorError::EmptyQuery)
        );
        assert_eq!(coordinator.state(), SearchState::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submit_clears_previous_matches() {
        let backend = Arc::new(MockBackend::default());
        backend.on_submit("rust", accepted("s1", SearchStatus::Completed));
        backend.on_submit("go", accepted("s2", SearchStatus::Pending));
        *backend.matches.lock().unwrap() = Some(Ok(vec![job("Rust Engineer")]));
        let coordinator = coordinator(&backend);

        coordinator.submit("rust", None).await.unwrap();
        let state = coordinator.submit("go", None).await.unwrap();

        assert_eq!(state.status, SearchPhase::Pending);
        assert!(state.matches.is_empty());
        assert!(state.error.is_none());
    }
}
