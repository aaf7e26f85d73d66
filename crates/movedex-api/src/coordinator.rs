//! Owns the result area and the lifecycle of lookup sessions
//!
//! `select` cancels whatever is in flight and starts a new session on a
//! background thread. Outcomes come back over a channel and are applied by
//! `poll` on the owning thread, after checking that the session is still the
//! active one.
//!
//! Each session gets its own fetch pool. A superseded session may still be
//! stuck in blocking requests, and those must never hold up its successor.

use crate::client::MoveApi;
use crate::render::{render_cards, Card};
use crate::session::{
    run_session, CancelToken, SessionError, SessionOutcome, SessionState, DEPENDENT_LIMIT,
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Display state for lookup results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultArea {
    /// Loading indicator; when set, `cards` is empty
    pub loading: bool,
    pub cards: Vec<Card>,
    /// At most one error message, replaced by each failed session
    pub error: Option<String>,
    /// Name selected by the session that last wrote to this area
    pub owner: Option<String>,
}

struct ActiveSession {
    id: u64,
    name: String,
    token: CancelToken,
    state: SessionState,
}

/// Outcome sent from a session thread
struct SessionEvent {
    id: u64,
    outcome: SessionOutcome,
}

pub struct RequestCoordinator {
    api: Arc<dyn MoveApi>,
    token: CancelToken,
    active: Option<ActiveSession>,
    session_counter: u64,
    in_flight: usize,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
    area: ResultArea,
}

impl RequestCoordinator {
    pub fn new(api: Arc<dyn MoveApi>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            api,
            token: CancelToken::new(),
            active: None,
            session_counter: 0,
            in_flight: 0,
            event_tx,
            event_rx,
            area: ResultArea::default(),
        }
    }

    pub fn area(&self) -> &ResultArea {
        &self.area
    }

    /// Name of the active session, if one was started
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    pub fn active_state(&self) -> Option<SessionState> {
        self.active.as_ref().map(|a| a.state)
    }

    pub fn is_loading(&self) -> bool {
        self.area.loading
    }

    /// Session threads that have not reported back yet, superseded ones included
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a lookup for `name`, superseding any session in progress.
    ///
    /// An empty name only cancels; the result area is left as it is.
    pub fn select(&mut self, name: &str) {
        self.token.cancel();
        self.token = CancelToken::new();
        if let Some(prev) = self.active.take() {
            if prev.state == SessionState::Pending {
                log::debug!("Cancelled session {} ({})", prev.id, prev.name);
            }
        }

        let name = name.trim();
        if name.is_empty() {
            return;
        }

        self.session_counter += 1;
        let id = self.session_counter;

        self.area = ResultArea {
            loading: true,
            cards: Vec::new(),
            error: None,
            owner: Some(name.to_string()),
        };
        self.active = Some(ActiveSession {
            id,
            name: name.to_string(),
            token: self.token.clone(),
            state: SessionState::Pending,
        });
        self.in_flight += 1;
        log::debug!("Started session {} ({})", id, name);

        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let tx = self.event_tx.clone();
        let name = name.to_string();
        thread::spawn(move || {
            // Dropped with this thread; a hung superseded session only ever holds its own workers
            let outcome = match session_pool(id) {
                Ok(pool) => pool.install(|| run_session(api.as_ref(), &name, &token)),
                Err(e) => {
                    log::warn!("Failed to build fetch pool for session {}: {}", id, e);
                    SessionOutcome::Failed(SessionError::network(e.to_string()))
                }
            };
            let _ = tx.send(SessionEvent { id, outcome });
        });
    }

    /// Apply outcomes that have arrived (non-blocking). Returns how many changed the display.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until the active session leaves `Pending`, or `timeout` passes.
    ///
    /// Returns true if there is no pending session left.
    pub fn wait_settled(&mut self, timeout: Duration) -> bool {
        self.wait_until(timeout, |c| c.active_state() != Some(SessionState::Pending))
    }

    /// Block until every session thread, superseded ones included, has reported back.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        self.wait_until(timeout, |c| c.in_flight == 0)
    }

    fn wait_until(&mut self, timeout: Duration, done: impl Fn(&Self) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while !done(self) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.apply(event);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return done(self);
                }
            }
        }
        true
    }

    fn apply(&mut self, event: SessionEvent) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        let Some(active) = self.active.as_mut() else {
            log::debug!("Discarding outcome of session {} (no active session)", event.id);
            return false;
        };
        if active.id != event.id || active.token.is_cancelled() {
            log::debug!("Discarding outcome of superseded session {}", event.id);
            return false;
        }

        active.state = event.outcome.state();
        match event.outcome {
            SessionOutcome::Success(records) => {
                log::debug!(
                    "Session {} ({}) fetched {} records",
                    active.id,
                    active.name,
                    records.len()
                );
                self.area.loading = false;
                self.area.error = None;
                self.area.cards = render_cards(&records);
                true
            }
            SessionOutcome::Failed(err) => {
                log::warn!("Lookup of {} failed: {}", active.name, err);
                self.area.loading = false;
                self.area.cards.clear();
                self.area.error = Some(err.to_string());
                true
            }
            SessionOutcome::Cancelled => false,
        }
    }
}

fn session_pool(id: u64) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(DEPENDENT_LIMIT)
        .thread_name(move |i| format!("movedex-s{id}-fetch-{i}"))
        .build()
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
