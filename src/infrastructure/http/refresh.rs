use crate::error::ClientError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// Result of one refresh: the new access token
pub type RefreshOutcome = Result<String, ClientError>;

struct RefreshState {
    /// Bumped on every successful refresh
    generation: u64,
    /// `Some` while a refresh is in flight; waiters in arrival order
    waiters: Option<VecDeque<oneshot::Sender<RefreshOutcome>>>,
}

/// Single-flight coordinator for token refreshes.
///
/// States are IDLE (`waiters == None`) and REFRESHING (`waiters == Some`).
/// The first caller hitting a 401 while IDLE becomes the leader and performs
/// the refresh; callers arriving while REFRESHING are queued and woken in
/// FIFO order with the leader's outcome. A caller whose request was sent
/// before the latest successful refresh skips the queue entirely.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// What a caller that got a 401 should do next
pub enum RefreshTicket<'a> {
    /// Run the refresh and report through the guard
    Leader(LeaderGuard<'a>),
    /// Await the in-flight refresh
    Waiter(oneshot::Receiver<RefreshOutcome>),
    /// A refresh already completed after the caller's request was sent
    AlreadyRefreshed,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState {
                generation: 0,
                waiters: None,
            }),
        }
    }

    /// Generation to record when a request is sent
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().waiters.is_some()
    }

    /// Number of callers currently queued behind the leader
    pub fn pending(&self) -> usize {
        self.state.lock().waiters.as_ref().map_or(0, VecDeque::len)
    }

    /// Register a caller whose request (sent at `observed_generation`) got 401
    pub fn join(&self, observed_generation: u64) -> RefreshTicket<'_> {
        let mut state = self.state.lock();

        if state.generation > observed_generation {
            return RefreshTicket::AlreadyRefreshed;
        }

        match state.waiters.as_mut() {
            Some(waiters) => {
                let (tx, rx) = oneshot::channel();
                waiters.push_back(tx);
                tracing::debug!(queued = waiters.len(), "Queued behind in-flight token refresh");
                RefreshTicket::Waiter(rx)
            }
            None => {
                state.waiters = Some(VecDeque::new());
                RefreshTicket::Leader(LeaderGuard {
                    coordinator: self,
                    completed: false,
                })
            }
        }
    }

    fn resolve(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            if outcome.is_ok() {
                state.generation += 1;
            }
            state.waiters.take().unwrap_or_default()
        };

        let woken = waiters.len();
        for waiter in waiters {
            // A waiter whose future was dropped is simply skipped
            let _ = waiter.send(outcome.clone());
        }
        woken
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by the leader for the duration of the refresh call.
///
/// Dropping it without calling [`LeaderGuard::complete`] fails every queued
/// waiter and returns the coordinator to IDLE.
pub struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    completed: bool,
}

impl LeaderGuard<'_> {
    /// Publish the outcome to all waiters; returns how many were woken
    pub fn complete(mut self, outcome: RefreshOutcome) -> usize {
        self.completed = true;
        self.coordinator.resolve(outcome)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!("Token refresh abandoned before completion");
            self.coordinator.resolve(Err(ClientError::RefreshFailed(
                "refresh abandoned".to_string(),
            )));
        }
    }
}
