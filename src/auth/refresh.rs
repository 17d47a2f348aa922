//! Single-flight coordination for access-token refresh.
//!
//! When an access token expires, every in-flight authenticated request fails
//! with a 401 at roughly the same time. Exactly one of those callers may hit
//! the refresh endpoint; the rest must wait for its outcome and replay with
//! the new token. `RefreshGate` enforces that: the decision between becoming
//! the refresher ("leader") and enqueueing as a waiter happens under a single
//! mutex acquisition, so two callers can never both observe "no refresh in
//! flight".
//!
//! Waiters are resolved in FIFO enqueue order. On refresh failure every
//! waiter receives the error rather than being dropped, so no caller is left
//! hanging.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::oneshot;

/// Why a refresh attempt failed. Terminal for the session: the client tears
/// down stored credentials when it sees one of these from the leader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh endpoint rejected the token (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh response missing access token")]
    MissingAccessToken,

    #[error("refresh request timed out")]
    TimedOut,

    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The leader dropped its flight without reporting an outcome
    /// (e.g. its task was cancelled).
    #[error("refresh abandoned before completion")]
    Abandoned,
}

/// Outcome of a refresh attempt: the new access token, or why it failed.
pub type RefreshOutcome = Result<String, RefreshError>;

/// What `acquire` decided for the caller.
#[derive(Debug)]
pub enum Ticket {
    /// No refresh was in flight; the caller must perform it and report the
    /// outcome through [`RefreshGate::finish`].
    Leader,
    /// A refresh is already in flight; await its outcome here.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// In-flight refresh marker plus the queued callers.
struct Flight {
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// The single-flight gate. `Some(flight)` inside the mutex is the
/// refresh-in-flight flag; the waiter queue lives in the flight itself so
/// both are cleared together.
#[derive(Default)]
pub struct RefreshGate {
    inflight: Mutex<Option<Flight>>,
}

impl std::fmt::Debug for RefreshGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGate").finish_non_exhaustive()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh, or become its leader if none is in flight.
    /// The check-then-act is a single lock acquisition with no await points.
    pub fn acquire(&self) -> Ticket {
        let mut guard = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_mut() {
            Some(flight) => {
                let (tx, rx) = oneshot::channel();
                flight.waiters.push(tx);
                Ticket::Waiter(rx)
            }
            None => {
                *guard = Some(Flight {
                    waiters: Vec::new(),
                });
                Ticket::Leader
            }
        }
    }

    /// Report the leader's outcome: clears the in-flight flag and resolves
    /// every waiter, in enqueue order, with a clone of the result.
    pub fn finish(&self, outcome: &RefreshOutcome) {
        let flight = {
            let mut guard = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };
        let Some(flight) = flight else {
            return;
        };
        for waiter in flight.waiters {
            // A waiter that gave up awaiting just drops its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Number of queued waiters. Zero when no refresh is in flight.
    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|flight| flight.waiters.len())
            .unwrap_or(0)
    }
}

/// Await the outcome of an in-flight refresh as a waiter.
pub(crate) async fn await_waiter(rx: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
    rx.await.unwrap_or(Err(RefreshError::Abandoned))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use super::*;

    #[test]
    fn first_caller_leads_rest_wait() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.acquire(), Ticket::Leader));
        assert!(matches!(gate.acquire(), Ticket::Waiter(_)));
        assert!(matches!(gate.acquire(), Ticket::Waiter(_)));
        assert_eq!(gate.waiter_count(), 2);
    }

    #[test]
    fn finish_clears_flight_for_next_storm() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.acquire(), Ticket::Leader));
        gate.finish(&Ok("T2".to_string()));
        // A later 401 storm elects a fresh leader.
        assert!(matches!(gate.acquire(), Ticket::Leader));
    }

    #[tokio::test]
    async fn waiters_receive_success_in_enqueue_order() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.acquire(), Ticket::Leader));

        let mut receivers = Vec::new();
        for _ in 0..3 {
            match gate.acquire() {
                Ticket::Waiter(rx) => receivers.push(rx),
                Ticket::Leader => panic!("second leader while refresh in flight"),
            }
        }

        gate.finish(&Ok("T2".to_string()));
        for rx in receivers {
            assert_eq!(await_waiter(rx).await, Ok("T2".to_string()));
        }
        assert_eq!(gate.waiter_count(), 0);
    }

    #[tokio::test]
    async fn waiters_are_rejected_on_refresh_failure() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.acquire(), Ticket::Leader));
        let Ticket::Waiter(rx) = gate.acquire() else {
            panic!("expected waiter");
        };

        gate.finish(&Err(RefreshError::Rejected {
            status: 400,
            detail: "token expired".to_string(),
        }));

        match await_waiter(rx).await {
            Err(RefreshError::Rejected { status: 400, .. }) => {}
            other => panic!("waiter should see the refresh error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn dropped_leader_reads_as_abandoned() {
        let gate = RefreshGate::new();
        assert!(matches!(gate.acquire(), Ticket::Leader));
        let Ticket::Waiter(rx) = gate.acquire() else {
            panic!("expected waiter");
        };

        // Dropping the gate drops the flight and its senders without a
        // finish, as a cancelled leader task would.
        drop(gate);
        assert_eq!(await_waiter(rx).await, Err(RefreshError::Abandoned));
    }

    /// Many concurrent callers, one refresh: the single-flight property.
    /// The barrier holds the flight open until every task has acquired.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn burst_of_callers_triggers_exactly_one_refresh() {
        const CALLERS: usize = 16;

        let gate = Arc::new(RefreshGate::new());
        let refresh_calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let gate = Arc::clone(&gate);
            let refresh_calls = Arc::clone(&refresh_calls);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                let ticket = gate.acquire();
                barrier.wait().await;
                match ticket {
                    Ticket::Leader => {
                        refresh_calls.fetch_add(1, Ordering::SeqCst);
                        let outcome = Ok("T2".to_string());
                        gate.finish(&outcome);
                        outcome
                    }
                    Ticket::Waiter(rx) => await_waiter(rx).await,
                }
            }));
        }

        let results = futures::future::join_all(handles).await;
        for result in results {
            assert_eq!(result.expect("task"), Ok("T2".to_string()));
        }
        assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    }
}
