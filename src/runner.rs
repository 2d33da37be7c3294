use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::session::{AttemptStatus, QuizSession, Tick};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

// Owns the repeating tick source for one attempt. The task stops on its
// own once the session leaves InProgress; dropping the runner aborts it,
// so an abandoned quiz view never leaves an orphaned timer behind.
pub struct SessionRunner {
    attempt_id: Uuid,
    session: Arc<RwLock<QuizSession>>,
    ticker: JoinHandle<()>,
}

impl SessionRunner {
    pub fn spawn(session: QuizSession) -> Self {
        Self::spawn_with_interval(session, TICK_INTERVAL)
    }

    pub fn spawn_with_interval(session: QuizSession, interval: Duration) -> Self {
        let attempt_id = session.attempt_id();
        let session = Arc::new(RwLock::new(session));
        let ticker = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                let mut clock = tokio::time::interval(interval);
                clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // The first interval tick completes immediately.
                clock.tick().await;
                loop {
                    clock.tick().await;
                    let mut guard = session.write().await;
                    match guard.status() {
                        AttemptStatus::NotStarted => continue,
                        AttemptStatus::Submitted => break,
                        AttemptStatus::InProgress => {}
                    }
                    match guard.tick().await {
                        Ok(Tick::Running { .. }) => {}
                        Ok(Tick::AutoSubmitted(_)) => {
                            info!("attempt {} auto-submitted on timeout", attempt_id);
                            break;
                        }
                        Err(err) => {
                            warn!("ticker for attempt {} stopped: {}", attempt_id, err);
                            break;
                        }
                    }
                }
            }
        });
        Self {
            attempt_id,
            session,
            ticker,
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn session(&self) -> Arc<RwLock<QuizSession>> {
        Arc::clone(&self.session)
    }

    pub fn is_finished(&self) -> bool {
        self.ticker.is_finished()
    }

    pub fn stop(&self) {
        self.ticker.abort();
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

// Lets the embedding UI find the active attempt again (e.g. to cancel
// the timer when the learner navigates away from the quiz view).
#[derive(Default)]
pub struct SessionRegistry {
    runners: DashMap<Uuid, SessionRunner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, runner: SessionRunner) -> Uuid {
        let attempt_id = runner.attempt_id();
        self.runners.insert(attempt_id, runner);
        attempt_id
    }

    pub fn session(&self, attempt_id: &Uuid) -> Option<Arc<RwLock<QuizSession>>> {
        self.runners.get(attempt_id).map(|r| r.session())
    }

    pub fn cancel(&self, attempt_id: &Uuid) -> bool {
        // Dropping the runner aborts its ticker task.
        self.runners.remove(attempt_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}
