//! Session registry for the web API.
//!
//! Browser clients run the camera and the landmark model themselves and post
//! one detection per frame. Each client gets its own
//! [`InteractionController`], kept here under a generated id until the
//! client deletes it or stops sending requests for the idle timeout.
//!
//! The registry is shared between request handlers. The map sits behind a
//! `RwLock`; each session behind its own `Mutex`, so requests for different
//! sessions never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{DetectionEvent, Operator};
use crate::problems::ProblemGenerator;
use crate::session::{DisplayState, InteractionController, SessionOptions, Verdict};

/// Maximum number of live sessions.
pub const MAX_SESSIONS: usize = 32;

/// Registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Too many sessions are open.
    #[error("session limit reached ({0} active)")]
    Full(usize),
}

/// Problem as sent to clients. The answer stays on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProblemView {
    /// Left operand
    pub operand1: u8,
    /// Operator symbol
    pub operator: Operator,
    /// Right operand
    pub operand2: u8,
}

/// Public view of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Session id (UUID v4)
    pub id: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Problem being asked
    pub problem: ProblemView,
    /// What the client should show
    pub display: DisplayState,
    /// True while feedback is shown
    pub is_locked: bool,
    /// Milliseconds until the feedback window closes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_remaining_ms: Option<u64>,
    /// Wrong answers since the last reset
    pub consecutive_failures: u32,
    /// Detections received
    pub frames_received: u64,
    /// Scored attempts
    pub attempts: u64,
    /// Correct answers
    pub correct: u64,
}

/// Result of posting one detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionOutcome {
    /// Verdict if the detection was scored
    pub verdict: Option<Verdict>,
    /// Session after the detection
    pub session: SessionSnapshot,
}

/// One client's session.
#[derive(Debug)]
struct RemoteSession {
    id: String,
    created_at: String,
    controller: InteractionController,
    last_seen: Instant,
    frames_received: u64,
    attempts: u64,
    correct: u64,
}

impl RemoteSession {
    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= idle_timeout
    }

    fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let state = self.controller.state();
        let problem = state.current_problem;
        let lock_remaining_ms = self.controller.lock_deadline().map(|deadline| {
            u64::try_from(deadline.saturating_duration_since(now).as_millis()).unwrap_or(u64::MAX)
        });

        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at.clone(),
            problem: ProblemView {
                operand1: problem.operand1(),
                operator: problem.operator(),
                operand2: problem.operand2(),
            },
            display: self.controller.display().clone(),
            is_locked: state.is_locked,
            lock_remaining_ms,
            consecutive_failures: state.consecutive_failures,
            frames_received: self.frames_received,
            attempts: self.attempts,
            correct: self.correct,
        }
    }
}

/// Live sessions keyed by id.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<RemoteSession>>>>,
    options: SessionOptions,
    max_generation_attempts: u32,
    idle_timeout: Duration,
    limit: usize,
}

impl SessionRegistry {
    /// Creates an empty registry using the session settings from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_limit(config, MAX_SESSIONS)
    }

    /// Creates an empty registry accepting at most `limit` sessions.
    #[must_use]
    pub fn with_limit(config: &Config, limit: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            options: config.session_options(),
            max_generation_attempts: config.session.max_generation_attempts,
            idle_timeout: config.session.idle_timeout(),
            limit,
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Idle timeout after which a silent session is dropped.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Starts a new session with a freshly seeded problem.
    ///
    /// Idle sessions are dropped first, so abandoned clients never hold a slot.
    pub fn create(&self, now: Instant) -> Result<SessionSnapshot, RegistryError> {
        let mut sessions = self.write();
        Self::evict_idle_locked(&mut sessions, now, self.idle_timeout);
        if sessions.len() >= self.limit {
            return Err(RegistryError::Full(sessions.len()));
        }

        let problems = ProblemGenerator::from_entropy(self.max_generation_attempts);
        let session = RemoteSession {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            controller: InteractionController::new(problems, self.options.settings),
            last_seen: now,
            frames_received: 0,
            attempts: 0,
            correct: 0,
        };
        let snapshot = session.snapshot(now);

        info!(id = %snapshot.id, active = sessions.len() + 1, "Session created");
        sessions.insert(snapshot.id.clone(), Arc::new(Mutex::new(session)));
        Ok(snapshot)
    }

    /// Returns the session state, closing an expired feedback window first.
    pub fn get(&self, id: &str, now: Instant) -> Option<SessionSnapshot> {
        let session = self.find(id)?;
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        session.last_seen = now;
        session.controller.tick(now);
        Some(session.snapshot(now))
    }

    /// Feeds one detection to a session.
    pub fn submit(&self, id: &str, event: &DetectionEvent, now: Instant) -> Option<DetectionOutcome> {
        let session = self.find(id)?;
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);

        session.last_seen = now;
        session.frames_received += 1;
        let verdict = session.controller.handle_event(event, now);
        if let Some(verdict) = verdict {
            session.attempts += 1;
            if matches!(verdict, Verdict::Correct { .. }) {
                session.correct += 1;
            }
            debug!(id, ?verdict, "Detection scored");
        }

        Some(DetectionOutcome {
            verdict,
            session: session.snapshot(now),
        })
    }

    /// Ends a session. Returns false if it did not exist.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            info!(id, "Session ended");
        }
        removed
    }

    /// Drops every session idle for at least the idle timeout.
    ///
    /// Returns how many were dropped.
    pub fn evict_idle(&self, now: Instant) -> usize {
        Self::evict_idle_locked(&mut self.write(), now, self.idle_timeout)
    }

    fn evict_idle_locked(
        sessions: &mut HashMap<String, Arc<Mutex<RemoteSession>>>,
        now: Instant,
        idle_timeout: Duration,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|id, session| {
            let idle = session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_idle(now, idle_timeout);
            if idle {
                info!(id = %id, "Session dropped after idle timeout");
            }
            !idle
        });
        before - sessions.len()
    }

    fn find(&self, id: &str) -> Option<Arc<Mutex<RemoteSession>>> {
        self.read().get(id).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Mutex<RemoteSession>>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Mutex<RemoteSession>>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
