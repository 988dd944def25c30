//! One blog post per submission: validate the topic, stream the crew's
//! progress into the live panel, hand back the finished post.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::crew::Crew;
use crate::engine::{FinalArtifact, Orchestrator};
use crate::error::RunError;
use crate::sink::{DisplayRegion, StreamingLogSink};
use crate::topic::Topic;

/// Where the runner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Validating => write!(f, "validating"),
            RunState::Running => write!(f, "running"),
            RunState::Succeeded => write!(f, "succeeded"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// A finished, successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub topic: Topic,
    pub artifact: FinalArtifact,
    /// Full sanitized log, not just the visible tail.
    pub log: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs the crew, one submission at a time.
pub struct PipelineRunner {
    engine: Arc<dyn Orchestrator>,
    crew: Crew,
    region: Arc<dyn DisplayRegion>,
    window: usize,
    state: Mutex<RunState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl PipelineRunner {
    pub fn new(engine: Arc<dyn Orchestrator>, region: Arc<dyn DisplayRegion>, window: usize) -> Self {
        Self {
            engine,
            crew: Crew::blog(),
            region,
            window,
            state: Mutex::new(RunState::Idle),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Characters of log tail shown in the panel.
    pub fn window(&self) -> usize {
        self.window
    }

    fn transition(&self, next: RunState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(from = %*state, to = %next, "Run state");
        *state = next;
    }

    /// Generate a post for `raw_topic`.
    ///
    /// Blank topics are rejected before anything else happens. A second
    /// submission while a run is in flight fails with [`RunError::Busy`]
    /// instead of queueing.
    pub async fn submit(&self, raw_topic: &str) -> Result<RunOutcome, RunError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            Topic::parse(raw_topic)?;
            return Err(RunError::Busy);
        };

        self.transition(RunState::Validating);
        let topic = match Topic::parse(raw_topic) {
            Ok(topic) => topic,
            Err(e) => {
                tracing::warn!("Rejected blank topic");
                self.transition(RunState::Idle);
                return Err(e.into());
            }
        };

        self.transition(RunState::Running);
        let running = RunningGuard {
            runner: self,
            armed: true,
        };
        self.region.clear();
        let mut sink = StreamingLogSink::new(Arc::clone(&self.region), self.window);
        let started_at = Utc::now();
        tracing::info!(%topic, engine = self.engine.name(), "Run started");

        let result = self.engine.kickoff(&self.crew, &topic, &mut sink).await;
        let finished_at = Utc::now();
        let elapsed_ms = (finished_at - started_at).num_milliseconds();

        match result {
            Ok(artifact) => {
                running.finish(RunState::Succeeded);
                tracing::info!(%topic, elapsed_ms, log_bytes = sink.buffer_len(), "Run succeeded");
                Ok(RunOutcome {
                    topic,
                    artifact,
                    log: sink.into_buffer(),
                    started_at,
                    finished_at,
                })
            }
            Err(e) => {
                running.finish(RunState::Failed);
                tracing::error!(%topic, elapsed_ms, error = %e, "Run failed");
                Err(e.into())
            }
        }
    }
}

/// Held while the engine runs. Dropped while still armed, the run was
/// cancelled or the engine panicked, and the state moves to `Failed`.
/// Declared after the in-flight lock guard so it drops first.
struct RunningGuard<'a> {
    runner: &'a PipelineRunner,
    armed: bool,
}

impl RunningGuard<'_> {
    fn finish(mut self, next: RunState) {
        self.armed = false;
        self.runner.transition(next);
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::error!("Run ended without a result");
            self.runner.transition(RunState::Failed);
        }
    }
}
