//! Schedule execution and the handle used to observe and stop it.

use std::fmt::Display;
use std::future::Future;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::poller::{FailurePolicy, Runner};
use crate::errors::SchedulerError;

/// Lifecycle of a schedule.
///
/// `Idle -> Scheduled -> (Running -> Scheduled)* -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// Built but not yet waiting for its first tick.
    Idle,
    /// Waiting for the next tick.
    Scheduled,
    /// An invocation is in progress.
    Running,
    /// Terminal.
    Stopped,
}

/// Why a schedule ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The configured number of invocations completed.
    Exhausted,
    /// `cancel` was called, or every handle was dropped.
    Cancelled,
}

/// Totals of a finished schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Invocations that ran to completion, failed ones included.
    pub invocations: u64,
    /// Invocations that returned an error.
    pub failures: u64,
    pub outcome: ScheduleOutcome,
}

/// Stops a running schedule from anywhere, e.g. a signal handler.
#[derive(Debug, Clone)]
pub struct ScheduleCanceller {
    shutdown_tx: broadcast::Sender<()>,
}

impl ScheduleCanceller {
    /// Request the schedule to stop. An invocation in progress is finished
    /// first; no further tick is taken.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Handle to a running schedule.
///
/// Dropping the handle without calling `wait` cancels the schedule.
pub struct ScheduleHandle {
    canceller: ScheduleCanceller,
    state_rx: watch::Receiver<ScheduleState>,
    join: JoinHandle<Result<ScheduleSummary, SchedulerError>>,
}

impl ScheduleHandle {
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> ScheduleCanceller {
        self.canceller.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ScheduleState {
        *self.state_rx.borrow()
    }

    /// Receiver notified on every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ScheduleState> {
        self.state_rx.clone()
    }

    /// Wait for the schedule to end.
    ///
    /// # Returns
    ///
    /// * `Ok(ScheduleSummary)` - Exhausted or cancelled
    /// * `Err(SchedulerError::Aborted)` - An invocation failed under the stop policy
    /// * `Err(SchedulerError::Join)` - The schedule task panicked
    pub async fn wait(self) -> Result<ScheduleSummary, SchedulerError> {
        let Self {
            canceller, join, ..
        } = self;

        let result = join
            .await
            .map_err(|e| SchedulerError::Join(e.to_string()))?;

        drop(canceller);
        result
    }
}

pub(super) fn spawn_schedule<F, Fut, T, E>(runner: Runner, task: F) -> ScheduleHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (state_tx, state_rx) = watch::channel(ScheduleState::Idle);

    let join = tokio::spawn(drive(runner, task, shutdown_rx, state_tx));

    ScheduleHandle {
        canceller: ScheduleCanceller { shutdown_tx },
        state_rx,
        join,
    }
}

async fn drive<F, Fut, T, E>(
    runner: Runner,
    mut task: F,
    mut shutdown_rx: broadcast::Receiver<()>,
    state_tx: watch::Sender<ScheduleState>,
) -> Result<ScheduleSummary, SchedulerError>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let repetitions = runner.repetitions();
    let mut invocations = 0u64;
    let mut failures = 0u64;

    info!(
        period_ms = runner.period().as_millis() as u64,
        repetitions = ?repetitions,
        policy = ?runner.policy(),
        "Starting schedule"
    );

    let outcome = if repetitions.is_exhausted(0) {
        ScheduleOutcome::Exhausted
    } else {
        let mut interval = tokio::time::interval(runner.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        state_tx.send_replace(ScheduleState::Scheduled);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!(invocations = invocations, "Schedule cancelled");
                    break ScheduleOutcome::Cancelled;
                }
                _ = interval.tick() => {}
            }

            state_tx.send_replace(ScheduleState::Running);
            let result = task().await;
            invocations += 1;

            match result {
                Ok(_) => debug!(attempt = invocations, "Invocation succeeded"),
                Err(e) => {
                    failures += 1;
                    if runner.policy() == FailurePolicy::Stop {
                        error!(attempt = invocations, error = %e, "Invocation failed, stopping schedule");
                        state_tx.send_replace(ScheduleState::Stopped);
                        return Err(SchedulerError::Aborted {
                            attempt: invocations,
                            reason: e.to_string(),
                        });
                    }
                    warn!(attempt = invocations, error = %e, "Invocation failed, continuing");
                }
            }

            if repetitions.is_exhausted(invocations) {
                info!(invocations = invocations, failures = failures, "Schedule exhausted");
                break ScheduleOutcome::Exhausted;
            }

            state_tx.send_replace(ScheduleState::Scheduled);
        }
    };

    state_tx.send_replace(ScheduleState::Stopped);

    Ok(ScheduleSummary {
        invocations,
        failures,
        outcome,
    })
}
