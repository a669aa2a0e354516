//! Schedule builder: `Poller::every(secs).for_iterations(n).stop_on_error(..).run(task)`.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use super::runner::{spawn_schedule, ScheduleHandle};

/// Shortest period a schedule ticks at.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// How many invocations a schedule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetitions {
    /// Stop after this many invocations. `Finite(0)` runs nothing.
    Finite(u64),
    /// Run until cancelled.
    Unbounded,
}

impl Repetitions {
    /// Interpret a signed repetition count. Any negative value means unbounded.
    pub fn from_count(count: i64) -> Self {
        u64::try_from(count)
            .map(Self::Finite)
            .unwrap_or(Self::Unbounded)
    }

    /// Whether `invocations` completed invocations use up the schedule.
    pub fn is_exhausted(&self, invocations: u64) -> bool {
        match self {
            Self::Finite(limit) => invocations >= *limit,
            Self::Unbounded => false,
        }
    }
}

/// What a failed invocation does to the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure, count it, and keep going.
    #[default]
    Continue,
    /// End the schedule with `SchedulerError::Aborted`.
    Stop,
}

/// First stage of the builder: the period between ticks.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    period: Duration,
}

impl Poller {
    /// Tick every `secs` seconds.
    pub fn every(secs: u64) -> Iterations {
        Self::every_duration(Duration::from_secs(secs))
    }

    /// Tick every `period`. Periods below one millisecond are raised to it.
    pub fn every_duration(period: Duration) -> Iterations {
        Iterations {
            poller: Self {
                period: period.max(MIN_PERIOD),
            },
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Second stage of the builder: how many times to run.
#[derive(Debug, Clone, Copy)]
pub struct Iterations {
    poller: Poller,
}

impl Iterations {
    /// Run `count` times; `-1` (or any negative count) runs until cancelled.
    pub fn for_iterations(self, count: i64) -> Runner {
        self.repetitions(Repetitions::from_count(count))
    }

    pub fn repetitions(self, repetitions: Repetitions) -> Runner {
        Runner {
            period: self.poller.period,
            repetitions,
            policy: FailurePolicy::default(),
        }
    }
}

/// Final stage of the builder: a fully described schedule, ready to run.
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    period: Duration,
    repetitions: Repetitions,
    policy: FailurePolicy,
}

impl Runner {
    /// End the schedule at the first failed invocation instead of continuing.
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.policy = if stop {
            FailurePolicy::Stop
        } else {
            FailurePolicy::Continue
        };
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn repetitions(&self) -> Repetitions {
        self.repetitions
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Start the schedule on the current tokio runtime.
    ///
    /// The first invocation starts immediately. Each invocation is awaited
    /// before the next tick is taken, so invocations never overlap; a run
    /// longer than the period delays the following tick instead of
    /// triggering a burst.
    pub fn run<F, Fut, T, E>(self, task: F) -> ScheduleHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        spawn_schedule(self, task)
    }
}
