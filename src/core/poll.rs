use std::future::Future;
use tokio::time::{sleep, timeout_at, Duration, Instant};

use crate::core::error::WorkflowError;

/// How often to ask for a status and when to give up.
///
/// With neither `max_polls` nor `timeout` set the loop waits for as long as
/// the remote side takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: Option<u32>,
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(1), max_polls: None, timeout: None }
    }
}

impl PollPolicy {
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    Pending,
    Done(T),
    Failed { status: String, message: Option<String> },
}

/// What is being polled, used to build errors.
#[derive(Debug, Clone, Copy)]
pub struct PollTarget<'a> {
    pub resource: &'static str,
    pub id: &'a str,
}

/// Calls `check` until it reports `Done` or `Failed`, sleeping
/// `policy.interval` between checks. `on_wait` receives the time elapsed
/// since the first check every time another cycle is about to start.
///
/// The timeout also cuts short a check that is still in flight.
pub async fn poll_until<T, F, Fut, W>(
    policy: &PollPolicy,
    target: PollTarget<'_>,
    mut check: F,
    mut on_wait: W,
) -> Result<T, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollState<T>>,
    W: FnMut(Duration),
{
    let started = Instant::now();
    let deadline = policy.timeout.map(|timeout| started + timeout);
    let timed_out = || WorkflowError::Timeout {
        resource: target.resource,
        id: target.id.to_string(),
        waited: started.elapsed(),
    };
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let state = match deadline {
            Some(deadline) => timeout_at(deadline, check()).await.map_err(|_| timed_out())?,
            None => check().await,
        };
        match state {
            PollState::Done(value) => return Ok(value),
            PollState::Failed { status, message } => {
                return Err(WorkflowError::TerminalStatus {
                    resource: target.resource,
                    id: target.id.to_string(),
                    status,
                    message,
                })
            }
            PollState::Pending => {}
        }

        if policy.max_polls.is_some_and(|max| attempts >= max) {
            return Err(WorkflowError::PollLimit {
                resource: target.resource,
                id: target.id.to_string(),
                attempts,
            });
        }

        let pause = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return Err(timed_out());
                }
                policy.interval.min(left)
            }
            None => policy.interval,
        };

        on_wait(started.elapsed());
        sleep(pause).await;
    }
}
