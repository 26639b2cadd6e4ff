//! Job queue convergence monitor
//!
//! Resource creation on the panel is asynchronous: a create call enqueues a
//! job, and the panel can enqueue *secondary* jobs while processing a
//! primary one (creating a domain schedules a web-server reload, for
//! example). A single zero reading of the pending-job counter is therefore
//! an unreliable termination signal; the monitor requires the counter to
//! sit at zero for a configurable number of consecutive polls before
//! declaring convergence.
//!
//! Query failures are tolerated with a backoff and reset the stability
//! streak; only the overall wall-clock timeout bounds the wait. The whole
//! wait is an ordinary future — callers that need an external deadline or
//! operator cancellation can `select!` against it or drop it.

use std::time::Duration;

use serde::Serialize;

use panel_orchestrator_client::ProvisioningClient;

/// Tuning knobs for one convergence wait.
#[derive(Debug, Clone)]
pub struct DrainConfig {
    /// Sleep between successful polls.
    pub poll_interval: Duration,
    /// Overall wall-clock bound, measured from monitor start. Transient
    /// query failures do not stop this clock.
    pub timeout: Duration,
    /// Consecutive zero readings required before the queue counts as
    /// drained.
    pub required_stable_readings: u32,
    /// Sleep after a failed poll before querying again.
    pub transient_backoff: Duration,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
            required_stable_readings: 3,
            transient_backoff: Duration::from_secs(10),
        }
    }
}

/// How one convergence wait ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrainOutcome {
    /// The counter was observed at zero for the required streak.
    Converged { elapsed: Duration, polls: u32 },
    /// The wall-clock bound was hit first. Advisory: the pipeline proceeds
    /// anyway, the panel simply keeps working through its backlog.
    TimedOut {
        elapsed: Duration,
        polls: u32,
        /// Most recent successfully observed count, if any poll succeeded.
        last_count: Option<u64>,
    },
}

impl DrainOutcome {
    #[must_use]
    pub fn converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Poll the pending-job counter until it is stably zero or the timeout
/// elapses.
///
/// `server_id == 0` polls across all servers. Never returns an error: query
/// failures of any kind reset the stability streak, wait
/// [`transient_backoff`](DrainConfig::transient_backoff) and try again
/// until the timeout.
pub async fn await_drain(
    client: &dyn ProvisioningClient,
    server_id: i64,
    config: &DrainConfig,
) -> DrainOutcome {
    let start = tokio::time::Instant::now();
    let mut polls = 0_u32;
    let mut streak = 0_u32;
    let mut last_count: Option<u64> = None;
    let mut last_logged: Option<u64> = None;

    loop {
        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            log::warn!(
                "[{:03}s] Job queue did not drain within {}s (last count: {:?})",
                elapsed.as_secs(),
                config.timeout.as_secs(),
                last_count
            );
            return DrainOutcome::TimedOut {
                elapsed,
                polls,
                last_count,
            };
        }

        polls += 1;

        match client.pending_job_count(server_id).await {
            Ok(count) => {
                last_count = Some(count);

                // One progress line per changed count, not per poll
                if last_logged != Some(count) {
                    log::info!("[{:03}s] Pending jobs: {count}", elapsed.as_secs());
                    last_logged = Some(count);
                }

                if count == 0 {
                    streak += 1;
                    if streak >= config.required_stable_readings {
                        let elapsed = start.elapsed();
                        log::info!(
                            "[{:03}s] Job queue stable at zero ({streak} consecutive reads)",
                            elapsed.as_secs()
                        );
                        return DrainOutcome::Converged { elapsed, polls };
                    }
                    log::info!(
                        "[{:03}s] Pending jobs: 0 (confirming {streak}/{})",
                        elapsed.as_secs(),
                        config.required_stable_readings
                    );
                } else {
                    streak = 0;
                }

                tokio::time::sleep(config.poll_interval).await;
            }
            Err(e) => {
                streak = 0;
                let level = if e.is_expected() {
                    log::Level::Warn
                } else {
                    log::Level::Error
                };
                log::log!(
                    level,
                    "[{:03}s] Job queue query failed, retrying in {}s: {e}",
                    elapsed.as_secs(),
                    config.transient_backoff.as_secs()
                );
                tokio::time::sleep(config.transient_backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockClient;
    use panel_orchestrator_client::ClientError;

    fn config(
        poll_secs: u64,
        timeout_secs: u64,
        stable: u32,
        backoff_secs: u64,
    ) -> DrainConfig {
        DrainConfig {
            poll_interval: Duration::from_secs(poll_secs),
            timeout: Duration::from_secs(timeout_secs),
            required_stable_readings: stable,
            transient_backoff: Duration::from_secs(backoff_secs),
        }
    }

    fn network_blip() -> ClientError {
        ClientError::Network {
            method: "monitor_jobqueue_count".to_string(),
            detail: "connection reset".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn converges_only_after_unbroken_streak() {
        let client = MockClient::new();
        // Streak at reads 3-4 is broken by the 1 at read 5; convergence
        // happens at the final reading only.
        client.script_job_counts(&[5, 2, 0, 0, 1, 0, 0, 0]);

        let outcome = await_drain(&client, 0, &config(2, 300, 3, 10)).await;

        match outcome {
            DrainOutcome::Converged { polls, .. } => assert_eq!(polls, 8),
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_immediately_on_reaching_streak() {
        let client = MockClient::new();
        client.script_job_counts(&[0, 0]);

        let outcome = await_drain(&client, 0, &config(2, 300, 2, 10)).await;

        match outcome {
            DrainOutcome::Converged { polls, elapsed } => {
                assert_eq!(polls, 2);
                // No trailing poll_interval sleep after the final read
                assert_eq!(elapsed.as_secs(), 2);
            }
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_zero_reading_is_not_trusted() {
        let client = MockClient::new();
        client.script_job_counts(&[0, 3, 0, 0, 0]);

        let outcome = await_drain(&client, 0, &config(2, 300, 3, 10)).await;

        match outcome {
            DrainOutcome::Converged { polls, .. } => assert_eq!(polls, 5),
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_queue_never_drains() {
        let client = MockClient::new();
        client.script_job_counts(&[5, 5, 5, 5, 5, 5, 5, 5, 5, 5]);

        let outcome = await_drain(&client, 0, &config(2, 10, 3, 10)).await;

        match outcome {
            DrainOutcome::TimedOut {
                elapsed,
                last_count,
                ..
            } => {
                assert!(elapsed >= Duration::from_secs(10));
                assert_eq!(last_count, Some(5));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_reset_streak_but_are_tolerated() {
        let client = MockClient::new();
        client.push_job_count(Ok(0));
        client.push_job_count(Ok(0));
        client.push_job_count(Err(network_blip()));
        client.push_job_count(Ok(0));
        client.push_job_count(Ok(0));
        client.push_job_count(Ok(0));

        let outcome = await_drain(&client, 0, &config(2, 300, 3, 10)).await;

        match outcome {
            DrainOutcome::Converged { polls, .. } => assert_eq!(polls, 6),
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_timeout_applies_across_transient_errors() {
        let client = MockClient::new();
        for _ in 0..10 {
            client.push_job_count(Err(network_blip()));
        }

        let outcome = await_drain(&client, 0, &config(2, 15, 3, 10)).await;

        match outcome {
            DrainOutcome::TimedOut {
                polls, last_count, ..
            } => {
                // Two failed polls (t=0, t=10) fit before the 15s bound
                assert_eq!(polls, 2);
                assert_eq!(last_count, None);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
