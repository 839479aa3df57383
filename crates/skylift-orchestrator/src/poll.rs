//! Generic bounded polling
//!
//! [`poll_until`] turns a check predicate into a timeout-bound wait:
//! invoke the predicate, sleep with exponential backoff and jitter, repeat
//! until the predicate reports done or failure, the deadline passes, or the
//! cancellation token fires. Time is measured on the monotonic clock from
//! loop entry; a slow in-flight check can overrun the deadline, the loop
//! just never schedules another attempt past it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use skylift_api::OperationError;

use crate::backoff::BackoffConfig;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

pub(crate) const EVENT_WAIT_START: &[&str] = &["orchestrator", "wait", "start"];
pub(crate) const EVENT_WAIT_STOP: &[&str] = &["orchestrator", "wait", "stop"];
pub(crate) const EVENT_WAIT_TIMEOUT: &[&str] = &["orchestrator", "wait", "timeout"];

/// Reason attached to a timeout when the caller supplied no message.
pub const DEFAULT_TIMEOUT_REASON: &str = "Timeout waiting for condition";

/// What a check predicate observed on one polling attempt.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// Condition holds; polling stops and the value is returned.
    Done(T),

    /// Condition does not hold yet. The optional diagnostic is logged,
    /// never branched on.
    Continue(Option<String>),

    /// A terminal error; polling stops and the error is returned unchanged.
    Failed(OperationError),
}

/// Parameters for one [`poll_until`] call.
#[derive(Clone)]
pub struct WaitOptions {
    /// Overall deadline, measured from loop entry.
    pub timeout: Duration,

    /// Operation label attached to telemetry.
    pub operation: &'static str,

    /// Reason reported on timeout instead of [`DEFAULT_TIMEOUT_REASON`].
    pub timeout_message: Option<String>,

    pub backoff: BackoffConfig,

    /// Sink for lifecycle events; emission is a no-op when unset.
    pub telemetry: Option<Arc<dyn TelemetrySink>>,

    /// Cancelling this token aborts the sleep and the in-flight check.
    pub cancel: Option<CancellationToken>,
}

impl WaitOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            operation: "wait",
            timeout_message: None,
            backoff: BackoffConfig::default(),
            telemetry: None,
            cancel: None,
        }
    }

    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_timeout_message(mut self, message: impl Into<String>) -> Self {
        self.timeout_message = Some(message.into());
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Override only the first delay, keeping the rest of the policy.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.backoff.initial_delay = delay;
        self
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn emit(&self, event: TelemetryEvent) {
        if let Some(sink) = &self.telemetry {
            sink.emit(event);
        }
    }
}

/// Ephemeral state of one polling loop.
struct PollSession {
    started: Instant,
    delay: Duration,
    attempts: u32,
}

impl PollSession {
    fn new(initial_delay: Duration) -> Self {
        Self {
            started: Instant::now(),
            delay: initial_delay,
            attempts: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Repeatedly invoke `check` until it reports [`PollOutcome::Done`] or
/// [`PollOutcome::Failed`], or until `opts.timeout` elapses.
///
/// The deadline is evaluated at loop top, but the first attempt always
/// runs: even a near-zero budget gets exactly one check. A check that
/// reports `Done` on its first invocation returns without sleeping at all.
pub async fn poll_until<T, F, Fut>(opts: WaitOptions, mut check: F) -> Result<T, OperationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome<T>>,
{
    let mut session = PollSession::new(opts.backoff.initial_delay);
    opts.emit(TelemetryEvent::new(EVENT_WAIT_START, opts.operation));

    loop {
        if session.attempts > 0 && session.elapsed() >= opts.timeout {
            let reason = opts
                .timeout_message
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEOUT_REASON.to_string());
            opts.emit(
                TelemetryEvent::new(EVENT_WAIT_TIMEOUT, opts.operation)
                    .with_duration(session.elapsed())
                    .with_attempts(session.attempts)
                    .with_reason(reason.clone()),
            );
            return Err(OperationError::timeout(reason));
        }

        let outcome = match &opts.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(cancelled(opts.operation)),
                outcome = check() => outcome,
            },
            None => check().await,
        };
        session.attempts += 1;

        match outcome {
            PollOutcome::Done(value) => {
                opts.emit(
                    TelemetryEvent::new(EVENT_WAIT_STOP, opts.operation)
                        .with_duration(session.elapsed())
                        .with_attempts(session.attempts),
                );
                return Ok(value);
            }
            // The caller already has full error context; no event here.
            PollOutcome::Failed(error) => return Err(error),
            PollOutcome::Continue(diagnostic) => {
                if let Some(diagnostic) = diagnostic {
                    tracing::debug!(operation = opts.operation, "still waiting: {diagnostic}");
                }

                let remaining = opts.timeout.saturating_sub(session.elapsed());
                let delay = opts.backoff.jittered(session.delay).min(remaining);
                if !delay.is_zero() {
                    match &opts.cancel {
                        Some(token) => tokio::select! {
                            _ = token.cancelled() => return Err(cancelled(opts.operation)),
                            _ = time::sleep(delay) => {}
                        },
                        None => time::sleep(delay).await,
                    }
                }
                session.delay = opts.backoff.next_delay(session.delay);
            }
        }
    }
}

fn cancelled(operation: &str) -> OperationError {
    OperationError::cancelled(format!("{operation} cancelled"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Default)]
    struct CaptureSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl TelemetrySink for CaptureSink {
        fn emit(&self, event: TelemetryEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl CaptureSink {
        fn names(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(TelemetryEvent::full_name)
                .collect()
        }

        fn measurement(&self, event_name: &str, key: &str) -> Option<f64> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.full_name() == event_name)
                .and_then(|e| e.measurements.get(key).copied())
        }
    }

    fn remote_error() -> OperationError {
        OperationError::from_response(
            404,
            "GET",
            "https://api.test/v1/apps/demo/machines/m1",
            None,
            r#"{"error":{"code":"not_found","message":"machine not found"}}"#,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_on_first_attempt_returns_without_sleeping() {
        let sink = Arc::new(CaptureSink::default());
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = poll_until(
            WaitOptions::new(Duration::from_secs(5)).with_telemetry(sink.clone()),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { PollOutcome::Done(7u32) }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(
            sink.names(),
            ["orchestrator.wait.start", "orchestrator.wait.stop"]
        );
        assert_eq!(
            sink.measurement("orchestrator.wait.stop", "attempts"),
            Some(1.0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_returns_the_error_unchanged_after_k_attempts() {
        let sink = Arc::new(CaptureSink::default());
        let calls = AtomicU32::new(0);

        let result: Result<u32, _> = poll_until(
            WaitOptions::new(Duration::from_secs(60)).with_telemetry(sink.clone()),
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt < 3 {
                        PollOutcome::Continue(None)
                    } else {
                        PollOutcome::Failed(remote_error())
                    }
                }
            },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.code(), Some("not_found"));
        // Failure emits no event of its own.
        assert_eq!(sink.names(), ["orchestrator.wait.start"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_default_reason() {
        let sink = Arc::new(CaptureSink::default());
        let started = Instant::now();

        let result: Result<u32, _> = poll_until(
            WaitOptions::new(Duration::from_secs(1)).with_telemetry(sink.clone()),
            || async { PollOutcome::Continue(Some("still pending".to_string())) },
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.reason(), Some(DEFAULT_TIMEOUT_REASON));
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(
            sink.names(),
            ["orchestrator.wait.start", "orchestrator.wait.timeout"]
        );
        assert!(sink.measurement("orchestrator.wait.timeout", "attempts") >= Some(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_custom_message() {
        let result: Result<u32, _> = poll_until(
            WaitOptions::new(Duration::from_millis(100))
                .with_timeout_message("Timeout waiting for machine to reach state: started"),
            || async { PollOutcome::Continue(None) },
        )
        .await;

        assert_eq!(
            result.unwrap_err().reason(),
            Some("Timeout waiting for machine to reach state: started")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_sleep_is_capped_at_the_deadline() {
        let sink = Arc::new(CaptureSink::default());
        let started = Instant::now();
        let backoff = BackoffConfig {
            initial_delay: Duration::from_millis(900),
            multiplier: 1.5,
            max_delay: Duration::from_secs(5),
            jitter: 0.0,
        };

        let result: Result<u32, _> = poll_until(
            WaitOptions::new(Duration::from_secs(1))
                .with_backoff(backoff)
                .with_telemetry(sink.clone()),
            || async { PollOutcome::Continue(None) },
        )
        .await;

        assert!(result.unwrap_err().is_timeout());
        // 900ms sleep, then a 100ms sleep capped by the remaining budget.
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(
            sink.measurement("orchestrator.wait.timeout", "attempts"),
            Some(2.0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_continue_twice_then_done() {
        let sink = Arc::new(CaptureSink::default());
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = poll_until(
            WaitOptions::new(Duration::from_secs(5)).with_telemetry(sink.clone()),
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt <= 2 {
                        PollOutcome::Continue(Some(format!("attempt {attempt}")))
                    } else {
                        PollOutcome::Done("ready")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "ready");
        assert_eq!(
            sink.measurement("orchestrator.wait.stop", "attempts"),
            Some(3.0)
        );
        // At least the two base delays; jitter only adds.
        assert!(started.elapsed() >= Duration::from_millis(500 + 750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_near_zero_timeout_still_checks_once() {
        let calls = AtomicU32::new(0);

        let result = poll_until(WaitOptions::new(Duration::from_millis(1)), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { PollOutcome::Done(()) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_near_zero_timeout_times_out_after_one_attempt() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, _> = poll_until(WaitOptions::new(Duration::from_millis(1)), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { PollOutcome::Continue(None) }
        })
        .await;

        assert!(result.unwrap_err().is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_the_sleep() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result: Result<u32, _> = poll_until(
            WaitOptions::new(Duration::from_secs(30))
                .with_operation("create_machine_and_wait")
                .with_cancel(token),
            || async { PollOutcome::Continue(None) },
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, OperationError::Cancelled { .. }));
        assert_eq!(err.reason(), Some("create_machine_and_wait cancelled"));
        // Cancelled mid-sleep, long before the 30s deadline.
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
