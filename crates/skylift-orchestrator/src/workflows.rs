//! Create-and-wait workflows
//!
//! Each workflow issues exactly one creation call, then waits for the
//! resource to reach its target state: server-side when the control plane
//! supports it, otherwise by polling through [`poll_until`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use skylift_api::{
    App, Machine, MachineConfig, OperationError, Result, APP_STATUS_ACTIVE, MACHINE_STATE_STARTED,
};

use crate::ops::ResourceOps;
use crate::poll::{poll_until, PollOutcome, WaitOptions};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

pub(crate) const EVENT_WAIT_FALLBACK: &[&str] = &["orchestrator", "wait", "fallback"];

/// Default bound on how long a workflow waits for its target state.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Inputs for [`Orchestrator::create_app_and_wait`].
#[derive(Debug, Clone)]
pub struct CreateAppOptions {
    pub name: String,
    pub org: String,
    pub timeout: Duration,
    pub cancel: Option<CancellationToken>,
}

impl CreateAppOptions {
    pub fn new(name: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            org: org.into(),
            timeout: DEFAULT_WAIT_TIMEOUT,
            cancel: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Inputs for [`Orchestrator::create_machine_and_wait`].
#[derive(Debug, Clone)]
pub struct CreateMachineOptions {
    pub app_name: String,
    pub config: MachineConfig,
    pub region: Option<String>,

    /// State the machine must reach, "started" unless overridden.
    pub target_state: String,

    pub timeout: Duration,
    pub cancel: Option<CancellationToken>,
}

impl CreateMachineOptions {
    pub fn new(app_name: impl Into<String>, config: MachineConfig) -> Self {
        Self {
            app_name: app_name.into(),
            config,
            region: None,
            target_state: MACHINE_STATE_STARTED.to_string(),
            timeout: DEFAULT_WAIT_TIMEOUT,
            cancel: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_target_state(mut self, state: impl Into<String>) -> Self {
        self.target_state = state.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Multi-step provisioning driver over a [`ResourceOps`] implementation.
pub struct Orchestrator<A> {
    ops: A,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl<A: ResourceOps> Orchestrator<A> {
    pub fn new(ops: A) -> Self {
        Self {
            ops,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Create an app and wait until the control plane reports it active.
    ///
    /// The creation error, if any, is propagated verbatim and no polling
    /// happens. A get failure during polling ends the wait immediately.
    pub async fn create_app_and_wait(&self, opts: CreateAppOptions) -> Result<App> {
        if opts.name.trim().is_empty() {
            return Err(OperationError::validation("app name must not be empty"));
        }
        if opts.org.trim().is_empty() {
            return Err(OperationError::validation(
                "organization slug must not be empty",
            ));
        }

        let created = self.ops.create_app(&opts.name, &opts.org).await?;
        tracing::info!(app = %created.name, status = %created.status, "app created");

        let wait = self
            .wait_options(opts.timeout, opts.cancel.clone())
            .with_operation("create_app_and_wait")
            .with_timeout_message("Timeout waiting for app to become active");

        let ops = &self.ops;
        let name = opts.name.as_str();
        poll_until(wait, || async move {
            match ops.get_app(name).await {
                Ok(app) if app.status == APP_STATUS_ACTIVE => PollOutcome::Done(app),
                Ok(app) => PollOutcome::Continue(Some(format!("app status: {}", app.status))),
                Err(error) => PollOutcome::Failed(error),
            }
        })
        .await
    }

    /// Create a machine and ensure it reaches the target state.
    ///
    /// When the created machine carries an instance id, the control plane's
    /// blocking wait endpoint is tried first; any failure there falls back
    /// silently to client-side polling, surfaced only as an
    /// `orchestrator.wait.fallback` telemetry event.
    pub async fn create_machine_and_wait(&self, opts: CreateMachineOptions) -> Result<Machine> {
        if opts.app_name.trim().is_empty() {
            return Err(OperationError::validation("app name must not be empty"));
        }
        if opts.config.is_empty() {
            return Err(OperationError::validation(
                "machine config must not be empty",
            ));
        }

        let created = self
            .ops
            .create_machine(&opts.app_name, &opts.config, opts.region.as_deref())
            .await?;
        tracing::info!(machine = %created.id, state = %created.state, "machine created");

        if let Some(instance_id) = created.instance_id.as_deref().filter(|id| !id.is_empty()) {
            match self
                .ops
                .wait_machine(
                    &opts.app_name,
                    &created.id,
                    instance_id,
                    &opts.target_state,
                    opts.timeout,
                )
                .await
            {
                Ok(machine) => return Ok(machine),
                Err(error) => {
                    tracing::debug!(
                        machine = %created.id,
                        error = %error,
                        "server-side wait failed, falling back to polling",
                    );
                    self.emit(
                        TelemetryEvent::new(EVENT_WAIT_FALLBACK, "create_machine_and_wait")
                            .with_reason(error.to_string()),
                    );
                }
            }
        }

        let wait = self
            .wait_options(opts.timeout, opts.cancel.clone())
            .with_operation("create_machine_and_wait")
            .with_timeout_message(format!(
                "Timeout waiting for machine to reach state: {}",
                opts.target_state
            ));

        let ops = &self.ops;
        let app_name = opts.app_name.as_str();
        let machine_id = created.id.as_str();
        let target_state = opts.target_state.as_str();
        poll_until(wait, || async move {
            match ops.get_machine(app_name, machine_id).await {
                Ok(machine) if machine.state == target_state => PollOutcome::Done(machine),
                Ok(machine) => {
                    PollOutcome::Continue(Some(format!("machine state: {}", machine.state)))
                }
                Err(error) => PollOutcome::Failed(error),
            }
        })
        .await
    }

    fn wait_options(&self, timeout: Duration, cancel: Option<CancellationToken>) -> WaitOptions {
        let mut wait = WaitOptions::new(timeout);
        if let Some(sink) = &self.telemetry {
            wait = wait.with_telemetry(sink.clone());
        }
        if let Some(token) = cancel {
            wait = wait.with_cancel(token);
        }
        wait
    }

    fn emit(&self, event: TelemetryEvent) {
        if let Some(sink) = &self.telemetry {
            sink.emit(event);
        }
    }
}
