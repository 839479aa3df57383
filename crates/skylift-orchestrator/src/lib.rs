//! Skylift provisioning orchestrator
//!
//! Turns the fire-and-forget calls of `skylift-api` into robust
//! "create and wait for target state" operations: bounded exponential
//! backoff with jitter, timeout- and cancellation-bound polling loops, and
//! structured lifecycle telemetry.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                caller                        │
//! └──────────────────┬──────────────────────────┘
//!                    │ create_*_and_wait
//! ┌──────────────────▼──────────────────────────┐
//! │          skylift-orchestrator                │
//! │  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  poll_until  │  │  TelemetrySink      │  │
//! │  │  + backoff   │  │  (wait.* events)    │  │
//! │  └──────────────┘  └─────────────────────┘  │
//! └──────────────────┬──────────────────────────┘
//!                    │ trait ResourceOps
//! ┌──────────────────▼──────────────────────────┐
//! │         skylift-api (REST client)            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ```no_run
//! use skylift_orchestrator::{CreateMachineOptions, Orchestrator};
//! use skylift_api::{ApiClient, MachineConfig};
//!
//! # async fn demo() -> Result<(), skylift_api::OperationError> {
//! let client = ApiClient::from_env()?;
//! let orchestrator = Orchestrator::new(client);
//!
//! let machine = orchestrator
//!     .create_machine_and_wait(
//!         CreateMachineOptions::new("my-app", MachineConfig::new("demo:latest"))
//!             .with_region("nrt"),
//!     )
//!     .await?;
//! println!("{} is {}", machine.id, machine.state);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod ops;
pub mod poll;
pub mod telemetry;
pub mod workflows;

// Re-exports
pub use backoff::BackoffConfig;
pub use ops::ResourceOps;
pub use poll::{poll_until, PollOutcome, WaitOptions, DEFAULT_TIMEOUT_REASON};
pub use telemetry::{LogSink, TelemetryEvent, TelemetrySink};
pub use workflows::{CreateAppOptions, CreateMachineOptions, Orchestrator, DEFAULT_WAIT_TIMEOUT};
