//! Skylift control plane API client
//!
//! This crate issues single REST calls against the Skylift control plane
//! (apps, machines, secrets, volumes) and decodes the results into typed
//! models. Multi-step provisioning flows (create a resource and wait until
//! it reaches a target state) live in the `skylift-orchestrator` crate,
//! which drives this one.
//!
//! ```no_run
//! use skylift_api::{ApiClient, ClientConfig};
//!
//! # async fn demo() -> Result<(), skylift_api::OperationError> {
//! let client = ApiClient::new(ClientConfig::new("token"))?;
//! let app = client.get_app("my-app").await?;
//! println!("{} is {}", app.name, app.status);
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod client;
pub mod config;
pub mod error;
pub mod machines;
pub mod secrets;
pub mod volumes;

// Re-exports
pub use apps::{App, CreateAppRequest, APP_STATUS_ACTIVE};
pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{OperationError, Result};
pub use machines::{
    CreateMachineRequest, GuestConfig, Machine, MachineConfig, MACHINE_STATE_STARTED,
};
pub use secrets::Secret;
pub use volumes::{CreateVolumeRequest, Volume};
