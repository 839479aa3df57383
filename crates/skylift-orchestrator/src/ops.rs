//! Resource operations boundary
//!
//! The orchestration engine reaches the control plane only through this
//! trait. Production code uses [`ApiClient`]; tests substitute scripted
//! fakes.

use std::time::Duration;

use async_trait::async_trait;

use skylift_api::{ApiClient, App, CreateMachineRequest, Machine, MachineConfig, Result};

/// The single-call operations the workflows are built from.
#[async_trait]
pub trait ResourceOps: Send + Sync {
    async fn create_app(&self, name: &str, org: &str) -> Result<App>;

    async fn get_app(&self, name: &str) -> Result<App>;

    async fn create_machine(
        &self,
        app_name: &str,
        config: &MachineConfig,
        region: Option<&str>,
    ) -> Result<Machine>;

    async fn get_machine(&self, app_name: &str, machine_id: &str) -> Result<Machine>;

    /// Server-side blocking wait for `state`, keyed by the machine's
    /// secondary instance id.
    async fn wait_machine(
        &self,
        app_name: &str,
        machine_id: &str,
        instance_id: &str,
        state: &str,
        timeout: Duration,
    ) -> Result<Machine>;
}

#[async_trait]
impl ResourceOps for ApiClient {
    async fn create_app(&self, name: &str, org: &str) -> Result<App> {
        ApiClient::create_app(self, name, org).await
    }

    async fn get_app(&self, name: &str) -> Result<App> {
        ApiClient::get_app(self, name).await
    }

    async fn create_machine(
        &self,
        app_name: &str,
        config: &MachineConfig,
        region: Option<&str>,
    ) -> Result<Machine> {
        let request = CreateMachineRequest {
            name: None,
            region: region.map(String::from),
            config: config.clone(),
        };
        ApiClient::create_machine(self, app_name, &request).await
    }

    async fn get_machine(&self, app_name: &str, machine_id: &str) -> Result<Machine> {
        ApiClient::get_machine(self, app_name, machine_id).await
    }

    async fn wait_machine(
        &self,
        app_name: &str,
        machine_id: &str,
        instance_id: &str,
        state: &str,
        timeout: Duration,
    ) -> Result<Machine> {
        ApiClient::wait_machine(self, app_name, machine_id, instance_id, state, timeout).await
    }
}
