//! Machine endpoints
//!
//! Machines go through created → starting → started → stopping → stopped,
//! plus destroying/destroyed at the end of life. The `wait` endpoint is the
//! server-side blocking variant of "poll until state": the control plane
//! holds the request open until the machine reaches the requested state or
//! its own internal deadline fires.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

/// State a freshly created machine is normally waited into.
pub const MACHINE_STATE_STARTED: &str = "started";

/// A compute instance inside an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Current lifecycle state, e.g. "created", "starting", "started".
    /// Kept as a plain string so unknown states pass through untouched.
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Secondary identifier of the current execution, distinct from the
    /// machine id. Required by the server-side wait endpoint; absent on
    /// machines that have never been scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<MachineConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Configuration payload for a machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineConfig {
    /// OCI image reference to boot. The one field every machine needs.
    pub image: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestConfig>,
}

impl MachineConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    /// A configuration with no image boots nothing; treat it as absent.
    pub fn is_empty(&self) -> bool {
        self.image.trim().is_empty()
    }
}

/// Machine sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestConfig {
    pub cpus: u32,
    pub memory_mb: u32,

    /// "shared" or "performance".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMachineRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    pub config: MachineConfig,
}

impl ApiClient {
    /// Create a machine in an app.
    pub async fn create_machine(
        &self,
        app_name: &str,
        request: &CreateMachineRequest,
    ) -> Result<Machine> {
        Self::require(app_name, "app name")?;
        self.execute(
            self.post(&format!("/apps/{app_name}/machines"))
                .json(request),
        )
        .await
    }

    /// Fetch a machine by id.
    pub async fn get_machine(&self, app_name: &str, machine_id: &str) -> Result<Machine> {
        Self::require(app_name, "app name")?;
        Self::require(machine_id, "machine id")?;
        self.execute(self.get(&format!("/apps/{app_name}/machines/{machine_id}")))
            .await
    }

    /// List all machines in an app.
    pub async fn list_machines(&self, app_name: &str) -> Result<Vec<Machine>> {
        Self::require(app_name, "app name")?;
        self.execute(self.get(&format!("/apps/{app_name}/machines")))
            .await
    }

    /// Start a stopped machine.
    pub async fn start_machine(&self, app_name: &str, machine_id: &str) -> Result<()> {
        Self::require(app_name, "app name")?;
        Self::require(machine_id, "machine id")?;
        self.execute_unit(self.post(&format!("/apps/{app_name}/machines/{machine_id}/start")))
            .await
    }

    /// Stop a running machine.
    pub async fn stop_machine(&self, app_name: &str, machine_id: &str) -> Result<()> {
        Self::require(app_name, "app name")?;
        Self::require(machine_id, "machine id")?;
        self.execute_unit(self.post(&format!("/apps/{app_name}/machines/{machine_id}/stop")))
            .await
    }

    /// Destroy a machine.
    pub async fn destroy_machine(&self, app_name: &str, machine_id: &str) -> Result<()> {
        Self::require(app_name, "app name")?;
        Self::require(machine_id, "machine id")?;
        self.execute_unit(self.delete(&format!("/apps/{app_name}/machines/{machine_id}")))
            .await
    }

    /// Block server-side until the machine reaches `state`.
    ///
    /// The HTTP request timeout must outlive the wait window, so this
    /// request overrides the client default with `timeout` plus headroom.
    pub async fn wait_machine(
        &self,
        app_name: &str,
        machine_id: &str,
        instance_id: &str,
        state: &str,
        timeout: Duration,
    ) -> Result<Machine> {
        Self::require(app_name, "app name")?;
        Self::require(machine_id, "machine id")?;
        Self::require(instance_id, "instance id")?;
        Self::require(state, "state")?;

        let path = format!(
            "/apps/{app_name}/machines/{machine_id}/wait?instance_id={instance_id}&state={state}&timeout={}",
            timeout.as_secs()
        );
        self.execute(self.get(&path).timeout(timeout + Duration::from_secs(5)))
            .await
    }
}
