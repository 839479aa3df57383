//! Volume endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

/// A persistent volume attachable to one machine at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,

    /// Lifecycle state, e.g. "creating", "created", "destroying".
    pub state: String,

    pub size_gb: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_machine_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateVolumeRequest {
    pub name: String,
    pub size_gb: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExtendVolumeRequest {
    size_gb: u32,
}

impl ApiClient {
    /// Create a volume in an app.
    pub async fn create_volume(
        &self,
        app_name: &str,
        request: &CreateVolumeRequest,
    ) -> Result<Volume> {
        Self::require(app_name, "app name")?;
        Self::require(&request.name, "volume name")?;
        self.execute(
            self.post(&format!("/apps/{app_name}/volumes"))
                .json(request),
        )
        .await
    }

    /// Fetch a volume by id.
    pub async fn get_volume(&self, app_name: &str, volume_id: &str) -> Result<Volume> {
        Self::require(app_name, "app name")?;
        Self::require(volume_id, "volume id")?;
        self.execute(self.get(&format!("/apps/{app_name}/volumes/{volume_id}")))
            .await
    }

    /// List all volumes in an app.
    pub async fn list_volumes(&self, app_name: &str) -> Result<Vec<Volume>> {
        Self::require(app_name, "app name")?;
        self.execute(self.get(&format!("/apps/{app_name}/volumes")))
            .await
    }

    /// Grow a volume. Volumes never shrink.
    pub async fn extend_volume(
        &self,
        app_name: &str,
        volume_id: &str,
        size_gb: u32,
    ) -> Result<Volume> {
        Self::require(app_name, "app name")?;
        Self::require(volume_id, "volume id")?;

        let body = ExtendVolumeRequest { size_gb };
        self.execute(
            self.post(&format!("/apps/{app_name}/volumes/{volume_id}/extend"))
                .json(&body),
        )
        .await
    }

    /// Destroy a volume.
    pub async fn destroy_volume(&self, app_name: &str, volume_id: &str) -> Result<()> {
        Self::require(app_name, "app name")?;
        Self::require(volume_id, "volume id")?;
        self.execute_unit(self.delete(&format!("/apps/{app_name}/volumes/{volume_id}")))
            .await
    }
}
