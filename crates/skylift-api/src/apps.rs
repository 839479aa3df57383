//! App endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

/// Status reported by the control plane once an app is ready for machines.
pub const APP_STATUS_ACTIVE: &str = "active";

/// An application, the namespace that machines, secrets and volumes live in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub name: String,

    /// Slug of the owning organization.
    pub organization: String,

    /// Lifecycle status as reported by the control plane, e.g. "pending"
    /// right after creation and "active" once provisioned. Kept as a plain
    /// string so unknown states pass through untouched.
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateAppRequest {
    pub app_name: String,
    pub org_slug: String,
}

#[derive(Debug, Deserialize)]
pub struct ListAppsResponse {
    pub apps: Vec<App>,
}

impl ApiClient {
    /// Create an app under an organization.
    pub async fn create_app(&self, name: &str, org: &str) -> Result<App> {
        Self::require(name, "app name")?;
        Self::require(org, "organization slug")?;

        let body = CreateAppRequest {
            app_name: name.to_string(),
            org_slug: org.to_string(),
        };
        self.execute(self.post("/apps").json(&body)).await
    }

    /// Fetch an app by name.
    pub async fn get_app(&self, name: &str) -> Result<App> {
        Self::require(name, "app name")?;
        self.execute(self.get(&format!("/apps/{name}"))).await
    }

    /// List apps, optionally scoped to one organization.
    pub async fn list_apps(&self, org: Option<&str>) -> Result<Vec<App>> {
        let path = match org {
            Some(org) => format!("/apps?org={org}"),
            None => "/apps".to_string(),
        };
        let response: ListAppsResponse = self.execute(self.get(&path)).await?;
        Ok(response.apps)
    }

    /// Delete an app and everything in it.
    pub async fn destroy_app(&self, name: &str) -> Result<()> {
        Self::require(name, "app name")?;
        self.execute_unit(self.delete(&format!("/apps/{name}")))
            .await
    }
}
