//! Secret endpoints
//!
//! Secret values are write-only: the control plane returns names and
//! digests, never the material itself.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

/// A named secret visible to machines in an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,

    /// Digest of the stored value, for change detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct SetSecretsRequest<'a> {
    secrets: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ListSecretsResponse {
    secrets: Vec<Secret>,
}

impl ApiClient {
    /// List the secrets set on an app.
    pub async fn list_secrets(&self, app_name: &str) -> Result<Vec<Secret>> {
        Self::require(app_name, "app name")?;
        let response: ListSecretsResponse = self
            .execute(self.get(&format!("/apps/{app_name}/secrets")))
            .await?;
        Ok(response.secrets)
    }

    /// Set (create or replace) secrets on an app.
    pub async fn set_secrets(
        &self,
        app_name: &str,
        secrets: &HashMap<String, String>,
    ) -> Result<()> {
        Self::require(app_name, "app name")?;
        if secrets.is_empty() {
            return Ok(());
        }

        let body = SetSecretsRequest { secrets };
        self.execute_unit(self.put(&format!("/apps/{app_name}/secrets")).json(&body))
            .await
    }

    /// Remove a single secret from an app.
    pub async fn unset_secret(&self, app_name: &str, name: &str) -> Result<()> {
        Self::require(app_name, "app name")?;
        Self::require(name, "secret name")?;
        self.execute_unit(self.delete(&format!("/apps/{app_name}/secrets/{name}")))
            .await
    }
}
