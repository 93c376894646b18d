//! Resource Dispatch
//!
//! Write side of the resource client: maps create/update/delete and status
//! changes onto the Zoho Books REST endpoints of a resource.

use super::fetcher::ResourceClient;
use crate::error::{Error, Result};
use serde_json::Value;

/// Status endpoints for activating / deactivating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Active,
    Inactive,
}

impl StatusChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl ResourceClient<'_> {
    /// POST a new object
    pub async fn create(&self, body: &Value) -> Result<Value> {
        tracing::info!("Creating {}", self.def.noun());
        let url = self.client.books_url(&self.def.endpoint);
        let response = self.client.post(&url, Some(body)).await?;
        self.single_object(response, "create")
    }

    /// PUT changed fields onto an existing object
    pub async fn update(&self, id: &str, body: &Value) -> Result<Value> {
        tracing::info!("Updating {} {}", self.def.noun(), id);
        let url = self.client.resource_url(&self.def.endpoint, id);
        let response = self.client.put(&url, Some(body)).await?;
        self.single_object(response, "update")
    }

    /// DELETE an object
    pub async fn delete(&self, id: &str) -> Result<bool> {
        tracing::info!("Deleting {} {}", self.def.noun(), id);
        let url = self.client.resource_url(&self.def.endpoint, id);
        self.client.delete(&url).await?;
        Ok(true)
    }

    pub async fn mark_active(&self, id: &str) -> Result<Option<Value>> {
        self.set_status(id, StatusChange::Active).await
    }

    pub async fn mark_inactive(&self, id: &str) -> Result<Option<Value>> {
        self.set_status(id, StatusChange::Inactive).await
    }

    /// Mark an object active or inactive
    ///
    /// The API usually answers with a bare confirmation message, in which case
    /// `None` is returned.
    pub async fn set_status(&self, id: &str, status: StatusChange) -> Result<Option<Value>> {
        tracing::info!("Marking {} {} as {}", self.def.noun(), id, status.as_str());
        let url = self
            .client
            .resource_url(&self.def.endpoint, id)
            + "/"
            + status.as_str();
        let response = self.client.post(&url, None).await?;
        Ok(response
            .get(&self.def.single_key)
            .filter(|v| v.is_object())
            .cloned())
    }

    fn single_object(&self, response: Value, action: &str) -> Result<Value> {
        response
            .get(&self.def.single_key)
            .filter(|v| v.is_object())
            .cloned()
            .ok_or_else(|| {
                Error::remote(
                    None,
                    format!(
                        "Failed to {} {}: response has no '{}' object",
                        action,
                        self.def.noun(),
                        self.def.single_key
                    ),
                )
            })
    }
}
