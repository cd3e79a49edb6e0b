//! Alert service.

use taskboard_core::{Alert, AlertId, AlertUpdate, NewAlert, VisibilityUpdate};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ClientError;

/// CRUD over `alertas/`, plus the bulk visibility update.
#[derive(Debug, Clone, Copy)]
pub struct AlertService<'a> {
    api: &'a ApiClient,
}

impl<'a> AlertService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// List alerts addressed to the logged-in user (all alerts for
    /// administrators).
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Alert>, ClientError> {
        self.api.get("alertas/").await
    }

    /// Fetch one alert.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: AlertId) -> Result<Alert, ClientError> {
        self.api.get(&format!("alertas/{id}/")).await
    }

    /// Send an alert to a user.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, alert), fields(user = %alert.user))]
    pub async fn create(&self, alert: &NewAlert) -> Result<Alert, ClientError> {
        self.api.post("alertas/", alert).await
    }

    /// Change an alert's message.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: AlertId, update: &AlertUpdate) -> Result<Alert, ClientError> {
        self.api.put(&format!("alertas/{id}/"), update).await
    }

    /// Delete an alert.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AlertId) -> Result<(), ClientError> {
        self.api.delete(&format!("alertas/{id}/")).await
    }

    /// Hide alerts. Hiding an already hidden alert is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn hide(&self, ids: &[AlertId]) -> Result<(), ClientError> {
        let body = VisibilityUpdate { ids: ids.to_vec() };
        self.api
            .patch_no_content("alertas/update-visibility/", &body)
            .await
    }
}
