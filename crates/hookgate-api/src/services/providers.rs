// Provider endpoints
//
// CRUD plus per-provider delivery statistics under `/admin/providers`.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Provider, ProviderCreate, ProviderStats, ProviderUpdate};
use crate::services::or_default_if_absent;

impl ApiClient {
    /// List every registered provider.
    ///
    /// `GET /admin/providers`. Empty when the route is not served.
    pub async fn list_providers(&self) -> Result<Vec<Provider>, Error> {
        let result = self.get_json(&["admin", "providers"], &[]).await;
        or_default_if_absent("provider list", result)
    }

    /// `GET /admin/providers/{name}`
    pub async fn get_provider(&self, name: &str) -> Result<Provider, Error> {
        self.get_json(&["admin", "providers", name], &[]).await
    }

    /// Register a provider. The request is validated before it is sent.
    ///
    /// `POST /admin/providers`
    pub async fn create_provider(&self, req: &ProviderCreate) -> Result<Provider, Error> {
        req.validate()?;
        debug!(name = %req.name, "creating provider");
        self.post_json(&["admin", "providers"], req).await
    }

    /// `PUT /admin/providers/{name}`
    pub async fn update_provider(
        &self,
        name: &str,
        req: &ProviderUpdate,
    ) -> Result<Provider, Error> {
        req.validate()?;
        debug!(name, "updating provider");
        self.put_json(&["admin", "providers", name], req).await
    }

    /// `DELETE /admin/providers/{name}`
    pub async fn delete_provider(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting provider");
        self.delete(&["admin", "providers", name]).await
    }

    /// `GET /admin/providers/{name}/stats`. Zeroed when the route is not served.
    pub async fn provider_stats(&self, name: &str) -> Result<ProviderStats, Error> {
        let result = self.get_json(&["admin", "providers", name, "stats"], &[]).await;
        or_default_if_absent("provider stats", result)
    }
}
