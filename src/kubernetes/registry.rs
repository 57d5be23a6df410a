//! Container registry integration and service options
use reqwest::Method;
use serde::Serialize;

use super::models::{KubernetesOptions, OptionsRoot};
use super::KubernetesService;
use crate::api::Response;
use crate::cancel::CancellationToken;
use crate::error::Result;

/// Clusters to (dis)connect from the account's container registry
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterRegistryRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cluster_uuids: Vec<String>,
}

impl KubernetesService {
    /// Versions, regions and node sizes available for new clusters
    pub async fn get_options(
        &self,
        token: &CancellationToken,
    ) -> Result<(KubernetesOptions, Response)> {
        let url = self.path(&["options"])?;
        let (root, response): (OptionsRoot, _) = self.client.get(token, url).await?;
        Ok((root.options, response))
    }

    /// Integrate the container registry with the given clusters
    pub async fn add_registry(
        &self,
        token: &CancellationToken,
        request: &ClusterRegistryRequest,
    ) -> Result<Response> {
        let url = self.path(&["registry"])?;
        self.client
            .send_empty(token, Method::POST, url, Some(request))
            .await
    }

    /// Remove the container registry integration from the given clusters
    pub async fn remove_registry(
        &self,
        token: &CancellationToken,
        request: &ClusterRegistryRequest,
    ) -> Result<Response> {
        let url = self.path(&["registry"])?;
        self.client
            .send_empty(token, Method::DELETE, url, Some(request))
            .await
    }
}
