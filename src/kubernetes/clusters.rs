//! Cluster lifecycle operations
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use super::maintenance::MaintenancePolicy;
use super::models::*;
use super::node_pools::NodePoolCreateRequest;
use super::KubernetesService;
use crate::api::client::{with_query, NO_BODY};
use crate::api::{ListOptions, Response};
use crate::cancel::CancellationToken;
use crate::error::Result;

/// Request structure for creating a cluster
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterCreateRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "region", skip_serializing_if = "String::is_empty")]
    pub region_slug: String,
    #[serde(rename = "version", skip_serializing_if = "String::is_empty")]
    pub version_slug: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vpc_uuid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_subnet: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_subnet: String,

    /// Create the cluster with a highly available control plane
    pub ha: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_pools: Vec<NodePoolCreateRequest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_policy: Option<MaintenancePolicy>,
    pub auto_upgrade: bool,
    pub surge_upgrade: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_firewall: Option<ControlPlaneFirewall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_autoscaler_configuration: Option<ClusterAutoscalerConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_agent: Option<PluginToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amd_gpu_device_plugin: Option<PluginToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amd_gpu_device_metrics_exporter_plugin: Option<PluginToggle>,
}

/// Request structure for updating a cluster
///
/// `None` fields are left untouched by the API; `Some(false)` switches a
/// feature off.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterUpdateRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_policy: Option<MaintenancePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_upgrade: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surge_upgrade: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_firewall: Option<ControlPlaneFirewall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_autoscaler_configuration: Option<ClusterAutoscalerConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_agent: Option<PluginToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amd_gpu_device_plugin: Option<PluginToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amd_gpu_device_metrics_exporter_plugin: Option<PluginToggle>,

    /// Convert the cluster to a highly available control plane
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha: Option<bool>,
}

/// Request structure for upgrading a cluster
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterUpgradeRequest {
    #[serde(rename = "version", skip_serializing_if = "String::is_empty")]
    pub version_slug: String,
}

/// Associated resources to destroy together with a cluster
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterDeleteSelectiveRequest {
    pub volumes: Vec<String>,
    pub volume_snapshots: Vec<String>,
    pub load_balancers: Vec<String>,
}

/// Options for fetching cluster credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterCredentialsGetRequest {
    /// Lifetime of the issued token; API default when unset
    pub expiry_seconds: Option<u64>,
}

impl KubernetesService {
    /// Create a new cluster
    pub async fn create(
        &self,
        token: &CancellationToken,
        request: &ClusterCreateRequest,
    ) -> Result<(KubernetesCluster, Response)> {
        let url = self.clusters_path(&[])?;
        let (root, response): (ClusterRoot, _) = self
            .client
            .send(token, Method::POST, url, Some(request))
            .await?;
        Ok((root.kubernetes_cluster, response))
    }

    /// Get cluster by ID
    pub async fn get(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
    ) -> Result<(KubernetesCluster, Response)> {
        let url = self.clusters_path(&[cluster_id])?;
        let (root, response): (ClusterRoot, _) = self.client.get(token, url).await?;
        Ok((root.kubernetes_cluster, response))
    }

    /// Get the user the API token maps to inside the cluster
    pub async fn get_user(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
    ) -> Result<(KubernetesClusterUser, Response)> {
        let url = self.clusters_path(&[cluster_id, "user"])?;
        let (root, response): (ClusterUserRoot, _) = self.client.get(token, url).await?;
        Ok((root.kubernetes_cluster_user, response))
    }

    /// Versions the cluster can be upgraded to
    pub async fn get_upgrades(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
    ) -> Result<(Vec<KubernetesVersion>, Response)> {
        let url = self.clusters_path(&[cluster_id, "upgrades"])?;
        let (root, response): (UpgradesRoot, _) = self.client.get(token, url).await?;
        Ok((root.available_upgrade_versions, response))
    }

    /// List clusters visible to the API token
    ///
    /// Pagination links and meta are copied onto the returned [`Response`].
    pub async fn list(
        &self,
        token: &CancellationToken,
        opts: Option<&ListOptions>,
    ) -> Result<(Vec<KubernetesCluster>, Response)> {
        let pairs = opts.map(ListOptions::query_pairs).unwrap_or_default();
        let url = with_query(self.clusters_path(&[])?, &pairs);

        let (root, mut response): (ClustersRoot, _) = self.client.get(token, url).await?;
        if root.links.is_some() {
            response.links = root.links;
        }
        if root.meta.is_some() {
            response.meta = root.meta;
        }
        debug!("Listed {} clusters", root.kubernetes_clusters.len());

        Ok((root.kubernetes_clusters, response))
    }

    /// Update cluster properties
    pub async fn update(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: &ClusterUpdateRequest,
    ) -> Result<(KubernetesCluster, Response)> {
        let url = self.clusters_path(&[cluster_id])?;
        let (root, response): (ClusterRoot, _) = self
            .client
            .send(token, Method::PUT, url, Some(request))
            .await?;
        Ok((root.kubernetes_cluster, response))
    }

    /// Upgrade the cluster to a version listed by [`get_upgrades`](Self::get_upgrades)
    pub async fn upgrade(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: &ClusterUpgradeRequest,
    ) -> Result<Response> {
        let url = self.clusters_path(&[cluster_id, "upgrade"])?;
        self.client
            .send_empty(token, Method::POST, url, Some(request))
            .await
    }

    /// Delete a cluster; this cannot be undone
    pub async fn delete(&self, token: &CancellationToken, cluster_id: &str) -> Result<Response> {
        let url = self.clusters_path(&[cluster_id])?;
        self.client
            .send_empty(token, Method::DELETE, url, NO_BODY)
            .await
    }

    /// Delete a cluster together with the listed associated resources; this cannot be undone
    pub async fn delete_selective(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: &ClusterDeleteSelectiveRequest,
    ) -> Result<Response> {
        let url = self.clusters_path(&[
            cluster_id,
            "destroy_with_associated_resources",
            "selective",
        ])?;
        self.client
            .send_empty(token, Method::DELETE, url, Some(request))
            .await
    }

    /// Delete a cluster and every associated resource; this cannot be undone
    pub async fn delete_dangerous(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
    ) -> Result<Response> {
        let url = self.clusters_path(&[
            cluster_id,
            "destroy_with_associated_resources",
            "dangerous",
        ])?;
        self.client
            .send_empty(token, Method::DELETE, url, NO_BODY)
            .await
    }

    /// Volumes, snapshots and load balancers that may be deleted with the cluster
    pub async fn list_associated_resources_for_deletion(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
    ) -> Result<(KubernetesAssociatedResources, Response)> {
        let url = self.clusters_path(&[cluster_id, "destroy_with_associated_resources"])?;
        self.client.get(token, url).await
    }

    /// Fetch the kubeconfig document, untouched
    ///
    /// `expiry_seconds` bounds the lifetime of the embedded token.
    pub async fn get_kubeconfig(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        expiry_seconds: Option<u64>,
    ) -> Result<(KubernetesClusterConfig, Response)> {
        let pairs: Vec<(&str, String)> = expiry_seconds
            .map(|secs| ("expiry_seconds", secs.to_string()))
            .into_iter()
            .collect();
        let url = with_query(self.clusters_path(&[cluster_id, "kubeconfig"])?, &pairs);

        let request = self.client.new_request(Method::GET, url, NO_BODY)?;
        let (kubeconfig_yaml, response) = self.client.execute_raw(token, request).await?;
        Ok((KubernetesClusterConfig { kubeconfig_yaml }, response))
    }

    /// Fetch API server credentials
    pub async fn get_credentials(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: Option<&ClusterCredentialsGetRequest>,
    ) -> Result<(KubernetesClusterCredentials, Response)> {
        let pairs: Vec<(&str, String)> = request
            .and_then(|r| r.expiry_seconds)
            .map(|secs| ("expiry_seconds", secs.to_string()))
            .into_iter()
            .collect();
        let url = with_query(self.clusters_path(&[cluster_id, "credentials"])?, &pairs);
        self.client.get(token, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::MaintenancePolicyDay;
    use serde_json::json;

    #[test]
    fn test_create_request_omits_unset_fields() {
        let request = ClusterCreateRequest {
            name: "prod".to_string(),
            region_slug: "nyc1".to_string(),
            version_slug: "1.29.1-do.0".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "prod",
                "region": "nyc1",
                "version": "1.29.1-do.0",
                "ha": false,
                "auto_upgrade": false,
                "surge_upgrade": false
            })
        );
    }

    #[test]
    fn test_create_request_with_policy() {
        let request = ClusterCreateRequest {
            name: "prod".to_string(),
            maintenance_policy: Some(MaintenancePolicy {
                start_time: "03:00".to_string(),
                duration: String::new(),
                day: MaintenancePolicyDay::Sunday,
            }),
            routing_agent: Some(PluginToggle::enabled(false)),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["maintenance_policy"]["day"], "sunday");
        assert_eq!(value["routing_agent"], json!({"enabled": false}));
    }

    #[test]
    fn test_update_request_distinguishes_unset_from_false() {
        let empty = serde_json::to_value(ClusterUpdateRequest::default()).unwrap();
        assert_eq!(empty, json!({}));

        let request = ClusterUpdateRequest {
            auto_upgrade: Some(false),
            ha: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"auto_upgrade": false, "ha": true})
        );
    }

    #[test]
    fn test_delete_selective_always_sends_lists() {
        let request = ClusterDeleteSelectiveRequest {
            volumes: vec!["vol-1".to_string()],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"volumes": ["vol-1"], "volume_snapshots": [], "load_balancers": []})
        );
    }
}
