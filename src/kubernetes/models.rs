//! DigitalOcean Kubernetes API data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::maintenance::MaintenancePolicy;
use super::status::ClusterStatus;
use super::taint::Taint;
use crate::api::{Links, Meta};

/// Kubernetes cluster resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubernetesCluster {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "region")]
    pub region_slug: String,
    #[serde(default, rename = "version")]
    pub version_slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_subnet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_subnet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ipv4: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vpc_uuid: String,

    /// Highly available control plane
    #[serde(default)]
    pub ha: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_pools: Vec<KubernetesNodePool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_policy: Option<MaintenancePolicy>,
    #[serde(default)]
    pub auto_upgrade: bool,
    #[serde(default)]
    pub surge_upgrade: bool,
    #[serde(default)]
    pub registry_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_firewall: Option<ControlPlaneFirewall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_autoscaler_configuration: Option<ClusterAutoscalerConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_agent: Option<PluginToggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amd_gpu_device_plugin: Option<PluginToggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amd_gpu_device_metrics_exporter_plugin: Option<PluginToggle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl KubernetesCluster {
    /// Cluster ID in DigitalOcean URN form
    pub fn urn(&self) -> String {
        format!("do:kubernetes:{}", self.id)
    }
}

/// User the API token authenticates as inside a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesClusterUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// API server credentials of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesClusterCredentials {
    #[serde(default)]
    pub server: String,
    #[serde(default, with = "base64_bytes")]
    pub certificate_authority_data: Vec<u8>,
    #[serde(default, with = "base64_bytes")]
    pub client_certificate_data: Vec<u8>,
    #[serde(default, with = "base64_bytes")]
    pub client_key_data: Vec<u8>,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Raw kubeconfig document of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubernetesClusterConfig {
    pub kubeconfig_yaml: Vec<u8>,
}

/// Control plane firewall settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlaneFirewall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_addresses: Option<Vec<String>>,
}

/// Cluster autoscaler tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterAutoscalerConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_down_utilization_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_down_unneeded_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanders: Option<Vec<String>>,
}

/// On/off switch of a cluster plugin (routing agent, AMD GPU plugins)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginToggle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl PluginToggle {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
        }
    }
}

/// Node pool of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNodePool {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
    #[serde(default)]
    pub auto_scale: bool,
    #[serde(default)]
    pub min_nodes: u32,
    #[serde(default)]
    pub max_nodes: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<KubernetesNode>,
}

/// Node of a node pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<KubernetesNodeStatus>,
    /// Backing droplet
    #[serde(default)]
    pub droplet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Node status; node states are free-form text on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNodeStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Template used to scale a node pool up from zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNodePoolTemplate {
    #[serde(default, alias = "Template")]
    pub template: Option<KubernetesNodeTemplate>,
}

/// Shape of the nodes a pool would create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNodeTemplate {
    #[serde(default)]
    pub cluster_uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<KubernetesNodePoolResources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocatable: Option<KubernetesNodePoolResources>,
}

/// Schedulable resources of a template node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNodePoolResources {
    #[serde(default)]
    pub cpu: i64,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub pods: i64,
}

/// Versions, regions and sizes available for new clusters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesOptions {
    #[serde(default)]
    pub versions: Vec<KubernetesVersion>,
    #[serde(default)]
    pub regions: Vec<KubernetesRegion>,
    #[serde(default)]
    pub sizes: Vec<KubernetesNodeSize>,
}

/// DigitalOcean Kubernetes release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesVersion {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesRegion {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesNodeSize {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Finding of a clusterlint run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterlintDiagnostic {
    #[serde(default)]
    pub check_name: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub object: Option<ClusterlintObject>,
}

/// Kubernetes object a diagnostic refers to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterlintObject {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<ClusterlintOwner>,
}

/// Owner of the offending object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterlintOwner {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

/// Resources that can be removed together with a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesAssociatedResources {
    #[serde(default)]
    pub volumes: Vec<AssociatedResource>,
    #[serde(default)]
    pub volume_snapshots: Vec<AssociatedResource>,
    #[serde(default)]
    pub load_balancers: Vec<AssociatedResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedResource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Entry of a cluster's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesClusterStatusMessage {
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// Response envelopes

#[derive(Debug, Deserialize)]
pub(crate) struct ClustersRoot {
    #[serde(default)]
    pub kubernetes_clusters: Vec<KubernetesCluster>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClusterRoot {
    pub kubernetes_cluster: KubernetesCluster,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClusterUserRoot {
    pub kubernetes_cluster_user: KubernetesClusterUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodePoolRoot {
    pub node_pool: KubernetesNodePool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodePoolsRoot {
    #[serde(default)]
    pub node_pools: Vec<KubernetesNodePool>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpgradesRoot {
    #[serde(default)]
    pub available_upgrade_versions: Vec<KubernetesVersion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OptionsRoot {
    #[serde(default)]
    pub options: KubernetesOptions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunClusterlintRoot {
    pub run_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiagnosticsRoot {
    #[serde(default, alias = "Diagnostics")]
    pub diagnostics: Vec<ClusterlintDiagnostic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusMessagesRoot {
    #[serde(default)]
    pub messages: Vec<KubernetesClusterStatusMessage>,
}

/// Standard base64 for byte blobs, `null` or absent decoding to empty
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
