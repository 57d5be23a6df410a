//! DigitalOcean Kubernetes (DOKS) endpoints
//!
//! Every operation maps one call to one HTTP request and returns the decoded
//! payload together with the [`Response`](crate::api::Response) wrapper.
pub mod clusterlint;
pub mod clusters;
pub mod maintenance;
pub mod models;
pub mod node_pools;
pub mod registry;
pub mod status;
pub mod taint;

pub use clusterlint::{
    GetClusterStatusMessagesRequest, GetClusterlintRequest, RunClusterlintRequest,
};
pub use clusters::{
    ClusterCreateRequest, ClusterCredentialsGetRequest, ClusterDeleteSelectiveRequest,
    ClusterUpdateRequest, ClusterUpgradeRequest,
};
pub use maintenance::{InvalidDayError, MaintenancePolicy, MaintenancePolicyDay, ParseDayError};
pub use models::*;
pub use node_pools::{
    NodeDeleteRequest, NodePoolCreateRequest, NodePoolRecycleNodesRequest, NodePoolUpdateRequest,
};
pub use registry::ClusterRegistryRequest;
pub use status::{ClusterStatus, ClusterStatusState, ParseStateError};
pub use taint::{ParseTaintError, Taint};

use url::Url;

use crate::api::DoClient;
use crate::error::Result;

const KUBERNETES_BASE: [&str; 2] = ["v2", "kubernetes"];

/// Handle on the Kubernetes endpoints
#[derive(Clone)]
pub struct KubernetesService {
    client: DoClient,
}

impl KubernetesService {
    /// Create a new Kubernetes service handle
    pub fn new(client: DoClient) -> Self {
        Self { client }
    }

    /// `/v2/kubernetes/<segments...>`
    fn path(&self, segments: &[&str]) -> Result<Url> {
        let mut full: Vec<&str> = KUBERNETES_BASE.to_vec();
        full.extend_from_slice(segments);
        self.client.endpoint(&full)
    }

    /// `/v2/kubernetes/clusters/<segments...>`
    fn clusters_path(&self, segments: &[&str]) -> Result<Url> {
        let mut full = vec!["clusters"];
        full.extend_from_slice(segments);
        self.path(&full)
    }
}
