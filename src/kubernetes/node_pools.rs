//! Node pool and node operations
use reqwest::Method;
use serde::Serialize;
use std::collections::HashMap;

use super::models::*;
use super::taint::Taint;
use super::KubernetesService;
use crate::api::client::{with_query, NO_BODY};
use crate::api::{ListOptions, Response};
use crate::cancel::CancellationToken;
use crate::error::Result;

/// Request structure for creating a node pool
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodePoolCreateRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub size: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_scale: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub min_nodes: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_nodes: u32,
}

/// Request structure for updating a node pool
///
/// `taints: Some(vec![])` clears all taints, `None` leaves them alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodePoolUpdateRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taints: Option<Vec<Taint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u32>,
}

/// Nodes to recycle, superseded by [`NodeDeleteRequest`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodePoolRecycleNodesRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,
}

/// Flags for deleting a single node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeDeleteRequest {
    /// Create a new node in place of the deleted one
    pub replace: bool,
    /// Delete without draining workloads first
    pub skip_drain: bool,
}

impl NodeDeleteRequest {
    /// Query parameters, each present only when set
    fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if self.replace {
            pairs.push(("replace", "1"));
        }
        if self.skip_drain {
            pairs.push(("skip_drain", "1"));
        }
        pairs
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl KubernetesService {
    /// Create a node pool in an existing cluster
    pub async fn create_node_pool(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: &NodePoolCreateRequest,
    ) -> Result<(KubernetesNodePool, Response)> {
        let url = self.clusters_path(&[cluster_id, "node_pools"])?;
        let (root, response): (NodePoolRoot, _) = self
            .client
            .send(token, Method::POST, url, Some(request))
            .await?;
        Ok((root.node_pool, response))
    }

    /// Get node pool by ID
    pub async fn get_node_pool(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        pool_id: &str,
    ) -> Result<(KubernetesNodePool, Response)> {
        let url = self.clusters_path(&[cluster_id, "node_pools", pool_id])?;
        let (root, response): (NodePoolRoot, _) = self.client.get(token, url).await?;
        Ok((root.node_pool, response))
    }

    /// Template the autoscaler uses to scale the named pool up from zero
    pub async fn get_node_pool_template(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        node_pool_name: &str,
    ) -> Result<(KubernetesNodePoolTemplate, Response)> {
        let url = self.clusters_path(&[cluster_id, "node_pools_template", node_pool_name])?;
        self.client.get(token, url).await
    }

    /// List the node pools of a cluster
    ///
    /// Pagination links and meta are copied onto the returned [`Response`].
    pub async fn list_node_pools(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        opts: Option<&ListOptions>,
    ) -> Result<(Vec<KubernetesNodePool>, Response)> {
        let pairs = opts.map(ListOptions::query_pairs).unwrap_or_default();
        let url = with_query(self.clusters_path(&[cluster_id, "node_pools"])?, &pairs);

        let (root, mut response): (NodePoolsRoot, _) = self.client.get(token, url).await?;
        if root.links.is_some() {
            response.links = root.links;
        }
        if root.meta.is_some() {
            response.meta = root.meta;
        }

        Ok((root.node_pools, response))
    }

    /// Update a node pool
    pub async fn update_node_pool(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        pool_id: &str,
        request: &NodePoolUpdateRequest,
    ) -> Result<(KubernetesNodePool, Response)> {
        let url = self.clusters_path(&[cluster_id, "node_pools", pool_id])?;
        let (root, response): (NodePoolRoot, _) = self
            .client
            .send(token, Method::PUT, url, Some(request))
            .await?;
        Ok((root.node_pool, response))
    }

    /// Recycle a batch of nodes
    #[deprecated(note = "use `delete_node` with `replace: true` instead")]
    pub async fn recycle_node_pool_nodes(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        pool_id: &str,
        request: &NodePoolRecycleNodesRequest,
    ) -> Result<Response> {
        let url = self.clusters_path(&[cluster_id, "node_pools", pool_id, "recycle"])?;
        self.client
            .send_empty(token, Method::POST, url, Some(request))
            .await
    }

    /// Delete a node pool and all of its nodes
    pub async fn delete_node_pool(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        pool_id: &str,
    ) -> Result<Response> {
        let url = self.clusters_path(&[cluster_id, "node_pools", pool_id])?;
        self.client
            .send_empty(token, Method::DELETE, url, NO_BODY)
            .await
    }

    /// Delete a single node
    pub async fn delete_node(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        pool_id: &str,
        node_id: &str,
        request: Option<&NodeDeleteRequest>,
    ) -> Result<Response> {
        let pairs = request.map(NodeDeleteRequest::query_pairs).unwrap_or_default();
        let url = with_query(
            self.clusters_path(&[cluster_id, "node_pools", pool_id, "nodes", node_id])?,
            &pairs,
        );
        self.client
            .send_empty(token, Method::DELETE, url, NO_BODY)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_delete_query_pairs() {
        let both_off = NodeDeleteRequest::default();
        assert!(both_off.query_pairs().is_empty());

        let skip_only = NodeDeleteRequest {
            skip_drain: true,
            replace: false,
        };
        assert_eq!(skip_only.query_pairs(), vec![("skip_drain", "1")]);

        let both_on = NodeDeleteRequest {
            skip_drain: true,
            replace: true,
        };
        assert_eq!(both_on.query_pairs(), vec![("replace", "1"), ("skip_drain", "1")]);
    }

    #[test]
    fn test_create_request_omits_zero_values() {
        let request = NodePoolCreateRequest {
            name: "workers".to_string(),
            size: "s-2vcpu-4gb".to_string(),
            count: 3,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "workers", "size": "s-2vcpu-4gb", "count": 3})
        );
    }

    #[test]
    fn test_update_request_keeps_explicit_zero_and_false() {
        let request = NodePoolUpdateRequest {
            count: Some(0),
            auto_scale: Some(false),
            taints: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"count": 0, "auto_scale": false, "taints": []})
        );

        let untouched = serde_json::to_value(NodePoolUpdateRequest::default()).unwrap();
        assert_eq!(untouched, json!({}));
    }
}
