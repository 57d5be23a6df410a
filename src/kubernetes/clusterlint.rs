//! Clusterlint runs and cluster status history
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::Serialize;

use super::models::*;
use super::KubernetesService;
use crate::api::client::with_query;
use crate::api::Response;
use crate::cancel::CancellationToken;
use crate::error::Result;

/// Check filters for a clusterlint run; empty lists mean no filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunClusterlintRequest {
    pub include_groups: Vec<String>,
    pub exclude_groups: Vec<String>,
    pub include_checks: Vec<String>,
    pub exclude_checks: Vec<String>,
}

/// Selects which run's diagnostics to fetch
#[derive(Debug, Clone, Default)]
pub struct GetClusterlintRequest {
    /// Latest run when unset
    pub run_id: Option<String>,
}

/// Filters the status history of a cluster
#[derive(Debug, Clone, Copy, Default)]
pub struct GetClusterStatusMessagesRequest {
    /// Only messages newer than this instant
    pub since: Option<DateTime<Utc>>,
}

impl KubernetesService {
    /// Schedule a clusterlint run, returning its run ID right away
    pub async fn run_clusterlint(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: &RunClusterlintRequest,
    ) -> Result<(String, Response)> {
        let url = self.clusters_path(&[cluster_id, "clusterlint"])?;
        let (root, response): (RunClusterlintRoot, _) = self
            .client
            .send(token, Method::POST, url, Some(request))
            .await?;
        Ok((root.run_id, response))
    }

    /// Diagnostics of a finished clusterlint run
    pub async fn get_clusterlint_results(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: Option<&GetClusterlintRequest>,
    ) -> Result<(Vec<ClusterlintDiagnostic>, Response)> {
        let pairs: Vec<(&str, &str)> = request
            .and_then(|r| r.run_id.as_deref())
            .filter(|run_id| !run_id.is_empty())
            .map(|run_id| ("run_id", run_id))
            .into_iter()
            .collect();
        let url = with_query(self.clusters_path(&[cluster_id, "clusterlint"])?, &pairs);

        let (root, response): (DiagnosticsRoot, _) = self.client.get(token, url).await?;
        Ok((root.diagnostics, response))
    }

    /// Status history of a cluster
    pub async fn get_cluster_status_messages(
        &self,
        token: &CancellationToken,
        cluster_id: &str,
        request: Option<&GetClusterStatusMessagesRequest>,
    ) -> Result<(Vec<KubernetesClusterStatusMessage>, Response)> {
        let pairs: Vec<(&str, String)> = request
            .and_then(|r| r.since)
            .map(|since| ("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .into_iter()
            .collect();
        let url = with_query(self.clusters_path(&[cluster_id, "status_messages"])?, &pairs);

        let (root, response): (StatusMessagesRoot, _) = self.client.get(token, url).await?;
        Ok((root.messages, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_request_sends_all_filters() {
        let request = RunClusterlintRequest {
            include_groups: vec!["basic".to_string()],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "include_groups": ["basic"],
                "exclude_groups": [],
                "include_checks": [],
                "exclude_checks": []
            })
        );
    }
}
