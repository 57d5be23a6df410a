//! doks - typed client for the DigitalOcean Kubernetes API
//!
//! ```no_run
//! # async fn run() -> doks::Result<()> {
//! let client = doks::DoClient::new("dop_v1_...")?;
//! let token = doks::CancellationToken::new();
//! let (clusters, response) = client.kubernetes().list(&token, None).await?;
//! println!("{} clusters, rate limit left: {}", clusters.len(), response.rate.remaining);
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod cancel;
pub mod config;
pub mod error;
pub mod kubernetes;

pub use api::{DoClient, ListOptions, Response};
pub use cancel::CancellationToken;
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
pub use kubernetes::KubernetesService;
