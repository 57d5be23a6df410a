//! HTTP plumbing shared by every API service
pub mod client;
pub mod pagination;
pub mod response;

pub use client::{DoClient, DEFAULT_API_URL};
pub use pagination::{LinkAction, Links, ListOptions, Meta, Pages};
pub use response::{Rate, Response};
