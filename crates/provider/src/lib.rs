//! Bitbucket Terraform Provider
//!
//! Resources for managing Bitbucket Cloud objects from Terraform. The crate
//! covers the resource logic and host entry points; the plugin RPC transport
//! is supplied by the embedding binary.

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

pub use client::{BitbucketClient, HttpClient, HttpResponse};
pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use identity::GroupId;
pub use provider::BitbucketProvider;
pub use resources::group::{GroupConfig, GroupResource, GroupState, Permission};
