//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod group;

use crate::client::HttpClient;
use crate::error::Result;
use crate::schema::Schema;
use crate::state::DynamicValue;

/// Trait for resource operations
#[async_trait::async_trait]
pub trait Resource {
    /// Resource type name
    fn type_name() -> &'static str;

    /// Attribute schema exposed to the host
    fn schema() -> Schema;

    /// Problems with a configuration, empty when it is acceptable
    fn validate(config: &DynamicValue) -> Vec<String>;

    /// Create a new resource
    async fn create(client: &dyn HttpClient, config: &DynamicValue) -> Result<DynamicValue>;

    /// Read an existing resource; `DynamicValue::Null` when it no longer exists
    async fn read(client: &dyn HttpClient, state: &DynamicValue) -> Result<DynamicValue>;

    /// Update an existing resource
    async fn update(client: &dyn HttpClient, state: &DynamicValue, config: &DynamicValue) -> Result<DynamicValue>;

    /// Delete a resource
    async fn delete(client: &dyn HttpClient, state: &DynamicValue) -> Result<()>;

    /// Adopt an existing remote object by its external ID
    async fn import(client: &dyn HttpClient, id: &str) -> Result<DynamicValue>;
}
