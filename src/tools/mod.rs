// SPDX-License-Identifier: MIT

//! Tools callable by the model
//!
//! - [registry] - immutable name -> tool mapping built once at startup
//! - [math] - toy arithmetic tools for the augmented-LLM example
//! - [invoice] - invoice tools over the flat-file store

pub mod invoice;
pub mod math;
pub mod registry;

pub use registry::{ToolRegistry, ToolRegistryBuilder};

use crate::error::Result;
use crate::llm::ToolSpec;
use async_trait::async_trait;
use serde_json::Value;

/// A callable advertised to the gateway by name and schema.
///
/// `name()`, `description()` and `schema()` return references so nothing is
/// allocated per call; implementations keep these in struct fields or
/// statics.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within a registry
    fn name(&self) -> &str;

    /// Natural-language description advertised to the model
    fn description(&self) -> &str;

    /// JSON schema of the argument record
    fn schema(&self) -> &Value;

    /// Invoke the tool with the supplied argument record
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Descriptor form of a tool, for advertisement to the gateway
pub fn spec_of(tool: &dyn Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.schema().clone(),
    }
}
