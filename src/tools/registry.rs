// SPDX-License-Identifier: MIT

//! Tool registry: process-wide, constructed once at startup, immutable
//! thereafter. Used both to advertise capabilities to the gateway and to
//! dispatch the invocation requests it returns.

use super::{spec_of, Tool};
use crate::error::{Result, WeftError};
use crate::llm::ToolSpec;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder {
            tools: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors of every registered tool, for advertisement
    pub fn descriptors(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| spec_of(t.as_ref())).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Invoke a tool by name; result is rendered as text. Fails with
    /// `UnknownTool` for an unregistered name and propagates whatever the
    /// callable raises; no retry, no timeout.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<String> {
        let tool = self.get(name).ok_or_else(|| WeftError::UnknownTool {
            name: name.to_string(),
        })?;

        log::info!("dispatching tool '{}' with args {}", name, args);
        let result = tool.execute(args).await?;

        Ok(match result {
            Value::String(s) => s,
            other => serde_json::to_string(&other)?,
        })
    }
}

pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::math::{AddTool, MultiplyTool};
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_add() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(AddTool))
            .build();

        let result = registry
            .dispatch("add", json!({"a": 2, "b": 3}))
            .await
            .unwrap();
        assert_eq!(result, "5");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::builder().build();

        let err = registry.dispatch("subtract", json!({})).await.unwrap_err();
        assert!(matches!(err, WeftError::UnknownTool { name } if name == "subtract"));
    }

    #[tokio::test]
    async fn test_dispatch_propagates_tool_error() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(AddTool))
            .build();

        // malformed argument record
        let err = registry.dispatch("add", json!({"a": "two"})).await;
        assert!(err.is_err());
    }

    #[test]
    fn test_descriptors_sorted() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(MultiplyTool))
            .register(Arc::new(AddTool))
            .build();

        let specs = registry.descriptors();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "add");
        assert_eq!(specs[1].name, "multiply");
        assert_eq!(specs[0].parameters["type"], "object");
    }

    #[test]
    fn test_register_overwrites_same_name() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(AddTool))
            .register(Arc::new(AddTool))
            .build();
        assert_eq!(registry.len(), 1);
    }
}
