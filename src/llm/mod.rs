// SPDX-License-Identifier: MIT

//! Model gateway - conversation turns and the completion trait
//!
//! The gateway is treated as an opaque capability: given a sequence of
//! turns (and optionally tool descriptors or a target schema), it returns
//! one response turn. Implementations live in their own submodules:
//! - [anthropic] - Anthropic's Messages API

pub mod anthropic;
pub mod structured;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    ToolResult,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// Linkage from a tool-result turn back to the invocation that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultRef {
    pub call_id: String,
    pub name: String,
}

/// One message in an exchange. Immutable once created; turns accumulate in
/// an ordered sequence that is never reordered or pruned within one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResultRef>,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_result: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_result: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_result: None,
        }
    }

    /// One tool-result turn per invocation, linked to its originating call id
    pub fn tool_result(
        call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::ToolResult,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_result: Some(ToolResultRef {
                call_id: call_id.into(),
                name: name.into(),
            }),
        }
    }

    /// Whether this turn carries pending tool-invocation requests
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The advertisement form of a tool: name, description and parameter schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Opaque completion capability. When `response_schema` is given the
/// returned turn's content is a JSON record conforming to that schema, or
/// the call fails with `SchemaViolation`. When `tools` is given the turn
/// may embed zero or more invocation requests.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn complete(
        &self,
        turns: &[Turn],
        tools: Option<&[ToolSpec]>,
        response_schema: Option<&Value>,
    ) -> Result<Turn>;
}
