// SPDX-License-Identifier: MIT

//! Augmented LLM: one completion call, augmented with either a target
//! schema or a set of callable tools.

use crate::error::Result;
use crate::llm::structured::complete_structured;
use crate::llm::{Gateway, ToolCall, Turn};
use crate::tools::math::{AddTool, MultiplyTool};
use crate::tools::{spec_of, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A web search query extracted from a user question
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// Query that is optimized for web search.
    pub search_query: String,
    /// Why this query is important to answer the user's question.
    pub justification: String,
}

/// Extract a typed search query from a free-text question
pub async fn structured_output(gateway: &dyn Gateway, question: &str) -> Result<SearchQuery> {
    complete_structured(gateway, &[Turn::user(question)]).await
}

/// Advertise the arithmetic tools and return whatever invocation requests
/// the model produces for `prompt`. The calls are not executed here; this
/// example stops at the point where the model decided what to call.
pub async fn tool_calling(gateway: &dyn Gateway, prompt: &str) -> Result<Vec<ToolCall>> {
    let specs = vec![spec_of(&AddTool), spec_of(&MultiplyTool)];
    let turn = gateway
        .complete(&[Turn::user(prompt)], Some(&specs), None)
        .await?;
    Ok(turn.tool_calls)
}
