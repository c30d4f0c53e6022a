// SPDX-License-Identifier: MIT

//! Anthropic gateway - Claude Messages API implementation

use super::{Gateway, Role, ToolCall, ToolSpec, Turn};
use crate::error::{Result, WeftError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;

/// Name of the synthetic tool used to force schema-conforming output
const RECORD_TOOL: &str = "record_output";

/// Anthropic Claude gateway
pub struct AnthropicGateway {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl AnthropicGateway {
    /// Create a new gateway.
    ///
    /// Requires `ANTHROPIC_API_KEY` to be set. Optionally uses
    /// `ANTHROPIC_BASE_URL` for custom endpoints.
    pub fn new(model_name: impl Into<String>) -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| WeftError::config("ANTHROPIC_API_KEY must be set"))?;
        let base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name: model_name.into(),
            base_url,
        })
    }

    /// Concatenate all system turns into the API's top-level system field
    fn extract_system(turns: &[Turn]) -> Option<String> {
        let parts: Vec<&str> = turns
            .iter()
            .filter(|t| t.role == Role::System)
            .map(|t| t.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// Convert turns to Anthropic messages.
    ///
    /// Tool-result turns must land in the user message immediately following
    /// the assistant turn that requested them, so consecutive tool-result
    /// turns are coalesced into one user message of `tool_result` blocks.
    fn turns_to_messages(turns: &[Turn]) -> Vec<Value> {
        let mut messages: Vec<Value> = Vec::new();
        let mut pending_results: Vec<Value> = Vec::new();

        for turn in turns {
            match turn.role {
                Role::System => continue,
                Role::ToolResult => {
                    if let Some(link) = &turn.tool_result {
                        pending_results.push(json!({
                            "type": "tool_result",
                            "tool_use_id": link.call_id,
                            "content": turn.content,
                        }));
                    }
                    continue;
                }
                _ => {}
            }

            if !pending_results.is_empty() {
                messages.push(json!({
                    "role": "user",
                    "content": std::mem::take(&mut pending_results),
                }));
            }

            let role = match turn.role {
                Role::Assistant => "assistant",
                _ => "user",
            };

            let mut content = Vec::new();
            if !turn.content.is_empty() {
                content.push(json!({"type": "text", "text": turn.content}));
            }
            for call in &turn.tool_calls {
                content.push(json!({
                    "type": "tool_use",
                    "id": call.id,
                    "name": call.name,
                    "input": call.args,
                }));
            }
            if content.is_empty() {
                continue;
            }

            messages.push(json!({"role": role, "content": content}));
        }

        if !pending_results.is_empty() {
            messages.push(json!({"role": "user", "content": pending_results}));
        }

        messages
    }

    fn tools_to_anthropic_format(tools: &[ToolSpec]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.parameters,
                })
            })
            .collect()
    }

    /// Parse an API response into a turn
    fn parse_response(response: &Value) -> Result<Turn> {
        let blocks = response["content"]
            .as_array()
            .ok_or_else(|| WeftError::api("anthropic", "no content in response"))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(t) = block["text"].as_str() {
                        text.push_str(t);
                    }
                }
                Some("tool_use") => {
                    tool_calls.push(ToolCall {
                        id: block["id"].as_str().unwrap_or_default().to_string(),
                        name: block["name"].as_str().unwrap_or_default().to_string(),
                        args: block["input"].clone(),
                    });
                }
                _ => {}
            }
        }

        if let Some(stop_reason) = response["stop_reason"].as_str() {
            log::debug!("Anthropic stop reason: {}", stop_reason);
        }

        Ok(Turn {
            role: Role::Assistant,
            content: text,
            tool_calls,
            tool_result: None,
        })
    }

    /// Pull the forced record tool's input out of a structured-output response
    fn parse_structured_response(response: &Value) -> Result<Turn> {
        let turn = Self::parse_response(response)?;
        let record = turn
            .tool_calls
            .iter()
            .find(|c| c.name == RECORD_TOOL)
            .map(|c| c.args.clone())
            .ok_or_else(|| {
                WeftError::SchemaViolation("model did not produce a structured record".to_string())
            })?;

        Ok(Turn::assistant(serde_json::to_string(&record)?))
    }
}

#[async_trait]
impl Gateway for AnthropicGateway {
    async fn complete(
        &self,
        turns: &[Turn],
        tools: Option<&[ToolSpec]>,
        response_schema: Option<&Value>,
    ) -> Result<Turn> {
        let url = format!("{}/messages", self.base_url);

        let mut body = json!({
            "model": self.model_name,
            "messages": Self::turns_to_messages(turns),
            "max_tokens": 4096,
        });

        if let Some(system) = Self::extract_system(turns) {
            body["system"] = json!(system);
        }

        if let Some(schema) = response_schema {
            // Structured output rides on tool use: one synthetic tool whose
            // input schema is the requested schema, with tool choice forced.
            body["tools"] = json!([{
                "name": RECORD_TOOL,
                "description": "Record the structured answer.",
                "input_schema": schema,
            }]);
            body["tool_choice"] = json!({"type": "tool", "name": RECORD_TOOL});
        } else if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = json!(Self::tools_to_anthropic_format(tools));
            }
        }

        log::debug!(
            "Anthropic request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(WeftError::api("anthropic", text));
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Anthropic response: {}", resp_json);

        if response_schema.is_some() {
            Self::parse_structured_response(&resp_json)
        } else {
            Self::parse_response(&resp_json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_system() {
        let turns = vec![Turn::system("You are helpful"), Turn::user("Hello")];
        assert_eq!(
            AnthropicGateway::extract_system(&turns),
            Some("You are helpful".to_string())
        );

        let turns = vec![Turn::user("Hello")];
        assert_eq!(AnthropicGateway::extract_system(&turns), None);
    }

    #[test]
    fn test_turns_to_messages_basic() {
        let turns = vec![
            Turn::system("sys"),
            Turn::user("Hello"),
            Turn::assistant("Hi there"),
        ];
        let messages = AnthropicGateway::turns_to_messages(&turns);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"][0]["text"], "Hello");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[test]
    fn test_turns_to_messages_tool_use() {
        let mut assistant = Turn::assistant("");
        assistant.tool_calls.push(ToolCall {
            id: "call_1".to_string(),
            name: "add".to_string(),
            args: json!({"a": 2, "b": 3}),
        });
        let turns = vec![Turn::user("add"), assistant];

        let messages = AnthropicGateway::turns_to_messages(&turns);
        assert_eq!(messages[1]["content"][0]["type"], "tool_use");
        assert_eq!(messages[1]["content"][0]["id"], "call_1");
        assert_eq!(messages[1]["content"][0]["name"], "add");
    }

    #[test]
    fn test_consecutive_tool_results_coalesce() {
        let mut assistant = Turn::assistant("");
        assistant.tool_calls.push(ToolCall {
            id: "c1".to_string(),
            name: "a".to_string(),
            args: json!({}),
        });
        assistant.tool_calls.push(ToolCall {
            id: "c2".to_string(),
            name: "b".to_string(),
            args: json!({}),
        });
        let turns = vec![
            Turn::user("go"),
            assistant,
            Turn::tool_result("c1", "a", "r1"),
            Turn::tool_result("c2", "b", "r2"),
        ];

        let messages = AnthropicGateway::turns_to_messages(&turns);
        // user, assistant, then ONE user message carrying both results
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"].as_array().unwrap().len(), 2);
        assert_eq!(messages[2]["content"][0]["tool_use_id"], "c1");
        assert_eq!(messages[2]["content"][1]["tool_use_id"], "c2");
    }

    #[test]
    fn test_parse_text_response() {
        let response = json!({
            "content": [{"type": "text", "text": "Hello, how can I help?"}],
            "stop_reason": "end_turn"
        });

        let turn = AnthropicGateway::parse_response(&response).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "Hello, how can I help?");
        assert!(turn.tool_calls.is_empty());
    }

    #[test]
    fn test_parse_tool_use_response() {
        let response = json!({
            "content": [{
                "type": "tool_use",
                "id": "toolu_123",
                "name": "get_weather",
                "input": {"city": "London"}
            }],
            "stop_reason": "tool_use"
        });

        let turn = AnthropicGateway::parse_response(&response).unwrap();
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].id, "toolu_123");
        assert_eq!(turn.tool_calls[0].name, "get_weather");
        assert_eq!(turn.tool_calls[0].args["city"], "London");
    }

    #[test]
    fn test_parse_structured_response() {
        let response = json!({
            "content": [{
                "type": "tool_use",
                "id": "toolu_1",
                "name": RECORD_TOOL,
                "input": {"search_query": "capital of Israel"}
            }],
            "stop_reason": "tool_use"
        });

        let turn = AnthropicGateway::parse_structured_response(&response).unwrap();
        let record: Value = serde_json::from_str(&turn.content).unwrap();
        assert_eq!(record["search_query"], "capital of Israel");
    }

    #[test]
    fn test_parse_structured_response_missing_record() {
        let response = json!({
            "content": [{"type": "text", "text": "I refuse"}],
            "stop_reason": "end_turn"
        });

        let err = AnthropicGateway::parse_structured_response(&response).unwrap_err();
        assert!(matches!(err, WeftError::SchemaViolation(_)));
    }
}
