// SPDX-License-Identifier: MIT

//! Toy arithmetic tools used by the augmented-LLM example and the tests

use super::Tool;
use crate::error::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};

static BINARY_OP_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer", "description": "First operand"},
            "b": {"type": "integer", "description": "Second operand"}
        },
        "required": ["a", "b"]
    })
});

#[derive(Debug, Deserialize)]
struct BinaryOpArgs {
    a: i64,
    b: i64,
}

pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two integers and return the sum."
    }

    fn schema(&self) -> &Value {
        &BINARY_OP_SCHEMA
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: BinaryOpArgs = serde_json::from_value(args)?;
        Ok(json!(args.a + args.b))
    }
}

pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two integers and return the product."
    }

    fn schema(&self) -> &Value {
        &BINARY_OP_SCHEMA
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: BinaryOpArgs = serde_json::from_value(args)?;
        Ok(json!(args.a * args.b))
    }
}
