// SPDX-License-Identifier: MIT

//! Typed structured-output decoding
//!
//! Structured output is a runtime contract: the gateway promises a record
//! conforming to a schema. This module turns that into a typed decode step,
//! failing with `SchemaViolation` on mismatch instead of trusting the
//! gateway blindly.

use crate::error::{Result, WeftError};
use crate::llm::{Gateway, Turn};
use schemars::{gen::SchemaGenerator, JsonSchema};
use serde::de::DeserializeOwned;

/// Generate the JSON schema the gateway is asked to conform to
pub fn schema_of<T: JsonSchema>() -> Result<serde_json::Value> {
    let schema = SchemaGenerator::default().into_root_schema_for::<T>();
    Ok(serde_json::to_value(schema)?)
}

/// Request a record of type `T` from the gateway and decode it
pub async fn complete_structured<T>(gateway: &dyn Gateway, turns: &[Turn]) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = schema_of::<T>()?;
    let turn = gateway.complete(turns, None, Some(&schema)).await?;

    serde_json::from_str(&turn.content).map_err(|e| {
        WeftError::SchemaViolation(format!(
            "cannot decode '{}' as {}: {}",
            turn.content,
            std::any::type_name::<T>(),
            e
        ))
    })
}
