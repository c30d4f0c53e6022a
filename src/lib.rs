// SPDX-License-Identifier: MIT

//! weft-rs: composable LLM workflow patterns
//!
//! A small step-graph runner, a tool-calling agent loop, and the classic
//! workflow patterns (chaining, parallelization, routing,
//! orchestrator/worker, evaluator/optimizer) wired on top of them.

pub mod agent;
pub mod error;
pub mod flow;
pub mod llm;
pub mod patterns;
pub mod store;
pub mod tools;

pub use error::{Result, WeftError};
