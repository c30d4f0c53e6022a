// SPDX-License-Identifier: MIT

//! Workflow patterns
//!
//! One module per pattern, in increasing order of complexity:
//! - [augmented] - structured output and tool advertisement
//! - [chain] - sequential chaining with a quality gate
//! - [parallel] - fan-out/aggregate over independent writers
//! - [routing] - classify then dispatch to one handler
//! - [orchestrator] - plan sections, fan out one worker per section
//! - [optimizer] - generate/evaluate feedback cycle

pub mod augmented;
pub mod chain;
pub mod optimizer;
pub mod orchestrator;
pub mod parallel;
pub mod routing;
