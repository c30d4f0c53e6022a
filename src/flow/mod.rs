// SPDX-License-Identifier: MIT

//! Step graph runner
//!
//! A workflow is a small fixed set of named steps connected by edges,
//! executed once over a shared state value:
//! - [state] - the `FlowState` trait steps read and update
//! - [graph] - the graph value: steps, edges, builder validation
//! - [runner] - the single generic interpreter

mod graph;
mod runner;
mod state;

pub use graph::{Edge, StepGraph, StepGraphBuilder, Target};
pub use state::{step_fn, FlowState, Step};
