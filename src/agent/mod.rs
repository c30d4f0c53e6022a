// SPDX-License-Identifier: MIT

//! Tool-calling agent loop
//!
//! A two-state machine (`model`, `tools`) built on the step graph runner.
//! The `model` step sends the accumulated turns to the gateway; the router
//! inspects the latest response for pending tool-invocation requests and
//! either transitions to `tools` or terminates. The `tools` step dispatches
//! every requested invocation sequentially and loops back to `model`.
//!
//! The turn sequence only grows; no turn is mutated or removed once
//! appended. A failing tool invocation is not caught by the loop: it
//! surfaces to the caller and aborts the run.

use crate::error::Result;
use crate::flow::{FlowState, StepGraph, Target};
use crate::llm::{Gateway, Turn};
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Shared state of one agent run: the ordered, append-only turn sequence
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    pub turns: Vec<Turn>,
}

/// The only update an agent step may produce
pub struct AppendTurns(pub Vec<Turn>);

impl FlowState for AgentState {
    type Update = AppendTurns;

    fn apply(&mut self, update: AppendTurns) {
        self.turns.extend(update.0);
    }
}

/// Tool-using agent over a gateway and an immutable tool registry
pub struct AgentLoop {
    name: String,
    graph: StepGraph<AgentState>,
}

impl AgentLoop {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        gateway: Arc<dyn Gateway>,
        registry: Arc<ToolRegistry>,
    ) -> Result<Self> {
        let name = name.into();
        let instruction = instruction.into();
        let system = format!(
            "{} You have the following tools: {}.",
            instruction,
            registry.names().join(", ")
        );

        let model_gateway = gateway;
        let model_registry = registry.clone();
        let tools_registry = registry;

        let graph = StepGraph::builder(name.clone())
            .step("model", move |state: AgentState| {
                let gateway = model_gateway.clone();
                let registry = model_registry.clone();
                let system = system.clone();
                async move {
                    let mut turns = Vec::with_capacity(state.turns.len() + 1);
                    turns.push(Turn::system(system));
                    turns.extend(state.turns.iter().cloned());

                    let descriptors = registry.descriptors();
                    let response = gateway
                        .complete(&turns, Some(&descriptors), None)
                        .await?;
                    Ok(AppendTurns(vec![response]))
                }
            })
            .step("tools", move |state: AgentState| {
                let registry = tools_registry.clone();
                async move {
                    let calls = state
                        .turns
                        .last()
                        .map(|t| t.tool_calls.clone())
                        .unwrap_or_default();

                    // Sequential, in the order the gateway listed them
                    let mut results = Vec::with_capacity(calls.len());
                    for call in calls {
                        let output = registry.dispatch(&call.name, call.args).await?;
                        results.push(Turn::tool_result(call.id, call.name, output));
                    }
                    Ok(AppendTurns(results))
                }
            })
            .route(
                "model",
                |state: &AgentState| {
                    let pending = state.turns.last().is_some_and(|t| t.has_tool_calls());
                    if pending { "use_tools" } else { "done" }.to_string()
                },
                [("use_tools", Target::step("tools")), ("done", Target::End)],
            )
            .edge("tools", "model")
            .start("model")
            .build()?;

        Ok(Self { name, graph })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run to completion from one user input, returning the full turn
    /// sequence (the input turn, every model response, every tool result).
    pub async fn run(&self, input: impl Into<String>) -> Result<Vec<Turn>> {
        self.run_turns(vec![Turn::user(input)]).await
    }

    /// Run to completion from pre-seeded turns
    pub async fn run_turns(&self, turns: Vec<Turn>) -> Result<Vec<Turn>> {
        let state = self.graph.run(AgentState { turns }).await?;
        Ok(state.turns)
    }
}
