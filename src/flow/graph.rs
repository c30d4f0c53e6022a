// SPDX-License-Identifier: MIT

//! Graph value: named steps plus typed edges, built and validated up front

use super::state::{step_fn, FlowState, Step};
use crate::error::{Result, WeftError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Destination of an edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Step(String),
    End,
}

impl Target {
    pub fn step(name: impl Into<String>) -> Self {
        Self::Step(name.into())
    }
}

/// Router: reads the state, returns a branch key
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Spawn function: reads the state, returns (step name, per-instance state)
/// pairs to run independently
pub type Spawn<S> = Arc<dyn Fn(&S) -> Vec<(String, S)> + Send + Sync>;

/// Outgoing edge of a step
pub enum Edge<S: FlowState> {
    /// Single declared successor
    Direct(Target),
    /// Router-selected successor; a key absent from the branch map is a
    /// `Routing` error, never a silent no-op
    Conditional {
        router: Router<S>,
        branches: HashMap<String, Target>,
    },
    /// Spawn independent step instances, then converge on the fan-in step
    FanOut { spawn: Spawn<S>, join: String },
}

/// A small directed step graph executed once per run
pub struct StepGraph<S: FlowState> {
    pub(crate) name: String,
    pub(crate) steps: HashMap<String, Arc<dyn Step<S>>>,
    pub(crate) edges: HashMap<String, Edge<S>>,
    pub(crate) start: String,
    pub(crate) step_limit: Option<usize>,
}

impl<S: FlowState> std::fmt::Debug for StepGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepGraph")
            .field("name", &self.name)
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("start", &self.start)
            .field("step_limit", &self.step_limit)
            .finish_non_exhaustive()
    }
}

impl<S: FlowState> StepGraph<S> {
    pub fn builder(name: impl Into<String>) -> StepGraphBuilder<S> {
        StepGraphBuilder {
            name: name.into(),
            steps: HashMap::new(),
            edges: HashMap::new(),
            start: None,
            step_limit: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [StepGraph]; `build` validates that every edge target and
/// the start marker name declared steps
pub struct StepGraphBuilder<S: FlowState> {
    name: String,
    steps: HashMap<String, Arc<dyn Step<S>>>,
    edges: HashMap<String, Edge<S>>,
    start: Option<String>,
    step_limit: Option<usize>,
}

impl<S: FlowState> StepGraphBuilder<S> {
    /// Add a step from an async closure
    pub fn step<F, Fut>(self, name: &str, f: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S::Update>> + Send + 'static,
    {
        self.step_impl(name, step_fn(f))
    }

    /// Add a step from a trait object
    pub fn step_impl(mut self, name: &str, step: Arc<dyn Step<S>>) -> Self {
        self.steps.insert(name.to_string(), step);
        self
    }

    /// Unconditional edge
    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .insert(from.to_string(), Edge::Direct(Target::step(to)));
        self
    }

    /// Mark a step as terminal
    pub fn terminal(mut self, from: &str) -> Self {
        self.edges.insert(from.to_string(), Edge::Direct(Target::End));
        self
    }

    /// Conditional edge: router key -> declared destination, no default
    pub fn route<F, const N: usize>(mut self, from: &str, router: F, branches: [(&str, Target); N]) -> Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.edges.insert(
            from.to_string(),
            Edge::Conditional {
                router: Arc::new(router),
                branches: branches
                    .into_iter()
                    .map(|(k, t)| (k.to_string(), t))
                    .collect(),
            },
        );
        self
    }

    /// Fan-out edge: spawn instances after `from`, join at `join`
    pub fn fan_out<F>(mut self, from: &str, spawn: F, join: &str) -> Self
    where
        F: Fn(&S) -> Vec<(String, S)> + Send + Sync + 'static,
    {
        self.edges.insert(
            from.to_string(),
            Edge::FanOut {
                spawn: Arc::new(spawn),
                join: join.to_string(),
            },
        );
        self
    }

    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    /// Opt-in step budget. The runner imposes no limit by default; bounding
    /// cyclic graphs is the caller's responsibility.
    pub fn step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<StepGraph<S>> {
        let start = self
            .start
            .ok_or_else(|| WeftError::config("graph has no start step"))?;

        let check = |name: &str| -> Result<()> {
            if self.steps.contains_key(name) {
                Ok(())
            } else {
                Err(WeftError::UnknownStep {
                    name: name.to_string(),
                })
            }
        };

        check(&start)?;
        for (from, edge) in &self.edges {
            check(from)?;
            match edge {
                Edge::Direct(Target::Step(to)) => check(to)?,
                Edge::Direct(Target::End) => {}
                Edge::Conditional { branches, .. } => {
                    for target in branches.values() {
                        if let Target::Step(to) = target {
                            check(to)?;
                        }
                    }
                }
                // Spawned step names are produced at runtime and checked there
                Edge::FanOut { join, .. } => check(join)?,
            }
        }

        Ok(StepGraph {
            name: self.name,
            steps: self.steps,
            edges: self.edges,
            start,
            step_limit: self.step_limit,
        })
    }
}
