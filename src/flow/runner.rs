// SPDX-License-Identifier: MIT

//! Graph execution
//!
//! One pass from the start step until a terminal marker, following edges.
//! Fan-out branches run concurrently and are all joined before the fan-in
//! step executes; merge order across branches is unspecified. Cyclic routes
//! are allowed and unbounded unless the caller sets a step limit.

use super::graph::{Edge, StepGraph, Target};
use super::state::{FlowState, Step};
use crate::error::{Result, WeftError};
use std::sync::Arc;
use uuid::Uuid;

impl<S: FlowState> StepGraph<S> {
    /// Execute the graph once over `initial`, returning the final state
    pub async fn run(&self, initial: S) -> Result<S> {
        let run_id = Uuid::new_v4();
        let mut state = initial;
        let mut current = self.start.clone();
        let mut executed = 0usize;

        loop {
            self.check_limit(executed)?;
            let step = self.step_named(&current)?;
            log::info!("[{}] {}: running step '{}'", run_id, self.name, current);

            let update = step.run(&state).await?;
            state.apply(update);
            executed += 1;

            let next = match self.edges.get(&current) {
                // A step with no outgoing edge is terminal
                None | Some(Edge::Direct(Target::End)) => break,
                Some(Edge::Direct(Target::Step(to))) => to.clone(),
                Some(Edge::Conditional { router, branches }) => {
                    let key = router(&state);
                    match branches.get(&key) {
                        None => {
                            return Err(WeftError::Routing {
                                step: current,
                                key,
                            })
                        }
                        Some(Target::End) => break,
                        Some(Target::Step(to)) => to.clone(),
                    }
                }
                Some(Edge::FanOut { spawn, join }) => {
                    let instances = spawn(&state);
                    log::info!(
                        "[{}] {}: fanning out {} instances, joining at '{}'",
                        run_id,
                        self.name,
                        instances.len(),
                        join
                    );
                    executed += self.run_fan_out(instances, &mut state).await?;
                    join.clone()
                }
            };
            current = next;
        }

        log::info!(
            "[{}] {}: finished after {} step executions",
            run_id,
            self.name,
            executed
        );
        Ok(state)
    }

    /// Run spawned instances concurrently and merge their updates into the
    /// parent state. Branches are independent by contract, so merge order
    /// only matters for append-policy fields, whose ordering is unspecified.
    async fn run_fan_out(&self, instances: Vec<(String, S)>, state: &mut S) -> Result<usize> {
        let mut futures = Vec::with_capacity(instances.len());
        for (name, branch_state) in instances {
            let step = Arc::clone(self.step_named(&name)?);
            futures.push(async move { step.run(&branch_state).await });
        }

        let count = futures.len();
        let updates = futures::future::try_join_all(futures).await?;
        for update in updates {
            state.apply(update);
        }
        Ok(count)
    }

    fn step_named(&self, name: &str) -> Result<&Arc<dyn Step<S>>> {
        self.steps.get(name).ok_or_else(|| WeftError::UnknownStep {
            name: name.to_string(),
        })
    }

    fn check_limit(&self, executed: usize) -> Result<()> {
        match self.step_limit {
            Some(limit) if executed >= limit => Err(WeftError::StepLimit { limit }),
            _ => Ok(()),
        }
    }
}
