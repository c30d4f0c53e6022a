// SPDX-License-Identifier: MIT

//! Shared state and the step contract
//!
//! Each graph carries one explicit state record threaded through the run.
//! Steps are pure functions over a snapshot of that state: they read a
//! subset of fields and return a typed partial update, which the runner
//! merges back with `apply`. Replace policy is plain assignment; append
//! policy is a `Vec` field that `apply` pushes onto. Concurrent fan-out
//! branches must write disjoint replace-policy fields or the same
//! append-policy field.

use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// State threaded through one run of a step graph
pub trait FlowState: Clone + Send + Sync + 'static {
    /// Partial update a step returns; merged into state by `apply`
    type Update: Send + 'static;

    fn apply(&mut self, update: Self::Update);
}

/// A named pure function over the shared state producing a partial update
#[async_trait]
pub trait Step<S: FlowState>: Send + Sync {
    async fn run(&self, state: &S) -> Result<S::Update>;
}

type BoxedStepFn<S> = Box<
    dyn Fn(S) -> Pin<Box<dyn Future<Output = Result<<S as FlowState>::Update>> + Send>>
        + Send
        + Sync,
>;

/// Adapter turning a plain async closure into a [Step]
struct FnStep<S: FlowState> {
    f: BoxedStepFn<S>,
}

#[async_trait]
impl<S: FlowState> Step<S> for FnStep<S> {
    async fn run(&self, state: &S) -> Result<S::Update> {
        (self.f)(state.clone()).await
    }
}

/// Wrap an async closure as a step. The closure receives its own snapshot
/// of the state, keeping steps pure from the runner's point of view.
pub fn step_fn<S, F, Fut>(f: F) -> Arc<dyn Step<S>>
where
    S: FlowState,
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S::Update>> + Send + 'static,
{
    Arc::new(FnStep {
        f: Box::new(move |s| Box::pin(f(s))),
    })
}
