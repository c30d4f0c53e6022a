// SPDX-License-Identifier: MIT

//! Routing: classify the request with a structured call, then dispatch to
//! exactly one handler. A classification outside the branch map is a
//! `Routing` error, not a silent fallback.

use crate::error::Result;
use crate::flow::{FlowState, StepGraph, Target};
use crate::llm::structured::complete_structured;
use crate::llm::{Gateway, Turn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The handlers a request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Joke,
    Story,
    Poem,
}

impl RouteKind {
    fn key(&self) -> &'static str {
        match self {
            RouteKind::Joke => "joke",
            RouteKind::Story => "story",
            RouteKind::Poem => "poem",
        }
    }
}

/// The next step in the routing workflow.
#[derive(Debug, Deserialize, JsonSchema)]
struct Route {
    route: RouteKind,
}

#[derive(Debug, Clone, Default)]
pub struct RouteState {
    pub input: String,
    pub route: Option<RouteKind>,
    pub output: String,
}

pub enum RouteUpdate {
    Route(RouteKind),
    Output(String),
}

impl FlowState for RouteState {
    type Update = RouteUpdate;

    fn apply(&mut self, update: RouteUpdate) {
        match update {
            RouteUpdate::Route(r) => self.route = Some(r),
            RouteUpdate::Output(s) => self.output = s,
        }
    }
}

fn handler(
    gateway: Arc<dyn Gateway>,
) -> impl Fn(RouteState) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<RouteUpdate>> + Send>>
       + Send
       + Sync {
    move |s: RouteState| {
        let gateway = gateway.clone();
        Box::pin(async move {
            let turn = gateway.complete(&[Turn::user(s.input)], None, None).await?;
            Ok(RouteUpdate::Output(turn.content))
        })
    }
}

pub fn build(gateway: Arc<dyn Gateway>) -> Result<StepGraph<RouteState>> {
    let classifier = gateway.clone();

    StepGraph::builder("routing")
        .step("call_router", move |s: RouteState| {
            let gateway = classifier.clone();
            async move {
                let turns = [
                    Turn::system(
                        "Route the user's input to story, joke, or poem, based on the user's request.",
                    ),
                    Turn::user(s.input),
                ];
                let route: Route = complete_structured(gateway.as_ref(), &turns).await?;
                Ok(RouteUpdate::Route(route.route))
            }
        })
        .step("write_joke", handler(gateway.clone()))
        .step("write_story", handler(gateway.clone()))
        .step("write_poem", handler(gateway))
        .route(
            "call_router",
            |s: &RouteState| {
                s.route.map(|r| r.key().to_string()).unwrap_or_default()
            },
            [
                ("joke", Target::step("write_joke")),
                ("story", Target::step("write_story")),
                ("poem", Target::step("write_poem")),
            ],
        )
        .terminal("write_joke")
        .terminal("write_story")
        .terminal("write_poem")
        .start("call_router")
        .build()
}

pub async fn run(gateway: Arc<dyn Gateway>, input: &str) -> Result<RouteState> {
    let graph = build(gateway)?;
    graph
        .run(RouteState {
            input: input.to_string(),
            ..Default::default()
        })
        .await
}
