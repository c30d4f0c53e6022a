// SPDX-License-Identifier: MIT

//! Parallelization: three independent writers fanned out from one topic,
//! joined by an aggregator. The writers fill disjoint replace-policy
//! fields, so branch completion order is irrelevant.

use crate::error::Result;
use crate::flow::{FlowState, StepGraph};
use crate::llm::{Gateway, Turn};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ParallelState {
    pub topic: String,
    pub joke: String,
    pub story: String,
    pub poem: String,
    pub aggregated: String,
}

pub enum ParallelUpdate {
    Topic(String),
    Joke(String),
    Story(String),
    Poem(String),
    Aggregated(String),
}

impl FlowState for ParallelState {
    type Update = ParallelUpdate;

    fn apply(&mut self, update: ParallelUpdate) {
        match update {
            ParallelUpdate::Topic(s) => self.topic = s,
            ParallelUpdate::Joke(s) => self.joke = s,
            ParallelUpdate::Story(s) => self.story = s,
            ParallelUpdate::Poem(s) => self.poem = s,
            ParallelUpdate::Aggregated(s) => self.aggregated = s,
        }
    }
}

fn writer(
    gateway: Arc<dyn Gateway>,
    kind: &'static str,
    wrap: fn(String) -> ParallelUpdate,
) -> impl Fn(ParallelState) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<ParallelUpdate>> + Send>>
       + Send
       + Sync {
    move |s: ParallelState| {
        let gateway = gateway.clone();
        Box::pin(async move {
            let prompt = format!("Write a {} about {}", kind, s.topic);
            let turn = gateway.complete(&[Turn::user(prompt)], None, None).await?;
            Ok(wrap(turn.content))
        })
    }
}

pub fn build(gateway: Arc<dyn Gateway>) -> Result<StepGraph<ParallelState>> {
    StepGraph::builder("parallel")
        .step("intake", |s: ParallelState| async move {
            Ok(ParallelUpdate::Topic(s.topic.trim().to_string()))
        })
        .step(
            "write_joke",
            writer(gateway.clone(), "joke", ParallelUpdate::Joke),
        )
        .step(
            "write_story",
            writer(gateway.clone(), "story", ParallelUpdate::Story),
        )
        .step(
            "write_poem",
            writer(gateway, "poem", ParallelUpdate::Poem),
        )
        .step("aggregator", |s: ParallelState| async move {
            let aggregated = format!(
                "Joke: {}\n\nStory: {}\n\nPoem: {}",
                s.joke, s.story, s.poem
            );
            Ok(ParallelUpdate::Aggregated(aggregated))
        })
        .fan_out(
            "intake",
            |s: &ParallelState| {
                ["write_joke", "write_story", "write_poem"]
                    .iter()
                    .map(|name| (name.to_string(), s.clone()))
                    .collect()
            },
            "aggregator",
        )
        .terminal("aggregator")
        .start("intake")
        .build()
}

pub async fn run(gateway: Arc<dyn Gateway>, topic: &str) -> Result<ParallelState> {
    let graph = build(gateway)?;
    graph
        .run(ParallelState {
            topic: topic.to_string(),
            ..Default::default()
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ToolSpec;
    use async_trait::async_trait;
    use serde_json::Value;

    /// Echoes the prompt back, so each writer's output names its branch
    struct EchoGateway;

    #[async_trait]
    impl Gateway for EchoGateway {
        async fn complete(
            &self,
            turns: &[Turn],
            _tools: Option<&[ToolSpec]>,
            _response_schema: Option<&Value>,
        ) -> Result<Turn> {
            Ok(Turn::assistant(format!("[{}]", turns[0].content)))
        }
    }

    #[tokio::test]
    async fn test_all_branches_write_their_field() {
        let state = run(Arc::new(EchoGateway), "rugelach").await.unwrap();

        assert_eq!(state.joke, "[Write a joke about rugelach]");
        assert_eq!(state.story, "[Write a story about rugelach]");
        assert_eq!(state.poem, "[Write a poem about rugelach]");
    }

    #[tokio::test]
    async fn test_aggregator_sees_every_contribution() {
        let state = run(Arc::new(EchoGateway), "cats").await.unwrap();

        assert!(state.aggregated.contains("Joke: [Write a joke about cats]"));
        assert!(state.aggregated.contains("Story: [Write a story about cats]"));
        assert!(state.aggregated.contains("Poem: [Write a poem about cats]"));
    }
}
