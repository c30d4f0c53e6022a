// SPDX-License-Identifier: MIT

//! Prompt chaining: joke generation refined step by step, with a quality
//! gate after the first draft. The gate is a structured check step writing
//! `funny_enough` into the state plus a pure router reading it back.

use crate::error::Result;
use crate::flow::{FlowState, StepGraph, Target};
use crate::llm::structured::complete_structured;
use crate::llm::{Gateway, Turn};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ChainState {
    pub topic: String,
    pub joke: String,
    pub funny_enough: Option<bool>,
    pub improved_joke: String,
    pub final_joke: String,
}

pub enum ChainUpdate {
    Joke(String),
    FunnyEnough(bool),
    ImprovedJoke(String),
    FinalJoke(String),
}

impl FlowState for ChainState {
    type Update = ChainUpdate;

    fn apply(&mut self, update: ChainUpdate) {
        match update {
            ChainUpdate::Joke(s) => self.joke = s,
            ChainUpdate::FunnyEnough(b) => self.funny_enough = Some(b),
            ChainUpdate::ImprovedJoke(s) => self.improved_joke = s,
            ChainUpdate::FinalJoke(s) => self.final_joke = s,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct FunnyCheck {
    funny_enough: bool,
}

pub fn build(gateway: Arc<dyn Gateway>) -> Result<StepGraph<ChainState>> {
    let g1 = gateway.clone();
    let g2 = gateway.clone();
    let g3 = gateway.clone();
    let g4 = gateway;

    StepGraph::builder("prompt_chaining")
        .step("generate_joke", move |s: ChainState| {
            let gateway = g1.clone();
            async move {
                let prompt = format!("Write a joke about {}", s.topic);
                let turn = gateway.complete(&[Turn::user(prompt)], None, None).await?;
                Ok(ChainUpdate::Joke(turn.content))
            }
        })
        .step("check_funny", move |s: ChainState| {
            let gateway = g2.clone();
            async move {
                let prompt = format!("Is this joke funny enough? {}", s.joke);
                let check: FunnyCheck =
                    complete_structured(gateway.as_ref(), &[Turn::user(prompt)]).await?;
                Ok(ChainUpdate::FunnyEnough(check.funny_enough))
            }
        })
        .step("improve_joke", move |s: ChainState| {
            let gateway = g3.clone();
            async move {
                let prompt = format!("Make this joke funnier by adding punchlines: {}", s.joke);
                let turn = gateway.complete(&[Turn::user(prompt)], None, None).await?;
                Ok(ChainUpdate::ImprovedJoke(turn.content))
            }
        })
        .step("polish_joke", move |s: ChainState| {
            let gateway = g4.clone();
            async move {
                let prompt = format!("Add a surprising twist to this joke: {}", s.improved_joke);
                let turn = gateway.complete(&[Turn::user(prompt)], None, None).await?;
                Ok(ChainUpdate::FinalJoke(turn.content))
            }
        })
        .edge("generate_joke", "check_funny")
        .route(
            "check_funny",
            |s: &ChainState| {
                match s.funny_enough {
                    Some(true) => "funny",
                    _ => "not_funny",
                }
                .to_string()
            },
            [
                ("funny", Target::step("improve_joke")),
                ("not_funny", Target::End),
            ],
        )
        .edge("improve_joke", "polish_joke")
        .terminal("polish_joke")
        .start("generate_joke")
        .build()
}

/// Run the chain over one topic
pub async fn run(gateway: Arc<dyn Gateway>, topic: &str) -> Result<ChainState> {
    let graph = build(gateway)?;
    graph
        .run(ChainState {
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
    use std::sync::Mutex;

    /// Replays canned responses in call order; structured calls get the
    /// canned content back as the record text.
    struct ScriptedGateway {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        async fn complete(
            &self,
            _turns: &[Turn],
            _tools: Option<&[ToolSpec]>,
            _response_schema: Option<&Value>,
        ) -> Result<Turn> {
            let mut responses = self.responses.lock().unwrap();
            Ok(Turn::assistant(responses.remove(0)))
        }
    }

    #[tokio::test]
    async fn test_funny_joke_goes_through_full_chain() {
        let gateway = ScriptedGateway::new(&[
            "draft joke",
            r#"{"funny_enough": true}"#,
            "funnier joke",
            "final joke",
        ]);

        let state = run(gateway, "cats").await.unwrap();
        assert_eq!(state.joke, "draft joke");
        assert_eq!(state.funny_enough, Some(true));
        assert_eq!(state.improved_joke, "funnier joke");
        assert_eq!(state.final_joke, "final joke");
    }

    #[tokio::test]
    async fn test_unfunny_joke_short_circuits() {
        let gateway = ScriptedGateway::new(&["draft joke", r#"{"funny_enough": false}"#]);

        let state = run(gateway, "cats").await.unwrap();
        assert_eq!(state.joke, "draft joke");
        assert_eq!(state.funny_enough, Some(false));
        assert!(state.improved_joke.is_empty());
        assert!(state.final_joke.is_empty());
    }
}
