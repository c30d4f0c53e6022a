// SPDX-License-Identifier: MIT

//! Evaluator/optimizer: generate a suggestion, evaluate it with a
//! structured grade, and cycle back with feedback until the evaluator is
//! satisfied. The cycle is bounded by the evaluator's verdict, not by the
//! runner; callers may add a step limit if they distrust the evaluator.

use crate::error::Result;
use crate::flow::{FlowState, StepGraph, Target};
use crate::llm::structured::complete_structured;
use crate::llm::{Gateway, Turn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The grade of the suggestion, either useful or not useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Verdict {
    #[serde(rename = "useful")]
    Useful,
    #[serde(rename = "not useful")]
    NotUseful,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct Feedback {
    /// The grade of the suggestion, either useful or not useful.
    status: Verdict,
    /// The feedback on the suggestion, either positive or negative.
    feedback: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizerState {
    pub topic: String,
    pub suggestion: Option<String>,
    pub feedback: Option<String>,
    pub status: Option<Verdict>,
}

pub enum OptimizerUpdate {
    Suggestion(String),
    Evaluation { status: Verdict, feedback: String },
}

impl FlowState for OptimizerState {
    type Update = OptimizerUpdate;

    fn apply(&mut self, update: OptimizerUpdate) {
        match update {
            OptimizerUpdate::Suggestion(s) => self.suggestion = Some(s),
            OptimizerUpdate::Evaluation { status, feedback } => {
                self.status = Some(status);
                self.feedback = Some(feedback);
            }
        }
    }
}

pub fn build(gateway: Arc<dyn Gateway>) -> Result<StepGraph<OptimizerState>> {
    let generator = gateway.clone();
    let evaluator = gateway;

    StepGraph::builder("evaluator_optimizer")
        .step("suggestion_generator", move |s: OptimizerState| {
            let gateway = generator.clone();
            async move {
                let prompt = match &s.feedback {
                    Some(feedback) => format!(
                        "Write a quick and short suggestion for the given topic: {}. Take into account the feedback: {}",
                        s.topic, feedback
                    ),
                    None => format!(
                        "Write a quick and short suggestion for the given topic: {}",
                        s.topic
                    ),
                };
                let turn = gateway.complete(&[Turn::user(prompt)], None, None).await?;
                Ok(OptimizerUpdate::Suggestion(turn.content))
            }
        })
        .step("suggestion_evaluator", move |s: OptimizerState| {
            let gateway = evaluator.clone();
            async move {
                let prompt = format!(
                    "Evaluate the suggestion: \"{}\" for the given topic: \"{}\"",
                    s.suggestion.as_deref().unwrap_or_default(),
                    s.topic
                );
                let graded: Feedback =
                    complete_structured(gateway.as_ref(), &[Turn::user(prompt)]).await?;
                Ok(OptimizerUpdate::Evaluation {
                    status: graded.status,
                    feedback: graded.feedback,
                })
            }
        })
        .edge("suggestion_generator", "suggestion_evaluator")
        .route(
            "suggestion_evaluator",
            |s: &OptimizerState| {
                match s.status {
                    Some(Verdict::Useful) => "OK",
                    _ => "FEEDBACK",
                }
                .to_string()
            },
            [
                ("OK", Target::End),
                ("FEEDBACK", Target::step("suggestion_generator")),
            ],
        )
        .start("suggestion_generator")
        .build()
}

pub async fn run(gateway: Arc<dyn Gateway>, topic: &str) -> Result<OptimizerState> {
    let graph = build(gateway)?;
    graph
        .run(OptimizerState {
            topic: topic.to_string(),
            ..Default::default()
        })
        .await
}
