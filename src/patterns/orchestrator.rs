// SPDX-License-Identifier: MIT

//! Orchestrator/worker: a planner produces the report outline, one worker
//! instance is spawned per section, and the aggregator joins the completed
//! sections. `completed_sections` is the append-policy fan-in field; its
//! ordering across workers is unspecified.

use crate::error::{Result, WeftError};
use crate::flow::{FlowState, StepGraph};
use crate::llm::structured::complete_structured;
use crate::llm::{Gateway, Turn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One planned section of the report
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    /// The name of this section of the report.
    pub name: String,
    /// The brief overview of the main topics and concepts covered in this section.
    pub description: String,
}

/// A list of sections that make up the full report.
#[derive(Debug, Deserialize, JsonSchema)]
struct Sections {
    sections: Vec<Section>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportState {
    pub topic: String,
    pub sections: Vec<Section>,
    pub completed_sections: Vec<String>,
    pub final_report: String,
    /// Set on worker instances only; the per-instance assignment
    pub section: Option<Section>,
}

pub enum ReportUpdate {
    Plan(Vec<Section>),
    CompletedSection(String),
    FinalReport(String),
}

impl FlowState for ReportState {
    type Update = ReportUpdate;

    fn apply(&mut self, update: ReportUpdate) {
        match update {
            ReportUpdate::Plan(sections) => self.sections = sections,
            ReportUpdate::CompletedSection(s) => self.completed_sections.push(s),
            ReportUpdate::FinalReport(s) => self.final_report = s,
        }
    }
}

pub fn build(gateway: Arc<dyn Gateway>) -> Result<StepGraph<ReportState>> {
    let planner = gateway.clone();
    let worker = gateway;

    StepGraph::builder("orchestrator_worker")
        .step("orchestrator", move |s: ReportState| {
            let gateway = planner.clone();
            async move {
                let turns = [
                    Turn::system(
                        "You are an expert journalistic writer. Generate a plan for a report.",
                    ),
                    Turn::user(format!("Here is the topic of the report: {}", s.topic)),
                ];
                let plan: Sections = complete_structured(gateway.as_ref(), &turns).await?;
                Ok(ReportUpdate::Plan(plan.sections))
            }
        })
        .step("worker", move |s: ReportState| {
            let gateway = worker.clone();
            async move {
                let section = s.section.ok_or_else(|| {
                    WeftError::other("worker instance spawned without a section")
                })?;
                let turns = [
                    Turn::system("You are an expert report writer. Write a section for a report."),
                    Turn::user(format!(
                        "Here is the name of the section: {}, and the description of the section: {}.",
                        section.name, section.description
                    )),
                ];
                let turn = gateway.complete(&turns, None, None).await?;
                Ok(ReportUpdate::CompletedSection(turn.content))
            }
        })
        .step("aggregator", |s: ReportState| async move {
            Ok(ReportUpdate::FinalReport(s.completed_sections.join("\n\n")))
        })
        .fan_out(
            "orchestrator",
            |s: &ReportState| {
                s.sections
                    .iter()
                    .map(|section| {
                        let mut branch = s.clone();
                        branch.section = Some(section.clone());
                        ("worker".to_string(), branch)
                    })
                    .collect()
            },
            "aggregator",
        )
        .terminal("aggregator")
        .start("orchestrator")
        .build()
}

pub async fn run(gateway: Arc<dyn Gateway>, topic: &str) -> Result<ReportState> {
    let graph = build(gateway)?;
    graph
        .run(ReportState {
            topic: topic.to_string(),
            ..Default::default()
        })
        .await
}
