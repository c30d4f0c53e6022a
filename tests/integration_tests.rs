//! Integration tests for the workflow patterns and the agent loop
//!
//! These tests verify end-to-end behavior using a mock gateway and the real
//! registry, store and graph runner.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;
use weft_rs::agent::AgentLoop;
use weft_rs::error::{Result, WeftError};
use weft_rs::llm::{Gateway, Role, ToolCall, ToolSpec, Turn};
use weft_rs::patterns;
use weft_rs::store::{InvoiceKind, InvoiceStore};
use weft_rs::tools::{invoice, math::AddTool, ToolRegistry};

// ============================================================================
// Mock gateway
// ============================================================================

/// Gateway that replays predefined turns in order
struct MockGateway {
    responses: Mutex<Vec<Turn>>,
}

impl MockGateway {
    fn new(responses: Vec<Turn>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
        })
    }

    fn tool_call(id: &str, name: &str, args: Value) -> Turn {
        let mut turn = Turn::assistant("");
        turn.tool_calls.push(ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            args,
        });
        turn
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn complete(
        &self,
        _turns: &[Turn],
        _tools: Option<&[ToolSpec]>,
        _response_schema: Option<&Value>,
    ) -> Result<Turn> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Turn::assistant("out of responses"))
        } else {
            Ok(responses.remove(0))
        }
    }
}

fn temp_db() -> PathBuf {
    std::env::temp_dir().join(format!("weft-it-{}.json", Uuid::new_v4()))
}

fn invoice_agent(gateway: Arc<dyn Gateway>, db: &PathBuf) -> AgentLoop {
    let store = Arc::new(AsyncMutex::new(InvoiceStore::open(db).unwrap()));
    let mut builder = ToolRegistry::builder();
    for tool in invoice::create_tools(store) {
        builder = builder.register(tool);
    }
    AgentLoop::new(
        "invoice-assistant",
        "You are a helpful financial business assistant.",
        gateway,
        Arc::new(builder.build()),
    )
    .unwrap()
}

// ============================================================================
// Agent loop end to end
// ============================================================================

#[tokio::test]
async fn test_agent_creates_invoice_through_tool_loop() {
    let db = temp_db();
    let gateway = MockGateway::new(vec![
        MockGateway::tool_call(
            "c1",
            "create_invoice",
            json!({
                "amount": 2500.0,
                "date": "2026-08-30",
                "type": "OUT",
                "description": "MacBook Pro"
            }),
        ),
        Turn::assistant("Created invoice 1 for the MacBook Pro."),
    ]);

    let agent = invoice_agent(gateway, &db);
    let turns = agent.run("Create an invoice for a 2,500$ MacBook Pro").await.unwrap();

    assert_eq!(turns.len(), 4);
    assert_eq!(turns[2].role, Role::ToolResult);
    assert!(turns[2].content.contains("id=1"));
    assert_eq!(turns[3].content, "Created invoice 1 for the MacBook Pro.");

    // the mutation actually hit the backing file
    let reopened = InvoiceStore::open(&db).unwrap();
    assert_eq!(reopened.count(), 1);
    assert_eq!(reopened.invoices()[0].kind, InvoiceKind::Out);

    let _ = std::fs::remove_file(db);
}

#[tokio::test]
async fn test_agent_aggregate_queries() {
    let db = temp_db();
    {
        let mut store = InvoiceStore::open(&db).unwrap();
        store.add(100.0, "2026-08-01", InvoiceKind::Out, "hosting").unwrap();
        store.add(2500.0, "2026-08-15", InvoiceKind::Out, "laptop").unwrap();
        store.add(4000.0, "2026-08-20", InvoiceKind::In, "consulting").unwrap();
    }

    let gateway = MockGateway::new(vec![
        MockGateway::tool_call("c1", "get_highest_outgoing_invoice", json!({})),
        MockGateway::tool_call("c2", "get_total_amount_of_invoices", json!({})),
        Turn::assistant("Highest outgoing is the laptop; total is 6600."),
    ]);

    let agent = invoice_agent(gateway, &db);
    let turns = agent.run("Summarize my invoices").await.unwrap();

    let results: Vec<&Turn> = turns.iter().filter(|t| t.role == Role::ToolResult).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].content.contains("description=laptop"));
    assert_eq!(results[1].content, "6600.0");

    let _ = std::fs::remove_file(db);
}

#[tokio::test]
async fn test_agent_unknown_tool_aborts_without_synthetic_result() {
    let db = temp_db();
    let gateway = MockGateway::new(vec![MockGateway::tool_call(
        "c1",
        "delete_all_invoices",
        json!({}),
    )]);

    let agent = invoice_agent(gateway, &db);
    let err = agent.run("wipe everything").await.unwrap_err();
    assert!(matches!(err, WeftError::UnknownTool { name } if name == "delete_all_invoices"));

    let _ = std::fs::remove_file(db);
}

#[tokio::test]
async fn test_agent_tool_failure_surfaces_to_caller() {
    let db = temp_db();
    // empty store, so the aggregate has nothing to return
    let gateway = MockGateway::new(vec![MockGateway::tool_call(
        "c1",
        "get_highest_incoming_invoice",
        json!({}),
    )]);

    let agent = invoice_agent(gateway, &db);
    let err = agent.run("highest incoming?").await.unwrap_err();
    assert!(matches!(err, WeftError::EmptyResult(_)));

    let _ = std::fs::remove_file(db);
}

#[tokio::test]
async fn test_agent_toy_add_tool_roundtrip() {
    let registry = Arc::new(ToolRegistry::builder().register(Arc::new(AddTool)).build());
    let gateway = MockGateway::new(vec![
        MockGateway::tool_call("1", "add", json!({"a": 2, "b": 3})),
        Turn::assistant("5 it is"),
    ]);

    let agent = AgentLoop::new("calc", "You add numbers.", gateway, registry).unwrap();
    let turns = agent.run("2+3?").await.unwrap();

    let result = turns.iter().find(|t| t.role == Role::ToolResult).unwrap();
    assert_eq!(result.content, "5");
    assert_eq!(result.tool_result.as_ref().unwrap().call_id, "1");
}

// ============================================================================
// Patterns over the mock gateway
// ============================================================================

#[tokio::test]
async fn test_chain_pattern_end_to_end() {
    let gateway = MockGateway::new(vec![
        Turn::assistant("draft"),
        Turn::assistant(r#"{"funny_enough": true}"#),
        Turn::assistant("better"),
        Turn::assistant("best"),
    ]);

    let state = patterns::chain::run(gateway, "cats").await.unwrap();
    assert_eq!(state.final_joke, "best");
}

#[tokio::test]
async fn test_orchestrator_pattern_end_to_end() {
    let gateway = MockGateway::new(vec![
        Turn::assistant(
            r#"{"sections": [{"name": "A", "description": "a"}, {"name": "B", "description": "b"}]}"#,
        ),
        Turn::assistant("section one"),
        Turn::assistant("section two"),
    ]);

    let state = patterns::orchestrator::run(gateway, "MCP").await.unwrap();
    assert_eq!(state.completed_sections.len(), 2);
    assert!(state.final_report.contains("section one"));
    assert!(state.final_report.contains("section two"));
}

#[tokio::test]
async fn test_optimizer_pattern_cycles() {
    let gateway = MockGateway::new(vec![
        Turn::assistant("first suggestion"),
        Turn::assistant(r#"{"status": "not useful", "feedback": "too vague"}"#),
        Turn::assistant("second suggestion"),
        Turn::assistant(r#"{"status": "useful", "feedback": "good"}"#),
    ]);

    let state = patterns::optimizer::run(gateway, "hydration").await.unwrap();
    assert_eq!(state.suggestion.as_deref(), Some("second suggestion"));
    assert_eq!(state.feedback.as_deref(), Some("good"));
}
