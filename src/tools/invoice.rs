// SPDX-License-Identifier: MIT

//! Invoice tools over the flat-file store
//!
//! The six tools behind the financial-assistant agent example. All of them
//! share one store handle; the agent loop executes tool invocations
//! sequentially, which is what makes the single-writer store safe here.

use super::Tool;
use crate::error::Result;
use crate::store::{InvoiceKind, InvoiceStore};
use async_trait::async_trait;
use chrono::Local;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedStore = Arc<Mutex<InvoiceStore>>;

static EMPTY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {}
    })
});

static CREATE_INVOICE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "amount": {"type": "number", "description": "Invoice amount"},
            "date": {"type": "string", "description": "Invoice date in YYYY-MM-DD format"},
            "type": {"type": "string", "enum": ["IN", "OUT"], "description": "Whether the invoice is incoming or outgoing"},
            "description": {"type": "string", "description": "Free-text description of the invoice"}
        },
        "required": ["amount", "date", "type", "description"]
    })
});

/// All invoice tools bound to one shared store
pub fn create_tools(store: SharedStore) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetTodaysDateTool),
        Arc::new(GetAllInvoicesTool {
            store: store.clone(),
        }),
        Arc::new(GetHighestInvoiceTool {
            store: store.clone(),
            kind: InvoiceKind::Out,
        }),
        Arc::new(GetHighestInvoiceTool {
            store: store.clone(),
            kind: InvoiceKind::In,
        }),
        Arc::new(GetTotalAmountTool {
            store: store.clone(),
        }),
        Arc::new(CreateInvoiceTool { store }),
    ]
}

pub struct GetTodaysDateTool;

#[async_trait]
impl Tool for GetTodaysDateTool {
    fn name(&self) -> &str {
        "get_todays_date"
    }

    fn description(&self) -> &str {
        "Get the current date, formatted as YYYY-MM-DD."
    }

    fn schema(&self) -> &Value {
        &EMPTY_SCHEMA
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(json!(Local::now().format("%Y-%m-%d").to_string()))
    }
}

pub struct GetAllInvoicesTool {
    store: SharedStore,
}

#[async_trait]
impl Tool for GetAllInvoicesTool {
    fn name(&self) -> &str {
        "get_all_invoices"
    }

    fn description(&self) -> &str {
        "Get all invoices."
    }

    fn schema(&self) -> &Value {
        &EMPTY_SCHEMA
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let store = self.store.lock().await;
        let lines: Vec<String> = store.invoices().iter().map(|i| i.to_string()).collect();
        Ok(json!(lines))
    }
}

/// Highest-amount invoice of one kind; registered twice, once per kind
pub struct GetHighestInvoiceTool {
    store: SharedStore,
    kind: InvoiceKind,
}

#[async_trait]
impl Tool for GetHighestInvoiceTool {
    fn name(&self) -> &str {
        match self.kind {
            InvoiceKind::Out => "get_highest_outgoing_invoice",
            InvoiceKind::In => "get_highest_incoming_invoice",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            InvoiceKind::Out => "Get the invoice with the highest amount and type `OUT`.",
            InvoiceKind::In => "Get the invoice with the highest amount and type `IN`.",
        }
    }

    fn schema(&self) -> &Value {
        &EMPTY_SCHEMA
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let store = self.store.lock().await;
        let invoice = store.highest(self.kind)?;
        Ok(json!(invoice.to_string()))
    }
}

pub struct GetTotalAmountTool {
    store: SharedStore,
}

#[async_trait]
impl Tool for GetTotalAmountTool {
    fn name(&self) -> &str {
        "get_total_amount_of_invoices"
    }

    fn description(&self) -> &str {
        "Get the total amount of all invoices."
    }

    fn schema(&self) -> &Value {
        &EMPTY_SCHEMA
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let store = self.store.lock().await;
        Ok(json!(store.total_amount()))
    }
}

#[derive(Debug, Deserialize)]
struct CreateInvoiceArgs {
    amount: f64,
    date: String,
    #[serde(rename = "type")]
    kind: InvoiceKind,
    description: String,
}

pub struct CreateInvoiceTool {
    store: SharedStore,
}

#[async_trait]
impl Tool for CreateInvoiceTool {
    fn name(&self) -> &str {
        "create_invoice"
    }

    fn description(&self) -> &str {
        "Add an invoice to the database. `date` must be in YYYY-MM-DD format."
    }

    fn schema(&self) -> &Value {
        &CREATE_INVOICE_SCHEMA
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: CreateInvoiceArgs = serde_json::from_value(args)?;
        let mut store = self.store.lock().await;
        let invoice = store.add(args.amount, args.date, args.kind, args.description)?;
        Ok(json!(invoice.to_string()))
    }
}
