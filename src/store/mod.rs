// SPDX-License-Identifier: MIT

//! Flat-file invoice store
//!
//! A toy record list persisted as one JSON file. Every mutation rewrites
//! the whole file; ids are assigned as count + 1. Single-writer only: id
//! assignment and the full rewrite race under concurrent writers, which the
//! agent loop avoids by executing tool invocations sequentially.

use crate::error::{Result, WeftError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Direction of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceKind {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceKind::In => write!(f, "IN"),
            InvoiceKind::Out => write!(f, "OUT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u32,
    pub amount: f64,
    /// ISO date, YYYY-MM-DD
    pub date: String,
    #[serde(rename = "type")]
    pub kind: InvoiceKind,
    pub description: String,
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invoice(id={}, amount={}, date={}, type={}, description={})",
            self.id, self.amount, self.date, self.kind, self.description
        )
    }
}

/// File-backed invoice list
pub struct InvoiceStore {
    path: PathBuf,
    invoices: Vec<Invoice>,
}

impl InvoiceStore {
    /// Open the store at `path`. A missing file is an empty store; the file
    /// is created on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let invoices = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        Ok(Self { path, invoices })
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn count(&self) -> usize {
        self.invoices.len()
    }

    pub fn total_amount(&self) -> f64 {
        self.invoices.iter().map(|i| i.amount).sum()
    }

    /// Invoice with the highest amount among the given kind. Fails with
    /// `EmptyResult` when no invoice of that kind exists.
    pub fn highest(&self, kind: InvoiceKind) -> Result<&Invoice> {
        self.invoices
            .iter()
            .filter(|i| i.kind == kind)
            .max_by(|a, b| a.amount.total_cmp(&b.amount))
            .ok_or_else(|| WeftError::EmptyResult(format!("no invoices of type {}", kind)))
    }

    /// Append an invoice with id = count + 1, then rewrite the backing file.
    /// Not safe under concurrent creation.
    pub fn add(
        &mut self,
        amount: f64,
        date: impl Into<String>,
        kind: InvoiceKind,
        description: impl Into<String>,
    ) -> Result<Invoice> {
        let invoice = Invoice {
            id: self.invoices.len() as u32 + 1,
            amount,
            date: date.into(),
            kind,
            description: description.into(),
        };
        self.invoices.push(invoice.clone());
        self.save()?;
        Ok(invoice)
    }

    fn save(&self) -> Result<()> {
        fs::write(&self.path, serde_json::to_string(&self.invoices)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> (InvoiceStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("weft-invoices-{}.json", Uuid::new_v4()));
        (InvoiceStore::open(&path).unwrap(), path)
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let (store, path) = temp_store();
        assert_eq!(store.count(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_id_assignment_is_count_plus_one() {
        let (mut store, path) = temp_store();

        let a = store.add(2500.0, "2026-08-30", InvoiceKind::Out, "MacBook Pro").unwrap();
        let b = store.add(120.5, "2026-08-30", InvoiceKind::In, "Consulting").unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_persists_across_reopen() {
        let (mut store, path) = temp_store();
        store.add(10.0, "2026-01-01", InvoiceKind::In, "one").unwrap();
        store.add(20.0, "2026-01-02", InvoiceKind::Out, "two").unwrap();
        drop(store);

        let reopened = InvoiceStore::open(&path).unwrap();
        assert_eq!(reopened.count(), 2);
        assert_eq!(reopened.invoices()[1].amount, 20.0);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_highest_filters_by_kind() {
        let (mut store, path) = temp_store();
        store.add(100.0, "2026-01-01", InvoiceKind::In, "in-low").unwrap();
        store.add(900.0, "2026-01-02", InvoiceKind::In, "in-high").unwrap();
        store.add(500.0, "2026-01-03", InvoiceKind::Out, "out-only").unwrap();

        assert_eq!(store.highest(InvoiceKind::In).unwrap().description, "in-high");
        assert_eq!(store.highest(InvoiceKind::Out).unwrap().amount, 500.0);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_highest_on_empty_filtered_set() {
        let (mut store, path) = temp_store();
        store.add(100.0, "2026-01-01", InvoiceKind::In, "in").unwrap();

        let err = store.highest(InvoiceKind::Out).unwrap_err();
        assert!(matches!(err, WeftError::EmptyResult(_)));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_total_amount() {
        let (mut store, path) = temp_store();
        assert_eq!(store.total_amount(), 0.0);
        store.add(1.5, "2026-01-01", InvoiceKind::In, "a").unwrap();
        store.add(2.5, "2026-01-02", InvoiceKind::Out, "b").unwrap();
        assert_eq!(store.total_amount(), 4.0);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let invoice = Invoice {
            id: 1,
            amount: 2500.0,
            date: "2026-08-30".to_string(),
            kind: InvoiceKind::Out,
            description: "MacBook Pro".to_string(),
        };
        let v = serde_json::to_value(&invoice).unwrap();
        assert_eq!(v["type"], "OUT");
        assert!(v.get("kind").is_none());
    }

    #[test]
    fn test_display_format() {
        let invoice = Invoice {
            id: 3,
            amount: 42.0,
            date: "2026-08-30".to_string(),
            kind: InvoiceKind::In,
            description: "widgets".to_string(),
        };
        assert_eq!(
            invoice.to_string(),
            "Invoice(id=3, amount=42, date=2026-08-30, type=IN, description=widgets)"
        );
    }
}
