//! Grid view model
//!
//! Turns a store snapshot into the rows and columns a table displays.
//! Rows are only produced for a finished fetch; while loading, or after a
//! failure, the grid is empty.

use crate::pagination::PaginationModel;
use crate::store::StoreSnapshot;
use crate::types::{FetchStatus, TransactionView};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write as _;

/// A grid column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Column {
    /// Field key
    pub field: &'static str,
    /// Header text
    pub header: &'static str,
    /// Relative width
    pub flex: f32,
    /// Minimum width in characters when rendered as text
    pub min_width: usize,
    /// Columns are never sortable
    pub sortable: bool,
}

const fn column(field: &'static str, header: &'static str, flex: f32, min_width: usize) -> Column {
    Column {
        field,
        header,
        flex,
        min_width,
        sortable: false,
    }
}

/// Columns in display order
pub const COLUMNS: [Column; 6] = [
    column("sequence_order", "Sequence Order", 0.1, 14),
    column("tx_hash", "Txn hash", 0.1, 10),
    column("method", "Method", 0.1, 8),
    column("sender", "Sender", 0.2, 10),
    column("status", "Status", 0.1, 8),
    column("txn_fee", "Txn Fee", 0.1, 8),
];

/// One displayed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    /// Row key (transaction hash)
    pub id: String,
    pub sequence_order: u64,
    pub tx_hash: String,
    pub method: String,
    pub sender: String,
    pub status: String,
    pub txn_fee: u64,
    /// RFC 3339 time the transaction was sequenced, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl GridRow {
    /// Build a row from a transaction
    pub fn from_transaction(tx: &TransactionView) -> Self {
        Self {
            id: tx.id().to_string(),
            sequence_order: tx.sequence_info.tx_order,
            tx_hash: tx.execution_info.tx_hash.clone(),
            method: tx.transaction.action_type.to_uppercase(),
            sender: tx.transaction.sender.clone(),
            status: tx.execution_info.status.kind.to_uppercase(),
            txn_fee: tx.execution_info.gas_used,
            timestamp: tx.sequence_info.tx_timestamp.and_then(format_timestamp),
        }
    }

    fn cells(&self) -> [String; 6] {
        [
            self.sequence_order.to_string(),
            self.tx_hash.clone(),
            self.method.clone(),
            self.sender.clone(),
            self.status.clone(),
            self.txn_fee.to_string(),
        ]
    }
}

fn format_timestamp(millis: u64) -> Option<String> {
    let millis = i64::try_from(millis).ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Everything needed to draw the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridView {
    pub page: u32,
    pub page_size: u32,
    pub status: FetchStatus,
    pub loading: bool,
    pub has_next_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub columns: &'static [Column],
    pub rows: Vec<GridRow>,
}

impl GridView {
    /// Build the view for a model and the store's snapshot
    pub fn new(model: &PaginationModel, snapshot: &StoreSnapshot) -> Self {
        let rows = if snapshot.status == FetchStatus::Finished {
            snapshot
                .result
                .data
                .iter()
                .map(GridRow::from_transaction)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            page: model.page,
            page_size: model.page_size,
            status: snapshot.status,
            loading: snapshot.status == FetchStatus::Loading,
            has_next_page: snapshot.result.has_next_page,
            error: snapshot.error.clone(),
            columns: &COLUMNS,
            rows,
        }
    }

    /// Render as a plain text table
    pub fn render_text(&self) -> String {
        let mut widths: Vec<usize> = COLUMNS
            .iter()
            .map(|c| c.header.len().max(c.min_width))
            .collect();
        let cells: Vec<[String; 6]> = self.rows.iter().map(GridRow::cells).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        let headers: Vec<&str> = COLUMNS.iter().map(|c| c.header).collect();
        push_line(&mut out, &headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &cells {
            push_line(&mut out, row, &widths);
        }

        if self.loading {
            out.push_str("(loading)\n");
        } else if let Some(err) = &self.error {
            let _ = writeln!(out, "(error: {err})");
        } else if self.rows.is_empty() {
            out.push_str("(no rows)\n");
        }
        let _ = writeln!(
            out,
            "page {} | {} per page | {}",
            self.page + 1,
            self.page_size,
            if self.has_next_page {
                "more available"
            } else {
                "last page"
            }
        );
        out
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
