//! In-memory page source for unit tests

use crate::error::{Error, Result};
use crate::pagination::{PageRequest, ResultPage};
use crate::source::PageSource;
use crate::types::{ExecutionInfo, ExecutionStatus, SequenceInfo, TransactionData, TransactionView};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

pub(crate) fn tx(order: u64) -> TransactionView {
    TransactionView {
        sequence_info: SequenceInfo {
            tx_order: order,
            tx_timestamp: Some(1_700_000_000_000 + order * 1000),
        },
        execution_info: ExecutionInfo {
            tx_hash: format!("0x{order:064x}"),
            gas_used: 100 + order,
            status: ExecutionStatus {
                kind: "executed".to_string(),
            },
        },
        transaction: TransactionData {
            action_type: "function".to_string(),
            sender: format!("0x{:040x}", order % 3),
        },
    }
}

/// Serves `total` sequential transactions, records every request
pub(crate) struct MockSource {
    total: u64,
    requests: Mutex<Vec<PageRequest>>,
    failures: AtomicU32,
    gate: Option<Semaphore>,
}

impl MockSource {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            total,
            requests: Mutex::new(Vec::new()),
            failures: AtomicU32::new(0),
            gate: None,
        }
    }

    /// Every fetch waits for a permit from [`MockSource::release`]
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// The next `n` fetches fail
    pub(crate) fn failing(self, n: u32) -> Self {
        self.failures.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub(crate) fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub(crate) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PageSource for MockSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<ResultPage<TransactionView>> {
        self.requests.lock().unwrap().push(request);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| Error::Other(e.to_string()))?
                .forget();
        }

        let fail = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(Error::http_status(503, "node unavailable"));
        }

        let end = (request.offset + u64::from(request.limit)).min(self.total);
        let data = (request.offset..end).map(tx).collect();
        Ok(ResultPage::new(data, end < self.total))
    }
}
