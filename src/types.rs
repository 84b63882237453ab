//! Common types used throughout rooch-txscan
//!
//! Fetch status, the transaction record returned by the node, and shared
//! HTTP retry settings.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Fetch Status
// ============================================================================

/// Lifecycle of the result store's most recent fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch completed successfully
    Finished,
    /// The last fetch failed
    Error,
}

impl FetchStatus {
    /// Whether a fetch is currently in flight
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the last fetch completed successfully
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Short lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Transaction Records
// ============================================================================

/// A transaction together with its sequencing and execution info
///
/// Only the fields needed for display are modelled; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub sequence_info: SequenceInfo,
    pub execution_info: ExecutionInfo,
    pub transaction: TransactionData,
}

impl TransactionView {
    /// Unique row key
    pub fn id(&self) -> &str {
        &self.execution_info.tx_hash
    }
}

/// Position of a transaction in the sequencer's order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub tx_order: u64,
    /// Milliseconds since the Unix epoch
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub tx_timestamp: Option<u64>,
}

/// Outcome of executing a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInfo {
    pub tx_hash: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub gas_used: u64,
    pub status: ExecutionStatus,
}

/// Execution status; only the kind is displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Transaction payload fields used for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub action_type: String,
    pub sender: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Num(u64),
    Str(String),
}

impl StrOrNum {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Num(n) => Ok(n),
            Self::Str(s) => s
                .parse()
                .map_err(|_| E::custom(format!("expected unsigned integer, got '{s}'"))),
        }
    }
}

/// Rooch encodes u64 values as decimal strings; accept both forms
pub(crate) fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    StrOrNum::deserialize(deserializer)?.into_u64()
}

pub(crate) fn opt_u64_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StrOrNum>::deserialize(deserializer)?
        .map(StrOrNum::into_u64)
        .transpose()
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_status_default_and_display() {
        assert_eq!(FetchStatus::default(), FetchStatus::Idle);
        assert_eq!(FetchStatus::Loading.to_string(), "loading");
        assert!(FetchStatus::Loading.is_loading());
        assert!(FetchStatus::Finished.is_finished());
        assert!(!FetchStatus::Error.is_finished());
    }

    #[test]
    fn test_transaction_view_from_rooch_json() {
        let tx: TransactionView = serde_json::from_value(json!({
            "sequence_info": {"tx_order": "42", "tx_timestamp": "1700000000000", "tx_accumulator_root": "0xab"},
            "execution_info": {
                "tx_hash": "0xdeadbeef",
                "gas_used": "1200",
                "state_root": "0x01",
                "status": {"type": "executed"}
            },
            "transaction": {"action_type": "function", "sender": "0xabc", "sequence_number": "3"}
        }))
        .unwrap();

        assert_eq!(tx.id(), "0xdeadbeef");
        assert_eq!(tx.sequence_info.tx_order, 42);
        assert_eq!(tx.sequence_info.tx_timestamp, Some(1_700_000_000_000));
        assert_eq!(tx.execution_info.gas_used, 1200);
        assert_eq!(tx.execution_info.status.kind, "executed");
    }

    #[test]
    fn test_numeric_fields_accept_numbers() {
        let info: ExecutionInfo = serde_json::from_value(json!({
            "tx_hash": "0x1",
            "gas_used": 77,
            "status": {"type": "moveabort"}
        }))
        .unwrap();
        assert_eq!(info.gas_used, 77);

        let seq: SequenceInfo = serde_json::from_value(json!({"tx_order": 5})).unwrap();
        assert_eq!(seq.tx_order, 5);
        assert!(seq.tx_timestamp.is_none());
    }

    #[test]
    fn test_numeric_field_rejects_garbage() {
        let result: std::result::Result<SequenceInfo, _> =
            serde_json::from_value(json!({"tx_order": "not-a-number"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_backoff_type_serde() {
        let b: BackoffType = serde_yaml::from_str("linear").unwrap();
        assert_eq!(b, BackoffType::Linear);
        assert_eq!(BackoffType::default(), BackoffType::Exponential);
    }
}
