//! Validation boundary for ledger JSON-RPC payloads.
//!
//! Everything past this module works with typed facts; untyped JSON never leaks
//! into scoring.

use serde::Deserialize;
use serde_json::Value;

use crate::core::{AccountLookup, AccountRoot, TxRef};
use crate::error::RpcError;

/// Seconds between the unix epoch and the ledger epoch (2000-01-01T00:00:00Z).
pub const LEDGER_EPOCH_OFFSET: i64 = 946_684_800;

const ACCOUNT_NOT_FOUND: &str = "actNotFound";
const ACCOUNT_MALFORMED: &str = "actMalformed";

/// Pull the `result` object out of a JSON-RPC response body.
///
/// `actNotFound` is passed through as a normal result since it is an answer,
/// not a failure. Any other `error` makes the attempt fail.
pub fn unwrap_envelope(body: Value) -> Result<Value, RpcError> {
    let result = match body {
        Value::Object(mut map) => match map.remove("result") {
            Some(result @ Value::Object(_)) => result,
            _ => Value::Object(map),
        },
        other => return Err(RpcError::Payload(format!("expected JSON object, got {other}"))),
    };

    match result.get("error").and_then(Value::as_str) {
        None | Some(ACCOUNT_NOT_FOUND) => Ok(result),
        Some(ACCOUNT_MALFORMED) => Err(RpcError::AccountMalformed),
        Some(code) => Err(RpcError::Rpc {
            code: code.to_string(),
            message: result
                .get("error_message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccountData {
    flags: Option<u32>,
    owner_count: Option<Count>,
    regular_key: Option<String>,
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    account_data: AccountData,
}

pub fn account_info(result: Value) -> Result<AccountLookup, RpcError> {
    if result.get("error").and_then(Value::as_str) == Some(ACCOUNT_NOT_FOUND) {
        return Ok(AccountLookup::NotFound);
    }

    let parsed: AccountInfoResult = serde_json::from_value(result)
        .map_err(|e| RpcError::Payload(format!("account_info: {e}")))?;
    let data = parsed.account_data;

    let owner_count = match data.owner_count {
        None => 0,
        Some(Count::Number(n)) => n,
        Some(Count::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| RpcError::Payload(format!("account_info: OwnerCount {s:?}")))?,
    };

    Ok(AccountLookup::Found(AccountRoot {
        flags: data.flags,
        owner_count,
        regular_key: data.regular_key.filter(|k| !k.is_empty()),
        domain_hex: data.domain.filter(|d| !d.is_empty()),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct TxBody {
    ledger_index: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TxEntry {
    ledger_index: Option<u32>,
    tx: Option<TxBody>,
    tx_json: Option<TxBody>,
}

#[derive(Debug, Deserialize)]
struct AccountTxResult {
    transactions: Vec<TxEntry>,
}

pub fn account_tx(result: Value) -> Result<Vec<TxRef>, RpcError> {
    let parsed: AccountTxResult = serde_json::from_value(result)
        .map_err(|e| RpcError::Payload(format!("account_tx: {e}")))?;

    Ok(parsed
        .transactions
        .into_iter()
        .map(|entry| {
            // API v1 nests the transaction under `tx`, v2 under `tx_json`.
            let body = entry.tx.or(entry.tx_json).unwrap_or_default();
            TxRef {
                ledger_index: entry.ledger_index.or(body.ledger_index),
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct LedgerHeader {
    close_time: i64,
}

#[derive(Debug, Deserialize)]
struct LedgerResult {
    ledger: LedgerHeader,
}

/// Close time of a ledger, converted to unix seconds.
pub fn ledger_close_time(result: Value) -> Result<i64, RpcError> {
    let parsed: LedgerResult = serde_json::from_value(result)
        .map_err(|e| RpcError::Payload(format!("ledger: {e}")))?;
    let close_time = parsed.ledger.close_time;
    close_time
        .checked_add(LEDGER_EPOCH_OFFSET)
        .ok_or_else(|| RpcError::Payload(format!("ledger: close_time {close_time} out of range")))
}
