pub mod address;
pub mod flags;
pub mod scan;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::flags::FlagSet;

/// The `account_data` object of a funded ledger account, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRoot {
    /// Raw `Flags` bitmask. `None` when the ledger omitted the field.
    pub flags: Option<u32>,
    pub owner_count: u32,
    pub regular_key: Option<String>,
    /// Hex-encoded `Domain` field exactly as the ledger returned it.
    pub domain_hex: Option<String>,
}

/// Outcome of an `account_info` lookup that reached a ledger endpoint.
///
/// Transport failures are not a variant here: they surface as `Err(LedgerError)`
/// so they can never be mistaken for an unfunded account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    Found(AccountRoot),
    NotFound,
}

/// One entry from `account_tx`, reduced to what age computation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRef {
    pub ledger_index: Option<u32>,
}

/// What a domain's well-known metadata said about the scanned address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvidence {
    pub domain: String,
    pub metadata_found: bool,
    /// Only meaningful when `metadata_found` is true.
    pub address_listed: bool,
    pub metadata_url: Option<String>,
}

/// Facts about one ledger account at scan time, as consumed by the rules.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub address: String,
    pub flags: FlagSet,
    pub owner_count: u32,
    pub regular_key_set: bool,
    /// `None` means indeterminate, never zero.
    pub age_days: Option<u32>,
    /// `None` when the account has no decodable `Domain` field.
    pub domain: Option<DomainEvidence>,
}

/// The thing that was scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Subject {
    Wallet { address: String },
    Domain { domain: String },
}

impl Subject {
    pub fn query(&self) -> &str {
        match self {
            Subject::Wallet { address } => address,
            Subject::Domain { domain } => domain,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Wallet { .. } => "wallet",
            Subject::Domain { .. } => "domain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Green,  // score <= 1
    Orange, // 2..=3
    Red,    // >= 4
}

impl Verdict {
    /// Step function over the risk score. Boundaries sit between 1/2 and 3/4.
    pub fn from_score(score: i32) -> Self {
        if score <= 1 {
            Verdict::Green
        } else if score <= 3 {
            Verdict::Orange
        } else {
            Verdict::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Green => "green",
            Verdict::Orange => "orange",
            Verdict::Red => "red",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Green => "🟢",
            Verdict::Orange => "🟠",
            Verdict::Red => "🔴",
        }
    }
}

/// One applied rule, as reported to callers.
///
/// `weight` is the negated score delta: positive weights lower risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub code: String,
    pub label: String,
    pub weight: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Reason {
    pub fn delta(&self) -> i32 {
        -self.weight
    }
}

/// A finished scan verdict. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: i32,
    pub verdict: Verdict,
    pub reasons: Vec<Reason>,
    pub badges: Vec<String>,
    pub subject: Subject,
    pub timestamp: DateTime<Utc>,
}
