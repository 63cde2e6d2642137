//! Project (domain) scoring: HTTPS reachability and published ledger metadata.

use crate::signals::Finding;

/// Cost of a domain that does not answer over HTTPS.
pub const HTTPS_WEIGHT: i32 = 1;
/// Cost of a domain without a reachable `xrp.toml`.
pub const METADATA_WEIGHT: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFacts {
    pub https_ok: bool,
    /// URL of the first reachable metadata candidate.
    pub metadata_url: Option<String>,
}

pub fn findings(facts: &ProjectFacts) -> Vec<Finding> {
    let mut out = Vec::new();
    if !facts.https_ok {
        out.push(Finding::new("HTTPS not detected", HTTPS_WEIGHT));
    }
    match &facts.metadata_url {
        Some(url) => out.push(Finding::new("xrp.toml found", 0).badge("xrp.toml").detail(url.clone())),
        None => out.push(Finding::new("xrp.toml not found", METADATA_WEIGHT)),
    }
    out
}
