use std::collections::HashSet;

use serde::Serialize;

use crate::config::ListConfig;
use crate::core::address::match_key;
use crate::signals::Finding;

/// Weight of a curated-list decision. Larger than any sum of ordinary rules.
pub const GATE_WEIGHT: i32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateHit {
    TrustedWallet,
    BlockedWallet,
    TrustedDomain,
    BlockedDomain,
}

impl GateHit {
    pub fn is_trusted(&self) -> bool {
        matches!(self, GateHit::TrustedWallet | GateHit::TrustedDomain)
    }

    /// The single dominant reason a short-circuited scan reports.
    pub fn finding(&self) -> Finding {
        match self {
            GateHit::TrustedWallet => Finding::new("Trusted allowlist wallet", -GATE_WEIGHT)
                .badge("Trusted wallet"),
            GateHit::BlockedWallet => Finding::new("Blocked denylist wallet", GATE_WEIGHT)
                .badge("Blocked wallet"),
            GateHit::TrustedDomain => {
                Finding::new("Verified ecosystem domain (allowlist)", -GATE_WEIGHT)
                    .badge("Verified ecosystem domain")
            }
            GateHit::BlockedDomain => Finding::new("Blocked domain (denylist)", GATE_WEIGHT)
                .badge("Blocked domain"),
        }
    }

    pub fn badges(&self) -> Vec<String> {
        let list_badge = if self.is_trusted() {
            "Allowlist match"
        } else {
            "Denylist match"
        };
        self.finding()
            .badge
            .into_iter()
            .chain(std::iter::once(list_badge.to_string()))
            .collect()
    }
}

/// Curated allow/deny sets, injected from configuration.
///
/// Matching is exact on the normalized key. Denylist entries win over allowlist
/// entries for the same key.
#[derive(Debug, Clone, Default)]
pub struct CuratedLists {
    trusted_wallets: HashSet<String>,
    blocked_wallets: HashSet<String>,
    trusted_domains: HashSet<String>,
    blocked_domains: HashSet<String>,
}

fn wallets(entries: &[String]) -> HashSet<String> {
    entries.iter().map(|a| a.trim().to_string()).collect()
}

fn domains(entries: &[String]) -> HashSet<String> {
    entries.iter().map(|d| match_key(d)).collect()
}

impl CuratedLists {
    pub fn from_config(config: &ListConfig) -> Self {
        let lists = Self {
            trusted_wallets: wallets(&config.trusted_wallets),
            blocked_wallets: wallets(&config.blocked_wallets),
            trusted_domains: domains(&config.trusted_domains),
            blocked_domains: domains(&config.blocked_domains),
        };
        tracing::debug!(
            "Curated lists loaded: {} trusted / {} blocked wallets, {} trusted / {} blocked domains",
            lists.trusted_wallets.len(),
            lists.blocked_wallets.len(),
            lists.trusted_domains.len(),
            lists.blocked_domains.len()
        );
        lists
    }

    pub fn check_wallet(&self, address: &str) -> Option<GateHit> {
        if self.blocked_wallets.contains(address) {
            Some(GateHit::BlockedWallet)
        } else if self.trusted_wallets.contains(address) {
            Some(GateHit::TrustedWallet)
        } else {
            None
        }
    }

    /// `domain` may be raw input; it is normalized to its match key first.
    pub fn check_domain(&self, domain: &str) -> Option<GateHit> {
        let key = match_key(domain);
        if self.blocked_domains.contains(&key) {
            Some(GateHit::BlockedDomain)
        } else if self.trusted_domains.contains(&key) {
            Some(GateHit::TrustedDomain)
        } else {
            None
        }
    }
}
