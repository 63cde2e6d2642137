//! Brand-confusion check: how close is a domain to a well-known ecosystem domain?
//!
//! Advisory only. It answers a different question from the trust-file scan and
//! has its own 0-100 scale; its score never feeds a wallet or project verdict.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strsim::levenshtein;

use crate::core::Verdict;
use crate::core::address::match_key;

/// Largest edit distance still considered a lookalike.
pub const MAX_DISTANCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookalikeSignal {
    pub id: &'static str,
    pub label: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nearest {
    pub known: String,
    pub distance: usize,
}

/// Raw observations about the URL being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookalikeFacts {
    pub domain: String,
    pub https: bool,
    pub reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookalikeReport {
    pub domain: String,
    pub https: bool,
    pub reachable: bool,
    pub nearest: Option<Nearest>,
    pub signals: Vec<LookalikeSignal>,
    pub score_value: u32,
    pub verdict: Verdict,
    pub summary: &'static str,
    pub checked_at: DateTime<Utc>,
}

/// Closest known domain to `domain`. Both sides are reduced to their match key
/// (no scheme, no path, no leading `www.`, lowercase). Ties go to the earlier
/// entry in `known`.
pub fn nearest(domain: &str, known: &[String]) -> Option<Nearest> {
    let key = match_key(domain);
    known
        .iter()
        .map(|k| {
            let known = match_key(k);
            let distance = levenshtein(&key, &known);
            Nearest { known, distance }
        })
        .min_by_key(|n| n.distance)
}

/// A lookalike is close to, but not the same as, a known domain.
///
/// Distance 0 is excluded: the known domain itself is not a typosquat, even
/// though it is within the `<= MAX_DISTANCE` window.
pub fn is_lookalike(nearest: &Nearest) -> bool {
    (1..=MAX_DISTANCE).contains(&nearest.distance)
}

fn is_country_code_tld(domain: &str) -> bool {
    domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() == 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

pub fn verdict_from_value(score_value: u32) -> Verdict {
    if score_value >= 70 {
        Verdict::Red
    } else if score_value >= 35 {
        Verdict::Orange
    } else {
        Verdict::Green
    }
}

fn summary(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Red => "High risk: HTTPS missing or strong similarity to a known brand.",
        Verdict::Orange => "Moderate risk: some indicators present.",
        Verdict::Green => "Low risk: no major indicators.",
    }
}

pub fn assess(facts: &LookalikeFacts, known: &[String], checked_at: DateTime<Utc>) -> LookalikeReport {
    let nearest = nearest(&facts.domain, known);
    let mut signals = Vec::new();

    if !facts.https {
        signals.push(LookalikeSignal {
            id: "no_https",
            label: "No HTTPS".to_string(),
            severity: Severity::High,
            evidence: None,
            points: 40,
        });
    }

    if !facts.reachable {
        signals.push(LookalikeSignal {
            id: "unreachable",
            label: "Site did not respond".to_string(),
            severity: Severity::Low,
            evidence: None,
            points: 10,
        });
    }

    if let Some(n) = nearest.as_ref().filter(|n| is_lookalike(n)) {
        signals.push(LookalikeSignal {
            id: "typo_risk",
            label: format!("Domain similar to {}", n.known),
            severity: Severity::Medium,
            evidence: Some(format!("distance={}", n.distance)),
            points: 20,
        });
    }

    if is_country_code_tld(&facts.domain) {
        signals.push(LookalikeSignal {
            id: "cctld",
            label: "Country-code TLD (manual review)".to_string(),
            severity: Severity::Low,
            evidence: None,
            points: 5,
        });
    }

    let score_value = signals.iter().map(|s| s.points).sum();
    let verdict = verdict_from_value(score_value);

    LookalikeReport {
        domain: facts.domain.clone(),
        https: facts.https,
        reachable: facts.reachable,
        nearest,
        signals,
        score_value,
        verdict,
        summary: summary(verdict),
        checked_at,
    }
}
