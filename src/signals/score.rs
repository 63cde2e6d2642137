use crate::core::{Reason, Verdict};
use crate::signals::Finding;

/// Longest machine-readable reason code.
pub const CODE_MAX_LEN: usize = 32;

/// Derive a stable code from a label: uppercase, runs of anything but `A-Z0-9`
/// collapsed to `_`, edges trimmed, truncated.
pub fn reason_code(label: &str) -> String {
    let mut code = String::with_capacity(label.len());
    for c in label.chars().flat_map(char::to_uppercase) {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            code.push(c);
        } else if !code.is_empty() && !code.ends_with('_') {
            code.push('_');
        }
    }
    let trimmed = code.trim_end_matches('_');
    let truncated: String = trimmed.chars().take(CODE_MAX_LEN).collect();
    if truncated.is_empty() {
        "REASON".to_string()
    } else {
        truncated
    }
}

pub fn to_reason(finding: &Finding) -> Reason {
    Reason {
        code: reason_code(&finding.label),
        label: finding.label.clone(),
        weight: -finding.delta,
        detail: finding.detail.clone(),
    }
}

/// Sum of deltas, floored at zero.
pub fn total(findings: &[Finding]) -> i32 {
    findings.iter().map(|f| f.delta).sum::<i32>().max(0)
}

/// Rebuild a score from an emitted reasons list.
pub fn from_reasons(reasons: &[Reason]) -> i32 {
    reasons.iter().map(Reason::delta).sum::<i32>().max(0)
}

pub fn verdict(score: i32) -> Verdict {
    Verdict::from_score(score)
}
