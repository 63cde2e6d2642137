pub mod lookalike;
pub mod project;
pub mod rules;
pub mod score;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{AccountSnapshot, Reason, ScoreResult, Subject, Verdict};
use rules::Rule;

/// Score an unfunded account gets. Lookup stops there, so nothing else applies.
pub const NOT_FOUND_SCORE: i32 = 4;

/// One applied rule before it is turned into a public [`Reason`].
///
/// `delta` is the change in risk score: positive means riskier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub label: String,
    pub delta: i32,
    pub badge: Option<String>,
    pub detail: Option<String>,
}

impl Finding {
    pub fn new(label: impl Into<String>, delta: i32) -> Self {
        Self {
            label: label.into(),
            delta,
            badge: None,
            detail: None,
        }
    }

    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Score, verdict, reasons, and badges derived from a list of findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub score: i32,
    pub verdict: Verdict,
    pub reasons: Vec<Reason>,
    pub badges: Vec<String>,
}

impl Assessment {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let score = score::total(findings);
        Self {
            score,
            verdict: score::verdict(score),
            reasons: findings.iter().map(score::to_reason).collect(),
            badges: findings.iter().filter_map(|f| f.badge.clone()).collect(),
        }
    }

    /// Terminal assessment for an account that was never funded.
    pub fn not_found() -> Self {
        Self::from_findings(&[
            Finding::new("Account not found (not activated/funded)", NOT_FOUND_SCORE)
                .badge("Account not found"),
        ])
    }

    pub fn into_result(self, subject: Subject, timestamp: DateTime<Utc>) -> ScoreResult {
        ScoreResult {
            score: self.score,
            verdict: self.verdict,
            reasons: self.reasons,
            badges: self.badges,
            subject,
            timestamp,
        }
    }
}

/// The signal engine applies all wallet rules and sums their deltas.
pub struct SignalEngine {
    rules: Vec<Box<dyn Rule + Send + Sync>>,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalEngine {
    pub fn new() -> Self {
        Self {
            rules: rules::default_rules(),
        }
    }

    pub fn findings(&self, account: &AccountSnapshot) -> Vec<Finding> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let finding = rule.evaluate(account)?;
                debug!("rule {} applied: {:+}", rule.name(), finding.delta);
                Some(finding)
            })
            .collect()
    }

    pub fn score(&self, account: &AccountSnapshot) -> Assessment {
        Assessment::from_findings(&self.findings(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::rules::tests::{evidence, make_test_account};

    fn labels(assessment: &Assessment) -> Vec<&str> {
        assessment.reasons.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn quiet_account_is_green() {
        let assessment = SignalEngine::new().score(&make_test_account());
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.verdict, Verdict::Green);
        assert_eq!(labels(&assessment), vec!["No domain configured"]);
        assert!(assessment.badges.is_empty());
    }

    #[test]
    fn global_freeze_without_domain_or_key_is_orange() {
        let mut account = make_test_account();
        account.flags.global_freeze = true;
        let assessment = SignalEngine::new().score(&account);
        assert_eq!(assessment.score, 3);
        assert_eq!(assessment.verdict, Verdict::Orange);
        assert_eq!(
            labels(&assessment),
            vec!["Account has GlobalFreeze set", "No domain configured"]
        );
        assert_eq!(assessment.badges, vec!["GlobalFreeze"]);
    }

    #[test]
    fn stacked_risks_are_red() {
        let mut account = make_test_account();
        account.flags.global_freeze = true;
        account.flags.disable_master = true;
        account.age_days = Some(2);
        account.owner_count = 50;
        let assessment = SignalEngine::new().score(&account);
        assert_eq!(assessment.score, 3 + 2 + 2 + 1);
        assert_eq!(assessment.verdict, Verdict::Red);
    }

    #[test]
    fn listed_domain_lowers_score_by_two() {
        let mut account = make_test_account();
        account.flags.global_freeze = true;
        account.owner_count = 21;
        let baseline = SignalEngine::new().score(&account).score;

        account.domain = Some(evidence(true, true));
        let assessment = SignalEngine::new().score(&account);
        assert_eq!(assessment.score, baseline - 2);
        assert_eq!(assessment.badges, vec!["GlobalFreeze", "xrp.toml", "TOML-listed"]);
    }

    #[test]
    fn risk_reducers_floor_at_zero() {
        let mut account = make_test_account();
        account.flags.require_dest_tag = true;
        account.domain = Some(evidence(true, true));
        let assessment = SignalEngine::new().score(&account);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.verdict, Verdict::Green);
        assert_eq!(assessment.reasons.len(), 3);
    }

    #[test]
    fn score_is_sum_of_applied_weights() {
        let mut account = make_test_account();
        account.flags.disable_master = true;
        account.age_days = Some(10);
        account.domain = Some(evidence(true, false));
        let assessment = SignalEngine::new().score(&account);
        assert_eq!(assessment.score, score::from_reasons(&assessment.reasons));
        assert_eq!(assessment.score, 2 + 1 - 1);
    }

    #[test]
    fn not_found_is_terminal_red() {
        let assessment = Assessment::not_found();
        assert_eq!(assessment.score, NOT_FOUND_SCORE);
        assert_eq!(assessment.verdict, Verdict::Red);
        assert_eq!(assessment.reasons.len(), 1);
        assert!(assessment.reasons[0].label.starts_with("Account not found"));
        assert_eq!(assessment.badges, vec!["Account not found"]);
    }

    #[test]
    fn scoring_is_deterministic() {
        let mut account = make_test_account();
        account.flags.global_freeze = true;
        account.age_days = Some(12);
        let engine = SignalEngine::new();
        assert_eq!(engine.score(&account), engine.score(&account));
    }
}
