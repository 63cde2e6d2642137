//! Response normalizer: JSON envelopes and plain-text summaries.

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::scan::{ScanDetails, ScanReport};
use crate::core::{ScoreResult, Verdict};
use crate::error::ScanError;
use crate::lists::GateHit;
use crate::signals::lookalike::LookalikeReport;
use crate::signals::score;

pub const DISCLAIMER: &str =
    "Results are indicative only and not a guarantee of safety. XRglass cannot guarantee 100% accuracy.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(flatten)]
    pub body: T,
}

/// `{label, impact}` entry, where impact is the score delta (positive = riskier).
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LegacyReason<'a> {
    pub label: &'a str,
    pub impact: i32,
}

#[derive(Debug, Serialize)]
pub struct ScanBody<'a> {
    pub verdict: Verdict,
    pub points: i32,
    pub reasons: Vec<LegacyReason<'a>>,
    /// Which curated list decided the verdict, for short-circuited scans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a ScanDetails>,
    pub result: &'a ScoreResult,
    pub disclaimer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LookalikeBody<'a> {
    #[serde(flatten)]
    pub report: &'a LookalikeReport,
    pub disclaimer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    pub retryable: bool,
}

pub fn scan_envelope(report: &ScanReport) -> Envelope<ScanBody<'_>> {
    let result = &report.result;
    debug_assert_eq!(score::from_reasons(&result.reasons), result.score);
    Envelope {
        status: Status::Ok,
        body: ScanBody {
            verdict: result.verdict,
            points: result.score,
            reasons: result
                .reasons
                .iter()
                .map(|r| LegacyReason {
                    label: &r.label,
                    impact: r.delta(),
                })
                .collect(),
            gate: report.gate,
            details: report.details.as_ref(),
            result,
            disclaimer: DISCLAIMER,
        },
    }
}

pub fn lookalike_envelope(report: &LookalikeReport) -> Envelope<LookalikeBody<'_>> {
    Envelope {
        status: Status::Ok,
        body: LookalikeBody {
            report,
            disclaimer: DISCLAIMER,
        },
    }
}

pub fn error_envelope(err: &ScanError) -> Envelope<ErrorBody> {
    Envelope {
        status: Status::Error,
        body: ErrorBody {
            message: err.to_string(),
            code: err.code(),
            retryable: err.is_retryable(),
        },
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn signed(delta: i32) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

pub fn render_scan(report: &ScanReport) -> String {
    let result = &report.result;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} (score {})",
        result.verdict.emoji(),
        result.verdict.as_str().to_uppercase(),
        result.subject.kind(),
        result.subject.query(),
        result.score
    );
    for reason in &result.reasons {
        let _ = write!(out, "  {:>4}  {}", signed(reason.delta()), reason.label);
        match &reason.detail {
            Some(detail) => {
                let _ = writeln!(out, " ({detail})");
            }
            None => out.push('\n'),
        }
    }
    if !result.badges.is_empty() {
        let _ = writeln!(out, "Badges: {}", result.badges.join(", "));
    }
    if let Some(ScanDetails::Wallet(details)) = &report.details {
        if !details.unavailable.is_empty() {
            let _ = writeln!(out, "Not checked: {}", details.unavailable.join(", "));
        }
    }
    out.push_str(DISCLAIMER);
    out
}

pub fn render_lookalike(report: &LookalikeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} ({}/100)",
        report.verdict.emoji(),
        report.verdict.as_str().to_uppercase(),
        report.domain,
        report.score_value
    );
    let _ = writeln!(out, "{}", report.summary);
    for signal in &report.signals {
        let _ = write!(out, "  +{:<3} {}", signal.points, signal.label);
        match &signal.evidence {
            Some(evidence) => {
                let _ = writeln!(out, " [{evidence}]");
            }
            None => out.push('\n'),
        }
    }
    out.push_str(DISCLAIMER);
    out
}

pub fn render_error(err: &ScanError) -> String {
    let retry = if err.is_retryable() { ", try again later" } else { "" };
    format!("error [{}]: {err}{retry}", err.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Subject;
    use crate::core::flags::FlagSet;
    use crate::core::scan::{ScanPhase, WalletDetails};
    use crate::error::LedgerError;
    use crate::signals::lookalike::{LookalikeFacts, assess};
    use crate::signals::{Assessment, Finding};
    use chrono::Utc;
    use serde_json::Value;

    fn report() -> ScanReport {
        let findings = [
            Finding::new("Account has GlobalFreeze set", 3).badge("GlobalFreeze"),
            Finding::new("xrp.toml found on domain", -1).badge("xrp.toml"),
            Finding::new("Account age < 30 days", 1).detail("12 days"),
        ];
        let result = Assessment::from_findings(&findings).into_result(
            Subject::Wallet {
                address: "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh".into(),
            },
            Utc::now(),
        );
        ScanReport {
            result,
            details: Some(ScanDetails::Wallet(WalletDetails {
                address: "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh".into(),
                owner_count: 2,
                account_age_days: Some(12),
                domain: Some("example.com".into()),
                toml_found: true,
                address_listed: false,
                toml_url: Some("https://example.com/.well-known/xrp.toml".into()),
                flags_decoded: FlagSet {
                    global_freeze: true,
                    ..FlagSet::default()
                },
                regular_key_set: false,
                unavailable: vec![],
            })),
            phase: ScanPhase::Scored,
            gate: None,
        }
    }

    fn json<T: Serialize>(value: &T) -> Value {
        serde_json::from_str(&to_json(value).unwrap()).unwrap()
    }

    #[test]
    fn scan_envelope_shape() {
        let report = report();
        let v = json(&scan_envelope(&report));

        assert_eq!(v["status"], "ok");
        assert_eq!(v["verdict"], "orange");
        assert_eq!(v["points"], 3);
        assert_eq!(v["disclaimer"], DISCLAIMER);
        assert_eq!(v["reasons"][0]["label"], "Account has GlobalFreeze set");
        assert_eq!(v["reasons"][0]["impact"], 3);
        assert_eq!(v["reasons"][1]["impact"], -1);
        assert_eq!(v["result"]["reasons"][0]["weight"], -3);
        assert_eq!(v["result"]["reasons"][0]["code"], "ACCOUNT_HAS_GLOBALFREEZE_SET");
        assert_eq!(v["result"]["subject"]["kind"], "wallet");
        assert_eq!(v["details"]["flags_decoded"]["GlobalFreeze"], true);
        assert_eq!(v["details"]["account_age_days"], 12);
    }

    #[test]
    fn normalized_block_is_lossless() {
        let report = report();
        let v = json(&scan_envelope(&report));
        let back: ScoreResult = serde_json::from_value(v["result"].clone()).unwrap();
        assert_eq!(back, report.result);
        assert_eq!(score::from_reasons(&back.reasons), back.score);
    }

    #[test]
    fn short_circuit_omits_details() {
        let mut report = report();
        report.details = None;
        report.gate = Some(GateHit::TrustedWallet);
        let v = json(&scan_envelope(&report));
        assert!(v.get("details").is_none());
        assert_eq!(v["gate"], "trusted_wallet");
    }

    #[test]
    fn error_envelope_shape() {
        let v = json(&error_envelope(&ScanError::Unavailable(LedgerError::NoEndpoints)));
        assert_eq!(v["status"], "error");
        assert_eq!(v["code"], "service_unavailable");
        assert_eq!(v["retryable"], true);

        let v = json(&error_envelope(&ScanError::InvalidAddress("xyz".into())));
        assert_eq!(v["code"], "invalid_address");
        assert_eq!(v["retryable"], false);
        assert!(v["message"].as_str().unwrap().contains("xyz"));
    }

    #[test]
    fn lookalike_envelope_flattens_report() {
        let facts = LookalikeFacts {
            domain: "xrpi.org".into(),
            https: true,
            reachable: true,
        };
        let report = assess(&facts, &["xrpl.org".to_string()], Utc::now());
        let v = json(&lookalike_envelope(&report));
        assert_eq!(v["status"], "ok");
        assert_eq!(v["domain"], "xrpi.org");
        assert_eq!(v["score_value"], 20);
        assert_eq!(v["signals"][0]["severity"], "medium");
        assert_eq!(v["nearest"]["known"], "xrpl.org");
        assert_eq!(v["disclaimer"], DISCLAIMER);
    }

    #[test]
    fn text_summary() {
        let text = render_scan(&report());
        assert!(text.starts_with("🟠 ORANGE wallet rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh (score 3)"));
        assert!(text.contains("+3  Account has GlobalFreeze set"));
        assert!(text.contains("-1  xrp.toml found on domain"));
        assert!(text.contains("Account age < 30 days (12 days)"));
        assert!(text.contains("Badges: GlobalFreeze, xrp.toml"));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn text_lists_unchecked_facts() {
        let mut report = report();
        if let Some(ScanDetails::Wallet(d)) = &mut report.details {
            d.unavailable = vec!["account_age".into()];
        }
        assert!(render_scan(&report).contains("Not checked: account_age"));
    }

    #[test]
    fn error_text() {
        let text = render_error(&ScanError::Unavailable(LedgerError::NoEndpoints));
        assert!(text.starts_with("error [service_unavailable]"));
        assert!(text.ends_with("try again later"));
    }
}
