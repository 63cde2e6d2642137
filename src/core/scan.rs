use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::address::{clean_domain, decode_domain_hex, is_valid_address, is_valid_domain};
use crate::core::flags::FlagSet;
use crate::core::{AccountLookup, AccountSnapshot, ScoreResult, Subject};
use crate::error::ScanError;
use crate::github::{self, RepoInfo};
use crate::lists::{CuratedLists, GateHit};
use crate::rpc::Ledger;
use crate::rpc::web::WebProbe;
use crate::signals::lookalike::{self, LookalikeFacts, LookalikeReport};
use crate::signals::project::{self, ProjectFacts};
use crate::signals::{Assessment, SignalEngine};
use crate::wellknown;

const SECONDS_PER_DAY: i64 = 86_400;

/// Lifecycle of a single scan.
///
/// `Init -> Fetching -> (ShortCircuit | Failed | Scored) -> Responded`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Init,
    Fetching,
    ShortCircuit,
    Failed,
    Scored,
    Responded,
}

/// Decoded facts behind a wallet verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletDetails {
    pub address: String,
    pub owner_count: u32,
    pub account_age_days: Option<u32>,
    pub domain: Option<String>,
    pub toml_found: bool,
    pub address_listed: bool,
    pub toml_url: Option<String>,
    pub flags_decoded: FlagSet,
    pub regular_key_set: bool,
    /// Facts that could not be established. Their rules did not contribute.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundDetails {
    pub address: String,
    pub not_found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    pub domain: String,
    pub https_ok: bool,
    pub toml_found: bool,
    pub toml_url: Option<String>,
    /// Flattened metadata file, when it was found and parsed as TOML.
    pub toml_parsed: Option<BTreeMap<String, String>>,
    /// Activity of the repository the metadata links to. Not scored.
    pub github: Option<RepoInfo>,
    /// Always false here; allowlisted domains short-circuit without details.
    pub trusted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanDetails {
    Wallet(WalletDetails),
    NotFound(NotFoundDetails),
    Project(ProjectDetails),
}

/// A scored scan plus the facts that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub result: ScoreResult,
    /// Absent for short-circuited scans, which fetch nothing.
    pub details: Option<ScanDetails>,
    /// `ShortCircuit` or `Scored`.
    pub phase: ScanPhase,
    pub gate: Option<GateHit>,
}

/// Whole days between a ledger close time and `now`, floored at zero.
pub fn age_days(close_time_unix: i64, now: DateTime<Utc>) -> u32 {
    let elapsed = now.timestamp().saturating_sub(close_time_unix).max(0);
    u32::try_from(elapsed / SECONDS_PER_DAY).unwrap_or(u32::MAX)
}

/// Tracks and logs phase transitions for one scan.
struct Progress {
    kind: &'static str,
    query: String,
    phase: ScanPhase,
}

impl Progress {
    fn start(kind: &'static str, query: &str) -> Self {
        Self {
            kind,
            query: query.to_string(),
            phase: ScanPhase::Init,
        }
    }

    fn advance(&mut self, next: ScanPhase) {
        debug!("{} scan {}: {:?} -> {:?}", self.kind, self.query, self.phase, next);
        self.phase = next;
    }

    fn finish(mut self, outcome: &Result<ScanReport, ScanError>) {
        match outcome {
            Ok(report) => {
                self.advance(ScanPhase::Responded);
                info!(
                    target: "xrglass::scan_log",
                    query = %self.query,
                    kind = self.kind,
                    verdict = report.result.verdict.as_str(),
                    score = report.result.score,
                    phase = ?report.phase,
                    "scan completed"
                );
            }
            Err(e) => {
                self.advance(ScanPhase::Failed);
                warn!("{} scan {} failed: {e}", self.kind, self.query);
                self.advance(ScanPhase::Responded);
            }
        }
    }
}

/// Runs wallet, project, and lookalike scans against injected data sources.
///
/// Holds no per-scan state; concurrent scans share nothing mutable.
pub struct Scanner<L, W> {
    ledger: L,
    web: W,
    lists: CuratedLists,
    known_domains: Vec<String>,
    engine: SignalEngine,
}

impl<L: Ledger, W: WebProbe> Scanner<L, W> {
    pub fn new(ledger: L, web: W, lists: CuratedLists, known_domains: Vec<String>) -> Self {
        Self {
            ledger,
            web,
            lists,
            known_domains,
            engine: SignalEngine::new(),
        }
    }

    pub async fn scan_wallet(&self, address: &str) -> Result<ScanReport, ScanError> {
        let address = address.trim();
        let mut progress = Progress::start("wallet", address);
        let outcome = self.wallet(address, &mut progress).await;
        progress.finish(&outcome);
        outcome
    }

    pub async fn scan_domain(&self, domain: &str) -> Result<ScanReport, ScanError> {
        let mut progress = Progress::start("domain", domain.trim());
        let outcome = self.project(domain, &mut progress).await;
        progress.finish(&outcome);
        outcome
    }

    /// Advisory brand-confusion check. Kept apart from the trust scans.
    pub async fn scan_lookalike(&self, input: &str) -> Result<LookalikeReport, ScanError> {
        let input = input.trim();
        let https = !input.to_ascii_lowercase().starts_with("http://");
        let domain = clean_domain(input);
        if !is_valid_domain(&domain) {
            return Err(ScanError::InvalidDomain(input.to_string()));
        }

        let scheme = if https { "https" } else { "http" };
        let reachable = self.web.reachable(&format!("{scheme}://{domain}")).await;
        let facts = LookalikeFacts {
            domain,
            https,
            reachable,
        };
        let report = lookalike::assess(&facts, &self.known_domains, Utc::now());
        info!(
            target: "xrglass::scan_log",
            query = %report.domain,
            kind = "lookalike",
            verdict = report.verdict.as_str(),
            score = report.score_value,
            "scan completed"
        );
        Ok(report)
    }

    async fn wallet(&self, address: &str, progress: &mut Progress) -> Result<ScanReport, ScanError> {
        if !is_valid_address(address) {
            return Err(ScanError::InvalidAddress(address.to_string()));
        }
        let subject = Subject::Wallet {
            address: address.to_string(),
        };

        if let Some(hit) = self.lists.check_wallet(address) {
            progress.advance(ScanPhase::ShortCircuit);
            return Ok(short_circuit(hit, subject));
        }

        progress.advance(ScanPhase::Fetching);
        let root = match self.ledger.account_info(address).await? {
            AccountLookup::Found(root) => root,
            AccountLookup::NotFound => {
                progress.advance(ScanPhase::Scored);
                return Ok(ScanReport {
                    result: Assessment::not_found().into_result(subject, Utc::now()),
                    details: Some(ScanDetails::NotFound(NotFoundDetails {
                        address: address.to_string(),
                        not_found: true,
                    })),
                    phase: ScanPhase::Scored,
                    gate: None,
                });
            }
        };

        let mut unavailable = Vec::new();
        let domain = root.domain_hex.as_deref().and_then(|hex| {
            let decoded = decode_domain_hex(hex);
            if decoded.is_none() {
                warn!("Domain field of {address} is not decodable: {hex:?}");
                unavailable.push("domain".to_string());
            }
            decoded
        });

        // Metadata and age do not depend on each other.
        let (evidence, age) = tokio::join!(
            async {
                match &domain {
                    Some(d) => Some(wellknown::check_address(&self.web, d, address).await),
                    None => None,
                }
            },
            self.account_age(address),
        );
        if age.is_none() {
            unavailable.push("account_age".to_string());
        }

        let account = AccountSnapshot {
            address: address.to_string(),
            flags: FlagSet::decode(root.flags),
            owner_count: root.owner_count,
            regular_key_set: root.regular_key.is_some(),
            age_days: age,
            domain: evidence,
        };
        let assessment = self.engine.score(&account);
        progress.advance(ScanPhase::Scored);

        let details = WalletDetails {
            address: account.address.clone(),
            owner_count: account.owner_count,
            account_age_days: account.age_days,
            domain: account.domain.as_ref().map(|e| e.domain.clone()),
            toml_found: account.domain.as_ref().is_some_and(|e| e.metadata_found),
            address_listed: account
                .domain
                .as_ref()
                .is_some_and(|e| e.metadata_found && e.address_listed),
            toml_url: account.domain.as_ref().and_then(|e| e.metadata_url.clone()),
            flags_decoded: account.flags,
            regular_key_set: account.regular_key_set,
            unavailable,
        };

        Ok(ScanReport {
            result: assessment.into_result(subject, Utc::now()),
            details: Some(ScanDetails::Wallet(details)),
            phase: ScanPhase::Scored,
            gate: None,
        })
    }

    /// Days since the account's first transaction. `None` when any lookup fails.
    async fn account_age(&self, address: &str) -> Option<u32> {
        let txs = match self.ledger.earliest_transactions(address, 1).await {
            Ok(txs) => txs,
            Err(e) => {
                warn!("Transaction history for {address} unavailable: {e}");
                return None;
            }
        };
        let Some(ledger_index) = txs.first().and_then(|tx| tx.ledger_index) else {
            debug!("No dated transaction found for {address}");
            return None;
        };
        match self.ledger.ledger_close_time(ledger_index).await {
            Ok(close_time) => Some(age_days(close_time, Utc::now())),
            Err(e) => {
                warn!("Close time of ledger {ledger_index} unavailable: {e}");
                None
            }
        }
    }

    async fn project(&self, input: &str, progress: &mut Progress) -> Result<ScanReport, ScanError> {
        let domain = clean_domain(input);
        if !is_valid_domain(&domain) {
            return Err(ScanError::InvalidDomain(input.trim().to_string()));
        }
        let subject = Subject::Domain {
            domain: domain.clone(),
        };

        if let Some(hit) = self.lists.check_domain(&domain) {
            progress.advance(ScanPhase::ShortCircuit);
            return Ok(short_circuit(hit, subject));
        }

        progress.advance(ScanPhase::Fetching);
        let homepage = format!("https://{domain}");
        let (https_ok, metadata) = tokio::join!(
            self.web.reachable(&homepage),
            wellknown::discover(&self.web, &domain),
        );

        let toml_parsed = metadata
            .as_ref()
            .and_then(|file| wellknown::parse_metadata(&file.body));
        let slug = toml_parsed
            .as_ref()
            .and_then(wellknown::repository_url)
            .and_then(github::repo_slug);
        let github = match slug {
            Some(slug) => github::repo_info(&self.web, &slug).await,
            None => None,
        };

        let facts = ProjectFacts {
            https_ok,
            metadata_url: metadata.map(|file| file.url),
        };
        let assessment = Assessment::from_findings(&project::findings(&facts));
        progress.advance(ScanPhase::Scored);

        Ok(ScanReport {
            result: assessment.into_result(subject, Utc::now()),
            details: Some(ScanDetails::Project(ProjectDetails {
                domain,
                https_ok: facts.https_ok,
                toml_found: facts.metadata_url.is_some(),
                toml_url: facts.metadata_url,
                toml_parsed,
                github,
                trusted: false,
            })),
            phase: ScanPhase::Scored,
            gate: None,
        })
    }
}

fn short_circuit(hit: GateHit, subject: Subject) -> ScanReport {
    let mut assessment = Assessment::from_findings(&[hit.finding()]);
    assessment.badges = hit.badges();
    ScanReport {
        result: assessment.into_result(subject, Utc::now()),
        details: None,
        phase: ScanPhase::ShortCircuit,
        gate: Some(hit),
    }
}
