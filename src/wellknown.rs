//! Discovery of a domain's well-known ledger metadata (`xrp.toml`).

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::DomainEvidence;
use crate::core::address::{clean_domain, is_valid_domain};
use crate::rpc::web::WebProbe;

/// Files checked when verifying a wallet's claimed domain.
pub const WALLET_FILES: &[&str] = &["xrp.toml"];

/// Files checked when scanning a project domain.
pub const PROJECT_FILES: &[&str] = &["xrp.toml", "xrp-ledger.toml"];

/// HTTPS candidate URLs, bare host before `www.` host, per file.
pub fn candidate_urls(domain: &str, files: &[&str]) -> Vec<String> {
    let host = clean_domain(domain);
    let mut hosts = vec![host.clone()];
    if !host.starts_with("www.") {
        hosts.push(format!("www.{host}"));
    }

    files
        .iter()
        .flat_map(|file| {
            hosts
                .iter()
                .map(move |h| format!("https://{h}/.well-known/{file}"))
        })
        .collect()
}

/// Fetch the domain's `xrp.toml` and look for `address` in it.
///
/// The first candidate answering with a success status decides the outcome. A
/// fetch failure only means "not found"; it is never evidence against the address.
pub async fn check_address<P: WebProbe>(web: &P, domain: &str, address: &str) -> DomainEvidence {
    let domain = clean_domain(domain);
    if !is_valid_domain(&domain) {
        debug!("claimed domain {domain:?} is not a hostname, skipping metadata fetch");
        return DomainEvidence {
            domain,
            metadata_found: false,
            address_listed: false,
            metadata_url: None,
        };
    }

    for url in candidate_urls(&domain, WALLET_FILES) {
        match web.fetch(&url).await {
            Ok(reply) if reply.is_success() => {
                let address_listed = reply.body.contains(address);
                debug!("{url} found, address listed: {address_listed}");
                return DomainEvidence {
                    domain,
                    metadata_found: true,
                    address_listed,
                    metadata_url: Some(url),
                };
            }
            Ok(reply) => debug!("{url} returned {}", reply.status),
            Err(e) => debug!("{url} failed: {e}"),
        }
    }

    DomainEvidence {
        domain,
        metadata_found: false,
        address_listed: false,
        metadata_url: None,
    }
}

/// A metadata file that answered with a success status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFile {
    pub url: String,
    pub body: String,
}

/// First project metadata candidate that answers, with its body.
pub async fn discover<P: WebProbe>(web: &P, domain: &str) -> Option<MetadataFile> {
    for url in candidate_urls(domain, PROJECT_FILES) {
        match web.fetch(&url).await {
            Ok(reply) if reply.is_success() => {
                return Some(MetadataFile {
                    url,
                    body: reply.body,
                });
            }
            Ok(reply) => debug!("{url} returned {}", reply.status),
            Err(e) => debug!("{url} failed: {e}"),
        }
    }
    None
}

/// Flatten a metadata file into `dotted.key -> value` pairs.
///
/// Array elements are keyed by index (`ACCOUNTS.0.address`). Returns `None` when
/// the body is not valid TOML.
pub fn parse_metadata(body: &str) -> Option<BTreeMap<String, String>> {
    let table: toml::Table = match body.parse() {
        Ok(t) => t,
        Err(e) => {
            debug!("metadata is not valid TOML: {e}");
            return None;
        }
    };
    let mut out = BTreeMap::new();
    for (key, value) in &table {
        flatten(key.clone(), value, &mut out);
    }
    Some(out)
}

fn flatten(key: String, value: &toml::Value, out: &mut BTreeMap<String, String>) {
    match value {
        toml::Value::Table(t) => {
            for (k, v) in t {
                flatten(format!("{key}.{k}"), v, out);
            }
        }
        toml::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(format!("{key}.{i}"), v, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(key, s.clone());
        }
        other => {
            out.insert(key, other.to_string());
        }
    }
}

const REPOSITORY_KEYS: &[&str] = &["Repository", "repo", "repository"];

/// A GitHub repository URL declared anywhere in the metadata.
pub fn repository_url(parsed: &BTreeMap<String, String>) -> Option<&str> {
    REPOSITORY_KEYS.iter().find_map(|wanted| {
        parsed.iter().find_map(|(key, value)| {
            let leaf = key.rsplit('.').next().unwrap_or(key);
            (leaf == *wanted && value.contains("github.com")).then_some(value.as_str())
        })
    })
}
