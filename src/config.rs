use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `ledger.endpoints` (comma separated).
pub const ENDPOINTS_ENV: &str = "XRPL_RPC_ENDPOINTS";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub http: HttpConfig,
    pub lists: ListConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoints, tried in order.
    pub endpoints: Vec<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListConfig {
    pub trusted_wallets: Vec<String>,
    pub blocked_wallets: Vec<String>,
    /// Ecosystem domains that short-circuit a project scan to green.
    pub trusted_domains: Vec<String>,
    pub blocked_domains: Vec<String>,
    /// Reference domains for the lookalike check.
    pub known_domains: Vec<String>,
}

const ECOSYSTEM_DOMAINS: &[&str] = &[
    "xrpl.org",
    "xrplf.org",
    "ripple.com",
    "xumm.app",
    "bithomp.com",
    "gatehub.net",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoints: strings(&[
                "https://xrplcluster.com",
                "https://s1.ripple.com:51234",
                "https://rippled.xrpscan.com",
            ]),
            timeout_ms: 15_000,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "XRglass/1.0 (+https://xrglass.vercel.app)".into(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            // Ripple donation wallet
            trusted_wallets: strings(&["rEb8TK3gBgk5auZkwc6sHnwrGVJH8DuaLh"]),
            blocked_wallets: Vec::new(),
            trusted_domains: strings(ECOSYSTEM_DOMAINS),
            blocked_domains: Vec::new(),
            known_domains: strings(ECOSYSTEM_DOMAINS),
        }
    }
}

impl LedgerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Split a comma-separated endpoint list, dropping blanks.
pub fn parse_endpoints(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Apply the endpoint override from [`ENDPOINTS_ENV`], if set.
    pub fn with_env(self) -> Self {
        let value = std::env::var(ENDPOINTS_ENV).ok();
        self.with_endpoint_override(value.as_deref())
    }

    pub fn with_endpoint_override(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            let endpoints = parse_endpoints(value);
            if endpoints.is_empty() {
                tracing::warn!("{ENDPOINTS_ENV} is set but lists no endpoints, ignoring");
            } else {
                tracing::info!("Using {} ledger endpoint(s) from {ENDPOINTS_ENV}", endpoints.len());
                self.ledger.endpoints = endpoints;
            }
        }
        self
    }
}
