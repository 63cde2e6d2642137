use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

const TRUSTED: &str = "rEb8TK3gBgk5auZkwc6sHnwrGVJH8DuaLh";

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("xrglass");
    cmd.env_remove("XRPL_RPC_ENDPOINTS")
        .args(["--config", "no-such-xrglass.toml"]);
    cmd
}

#[test]
fn help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("wallet"))
        .stdout(contains("lookalike"));
}

#[test]
fn invalid_address_exits_2() {
    cmd()
        .args(["wallet", "not-an-address"])
        .assert()
        .code(2)
        .stderr(contains("invalid_address"));
}

#[test]
fn invalid_address_json_envelope() {
    cmd()
        .args(["--json", "wallet", "0xdeadbeef"])
        .assert()
        .code(2)
        .stdout(contains("\"status\": \"error\""))
        .stdout(contains("\"retryable\": false"));
}

#[test]
fn allowlisted_wallet_is_green_offline() {
    cmd()
        .args(["--json", "wallet", TRUSTED])
        .assert()
        .success()
        .stdout(contains("\"verdict\": \"green\""))
        .stdout(contains("Trusted allowlist wallet"))
        .stdout(contains("disclaimer"));
}

#[test]
fn allowlisted_wallet_text_summary() {
    cmd()
        .args(["wallet", TRUSTED])
        .assert()
        .success()
        .stdout(contains("GREEN wallet"))
        .stdout(contains("Badges: Trusted wallet, Allowlist match"));
}

#[test]
fn ecosystem_domain_is_green() {
    cmd()
        .args(["--json", "domain", "https://www.xrpl.org/"])
        .assert()
        .success()
        .stdout(contains("\"verdict\": \"green\""))
        .stdout(contains("Verified ecosystem domain (allowlist)"));
}

#[test]
fn invalid_domain_exits_2() {
    cmd()
        .args(["domain", "not a domain"])
        .assert()
        .code(2)
        .stderr(contains("invalid_domain"));
}

#[test]
fn empty_endpoint_list_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("xrglass.toml");
    std::fs::write(&path, "[ledger]\nendpoints = []\n").unwrap();

    let mut cmd = cargo_bin_cmd!("xrglass");
    cmd.env_remove("XRPL_RPC_ENDPOINTS")
        .arg("--config")
        .arg(&path)
        .args(["--json", "wallet", "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"])
        .assert()
        .code(3)
        .stdout(contains("service_unavailable"))
        .stdout(contains("\"retryable\": true"));
}

#[test]
fn blocked_wallet_from_config_is_red() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("xrglass.toml");
    std::fs::write(
        &path,
        "[lists]\nblocked_wallets = [\"rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh\"]\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("xrglass");
    cmd.env_remove("XRPL_RPC_ENDPOINTS")
        .arg("--config")
        .arg(&path)
        .args(["--json", "wallet", "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"])
        .assert()
        .success()
        .stdout(contains("\"verdict\": \"red\""))
        .stdout(contains("Denylist match"));
}
