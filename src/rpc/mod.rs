pub mod parse;
pub mod web;

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::core::{AccountLookup, TxRef};
use crate::error::{LedgerError, RpcError};

/// Read access to the ledger, as the scanner needs it.
pub trait Ledger {
    async fn account_info(&self, address: &str) -> Result<AccountLookup, LedgerError>;

    /// Oldest transactions touching `address`, oldest first.
    async fn earliest_transactions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<TxRef>, LedgerError>;

    /// Close time of a validated ledger, in unix seconds.
    async fn ledger_close_time(&self, ledger_index: u32) -> Result<i64, LedgerError>;
}

/// XRP Ledger JSON-RPC client over an ordered list of public endpoints.
///
/// Endpoints are tried one at a time in order; the first that yields a valid
/// answer wins.
pub struct XrplRpc {
    endpoints: Vec<String>,
    client: Client,
    timeout: Duration,
}

/// HTTP client shared by the ledger client and the web client of one scanner.
pub fn build_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(user_agent).build()
}

impl XrplRpc {
    pub fn with_client(client: Client, endpoints: Vec<String>, timeout: Duration) -> Self {
        Self {
            endpoints,
            client,
            timeout,
        }
    }

    /// One attempt against one endpoint, bounded by the per-call timeout.
    async fn call_once(&self, url: &str, method: &str, params: &Value) -> Result<Value, RpcError> {
        let body = json!({
            "method": method,
            "params": [params],
        });

        tokio::time::timeout(self.timeout, self.post(url, &body))
            .await
            .map_err(|_| RpcError::Timeout(self.timeout))?
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, RpcError> {
        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| RpcError::Payload(format!("invalid JSON: {e}")))?;
        parse::unwrap_envelope(json)
    }

    /// Run `method` against each endpoint in turn until one returns a payload that
    /// `parse` accepts.
    pub async fn call<T>(
        &self,
        method: &str,
        params: Value,
        parse: impl Fn(Value) -> Result<T, RpcError>,
    ) -> Result<T, LedgerError> {
        let mut last = None;

        for (attempt, endpoint) in self.endpoints.iter().enumerate() {
            let outcome = self
                .call_once(endpoint, method, &params)
                .await
                .and_then(&parse);

            match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        info!("{method} succeeded via {endpoint} after {attempt} failed endpoint(s)");
                    } else {
                        debug!("{method} succeeded via {endpoint}");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_definitive() => {
                    return Err(LedgerError::Rejected {
                        method: method.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("{method} failed via {endpoint}: {e}");
                    last = Some(e);
                }
            }
        }

        match last {
            Some(last) => Err(LedgerError::Exhausted {
                method: method.to_string(),
                attempts: self.endpoints.len(),
                last,
            }),
            None => Err(LedgerError::NoEndpoints),
        }
    }
}

impl Ledger for XrplRpc {
    async fn account_info(&self, address: &str) -> Result<AccountLookup, LedgerError> {
        let params = json!({
            "account": address,
            "ledger_index": "validated",
            "strict": true,
        });
        self.call("account_info", params, parse::account_info).await
    }

    async fn earliest_transactions(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<TxRef>, LedgerError> {
        let params = json!({
            "account": address,
            "ledger_index_min": -1,
            "ledger_index_max": -1,
            "forward": true,
            "limit": limit,
        });
        self.call("account_tx", params, parse::account_tx).await
    }

    async fn ledger_close_time(&self, ledger_index: u32) -> Result<i64, LedgerError> {
        let params = json!({
            "ledger_index": ledger_index,
            "transactions": false,
            "expand": false,
        });
        self.call("ledger", params, parse::ledger_close_time).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const ADDR: &str = "rEb8TK3gBgk5auZkwc6sHnwrGVJH8DuaLh";

    /// Serve `body` with `status` to every connection. Returns the base URL.
    async fn stub(status: u16, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    /// Accept connections and never answer.
    async fn silent() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    /// An address nothing listens on.
    async fn closed() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let Ok(n) = socket.read(&mut chunk).await else {
                return;
            };
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn client(endpoints: Vec<String>) -> XrplRpc {
        XrplRpc::with_client(Client::new(), endpoints, Duration::from_millis(500))
    }

    const FOUND: &str = r#"{"result":{"account_data":{"Account":"rEb8TK3gBgk5auZkwc6sHnwrGVJH8DuaLh","Flags":0,"OwnerCount":1},"status":"success"}}"#;
    const NOT_FOUND: &str = r#"{"result":{"error":"actNotFound","status":"error"}}"#;
    const BUSY: &str = r#"{"result":{"error":"tooBusy","status":"error"}}"#;

    #[tokio::test]
    async fn falls_back_to_next_endpoint() {
        let rpc = client(vec![closed().await, stub(503, "{}").await, stub(200, FOUND).await]);
        let lookup = rpc.account_info(ADDR).await.unwrap();
        assert!(matches!(lookup, AccountLookup::Found(ref root) if root.owner_count == 1));
    }

    #[tokio::test]
    async fn rpc_level_error_tries_next_endpoint() {
        let rpc = client(vec![stub(200, BUSY).await, stub(200, NOT_FOUND).await]);
        assert_eq!(rpc.account_info(ADDR).await.unwrap(), AccountLookup::NotFound);
    }

    #[tokio::test]
    async fn not_found_is_an_answer_not_a_failure() {
        // The second endpoint would say Found; it must never be asked.
        let rpc = client(vec![stub(200, NOT_FOUND).await, stub(200, FOUND).await]);
        assert_eq!(rpc.account_info(ADDR).await.unwrap(), AccountLookup::NotFound);
    }

    #[tokio::test]
    async fn malformed_payload_tries_next_endpoint() {
        let rpc = client(vec![stub(200, "not json").await, stub(200, FOUND).await]);
        assert!(matches!(rpc.account_info(ADDR).await, Ok(AccountLookup::Found(_))));
    }

    #[tokio::test]
    async fn all_endpoints_timing_out_is_exhausted() {
        let rpc = client(vec![silent().await, silent().await]);
        match rpc.account_info(ADDR).await {
            Err(LedgerError::Exhausted { method, attempts, last }) => {
                assert_eq!(method, "account_info");
                assert_eq!(attempts, 2);
                assert!(matches!(last, RpcError::Timeout(_)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_account_stops_immediately() {
        let malformed = r#"{"result":{"error":"actMalformed","status":"error"}}"#;
        let rpc = client(vec![stub(200, malformed).await, stub(200, FOUND).await]);
        assert!(matches!(
            rpc.account_info(ADDR).await,
            Err(LedgerError::Rejected { source: RpcError::AccountMalformed, .. })
        ));
    }

    #[tokio::test]
    async fn no_endpoints() {
        let rpc = client(vec![]);
        assert!(matches!(rpc.account_info(ADDR).await, Err(LedgerError::NoEndpoints)));
    }

    #[tokio::test]
    async fn ledger_close_time_round_trip() {
        let body = r#"{"result":{"ledger":{"close_time":100},"status":"success"}}"#;
        let rpc = client(vec![stub(200, body).await]);
        assert_eq!(
            rpc.ledger_close_time(5).await.unwrap(),
            100 + parse::LEDGER_EPOCH_OFFSET
        );
    }
}
