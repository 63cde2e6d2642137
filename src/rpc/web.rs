use std::time::Duration;

use reqwest::{Client, Method};
use tracing::debug;

use crate::error::FetchError;

const ACCEPT: &str = "text/plain,*/*";

/// Status and body of a completed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Plain HTTP(S) access used for well-known files and reachability checks.
pub trait WebProbe {
    /// GET `url` and read the whole body.
    async fn fetch(&self, url: &str) -> Result<HttpReply, FetchError>;

    /// Whether `url` answers with a success status. Never fails.
    async fn reachable(&self, url: &str) -> bool;
}

pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn send(&self, method: Method, url: &str) -> Result<HttpReply, FetchError> {
        let request = async {
            let resp = self
                .client
                .request(method.clone(), url)
                .header("Accept", ACCEPT)
                .send()
                .await?;
            let status = resp.status().as_u16();
            let body = if method == Method::HEAD {
                String::new()
            } else {
                resp.text().await?
            };
            Ok::<_, FetchError>(HttpReply { status, body })
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }
}

impl WebProbe for HttpProbe {
    async fn fetch(&self, url: &str) -> Result<HttpReply, FetchError> {
        self.send(Method::GET, url).await
    }

    async fn reachable(&self, url: &str) -> bool {
        match self.send(Method::HEAD, url).await {
            Ok(reply) if reply.is_success() => return true,
            Ok(reply) => debug!("HEAD {url} returned {}, retrying with GET", reply.status),
            Err(e) => debug!("HEAD {url} failed: {e}, retrying with GET"),
        }
        match self.send(Method::GET, url).await {
            Ok(reply) => reply.is_success(),
            Err(e) => {
                debug!("GET {url} failed: {e}");
                false
            }
        }
    }
}
