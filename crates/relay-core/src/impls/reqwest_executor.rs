//! ReqwestExecutor - 本番用の HttpExecutor
//!
//! # 学習ポイント
//! - 同期の `execute()` から tokio task を detach する（Handle::spawn）
//! - `tracing::Instrument` で dispatch の span を spawn 先に引き継ぐ
//! - 失敗は ExecuteError に分類してログに出すだけ（retry しない）

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{Instrument, Span, debug, warn};

use crate::ports::{ExecuteError, HttpExecutor};

/// Sends each request on a tokio runtime and forgets about it.
///
/// Holds a runtime [`Handle`] rather than relying on an ambient runtime, so
/// `execute` can be called from plain threads as well as from async tasks.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
    runtime: Handle,
}

impl ReqwestExecutor {
    pub fn new(runtime: Handle) -> Self {
        Self::with_client(Client::new(), runtime)
    }

    pub fn with_client(client: Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    /// Executor bound to the runtime of the calling task, if there is one.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, method: &str, url: &str, timeout: Duration) {
        let method = match parse_method(method) {
            Ok(method) => method,
            Err(e) => {
                warn!(url, error = %e, "skipping outbound request");
                return;
            }
        };

        let request = self.client.request(method.clone(), url).timeout(timeout);
        let url = url.to_string();

        self.runtime.spawn(
            async move {
                match send(request, timeout).await {
                    Ok(status) => debug!(%method, %url, %status, "outbound request completed"),
                    Err(e) => warn!(%method, %url, error = %e, "outbound request failed"),
                }
            }
            .instrument(Span::current()),
        );
    }
}

async fn send(request: RequestBuilder, timeout: Duration) -> Result<StatusCode, ExecuteError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ExecuteError::Timeout(timeout)
        } else {
            ExecuteError::Transport(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExecuteError::Status(status.as_u16()));
    }
    Ok(status)
}

/// Methods are matched case-insensitively; rule tables often say `get`.
fn parse_method(raw: &str) -> Result<Method, ExecuteError> {
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ExecuteError::InvalidMethod(raw.to_string()))
}
