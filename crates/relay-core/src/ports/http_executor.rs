//! HttpExecutor port - outbound HTTP の実行
//!
//! Dispatcher から見ると fire-and-forget です。結果（成功・HTTP エラー・timeout）は
//! executor 側で扱い、dispatcher には返しません。
//!
//! # 実装
//! - `ReqwestExecutor`: 本番用（tokio task に detach）
//! - `RecordingExecutor`: 開発・テスト用（呼び出しを記録するだけ）

use std::time::Duration;

/// HttpExecutor performs a bodiless request to a pre-built URL.
///
/// `execute` must not block on the network: implementations hand the request
/// off and return immediately.
pub trait HttpExecutor: Send + Sync {
    fn execute(&self, method: &str, url: &str, timeout: Duration);
}

/// Failure of an outbound call, as seen by an executor.
///
/// Never reaches the dispatcher; executors log it.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("unsupported http method '{0}'")]
    InvalidMethod(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}
