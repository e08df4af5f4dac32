//! The vision-model seam: client trait, cancellation and error classes.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Notify;

/// Coarse class of a failed vision request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportErrorKind {
    InvalidKey,
    RateLimited,
    Network,
    Timeout,
    Unknown,
    Cancelled,
}

impl TransportErrorKind {
    /// Short localized message shown to the user instead of raw error text.
    pub fn user_message(self) -> &'static str {
        match self {
            TransportErrorKind::InvalidKey => "API Key 无效或已过期，请检查设置",
            TransportErrorKind::RateLimited => "请求过于频繁，请稍后再试",
            TransportErrorKind::Network => "网络连接失败，请检查网络设置",
            TransportErrorKind::Timeout => "AI 识别超时，请稍后重试",
            TransportErrorKind::Unknown => "AI 识别失败，请稍后重试",
            TransportErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Maps a raw client error message to a [`TransportErrorKind`].
///
/// Checked in order: credentials, rate limiting, timeout, network. The
/// word "rate" only counts as a whole token so that e.g. "generate" does
/// not look like throttling.
pub fn classify_error(message: &str) -> TransportErrorKind {
    let lower = message.to_lowercase();

    if lower.contains("401")
        || lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("unauthorized")
        || lower.contains("invalid key")
    {
        return TransportErrorKind::InvalidKey;
    }

    let rate_token = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "rate" || word.starts_with("ratelimit"));
    if lower.contains("429") || lower.contains("too many requests") || rate_token {
        return TransportErrorKind::RateLimited;
    }

    if lower.contains("timeout") || lower.contains("timed out") {
        return TransportErrorKind::Timeout;
    }

    if lower.contains("network")
        || lower.contains("failed to fetch")
        || lower.contains("connection")
        || lower.contains("dns")
    {
        return TransportErrorKind::Network;
    }

    TransportErrorKind::Unknown
}

/// Error text reported by a [`VisionClient`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ClientError(pub String);

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One request to the vision model.
#[derive(Clone, Debug)]
pub struct VisionRequest {
    /// Encoded image, already within the configured size cap.
    pub image: Vec<u8>,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

/// A vision model that answers an image plus prompt with free text.
///
/// Implementations own the HTTP/SDK details; the adapter only needs the
/// response body or an error message it can classify.
pub trait VisionClient {
    fn analyze(
        &self,
        request: VisionRequest,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation flag shared between a caller and a request.
///
/// Clones observe the same state. Cancelling is idempotent.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // register before checking the flag so a concurrent cancel is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// True if both handles share the same state.
    pub fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
