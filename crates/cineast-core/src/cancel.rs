//! Supersedable request tokens.
//!
//! Each flow kind owns a [`RequestSlot`]. Starting a flow hands out a fresh
//! token and cancels the one handed out before it, so a slow stale response
//! can never land after a newer one.

use std::future::Future;
use std::sync::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("request was superseded or cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
pub struct RequestSlot {
    parent: Option<CancellationToken>,
    current: Mutex<Option<CancellationToken>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens from this slot are also cancelled when `parent` is (e.g. on Ctrl-C)
    pub fn with_parent(parent: CancellationToken) -> Self {
        Self {
            parent: Some(parent),
            current: Mutex::new(None),
        }
    }

    /// Cancel the in-flight request, if any, and hand out a token for the next one
    pub fn begin(&self) -> CancellationToken {
        let token = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(token.clone()) {
            if !previous.is_cancelled() {
                debug!("Superseding in-flight request");
                previous.cancel();
            }
        }
        token
    }

    pub fn cancel(&self) {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = current.as_ref() {
            token.cancel();
        }
    }
}

/// Run `fut` unless `cancel` fires first
pub async fn guarded<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, Cancelled>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Cancelled),
        value = fut => Ok(value),
    }
}
