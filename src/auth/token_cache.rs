//! Bearer token caching for the developer credential chain.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Token lifetime assumed when the credential does not report one we can use.
pub(crate) const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

pub(crate) struct CachedToken {
    token: String,
    refresh_at: Instant,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}

impl CachedToken {
    pub(crate) fn new(token: String, ttl: Duration) -> Self {
        Self {
            token,
            refresh_at: Instant::now() + ttl.saturating_sub(TOKEN_REFRESH_MARGIN),
        }
    }

    pub(crate) fn is_stale(&self) -> bool {
        Instant::now() >= self.refresh_at
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

pub(crate) type TokenCache = RwLock<Option<CachedToken>>;
