//! Revoked-credential tracking.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// Set of credentials explicitly invalidated before their natural expiry.
///
/// Each entry carries the credential's own expiry; once that passes the
/// token is dead regardless, so the entry is evicted on the next write or
/// lookup. This bounds the set by the number of live revoked tokens.
///
/// Shared read/write across all request handlers; every authenticated
/// request must consult [`RevocationSet::is_revoked`] before trusting an
/// otherwise-valid credential.
#[derive(Debug, Default)]
pub struct RevocationSet {
    inner: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl RevocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a credential revoked until `expires_at` (its natural expiry).
    pub fn revoke(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        if let Ok(mut inner) = self.inner.write() {
            let now = Utc::now();
            inner.retain(|_, exp| *exp > now);
            inner.insert(token.into(), expires_at);
        }
    }

    /// Whether this credential has been revoked.
    ///
    /// Entries past their expiry do not count and are dropped. A poisoned
    /// lock fails closed: the credential is treated as revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        let now = Utc::now();

        let has_stale = match self.inner.read() {
            Ok(inner) => match inner.get(token) {
                Some(exp) if *exp > now => return true,
                Some(_) => true,
                None => false,
            },
            Err(_) => return true,
        };

        if has_stale {
            if let Ok(mut inner) = self.inner.write() {
                inner.retain(|_, exp| *exp > now);
            }
        }
        false
    }

    /// Number of live entries (pruning happens on the mutating paths).
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
