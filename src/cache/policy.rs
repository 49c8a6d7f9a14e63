//! Expiry Policy Module
//!
//! Selects how an entry's expiry is computed when the caller does not pass one.

use chrono::{DateTime, TimeDelta, Utc};

// == Expiry Policy ==
/// Expiry policy chosen at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Every write expires `ttl` after it happens. With `refresh_on_access`,
    /// each successful get pushes the expiry out to `ttl` from the lookup.
    Ttl {
        ttl: TimeDelta,
        refresh_on_access: bool,
    },
    /// Callers supply absolute expiries per write; writes without one never expire.
    PerEntry,
}

impl ExpiryPolicy {
    /// Expiry assigned to a write at `now` when none is supplied.
    pub fn expiry_for_add(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpiryPolicy::Ttl { ttl, .. } => Some(offset(now, *ttl)),
            ExpiryPolicy::PerEntry => None,
        }
    }

    /// Expiry assigned to an entry on a successful get at `now`, if it changes.
    pub fn expiry_for_hit(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpiryPolicy::Ttl {
                ttl,
                refresh_on_access: true,
            } => Some(offset(now, *ttl)),
            _ => None,
        }
    }
}

/// `now + ttl`, saturating at the representable range.
fn offset(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(if ttl < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
