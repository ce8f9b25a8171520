//! Per-user attack cooldowns.

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_attack: HashMap<UserId, DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `user` may attack at `now`.
    pub fn is_ready(&self, user: &UserId, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.remaining(user, now, threshold).is_none()
    }

    /// How long `user` still has to wait, or `None` if they can attack now.
    ///
    /// A timestamp in the future (clock stepped backwards) counts as
    /// "just attacked" and waits out the full threshold.
    pub fn remaining(&self, user: &UserId, now: DateTime<Utc>, threshold: Duration) -> Option<Duration> {
        let last = self.last_attack.get(user)?;
        let elapsed = (now - *last).to_std().unwrap_or(Duration::ZERO);
        threshold.checked_sub(elapsed).filter(|left| !left.is_zero())
    }

    pub fn record(&mut self, user: &UserId, now: DateTime<Utc>) {
        self.last_attack.insert(user.clone(), now);
    }

    pub fn last_attack(&self, user: &UserId) -> Option<DateTime<Utc>> {
        self.last_attack.get(user).copied()
    }
}
