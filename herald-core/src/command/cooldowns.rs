//! Per-scope cooldown tables with timed expiry.
//!
//! Each scope (user, channel, guild) owns an independent table and its own
//! expiry worker, so a burst of expiries in one scope cannot delay another.
//! The table maps scope key to the expiry instant; the worker drains a
//! [`DelayQueue`] and removes entries as they lapse. An entry whose timer
//! has lapsed but which the worker has not swept yet counts as free.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::time::DelayQueue;
use tracing::trace;

use super::CooldownScope;

struct ScopeTable {
    entries: Arc<DashMap<u64, Instant>>,
    schedule: mpsc::UnboundedSender<(u64, Duration)>,
}

impl ScopeTable {
    /// Must be constructed inside a tokio runtime: spawns the expiry worker.
    /// The worker exits when the table (and with it the sender) is dropped.
    fn new(scope: CooldownScope) -> Self {
        let entries: Arc<DashMap<u64, Instant>> = Arc::new(DashMap::new());
        let (schedule, mut pending) = mpsc::unbounded_channel::<(u64, Duration)>();

        let worker_entries = entries.clone();
        tokio::spawn(async move {
            let mut expiries = DelayQueue::new();

            loop {
                tokio::select! {
                    scheduled = pending.recv() => match scheduled {
                        Some((key, duration)) => {
                            expiries.insert(key, duration);
                        },
                        None => break,
                    },
                    Some(expired) = expiries.next() => {
                        let key = expired.into_inner();
                        // Only sweep the entry if it has actually lapsed: a
                        // reacquire may have replaced it with a live expiry
                        // after our timer fired.
                        worker_entries.remove_if(&key, |_, expiry| *expiry <= Instant::now());
                        trace!("{scope} cooldown expired for key {key}");
                    },
                }
            }
        });

        Self { entries, schedule }
    }

    fn try_acquire(&self, key: u64, duration: Duration) -> Result<(), Duration> {
        let expiry = Instant::now() + duration;

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let remaining = occupied.get().saturating_duration_since(Instant::now());
                if !remaining.is_zero() {
                    return Err(remaining);
                }
                occupied.insert(expiry);
            },
            Entry::Vacant(vacant) => {
                vacant.insert(expiry);
            },
        }

        // worker gone means the manager is shutting down; nothing to sweep
        let _ = self.schedule.send((key, duration));
        Ok(())
    }

    fn is_active(&self, key: u64) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|expiry| !expiry.saturating_duration_since(Instant::now()).is_zero())
    }
}

/// All cooldown state for one router instance. Constructed once at startup
/// and passed by handle; tests can instantiate isolated managers.
pub struct CooldownManager {
    user: ScopeTable,
    channel: ScopeTable,
    guild: ScopeTable,
}

impl CooldownManager {
    /// Must be called inside a tokio runtime (spawns one worker per scope).
    pub fn new() -> Self {
        Self {
            user: ScopeTable::new(CooldownScope::User),
            channel: ScopeTable::new(CooldownScope::Channel),
            guild: ScopeTable::new(CooldownScope::Guild),
        }
    }

    fn table(&self, scope: CooldownScope) -> &ScopeTable {
        match scope {
            CooldownScope::User => &self.user,
            CooldownScope::Channel => &self.channel,
            CooldownScope::Guild => &self.guild,
        }
    }

    /// Tries to start a cooldown for `(scope, key)`.
    ///
    /// Fails with the remaining delay if one is already active, leaving
    /// state untouched. On success the entry exists before this returns, so
    /// a concurrent dispatch for the same key cannot also acquire it.
    pub fn try_acquire(
        &self,
        scope: CooldownScope,
        key: u64,
        duration: Duration,
    ) -> Result<(), Duration> {
        self.table(scope).try_acquire(key, duration)
    }

    pub fn is_active(&self, scope: CooldownScope, key: u64) -> bool {
        self.table(scope).is_active(key)
    }
}

impl Default for CooldownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_acquire_reports_remaining() {
        let cooldowns = CooldownManager::new();

        assert!(cooldowns
            .try_acquire(CooldownScope::User, 1, Duration::from_secs(10))
            .is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;

        let remaining = cooldowns
            .try_acquire(CooldownScope::User, 1, Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(remaining, Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_and_is_reacquirable() {
        let cooldowns = CooldownManager::new();

        assert!(cooldowns
            .try_acquire(CooldownScope::Channel, 7, Duration::from_secs(1))
            .is_ok());
        assert!(cooldowns.is_active(CooldownScope::Channel, 7));

        tokio::time::advance(Duration::from_secs(2)).await;
        // let the expiry worker run its sweep
        tokio::task::yield_now().await;

        assert!(!cooldowns.is_active(CooldownScope::Channel, 7));
        assert!(cooldowns
            .try_acquire(CooldownScope::Channel, 7, Duration::from_secs(1))
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn scopes_are_independent() {
        let cooldowns = CooldownManager::new();

        assert!(cooldowns
            .try_acquire(CooldownScope::User, 42, Duration::from_secs(10))
            .is_ok());
        assert!(cooldowns
            .try_acquire(CooldownScope::Guild, 42, Duration::from_secs(10))
            .is_ok());
        assert!(cooldowns
            .try_acquire(CooldownScope::Channel, 42, Duration::from_secs(10))
            .is_ok());
    }

    #[tokio::test]
    async fn concurrent_acquires_are_mutually_exclusive() {
        let cooldowns = Arc::new(CooldownManager::new());

        let mut handles = Vec::new();
        for _ in 0..2 {
            let cooldowns = cooldowns.clone();
            handles.push(tokio::spawn(async move {
                cooldowns.try_acquire(CooldownScope::User, 99, Duration::from_secs(10))
            }));
        }

        let mut successes = 0;
        let mut failures = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(remaining) => {
                    assert!(remaining <= Duration::from_secs(10));
                    assert!(remaining > Duration::from_secs(9));
                    failures += 1;
                },
            }
        }

        assert_eq!((successes, failures), (1, 1));
    }
}
