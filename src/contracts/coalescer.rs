//! Single-flight coalescing of remote fetches.
//!
//! Guarantees at most one in-flight fetch per key across concurrent
//! callers. The first caller for a key becomes the leader and runs the
//! fetch; latecomers suspend on the key's wait-list and are woken when the
//! leader finishes, successfully or not. A waiter must then re-read the
//! cache instead of re-invoking the fetch.

use std::{
    collections::{HashMap, hash_map::Entry},
    future::Future,
    sync::Mutex,
};

use tokio::sync::broadcast;

/// Outcome of a coalesced fetch.
#[derive(Debug)]
pub enum CoalesceOutcome<T> {
    /// This caller was the leader and ran the fetch.
    Fetched(T),
    /// Another caller was already fetching this key; re-read the cache.
    Waited,
}

/// Deduplicates concurrent fetches for the same key.
///
/// The fetch closure must complete its cache write before returning, since
/// waiters re-read the cache as soon as the key is released.
#[derive(Debug, Default)]
pub struct FetchCoalescer {
    in_flight: Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl FetchCoalescer {
    /// Creates a coalescer with no keys in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` for `key` unless a fetch for the same key is already in
    /// flight, in which case the caller waits for it instead.
    ///
    /// The key is released on every exit path, including a dropped leader,
    /// so a failed fetch never leaves the key poisoned.
    pub async fn coalesce<T, F, Fut>(&self, key: &str, fetch: F) -> CoalesceOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let waiter = {
            let mut in_flight = self.in_flight.lock().expect("coalescer lock poisoned");
            match in_flight.entry(key.to_string()) {
                Entry::Occupied(entry) => Some(entry.get().subscribe()),
                Entry::Vacant(entry) => {
                    let (sender, _) = broadcast::channel(1);
                    entry.insert(sender);
                    None
                }
            }
        };

        match waiter {
            Some(mut receiver) => {
                // A value and a closed channel both mean the leader is done.
                let _ = receiver.recv().await;
                CoalesceOutcome::Waited
            }
            None => {
                let _release = ReleaseGuard { key, in_flight: &self.in_flight };
                CoalesceOutcome::Fetched(fetch().await)
            }
        }
    }

    /// Number of keys currently being fetched.
    #[cfg(test)]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().expect("coalescer lock poisoned").len()
    }
}

/// Releases the key and wakes all waiters when the leader finishes,
/// including when the leader's future is dropped mid-fetch.
struct ReleaseGuard<'a> {
    key: &'a str,
    in_flight: &'a Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(sender) = in_flight.remove(self.key) {
                let _ = sender.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn test_single_caller_fetches() {
        let coalescer = FetchCoalescer::new();
        let outcome = coalescer.coalesce("key", || async { 42 }).await;

        assert!(matches!(outcome, CoalesceOutcome::Fetched(42)));
        assert_eq!(coalescer.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_fetch_once() {
        let coalescer = Arc::new(FetchCoalescer::new());
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let coalescer = Arc::clone(&coalescer);
            let fetches = Arc::clone(&fetches);
            tasks.push(tokio::spawn(async move {
                coalescer
                    .coalesce("key", || async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    })
                    .await
            }));
        }

        let outcomes = futures::future::join_all(tasks).await;
        let leaders = outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap())
            .filter(|outcome| matches!(outcome, CoalesceOutcome::Fetched(())))
            .count();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(leaders, 1);
        assert_eq!(coalescer.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let coalescer = Arc::new(FetchCoalescer::new());
        let fetches = Arc::new(AtomicUsize::new(0));

        let a = coalescer.coalesce("a", || async {
            fetches.fetch_add(1, Ordering::SeqCst);
        });
        let b = coalescer.coalesce("b", || async {
            fetches.fetch_add(1, Ordering::SeqCst);
        });
        let (a, b) = tokio::join!(a, b);

        assert!(matches!(a, CoalesceOutcome::Fetched(())));
        assert!(matches!(b, CoalesceOutcome::Fetched(())));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_releases_key() {
        let coalescer = FetchCoalescer::new();

        let outcome: CoalesceOutcome<Option<u64>> =
            coalescer.coalesce("key", || async { None }).await;
        assert!(matches!(outcome, CoalesceOutcome::Fetched(None)));
        assert_eq!(coalescer.in_flight_count(), 0);

        // The next caller retries independently.
        let outcome = coalescer.coalesce("key", || async { Some(7) }).await;
        assert!(matches!(outcome, CoalesceOutcome::Fetched(Some(7))));
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_key() {
        let coalescer = Arc::new(FetchCoalescer::new());

        {
            let coalescer = Arc::clone(&coalescer);
            let leader = tokio::spawn(async move {
                coalescer
                    .coalesce("key", || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    })
                    .await
            });
            tokio::time::sleep(Duration::from_millis(20)).await;
            leader.abort();
            let _ = leader.await;
        }

        assert_eq!(coalescer.in_flight_count(), 0);
    }
}
