//! Registry of tokens rejected before their natural expiry.
//!
//! Logout inserts the presented token here; the authentication gate consults
//! the registry before anything else. The in-memory implementation bounds its
//! growth with a periodic clear-all once a size threshold is exceeded. A
//! cleared token that has not yet expired becomes usable again; that loss is
//! accepted in exchange for a bounded footprint.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Membership set of revoked token strings.
///
/// Held behind `Arc<dyn TokenRevocationRegistry>` so a shared store can
/// replace the in-memory one in a multi-instance deployment.
#[async_trait]
pub trait TokenRevocationRegistry: Send + Sync {
    /// Marks `token` as revoked. Revoking twice is a no-op.
    async fn revoke(&self, token: &str);

    async fn is_revoked(&self, token: &str) -> bool;

    /// Runs the size-bound maintenance. Returns how many entries were dropped.
    async fn compact(&self) -> usize;

    async fn len(&self) -> usize;
}

pub struct InMemoryRevocationRegistry {
    tokens: RwLock<HashSet<String>>,
    max_entries: usize,
}

impl InMemoryRevocationRegistry {
    pub fn new(max_entries: usize) -> Self {
        Self {
            tokens: RwLock::new(HashSet::new()),
            max_entries,
        }
    }
}

#[async_trait]
impl TokenRevocationRegistry for InMemoryRevocationRegistry {
    async fn revoke(&self, token: &str) {
        let mut tokens = self.tokens.write();
        if !tokens.contains(token) {
            tokens.insert(token.to_string());
        }
    }

    async fn is_revoked(&self, token: &str) -> bool {
        self.tokens.read().contains(token)
    }

    async fn compact(&self) -> usize {
        let mut tokens = self.tokens.write();
        if tokens.len() > self.max_entries {
            let evicted = tokens.len();
            tokens.clear();
            evicted
        } else {
            0
        }
    }

    async fn len(&self) -> usize {
        self.tokens.read().len()
    }
}

/// Runs `compact()` on a fixed interval for the life of the process.
pub fn spawn_compaction_task(
    registry: Arc<dyn TokenRevocationRegistry>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = registry.compact().await;
            if evicted > 0 {
                info!(evicted, "Revocation registry exceeded its bound and was cleared");
            } else {
                let size = registry.len().await;
                debug!(size, "Revocation registry within bound");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = InMemoryRevocationRegistry::new(10);

        registry.revoke("token-a").await;
        registry.revoke("token-a").await;

        assert!(registry.is_revoked("token-a").await);
        assert!(!registry.is_revoked("token-b").await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_compact_leaves_small_registry_alone() {
        let registry = InMemoryRevocationRegistry::new(3);
        for i in 0..3 {
            registry.revoke(&format!("token-{i}")).await;
        }

        assert_eq!(registry.compact().await, 0);
        assert!(registry.is_revoked("token-0").await);
    }

    #[tokio::test]
    async fn test_compact_clears_everything_past_threshold() {
        let registry = InMemoryRevocationRegistry::new(3);
        for i in 0..4 {
            registry.revoke(&format!("token-{i}")).await;
        }

        assert_eq!(registry.compact().await, 4);
        assert_eq!(registry.len().await, 0);
        assert!(!registry.is_revoked("token-3").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_revocations_are_all_recorded() {
        let registry: Arc<dyn TokenRevocationRegistry> =
            Arc::new(InMemoryRevocationRegistry::new(10_000));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for i in 0..100 {
                        let token = format!("w{worker}-t{i}");
                        registry.revoke(&token).await;
                        assert!(registry.is_revoked(&token).await);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len().await, 800);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compaction_task_runs_on_interval() {
        let registry = Arc::new(InMemoryRevocationRegistry::new(1));
        registry.revoke("a").await;
        registry.revoke("b").await;

        let handle = spawn_compaction_task(registry.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(registry.len().await, 0);
        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_compaction_task_keeps_registry_within_bound() {
        let registry = Arc::new(InMemoryRevocationRegistry::new(10));
        registry.revoke("a").await;
        registry.revoke("b").await;

        let handle = spawn_compaction_task(registry.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        assert_eq!(registry.len().await, 2);
        assert!(registry.is_revoked("a").await);
        handle.abort();
    }
}
