//! Resource snapshot cache
//!
//! Holds the last full resource list read from the repository. Reloads swap
//! the whole snapshot, so readers see either the previous list or the new
//! one. Each reload takes a ticket before fetching; a reload that finishes
//! after a later-started one has been installed is discarded.

use atelier_core::models::Resource;
use atelier_core::RepositoryError;
use atelier_db::ResourceRepository;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct Installed {
    resources: Arc<[Resource]>,
    ticket: u64,
}

pub struct ResourceCache {
    current: RwLock<Installed>,
    tickets: AtomicU64,
    generation: AtomicU64,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Installed {
                resources: Arc::from(Vec::new()),
                ticket: 0,
            }),
            tickets: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> Arc<[Resource]> {
        self.current.read().await.resources.clone()
    }

    /// Number of installed reloads. Zero means the cache was never loaded.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub async fn find(&self, id: Uuid) -> Option<Resource> {
        self.snapshot().await.iter().find(|r| r.id == id).cloned()
    }

    /// Fetch the full list and replace the snapshot, unless a reload started
    /// later has already replaced it. On error the previous snapshot is kept.
    ///
    /// Returns the size of the snapshot installed afterwards.
    #[tracing::instrument(skip(self, repo))]
    pub async fn reload(&self, repo: &dyn ResourceRepository) -> Result<usize, RepositoryError> {
        let ticket = self.tickets.fetch_add(1, Ordering::AcqRel) + 1;
        let fresh: Arc<[Resource]> = repo.list().await?.into();

        let mut current = self.current.write().await;
        if ticket < current.ticket {
            tracing::debug!(
                ticket,
                installed = current.ticket,
                "Discarding reload overtaken by a newer one"
            );
            return Ok(current.resources.len());
        }
        let count = fresh.len();
        *current = Installed {
            resources: fresh,
            ticket,
        };
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::debug!(count, generation, "Resource cache reloaded");
        Ok(count)
    }
}
