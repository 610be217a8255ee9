use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Usage metrics for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub folders_created: Arc<AtomicUsize>,
    pub folders_deleted: Arc<AtomicUsize>,
    pub folders_moved: Arc<AtomicUsize>,
    pub folders_cloned: Arc<AtomicUsize>,
    pub items_created: Arc<AtomicUsize>,
    pub items_deleted: Arc<AtomicUsize>,
    pub items_cloned: Arc<AtomicUsize>,
    pub images_created: Arc<AtomicUsize>,
    pub images_deleted: Arc<AtomicUsize>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            folders_created: Arc::new(AtomicUsize::new(0)),
            folders_deleted: Arc::new(AtomicUsize::new(0)),
            folders_moved: Arc::new(AtomicUsize::new(0)),
            folders_cloned: Arc::new(AtomicUsize::new(0)),
            items_created: Arc::new(AtomicUsize::new(0)),
            items_deleted: Arc::new(AtomicUsize::new(0)),
            items_cloned: Arc::new(AtomicUsize::new(0)),
            images_created: Arc::new(AtomicUsize::new(0)),
            images_deleted: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_folders_created(&self) {
        self.folders_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_folders_deleted(&self) {
        self.folders_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_folders_moved(&self) {
        self.folders_moved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_folders_cloned(&self) {
        self.folders_cloned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_items_created(&self) {
        self.items_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_items_deleted(&self) {
        self.items_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_items_cloned(&self) {
        self.items_cloned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_images_created(&self) {
        self.images_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_images_deleted(&self) {
        self.images_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            folders_created: self.folders_created.load(Ordering::Relaxed),
            folders_deleted: self.folders_deleted.load(Ordering::Relaxed),
            folders_moved: self.folders_moved.load(Ordering::Relaxed),
            folders_cloned: self.folders_cloned.load(Ordering::Relaxed),
            items_created: self.items_created.load(Ordering::Relaxed),
            items_deleted: self.items_deleted.load(Ordering::Relaxed),
            items_cloned: self.items_cloned.load(Ordering::Relaxed),
            images_created: self.images_created.load(Ordering::Relaxed),
            images_deleted: self.images_deleted.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub folders_created: usize,
    pub folders_deleted: usize,
    pub folders_moved: usize,
    pub folders_cloned: usize,
    pub items_created: usize,
    pub items_deleted: usize,
    pub items_cloned: usize,
    pub images_created: usize,
    pub images_deleted: usize,
    pub uptime_seconds: u64,
}
