//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from request threads and actors.

use crate::config::SyncConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<SyncConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SyncConfig::default()));

#[inline]
pub fn cfg() -> Arc<SyncConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: SyncConfig) -> Arc<SyncConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
