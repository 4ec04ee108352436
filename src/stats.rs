//! Aggregate statistics over a registry snapshot

use serde::Serialize;

use crate::expiry::is_expired;
use crate::models::Link;

/// Summary counts for a set of links at a reference time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total_links: usize,
    pub active_links: usize,
    pub expired_links: usize,
    pub total_clicks: u64,
}

impl RegistryStats {
    /// Always recomputed from the given snapshot; nothing is cached.
    pub fn compute(links: &[Link], now: i64) -> Self {
        let total_links = links.len();
        let active_links = links.iter().filter(|link| !is_expired(link, now)).count();
        let total_clicks: u64 = links.iter().map(|link| link.click_count).sum();

        Self {
            total_links,
            active_links,
            expired_links: total_links - active_links,
            total_clicks,
        }
    }
}
