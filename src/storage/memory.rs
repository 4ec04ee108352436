use crate::models::{Click, Link, NewClick, NewLink};
use crate::storage::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-lifetime link storage backed by a sharded concurrent map
pub struct MemoryStorage {
    links: DashMap<String, Link>,
    next_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert(&self, new_link: NewLink) -> StorageResult<Link> {
        // The entry guard holds the shard lock, so no other insert can claim the
        // same code between the vacancy check and the insert.
        match self.links.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict),
            Entry::Vacant(slot) => {
                let link = Link {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    short_code: new_link.short_code,
                    original_url: new_link.original_url,
                    created_at: new_link.created_at,
                    expires_at: new_link.expires_at,
                    click_count: 0,
                    clicks: Vec::new(),
                };
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn get(&self, short_code: &str) -> Option<Link> {
        self.links.get(short_code).map(|entry| entry.value().clone())
    }

    async fn append_click(&self, short_code: &str, new_click: NewClick) -> StorageResult<Click> {
        let mut entry = self
            .links
            .get_mut(short_code)
            .ok_or(StorageError::NotFound)?;
        let link = entry.value_mut();

        let click = Click {
            id: link.clicks.len() as i64 + 1,
            timestamp: new_click.timestamp,
            source: new_click.source,
            location: new_click.location,
        };
        link.clicks.push(click.clone());
        link.click_count += 1;

        Ok(click)
    }

    async fn snapshot(&self) -> Vec<Link> {
        self.links
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    async fn len(&self) -> usize {
        self.links.len()
    }
}
