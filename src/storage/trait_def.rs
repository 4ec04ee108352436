use crate::models::{Click, Link, NewClick, NewLink};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error("short code not found")]
    NotFound,
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a link under its short code, failing with `Conflict` if the code is taken.
    /// The existence check and the insert are a single atomic step.
    async fn insert(&self, link: NewLink) -> StorageResult<Link>;

    /// Get a link by short code
    async fn get(&self, short_code: &str) -> Option<Link>;

    /// Append a click and bump the link's counter in one critical section
    async fn append_click(&self, short_code: &str, click: NewClick) -> StorageResult<Click>;

    /// Copy of every stored link, in no particular order
    async fn snapshot(&self) -> Vec<Link>;

    async fn len(&self) -> usize;
}
