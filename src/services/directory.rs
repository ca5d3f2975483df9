//! Fetch-then-store holder shared by every listing.
//!
//! A [`Directory`] owns the last successfully loaded collection. A refresh
//! either replaces it wholesale or, on failure, leaves it exactly as it was
//! and records the error. Refreshes are tied to a cancellation token so a
//! view that goes away does not publish a late result.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::{AdminError, AdminResult};

#[derive(Debug)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Snapshot {
            items: Vec::new(),
            fetched_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryView {
    Loading,
    Empty,
    Loaded(usize),
}

pub struct Directory<T> {
    name: &'static str,
    inner: ArcSwap<Snapshot<T>>,
    loading: AtomicBool,
    last_error: Mutex<Option<String>>,
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<T> Directory<T> {
    pub fn new(name: &'static str) -> Self {
        Directory {
            name,
            inner: ArcSwap::from_pointee(Snapshot::default()),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.inner.load_full()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }

    pub fn view(&self) -> DirectoryView {
        if self.is_loading() {
            return DirectoryView::Loading;
        }
        match self.inner.load().items.len() {
            0 => DirectoryView::Empty,
            n => DirectoryView::Loaded(n),
        }
    }

    /// Runs `fetch` and publishes its result. On error the previous
    /// collection stays in place; on cancellation nothing is recorded.
    pub async fn refresh<F>(&self, fetch: F, token: &CancellationToken) -> AdminResult<Arc<Snapshot<T>>>
    where
        F: Future<Output = AdminResult<Vec<T>>>,
    {
        self.loading.store(true, Ordering::SeqCst);
        let _guard = LoadingGuard(&self.loading);

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(AdminError::Cancelled),
            result = fetch => result,
        };

        match result {
            Ok(items) => {
                tracing::debug!("{}: loaded {} records", self.name, items.len());
                self.inner.store(Arc::new(Snapshot {
                    items,
                    fetched_at: Some(Utc::now()),
                }));
                self.set_error(None);
                Ok(self.snapshot())
            }
            Err(AdminError::Cancelled) => {
                tracing::debug!("{}: refresh cancelled", self.name);
                Err(AdminError::Cancelled)
            }
            Err(e) => {
                tracing::error!("{}: refresh failed: {}", self.name, e);
                self.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    fn set_error(&self, error: Option<String>) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = error;
        }
    }
}

impl<T: Clone> Directory<T> {
    pub fn items(&self) -> Vec<T> {
        self.inner.load().items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn server_error() -> AdminError {
        AdminError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        }
    }

    #[tokio::test]
    async fn refresh_replaces_collection() {
        let dir = Directory::new("orders");
        let token = CancellationToken::new();
        assert_eq!(dir.view(), DirectoryView::Empty);

        dir.refresh(async { Ok(vec![1, 2, 3]) }, &token).await.unwrap();
        assert_eq!(dir.items(), vec![1, 2, 3]);
        assert_eq!(dir.view(), DirectoryView::Loaded(3));
        assert!(dir.snapshot().fetched_at.is_some());
        assert!(!dir.is_loading());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_items() {
        let dir = Directory::new("orders");
        let token = CancellationToken::new();
        dir.refresh(async { Ok(vec!["a"]) }, &token).await.unwrap();

        let result = dir.refresh(async { Err(server_error()) }, &token).await;
        assert!(result.is_err());
        assert_eq!(dir.items(), vec!["a"]);
        assert!(dir.last_error().is_some());
        assert!(!dir.is_loading());

        dir.refresh(async { Ok(vec!["b"]) }, &token).await.unwrap();
        assert!(dir.last_error().is_none());
    }

    #[tokio::test]
    async fn cancelled_refresh_publishes_nothing() {
        let dir: Directory<u8> = Directory::new("orders");
        let token = CancellationToken::new();
        token.cancel();

        let result = dir.refresh(async { Ok(vec![9]) }, &token).await;
        assert!(matches!(result, Err(AdminError::Cancelled)));
        assert!(dir.items().is_empty());
        assert!(dir.last_error().is_none());
    }

    #[tokio::test]
    async fn empty_result_is_a_distinct_view() {
        let dir: Directory<u8> = Directory::new("products");
        let token = CancellationToken::new();
        dir.refresh(async { Ok(vec![1]) }, &token).await.unwrap();
        dir.refresh(async { Ok(Vec::new()) }, &token).await.unwrap();
        assert_eq!(dir.view(), DirectoryView::Empty);
    }
}
