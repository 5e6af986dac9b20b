//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::links::Link;
use crate::links::ViewEvent;

use super::Result;
use super::Storage;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All links in storage, in order of creation
    links: Arc<Mutex<Vec<Link>>>,

    /// All views in storage, in order of arrival
    views: Arc<Mutex<Vec<ViewEvent>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for Memory {
    async fn create_link(&self, url: &str) -> Result<u64> {
        let mut links = self.links.lock().await;

        // IDs start at 1, like a serial column
        let id = links.last().map_or(1, |link| link.id + 1);

        links.push(Link {
            id,
            url: url.to_string(),
        });

        Ok(id)
    }

    async fn resolve_link(&self, id: u64) -> Result<Option<String>> {
        Ok(self
            .links
            .lock()
            .await
            .iter()
            .find(|link| link.id == id)
            .map(|link| link.url.clone()))
    }

    async fn record_view(&self, id: u64) -> Result<()> {
        self.views.lock().await.push(ViewEvent { link_id: id });

        Ok(())
    }

    async fn count_views(&self, id: u64) -> Result<u64> {
        let count = self
            .views
            .lock()
            .await
            .iter()
            .filter(|view| view.link_id == id)
            .count();

        Ok(count as u64)
    }
}
