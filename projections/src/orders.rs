//! Order status feed

use pestaway_sessions::BackendError;

use crate::records::{OrderId, OrderRecord, OrderStatus};
use crate::source::FeedSource;

/// A filtered view over the user's orders
///
/// Orders are few enough that the feed shows every match; there is no
/// pagination here.
#[derive(Debug)]
pub struct OrderFeed<S> {
    source: S,
    records: Vec<OrderRecord>,
    filter: Option<OrderStatus>,
}

impl<S: FeedSource> OrderFeed<S> {
    /// Create an empty feed over a source
    ///
    /// Call [`OrderFeed::refresh`] to load the first list.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            records: Vec::new(),
            filter: None,
        }
    }

    /// Replace the local list with the backend's current list
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; the previous list is kept.
    pub async fn refresh(&mut self) -> Result<(), BackendError> {
        self.records = self.source.fetch_orders().await?;
        tracing::debug!(count = self.records.len(), "order feed refreshed");
        Ok(())
    }

    /// Show only orders with this status, or everything with `None`
    pub fn set_filter(&mut self, filter: Option<OrderStatus>) {
        self.filter = filter;
    }

    /// Orders matching the current filter
    #[must_use]
    pub fn visible(&self) -> Vec<&OrderRecord> {
        self.records
            .iter()
            .filter(|record| self.filter.is_none_or(|status| record.status == status))
            .collect()
    }

    /// All orders regardless of filter
    #[must_use]
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// Mark an order shipped, then re-fetch the list
    ///
    /// # Errors
    ///
    /// Returns the backend error from the mutation or the re-fetch.
    pub async fn ship(&mut self, id: &OrderId) -> Result<(), BackendError> {
        self.mutate(id, OrderStatus::Shipped).await
    }

    /// Mark an order delivered, then re-fetch the list
    ///
    /// # Errors
    ///
    /// Returns the backend error from the mutation or the re-fetch.
    pub async fn deliver(&mut self, id: &OrderId) -> Result<(), BackendError> {
        self.mutate(id, OrderStatus::Delivered).await
    }

    /// Cancel an order, then re-fetch the list
    ///
    /// # Errors
    ///
    /// Returns the backend error from the mutation or the re-fetch.
    pub async fn cancel(&mut self, id: &OrderId) -> Result<(), BackendError> {
        self.mutate(id, OrderStatus::Cancelled).await
    }

    /// The list is never patched locally; the backend stays the single
    /// source of truth.
    async fn mutate(&mut self, id: &OrderId, status: OrderStatus) -> Result<(), BackendError> {
        self.source.set_order_status(id, status).await?;
        self.refresh().await
    }
}
