//! Booking status feed

use pestaway_sessions::BackendError;
use pestaway_sessions::types::BookingId;
use thiserror::Error;

use crate::records::{BookingRecord, BookingStatus};
use crate::source::FeedSource;

/// Bookings shown per page
pub const PAGE_SIZE: usize = 5;

/// Feedback could not be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// The booking id is not in the current list
    #[error("Booking not found")]
    UnknownBooking,

    /// Feedback is only accepted for completed bookings
    #[error("Feedback can only be given for completed bookings")]
    NotCompleted,

    /// Feedback was already submitted for this booking
    #[error("Feedback has already been submitted")]
    AlreadyGiven,

    /// The backend call failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A filtered, searchable, paginated view over the user's bookings
#[derive(Debug)]
pub struct BookingFeed<S> {
    source: S,
    records: Vec<BookingRecord>,
    filter: Option<BookingStatus>,
    search: String,
    page: usize,
}

impl<S: FeedSource> BookingFeed<S> {
    /// Create an empty feed over a source
    ///
    /// Call [`BookingFeed::refresh`] to load the first list.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            records: Vec::new(),
            filter: None,
            search: String::new(),
            page: 0,
        }
    }

    /// Replace the local list with the backend's current list
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; the previous list is kept.
    pub async fn refresh(&mut self) -> Result<(), BackendError> {
        self.records = self.source.fetch_bookings().await?;
        tracing::debug!(count = self.records.len(), "booking feed refreshed");
        self.clamp_page();
        Ok(())
    }

    /// Show only bookings with this status, or everything with `None`
    ///
    /// Changing the filter jumps back to the first page.
    pub fn set_filter(&mut self, filter: Option<BookingStatus>) {
        self.filter = filter;
        self.page = 0;
    }

    /// Set the free-text search query
    ///
    /// Matching is case-insensitive over service name, location and
    /// technician names. Changing the query jumps back to the first page.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 0;
    }

    /// Move to the next page, if there is one
    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    /// Move to the previous page, if there is one
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Current zero-based page
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Number of pages for the current filter and search
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(PAGE_SIZE).max(1)
    }

    /// The current page of matching bookings
    #[must_use]
    pub fn visible(&self) -> Vec<&BookingRecord> {
        self.filtered()
            .into_iter()
            .skip(self.page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    /// All bookings regardless of filter, search and page
    #[must_use]
    pub fn records(&self) -> &[BookingRecord] {
        &self.records
    }

    /// Submit feedback for a completed booking, then re-fetch the list
    ///
    /// Feedback can be given once, and only after the visit completed.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::UnknownBooking`], [`FeedbackError::NotCompleted`]
    /// or [`FeedbackError::AlreadyGiven`] without touching the backend, or
    /// the backend error from the call or the re-fetch.
    pub async fn submit_feedback(
        &mut self,
        id: &BookingId,
        feedback: &str,
    ) -> Result<(), FeedbackError> {
        let record = self
            .records
            .iter()
            .find(|record| &record.id == id)
            .ok_or(FeedbackError::UnknownBooking)?;
        if record.status != BookingStatus::Completed {
            return Err(FeedbackError::NotCompleted);
        }
        if record.feedback.is_some() {
            return Err(FeedbackError::AlreadyGiven);
        }
        self.source.submit_feedback(id, feedback).await?;
        self.refresh().await?;
        Ok(())
    }

    fn filtered(&self) -> Vec<&BookingRecord> {
        let query = self.search.trim().to_lowercase();
        self.records
            .iter()
            .filter(|record| self.filter.is_none_or(|status| record.status == status))
            .filter(|record| query.is_empty() || Self::matches(record, &query))
            .collect()
    }

    fn matches(record: &BookingRecord, query: &str) -> bool {
        record.service_name.to_lowercase().contains(query)
            || record.location.to_lowercase().contains(query)
            || record
                .technicians
                .iter()
                .any(|name| name.to_lowercase().contains(query))
    }

    fn clamp_page(&mut self) {
        let last = self.page_count() - 1;
        if self.page > last {
            self.page = last;
        }
    }
}
