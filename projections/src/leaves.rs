//! Technician leave feed

use pestaway_sessions::BackendError;

use crate::records::{LeaveId, LeaveRecord, LeaveStatus};
use crate::source::FeedSource;

/// Admin view over technician leave requests
#[derive(Debug)]
pub struct LeaveFeed<S> {
    source: S,
    records: Vec<LeaveRecord>,
}

impl<S: FeedSource> LeaveFeed<S> {
    /// Create an empty feed over a source
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            records: Vec::new(),
        }
    }

    /// Replace the local list with the backend's current list
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; the previous list is kept.
    pub async fn refresh(&mut self) -> Result<(), BackendError> {
        self.records = self.source.fetch_leaves().await?;
        Ok(())
    }

    /// All leave requests
    #[must_use]
    pub fn records(&self) -> &[LeaveRecord] {
        &self.records
    }

    /// Approve a leave request, then re-fetch the list
    ///
    /// # Errors
    ///
    /// Returns the backend error from the mutation or the re-fetch.
    pub async fn approve(&mut self, id: &LeaveId) -> Result<(), BackendError> {
        self.source.set_leave_status(id, LeaveStatus::Approved).await?;
        self.refresh().await
    }

    /// Reject a leave request, then re-fetch the list
    ///
    /// # Errors
    ///
    /// Returns the backend error from the mutation or the re-fetch.
    pub async fn reject(&mut self, id: &LeaveId) -> Result<(), BackendError> {
        self.source.set_leave_status(id, LeaveStatus::Rejected).await?;
        self.refresh().await
    }
}
