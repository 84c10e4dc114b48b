//! Backing data source for the feeds
//!
//! A [`FeedSource`] provides both the list fetches and the status
//! mutations. Feeds never merge mutation results locally: after any
//! mutation they re-fetch the whole list, so what they show is always
//! what the backend currently holds.

use pestaway_sessions::BackendError;
use pestaway_sessions::types::BookingId;

use crate::records::{BookingRecord, LeaveId, LeaveRecord, LeaveStatus, OrderId, OrderRecord, OrderStatus};

/// Lists and mutations a feed needs from the backend
pub trait FeedSource: Send + Sync {
    /// Fetch all orders visible to the current user
    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<OrderRecord>, BackendError>> + Send;

    /// Fetch all bookings visible to the current user
    fn fetch_bookings(
        &self,
    ) -> impl Future<Output = Result<Vec<BookingRecord>, BackendError>> + Send;

    /// Fetch all technician leave requests
    fn fetch_leaves(&self) -> impl Future<Output = Result<Vec<LeaveRecord>, BackendError>> + Send;

    /// Move an order to a new fulfilment status
    fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Decide a leave request
    fn set_leave_status(
        &self,
        id: &LeaveId,
        status: LeaveStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Attach customer feedback to a booking
    fn submit_feedback(
        &self,
        id: &BookingId,
        feedback: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}
