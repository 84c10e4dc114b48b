//! In-memory feed source for tests

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pestaway_sessions::BackendError;
use pestaway_sessions::types::BookingId;

use crate::records::{
    BookingRecord, LeaveId, LeaveRecord, LeaveStatus, OrderId, OrderRecord, OrderStatus,
};
use crate::source::FeedSource;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A feed source over plain vectors
///
/// Mutations change the stored lists the way the real backend would, so
/// re-fetch-after-mutation behavior is observable. Cloning shares the
/// underlying lists, letting a test play "another client" and change
/// data behind the feed's back.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedSource {
    inner: Arc<InMemoryInner>,
}

#[derive(Debug, Default)]
struct InMemoryInner {
    orders: Mutex<Vec<OrderRecord>>,
    bookings: Mutex<Vec<BookingRecord>>,
    leaves: Mutex<Vec<LeaveRecord>>,
}

impl InMemoryFeedSource {
    /// An empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order to the stored list
    pub fn push_order(&self, record: OrderRecord) {
        lock(&self.inner.orders).push(record);
    }

    /// Add a booking to the stored list
    pub fn push_booking(&self, record: BookingRecord) {
        lock(&self.inner.bookings).push(record);
    }

    /// Add a leave request to the stored list
    pub fn push_leave(&self, record: LeaveRecord) {
        lock(&self.inner.leaves).push(record);
    }

    /// Snapshot of the stored orders
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        lock(&self.inner.orders).clone()
    }

    /// Snapshot of the stored bookings
    #[must_use]
    pub fn bookings(&self) -> Vec<BookingRecord> {
        lock(&self.inner.bookings).clone()
    }
}

impl FeedSource for InMemoryFeedSource {
    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<OrderRecord>, BackendError>> + Send {
        let orders = self.orders();
        async move { Ok(orders) }
    }

    fn fetch_bookings(
        &self,
    ) -> impl Future<Output = Result<Vec<BookingRecord>, BackendError>> + Send {
        let bookings = self.bookings();
        async move { Ok(bookings) }
    }

    fn fetch_leaves(&self) -> impl Future<Output = Result<Vec<LeaveRecord>, BackendError>> + Send {
        let leaves = lock(&self.inner.leaves).clone();
        async move { Ok(leaves) }
    }

    fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let result = {
            let mut orders = lock(&self.inner.orders);
            match orders.iter_mut().find(|record| &record.id == id) {
                Some(record) => {
                    record.status = status;
                    Ok(())
                },
                None => Err(BackendError::Rejected {
                    status: 404,
                    message: "Order not found".into(),
                }),
            }
        };
        async move { result }
    }

    fn set_leave_status(
        &self,
        id: &LeaveId,
        status: LeaveStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let result = {
            let mut leaves = lock(&self.inner.leaves);
            match leaves.iter_mut().find(|record| &record.id == id) {
                Some(record) => {
                    record.status = status;
                    Ok(())
                },
                None => Err(BackendError::Rejected {
                    status: 404,
                    message: "Leave request not found".into(),
                }),
            }
        };
        async move { result }
    }

    fn submit_feedback(
        &self,
        id: &BookingId,
        feedback: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let result = {
            let mut bookings = lock(&self.inner.bookings);
            match bookings.iter_mut().find(|record| &record.id == id) {
                Some(record) => {
                    record.feedback = Some(feedback.to_owned());
                    Ok(())
                },
                None => Err(BackendError::Rejected {
                    status: 404,
                    message: "Booking not found".into(),
                }),
            }
        };
        async move { result }
    }
}
