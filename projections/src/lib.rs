//! # Pestaway Projections
//!
//! Read-only status feeds over the Pestaway backend: the user's orders
//! and bookings, and the admin's technician-leave queue.
//!
//! Feeds follow one rule: the backend is the single source of truth.
//! Every mutation (ship an order, approve a leave, submit feedback) is
//! followed by a full re-fetch of the list, never a local patch, so the
//! displayed list always equals what the backend holds.
//!
//! - [`orders::OrderFeed`]: status filter, no pagination
//! - [`bookings::BookingFeed`]: status filter, case-insensitive search,
//!   fixed page size
//! - [`leaves::LeaveFeed`]: approve/reject queue
//! - [`style`]: total status-to-badge mappings over a closed tone enum
//!
//! The backend is reached through the [`source::FeedSource`] trait;
//! [`mocks::InMemoryFeedSource`] backs the tests.

pub mod bookings;
pub mod leaves;
pub mod mocks;
pub mod orders;
pub mod records;
pub mod source;
pub mod style;

pub use bookings::{BookingFeed, FeedbackError, PAGE_SIZE};
pub use leaves::LeaveFeed;
pub use orders::OrderFeed;
pub use records::{
    BookingRecord, BookingStatus, LeaveId, LeaveRecord, LeaveStatus, OrderId, OrderRecord,
    OrderStatus,
};
pub use source::FeedSource;
pub use style::StatusTone;
