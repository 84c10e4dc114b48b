//! Backend API seam
//!
//! The reducers describe the calls they need as traits; the HTTP client
//! in `pestaway-api` implements them, and the mocks in [`crate::mocks`]
//! script them for tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BookingId, CartId, Money, ServiceId};

/// A backend call failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered with an error payload
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the error payload
        message: String,
    },

    /// The request never produced an answer
    #[error("Network error: {0}")]
    Network(String),
}

/// Payload confirming a product order after the gateway succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmCartPayment {
    /// Cart rows being converted into an order
    pub cart_ids: Vec<CartId>,
    /// Full delivery address as a single line
    pub delivery_address: String,
    /// Ten-digit contact phone
    pub phone: String,
    /// Payment id returned by the gateway
    pub razorpay_payment_id: String,
}

/// Payload creating a service booking before payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookService {
    /// Service being booked
    pub service: ServiceId,
    /// Visit latitude
    pub lat: f64,
    /// Visit longitude
    pub lng: f64,
    /// Start of the visit
    pub booking_date: DateTime<Utc>,
    /// Free-text requirements, when given
    pub requirements: Option<String>,
}

/// Payload verifying a booking payment after the gateway succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPayment {
    /// Booking being paid for
    pub booking_id: BookingId,
    /// Payment id returned by the gateway
    pub razorpay_payment_id: String,
    /// Order id returned by the gateway, when given
    pub razorpay_order_id: Option<String>,
    /// Signature returned by the gateway, when given
    pub razorpay_signature: Option<String>,
    /// Amount that was charged
    pub amount: Money,
}

/// Backend calls the product checkout flow needs
pub trait CheckoutApi: Send + Sync {
    /// Convert paid-for cart rows into a confirmed order
    fn confirm_cart_payment(
        &self,
        request: ConfirmCartPayment,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Backend calls the service booking flow needs
pub trait BookingApi: Send + Sync {
    /// Create a booking and return its id
    fn book_service(
        &self,
        request: BookService,
    ) -> impl Future<Output = Result<BookingId, BackendError>> + Send;

    /// Verify a gateway payment against a booking
    fn verify_payment(
        &self,
        request: VerifyPayment,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}
