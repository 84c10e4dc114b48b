//! Error types for checkout and booking sessions

use thiserror::Error;

/// Message shown when the gateway reports a failed payment
///
/// No money has moved in this case, so the message must never be confused
/// with [`PAID_BUT_UNCONFIRMED`].
pub const PAYMENT_FAILED: &str = "Payment failed. You have not been charged.";

/// Message shown when the gateway succeeded but the backend confirmation
/// or verification call failed
///
/// Money has moved here, so this must stay distinct from [`PAYMENT_FAILED`].
pub const PAID_BUT_UNCONFIRMED: &str =
    "Payment succeeded, but confirmation failed. Please contact support.";

/// Message shown when the user closes the gateway without paying
pub const PAYMENT_CANCELLED: &str = "Payment cancelled.";

/// A form input failed validation
///
/// Each variant carries the exact message shown next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The selection has no items
    #[error("Your cart is empty")]
    EmptySelection,

    /// A buy-now quantity was zero
    #[error("Quantity must be at least 1")]
    QuantityZero,

    /// A buy-now quantity exceeded the available stock
    #[error("Only {available} in stock")]
    QuantityExceedsStock {
        /// Units the user asked for
        requested: u32,
        /// Units actually in stock
        available: u32,
    },

    /// One or more address fields were left blank
    #[error("Please fill in all fields")]
    IncompleteAddress,

    /// The phone field was left blank
    #[error("Phone number is required")]
    PhoneRequired,

    /// The phone was not exactly ten digits
    #[error("Phone number must be exactly 10 digits")]
    PhoneFormat,

    /// The booking date field was left blank
    #[error("Please choose a booking date")]
    DateRequired,

    /// The booking time field was left blank
    #[error("Please choose a booking time")]
    TimeRequired,

    /// The date or time could not be parsed
    #[error("Booking date or time is not valid")]
    InvalidSchedule,

    /// The booking date is not strictly in the future
    #[error("Booking date must be in the future")]
    DateNotInFuture,

    /// No marker was placed on the map
    #[error("Please select a location on the map")]
    NoLocationSelected,
}

/// A session could not start payment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A form input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The gateway script never finished loading
    #[error("Payment gateway is unavailable. Please reload and try again.")]
    GatewayUnavailable,

    /// The gateway key is missing from configuration
    #[error("Payment is not configured")]
    MissingConfiguration,
}
