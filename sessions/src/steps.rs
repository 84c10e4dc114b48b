//! Step machines for the two payment flows
//!
//! Forward movement requires the current step's inputs to validate;
//! backward movement never does. The transitions below are the only
//! legal ones, so a session can never skip a step.

use serde::{Deserialize, Serialize};

/// Steps of the product checkout flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Collect the delivery address
    Address,
    /// Collect contact details
    Contact,
    /// Review the total and pay
    Payment,
}

impl CheckoutStep {
    /// The step a new session starts on
    pub const FIRST: Self = Self::Address;

    /// The next step forward, or `None` from the last step
    #[must_use]
    pub const fn advance(self) -> Option<Self> {
        match self {
            Self::Address => Some(Self::Contact),
            Self::Contact => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    /// The previous step, or `None` from the first step
    #[must_use]
    pub const fn retreat(self) -> Option<Self> {
        match self {
            Self::Address => None,
            Self::Contact => Some(Self::Address),
            Self::Payment => Some(Self::Contact),
        }
    }
}

/// Steps of the service booking flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStep {
    /// Pick a date, time and map location
    ScheduleLocation,
    /// Review the total and pay
    Payment,
}

impl BookingStep {
    /// The step a new session starts on
    pub const FIRST: Self = Self::ScheduleLocation;

    /// The next step forward, or `None` from the last step
    #[must_use]
    pub const fn advance(self) -> Option<Self> {
        match self {
            Self::ScheduleLocation => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    /// The previous step, or `None` from the first step
    #[must_use]
    pub const fn retreat(self) -> Option<Self> {
        match self {
            Self::ScheduleLocation => None,
            Self::Payment => Some(Self::ScheduleLocation),
        }
    }
}

/// Lifecycle of a payment session
///
/// A session moves forward through `Draft`, `Submitting`,
/// `AwaitingGateway` and `Confirming`, and ends in `Confirmed` or
/// `Failed`. A gateway dismissal drops it back to `Draft`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The user is still filling in the form
    Draft,
    /// The session is being registered with the backend
    Submitting,
    /// The gateway window is open
    AwaitingGateway,
    /// The gateway succeeded; waiting on backend confirmation
    Confirming,
    /// Payment confirmed end to end
    Confirmed,
    /// The session ended with an error
    Failed {
        /// Message shown to the user
        message: String,
    },
}

impl SessionStatus {
    /// Whether the session has reached a terminal state
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed { .. })
    }

    /// Whether a payment attempt is already in flight
    ///
    /// A second initiate while this holds is dropped, which is what keeps
    /// double-clicks from opening the gateway twice.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Submitting | Self::AwaitingGateway | Self::Confirming
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_steps_walk_in_order() {
        assert_eq!(CheckoutStep::FIRST, CheckoutStep::Address);
        assert_eq!(CheckoutStep::Address.advance(), Some(CheckoutStep::Contact));
        assert_eq!(CheckoutStep::Contact.advance(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Payment.advance(), None);
        assert_eq!(CheckoutStep::Payment.retreat(), Some(CheckoutStep::Contact));
        assert_eq!(CheckoutStep::Address.retreat(), None);
    }

    #[test]
    fn booking_steps_walk_in_order() {
        assert_eq!(
            BookingStep::ScheduleLocation.advance(),
            Some(BookingStep::Payment)
        );
        assert_eq!(BookingStep::Payment.advance(), None);
        assert_eq!(
            BookingStep::Payment.retreat(),
            Some(BookingStep::ScheduleLocation)
        );
        assert_eq!(BookingStep::ScheduleLocation.retreat(), None);
    }

    #[test]
    fn status_classifies_terminal_and_in_flight() {
        assert!(SessionStatus::Confirmed.is_terminal());
        assert!(
            SessionStatus::Failed {
                message: "x".into(),
            }
            .is_terminal()
        );
        assert!(!SessionStatus::Draft.is_terminal());
        assert!(SessionStatus::Submitting.is_in_flight());
        assert!(SessionStatus::AwaitingGateway.is_in_flight());
        assert!(SessionStatus::Confirming.is_in_flight());
        assert!(!SessionStatus::Draft.is_in_flight());
    }
}
