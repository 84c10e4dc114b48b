//! Badge styling for status values
//!
//! Every status maps through a closed [`StatusTone`] to a fully spelled
//! class string. Class names are never assembled from fragments, so a
//! status can never produce a class that does not exist.

use crate::records::{BookingStatus, LeaveStatus, OrderStatus};

/// Visual tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// Neutral informational state
    Info,
    /// Work in progress
    Progress,
    /// Completed successfully
    Success,
    /// Terminal negative state
    Danger,
}

impl StatusTone {
    /// The complete badge class for this tone
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Info => "badge bg-blue-500 text-white",
            Self::Progress => "badge bg-yellow-500 text-black",
            Self::Success => "badge bg-green-500 text-white",
            Self::Danger => "badge bg-red-500 text-white",
        }
    }
}

impl OrderStatus {
    /// Tone shown for this order status
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Ordered => StatusTone::Info,
            Self::Shipped => StatusTone::Progress,
            Self::Delivered => StatusTone::Success,
            Self::Cancelled => StatusTone::Danger,
        }
    }
}

impl BookingStatus {
    /// Tone shown for this booking status
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Pending => StatusTone::Progress,
            Self::Confirmed => StatusTone::Info,
            Self::Completed => StatusTone::Success,
        }
    }
}

impl LeaveStatus {
    /// Tone shown for this leave status
    #[must_use]
    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Pending => StatusTone::Progress,
            Self::Approved => StatusTone::Success,
            Self::Rejected => StatusTone::Danger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_order_status_has_a_complete_class() {
        for status in [
            OrderStatus::Ordered,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let class = status.tone().badge_class();
            assert!(class.starts_with("badge bg-"));
            assert!(!class.contains("${"));
        }
    }

    #[test]
    fn booking_statuses_map_to_distinct_tones() {
        assert_ne!(
            BookingStatus::Pending.tone(),
            BookingStatus::Completed.tone()
        );
        assert_eq!(
            BookingStatus::Completed.tone().badge_class(),
            "badge bg-green-500 text-white"
        );
    }
}
