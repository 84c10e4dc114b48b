//! Records served by the status feeds

use chrono::{DateTime, Utc};
use pestaway_sessions::types::{BookingId, Money, SelectionItem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a confirmed order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new order id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a technician leave request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveId(String);

impl LeaveId {
    /// Create a new leave id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fulfilment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed and paid, not yet shipped
    Ordered,
    /// Handed to the courier
    Shipped,
    /// Received by the customer
    Delivered,
    /// Cancelled before delivery
    Cancelled,
}

/// Progress of a service booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Paid, waiting for a technician
    Pending,
    /// Technician assigned
    Confirmed,
    /// Visit finished
    Completed,
}

/// Status of a technician leave request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Waiting on an admin decision
    Pending,
    /// Granted
    Approved,
    /// Denied
    Rejected,
}

/// One confirmed order as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order id
    pub id: OrderId,
    /// Items in the order
    pub items: Vec<SelectionItem>,
    /// Amount charged
    pub total: Money,
    /// Fulfilment status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
}

/// One service booking as the backend reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Booking id
    pub id: BookingId,
    /// Name of the booked service
    pub service_name: String,
    /// Start of the visit
    pub starts_at: DateTime<Utc>,
    /// Technicians assigned so far; the backend may repeat names
    pub technicians: Vec<String>,
    /// Amount billed, once billed
    pub bill: Option<Money>,
    /// Progress of the booking
    pub status: BookingStatus,
    /// Feedback left by the customer, if any
    pub feedback: Option<String>,
    /// Human-readable visit location
    pub location: String,
}

impl BookingRecord {
    /// Assigned technician names with duplicates removed, order preserved
    #[must_use]
    pub fn technician_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for name in &self.technicians {
            if !seen.contains(&name.as_str()) {
                seen.push(name.as_str());
            }
        }
        seen
    }
}

/// One technician leave request as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// Leave id
    pub id: LeaveId,
    /// Technician asking for leave
    pub technician: String,
    /// First day of leave
    pub from: DateTime<Utc>,
    /// Last day of leave
    pub to: DateTime<Utc>,
    /// Decision status
    pub status: LeaveStatus,
}
