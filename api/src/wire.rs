//! Wire payloads exchanged with the backend

use chrono::{DateTime, Utc};
use pestaway_sessions::types::{BookingId, CartId, Money, SelectionItem};
use serde::{Deserialize, Serialize};

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// JWT issued by the backend
    pub token: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// One cart row as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Cart row id
    pub cart_id: CartId,
    /// Product in the row
    pub product_id: String,
    /// Product display name
    pub name: String,
    /// Price per unit
    pub unit_price: Money,
    /// Units in the row
    pub quantity: u32,
}

impl CartEntry {
    /// Convert into a selection line for a checkout session
    #[must_use]
    pub fn into_selection_item(self) -> SelectionItem {
        SelectionItem::new(self.product_id, self.name, self.unit_price, self.quantity)
            .with_cart_id(self.cart_id)
    }
}

/// Add-to-cart request body
#[derive(Debug, Clone, Serialize)]
pub struct AddToCart {
    /// Product to add
    pub product_id: String,
    /// Units to add
    pub quantity: u32,
}

/// Response to a booking creation
#[derive(Debug, Clone, Deserialize)]
pub struct BookResponse {
    /// Id of the created booking
    pub booking_id: BookingId,
}

/// Feedback submission body
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    /// Booking the feedback is for
    pub booking_id: BookingId,
    /// Feedback text
    pub feedback: String,
}

/// Status mutation body
#[derive(Debug, Clone, Serialize)]
pub struct StatusPatch<T> {
    /// New status value
    pub status: T,
}

/// Product create/update body
#[derive(Debug, Clone, Serialize)]
pub struct ProductPayload {
    /// Display name
    pub name: String,
    /// Description shown on the product page
    pub description: String,
    /// Price per unit
    pub price: Money,
    /// Units in stock
    pub stock: u32,
}

/// Service create/update body
#[derive(Debug, Clone, Serialize)]
pub struct ServicePayload {
    /// Display name
    pub name: String,
    /// Description shown on the service page
    pub description: String,
    /// Base price, before GST
    pub price: Money,
}

/// One generated business report
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRecord {
    /// Report id
    pub id: String,
    /// Report title
    pub title: String,
    /// When the report was generated
    pub created_at: DateTime<Utc>,
    /// Download location
    pub url: String,
}

/// One published blog post
#[derive(Debug, Clone, Deserialize)]
pub struct BlogRecord {
    /// Post id
    pub id: String,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// When the post was published
    pub created_at: DateTime<Utc>,
}

/// One registered account, as the admin user list reports it
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// User id
    pub id: String,
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Claimed role string
    pub role: String,
}

/// One user notification
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    /// Notification id
    pub id: String,
    /// Notification text
    pub message: String,
    /// Whether the user has seen it
    pub seen: bool,
    /// When it was created
    pub created_at: DateTime<Utc>,
}
