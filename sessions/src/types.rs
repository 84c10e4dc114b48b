//! Core domain types shared by the checkout and booking flows

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A monetary amount in paise (1/100 of a rupee)
///
/// All arithmetic happens on integer paise so totals never drift the way
/// floating-point rupee amounts would. Amounts are non-negative and
/// arithmetic saturates at the `i64` bounds instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

/// GST rate applied to service bookings, in percent
pub const GST_RATE_PERCENT: i64 = 18;

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create an amount from paise
    #[must_use]
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    /// Create an amount from whole rupees
    #[must_use]
    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    /// The amount in paise
    #[must_use]
    pub const fn paise(self) -> i64 {
        self.0
    }

    /// The amount in whole rupees, truncating any paise remainder
    #[must_use]
    pub const fn rupees(self) -> i64 {
        self.0 / 100
    }

    /// Add another amount, saturating on overflow
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiply by a quantity, saturating on overflow
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// The amount with 18% GST added, rounded half-up to the nearest paisa
    #[must_use]
    pub const fn with_gst(self) -> Self {
        Self(
            self.0
                .saturating_mul(100 + GST_RATE_PERCENT)
                .saturating_add(50)
                / 100,
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{20b9}{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Identifier of a cart row on the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(String);

impl CartId {
    /// Create a new cart id
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

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a bookable service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a new service id
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

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a service booking created on the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Create a new booking id
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

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single purchasable line in a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    /// Identifier of the product or service being purchased
    pub reference_id: String,
    /// Cart row this item came from, when it was selected via the cart
    pub cart_id: Option<CartId>,
    /// Display name
    pub name: String,
    /// Price per unit
    pub unit_price: Money,
    /// Units requested
    pub quantity: u32,
}

impl SelectionItem {
    /// Create a new selection line
    #[must_use]
    pub fn new(
        reference_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            reference_id: reference_id.into(),
            cart_id: None,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Attach the backing cart row
    #[must_use]
    pub fn with_cart_id(mut self, cart_id: CartId) -> Self {
        self.cart_id = Some(cart_id);
        self
    }

    /// Price of the whole line
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A point placed on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Validated contact details for an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    phone: String,
}

impl Contact {
    /// Validate a raw phone input
    ///
    /// The phone must be exactly ten ASCII digits. An empty input and a
    /// malformed input produce different errors so the form can show the
    /// right message.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::PhoneRequired);
        }
        if trimmed.len() != 10 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::PhoneFormat);
        }
        Ok(Self {
            phone: trimmed.to_owned(),
        })
    }

    /// The validated ten-digit phone number
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// Raw address form fields as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInput {
    /// City or locality
    pub location: String,
    /// Street address
    pub address_line: String,
    /// Postal code
    pub pincode: String,
}

/// A validated delivery address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    location: String,
    address_line: String,
    pincode: String,
}

impl Address {
    /// Validate raw address fields
    ///
    /// Every field must be non-empty after trimming.
    pub fn parse(input: &AddressInput) -> Result<Self, ValidationError> {
        let location = input.location.trim();
        let address_line = input.address_line.trim();
        let pincode = input.pincode.trim();
        if location.is_empty() || address_line.is_empty() || pincode.is_empty() {
            return Err(ValidationError::IncompleteAddress);
        }
        Ok(Self {
            location: location.to_owned(),
            address_line: address_line.to_owned(),
            pincode: pincode.to_owned(),
        })
    }

    /// The full address as a single line, for the confirmation payload
    #[must_use]
    pub fn full_line(&self) -> String {
        format!("{}, {}, {}", self.address_line, self.location, self.pincode)
    }
}

/// Raw schedule form fields as the user typed them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleInput {
    /// Date in `YYYY-MM-DD` form
    pub date: String,
    /// Time in `HH:MM` or `HH:MM:SS` form
    pub time: String,
    /// Marker placed on the map, if any
    pub geo: Option<GeoPoint>,
    /// Free-text requirements for the technician
    pub requirements: String,
}

/// A validated service schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Start of the visit
    pub starts_at: DateTime<Utc>,
    /// Location of the visit
    pub geo: GeoPoint,
    /// Free-text requirements, when given
    pub requirements: Option<String>,
}

impl Schedule {
    /// Validate raw schedule fields against the current time
    ///
    /// The combined date and time must be strictly in the future, and a
    /// marker must have been placed on the map.
    pub fn parse(input: &ScheduleInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let date = input.date.trim();
        let time = input.time.trim();
        if date.is_empty() {
            return Err(ValidationError::DateRequired);
        }
        if time.is_empty() {
            return Err(ValidationError::TimeRequired);
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidSchedule)?;
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .map_err(|_| ValidationError::InvalidSchedule)?;
        let starts_at = date.and_time(time).and_utc();
        if starts_at <= now {
            return Err(ValidationError::DateNotInFuture);
        }
        let geo = input.geo.ok_or(ValidationError::NoLocationSelected)?;
        let requirements = match input.requirements.trim() {
            "" => None,
            text => Some(text.to_owned()),
        };
        Ok(Self {
            starts_at,
            geo,
            requirements,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn money_gst_rounds_half_up() {
        // 500 rupees -> 590 rupees at 18%
        assert_eq!(Money::from_rupees(500).with_gst(), Money::from_rupees(590));
        // 1 paisa -> 1.18 paise rounds to 1
        assert_eq!(Money::from_paise(1).with_gst(), Money::from_paise(1));
        // 3 paise -> 3.54 paise rounds to 4
        assert_eq!(Money::from_paise(3).with_gst(), Money::from_paise(4));
    }

    #[test]
    fn money_displays_rupees_and_paise() {
        assert_eq!(Money::from_paise(59_000).to_string(), "\u{20b9}590.00");
        assert_eq!(Money::from_paise(105).to_string(), "\u{20b9}1.05");
        assert_eq!(Money::from_paise(105).rupees(), 1);
    }

    #[test]
    fn money_arithmetic_saturates_instead_of_overflowing() {
        let max = Money::from_paise(i64::MAX);
        assert_eq!(max.add(Money::from_paise(1)), max);
        assert_eq!(max.times(2), max);
        // with_gst caps the intermediate product instead of panicking.
        assert!(max.with_gst().paise() > 0);
    }

    proptest! {
        #[test]
        fn money_gst_within_one_paisa_of_exact(paise in 0i64..1_000_000_000) {
            let total = Money::from_paise(paise).with_gst().paise();
            let exact = paise as f64 * 1.18;
            prop_assert!((total as f64 - exact).abs() <= 0.5);
        }
    }

    #[test]
    fn contact_distinguishes_empty_from_malformed() {
        assert_eq!(Contact::parse(""), Err(ValidationError::PhoneRequired));
        assert_eq!(Contact::parse("  "), Err(ValidationError::PhoneRequired));
        assert_eq!(Contact::parse("12345"), Err(ValidationError::PhoneFormat));
        assert_eq!(Contact::parse("12345678901"), Err(ValidationError::PhoneFormat));
        assert_eq!(Contact::parse("98765x3210"), Err(ValidationError::PhoneFormat));
        assert_eq!(
            Contact::parse("9876543210").unwrap().phone(),
            "9876543210"
        );
    }

    #[test]
    fn address_requires_every_field() {
        let mut input = AddressInput {
            location: "Mumbai".into(),
            address_line: "12 MG Road".into(),
            pincode: "400001".into(),
        };
        let address = Address::parse(&input).unwrap();
        assert_eq!(address.full_line(), "12 MG Road, Mumbai, 400001");

        input.pincode = "   ".into();
        assert_eq!(
            Address::parse(&input),
            Err(ValidationError::IncompleteAddress)
        );
    }

    #[test]
    fn schedule_accepts_both_time_formats() {
        let now = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut input = ScheduleInput {
            date: "2025-06-15".into(),
            time: "10:30".into(),
            geo: Some(GeoPoint::new(19.07, 72.87)),
            requirements: String::new(),
        };
        assert!(Schedule::parse(&input, now).is_ok());
        input.time = "10:30:45".into();
        assert!(Schedule::parse(&input, now).is_ok());
        input.time = "half past ten".into();
        assert_eq!(
            Schedule::parse(&input, now),
            Err(ValidationError::InvalidSchedule)
        );
    }

    #[test]
    fn schedule_must_be_strictly_future() {
        let now = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut input = ScheduleInput {
            date: "2025-01-01".into(),
            time: "00:00:00".into(),
            geo: Some(GeoPoint::new(19.07, 72.87)),
            requirements: String::new(),
        };
        assert_eq!(
            Schedule::parse(&input, now),
            Err(ValidationError::DateNotInFuture)
        );
        // one second later passes
        input.time = "00:00:01".into();
        assert!(Schedule::parse(&input, now).is_ok());
    }

    #[test]
    fn schedule_requires_map_marker() {
        let now = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let input = ScheduleInput {
            date: "2025-06-15".into(),
            time: "10:30".into(),
            geo: None,
            requirements: String::new(),
        };
        assert_eq!(
            Schedule::parse(&input, now),
            Err(ValidationError::NoLocationSelected)
        );
    }
}
