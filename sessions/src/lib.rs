//! # Pestaway Sessions
//!
//! Payment session state machines for the Pestaway storefront.
//!
//! Two flows share one shape: a step-gated form that ends in a gateway
//! payment and a backend confirmation.
//!
//! - **Checkout** ([`checkout`]): pay for products from the cart or a
//!   buy-now selection. Steps: address, contact, payment. The charge is
//!   the item subtotal exactly.
//! - **Booking** ([`booking`]): book a pest-control service visit. Steps:
//!   schedule and location, then payment. The charge is the service price
//!   plus 18% GST, and the booking is created on the backend before the
//!   gateway opens.
//!
//! Both flows are plain reducers over `pestaway-core`: every transition
//! is a pure function of state and action, and the gateway and backend
//! are reached only through effects. Run them on a
//! `pestaway_runtime::Store` or drive them by hand in tests.
//!
//! Failure handling keeps two situations apart that look similar but are
//! not: a gateway failure (no money moved) and a backend confirmation
//! failure after a successful payment (money moved). The two produce
//! different terminal messages; see [`error`].
//!
//! ## Example
//!
//! ```ignore
//! use pestaway_sessions::checkout::{
//!     CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutState,
//! };
//! use pestaway_sessions::selection::Selection;
//! use pestaway_runtime::Store;
//!
//! let store = Store::new(
//!     CheckoutState::new(Selection::from_cart(cart_items)),
//!     CheckoutReducer::default(),
//!     CheckoutEnvironment { gateway, backend, config },
//! );
//! store.send(CheckoutAction::InitiatePayment).await?;
//! ```

pub mod backend;
pub mod booking;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod mocks;
pub mod selection;
pub mod steps;
pub mod types;

pub use backend::{BackendError, BookingApi, CheckoutApi};
pub use error::{SessionError, ValidationError};
pub use gateway::{GatewayConfig, GatewayOutcome, PaymentGateway};
pub use selection::Selection;
pub use steps::{BookingStep, CheckoutStep, SessionStatus};
pub use types::{Address, BookingId, CartId, Contact, Money, Schedule, SelectionItem, ServiceId};
