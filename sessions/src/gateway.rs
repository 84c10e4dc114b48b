//! Payment gateway seam
//!
//! The session reducers never talk to Razorpay directly. They hand a
//! [`GatewayOrder`] to whatever implements [`PaymentGateway`] and react to
//! the [`GatewayOutcome`] that comes back.

use crate::types::Money;

/// Static gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Public gateway key, absent when the deployment is misconfigured
    pub key: Option<String>,
    /// ISO currency code charged through the gateway
    pub currency: String,
}

impl GatewayConfig {
    /// Create a configuration with the given key
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            currency: "INR".to_owned(),
        }
    }

    /// Create a configuration with no key, as seen when the environment
    /// variable is missing
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            key: None,
            currency: "INR".to_owned(),
        }
    }
}

/// The order handed to the gateway when its window opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    /// Amount to charge, in the currency's smallest unit
    pub amount: Money,
    /// ISO currency code
    pub currency: String,
    /// Receipt or booking reference shown on the gateway
    pub reference: String,
    /// Short description shown on the gateway
    pub description: String,
    /// Phone number to prefill, when known
    pub prefill_phone: Option<String>,
}

/// Proof of payment returned by the gateway on success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayProof {
    /// Gateway payment id
    pub payment_id: String,
    /// Gateway order id, when the gateway created one
    pub order_id: Option<String>,
    /// Gateway signature over the payment, when given
    pub signature: Option<String>,
}

/// How a gateway window closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The payment went through
    Success(GatewayProof),
    /// The user closed the window without paying
    ///
    /// Money has not moved; this is a cancellation, not an error.
    Dismissed,
    /// The gateway reported a failed payment
    Failed {
        /// Reason given by the gateway
        reason: String,
    },
}

/// A payment gateway the session reducers can open
pub trait PaymentGateway: Send + Sync {
    /// Whether the gateway script finished loading
    ///
    /// Sessions refuse to initiate payment while this is false rather than
    /// open a window that can never complete.
    fn is_ready(&self) -> bool;

    /// Open the gateway window for an order and wait for it to close
    fn open(&self, order: GatewayOrder) -> impl Future<Output = GatewayOutcome> + Send;
}
