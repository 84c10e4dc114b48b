//! # Pestaway API
//!
//! REST plumbing for the Pestaway backend: environment-driven
//! configuration, the auth context with its role guard, and the
//! `reqwest`-based client.
//!
//! [`ApiClient`] is the live implementation of every seam the rest of
//! the workspace defines: `CheckoutApi` and `BookingApi` from
//! `pestaway-sessions`, and `FeedSource` from `pestaway-projections`.
//! Wire a client plus a gateway into a session environment and the
//! reducers run unchanged against the real backend.
//!
//! ## Example
//!
//! ```ignore
//! use pestaway_api::{ApiClient, ApiConfig, gateway_config_from_env};
//!
//! let config = ApiConfig::from_env()?;
//! let client = ApiClient::new(&config)?;
//! let context = client.login("user@example.com", "secret").await?;
//! let client = client.with_auth(&context);
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use auth::{Access, AuthContext, Role, authorize};
pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError, gateway_config_from_env};
pub use error::ApiError;
