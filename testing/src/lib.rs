//! # Pestaway Testing
//!
//! Testing utilities for the Pestaway session engine.
//!
//! This crate provides:
//! - Deterministic mock implementations of environment traits (`FixedClock`)
//! - A fluent Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for effect lists
//!
//! Domain-specific mocks (payment gateway, backend API) live next to the
//! traits they implement in `pestaway-sessions::mocks`.
//!
//! ## Example
//!
//! ```ignore
//! use pestaway_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(CheckoutReducer::default())
//!     .with_env(test_environment())
//!     .given_state(CheckoutState::default())
//!     .when_action(CheckoutAction::Next)
//!     .then_state(|state| assert_eq!(state.step, CheckoutStep::Contact))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use pestaway_core::environment::Clock;


/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making time-sensitive validation
    /// (future-date checks) reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use pestaway_testing::mocks::FixedClock;
    /// use pestaway_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen
    /// in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
