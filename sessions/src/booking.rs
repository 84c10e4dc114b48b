//! Service booking flow
//!
//! A two-step form (schedule and location, then payment). Unlike product
//! checkout, the booking is created on the backend before the gateway
//! opens, and the payment is verified against it afterwards. The charged
//! total is the service price plus 18% GST.

use std::marker::PhantomData;

use pestaway_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

use crate::backend::{BookService, BookingApi, VerifyPayment};
use crate::error::{
    PAID_BUT_UNCONFIRMED, PAYMENT_CANCELLED, PAYMENT_FAILED, SessionError, ValidationError,
};
use crate::gateway::{GatewayConfig, GatewayOrder, GatewayOutcome, PaymentGateway};
use crate::steps::{BookingStep, SessionStatus};
use crate::types::{BookingId, Money, Schedule, ScheduleInput, ServiceId};

/// Everything the booking reducer needs from the outside world
#[derive(Debug, Clone)]
pub struct BookingEnvironment<C, G, B> {
    /// Time source for future-date validation
    pub clock: C,
    /// Payment gateway
    pub gateway: G,
    /// Backend API client
    pub backend: B,
    /// Gateway configuration
    pub config: GatewayConfig,
}

/// State of one service booking session
#[derive(Debug, Clone, PartialEq)]
pub struct BookingState {
    /// Service being booked
    pub service: ServiceId,
    /// Display name of the service
    pub service_name: String,
    /// Base price of the service, before GST
    pub price: Money,
    /// Current form step
    pub step: BookingStep,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Raw schedule fields
    pub schedule_input: ScheduleInput,
    /// Validated schedule, set when the schedule step passes
    pub schedule: Option<Schedule>,
    /// Booking created on the backend, set before the gateway opens
    pub booking_id: Option<BookingId>,
    /// Message shown next to the form, if any
    pub notice: Option<String>,
}

impl BookingState {
    /// Start a session for a service
    #[must_use]
    pub fn new(service: ServiceId, service_name: impl Into<String>, price: Money) -> Self {
        Self {
            service,
            service_name: service_name.into(),
            price,
            step: BookingStep::FIRST,
            status: SessionStatus::Draft,
            schedule_input: ScheduleInput::default(),
            schedule: None,
            booking_id: None,
            notice: None,
        }
    }

    /// Amount the session will charge: price plus 18% GST
    #[must_use]
    pub const fn total(&self) -> Money {
        self.price.with_gst()
    }
}

/// Actions driving a booking session
#[derive(Debug, Clone)]
pub enum BookingAction {
    /// The user edited the date field
    SetDate(String),
    /// The user edited the time field
    SetTime(String),
    /// The user placed or moved the map marker
    PlaceMarker(crate::types::GeoPoint),
    /// The user edited the requirements field
    SetRequirements(String),
    /// The user asked to move to the next step
    Next,
    /// The user asked to move to the previous step
    Back,
    /// The user pressed pay
    InitiatePayment,
    /// The backend created the booking
    BookingCreated {
        /// Id of the new booking
        booking_id: BookingId,
    },
    /// The backend rejected or never answered the booking call
    BookingFailed {
        /// Message to surface
        message: String,
    },
    /// The gateway window closed
    GatewayReturned(GatewayOutcome),
    /// The backend verified the payment
    VerificationSucceeded,
    /// The backend rejected or never answered the verification
    VerificationFailed {
        /// Message to surface
        message: String,
    },
}

/// Reducer for the service booking flow
pub struct BookingReducer<C, G, B> {
    _marker: PhantomData<(C, G, B)>,
}

impl<C, G, B> Default for BookingReducer<C, G, B> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C, G, B> BookingReducer<C, G, B>
where
    C: Clock,
    G: PaymentGateway + Clone + 'static,
    B: BookingApi + Clone + 'static,
{
    fn initiate(
        state: &mut BookingState,
        env: &BookingEnvironment<C, G, B>,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.step != BookingStep::Payment || state.status != SessionStatus::Draft {
            return smallvec![Effect::None];
        }
        let Some(schedule) = state.schedule.clone() else {
            // Unreachable through the step machine, but never trust it blindly.
            state.notice = Some(ValidationError::NoLocationSelected.to_string());
            return smallvec![Effect::None];
        };
        if !env.gateway.is_ready() {
            tracing::warn!("payment initiated before gateway script loaded");
            state.notice = Some(SessionError::GatewayUnavailable.to_string());
            return smallvec![Effect::None];
        }
        if env.config.key.is_none() {
            tracing::error!("gateway key missing from configuration");
            state.notice = Some(SessionError::MissingConfiguration.to_string());
            return smallvec![Effect::None];
        }
        state.notice = None;
        // A dismissed payment leaves an unpaid booking on the backend; a
        // retry pays against it rather than creating a second one.
        if let Some(booking_id) = state.booking_id.clone() {
            return Self::open_gateway(state, booking_id, env);
        }
        state.status = SessionStatus::Submitting;
        let request = BookService {
            service: state.service.clone(),
            lat: schedule.geo.lat,
            lng: schedule.geo.lng,
            booking_date: schedule.starts_at,
            requirements: schedule.requirements,
        };
        let backend = env.backend.clone();
        smallvec![Effect::future(async move {
            match backend.book_service(request).await {
                Ok(booking_id) => Some(BookingAction::BookingCreated { booking_id }),
                Err(error) => {
                    tracing::error!(%error, "booking creation failed");
                    Some(BookingAction::BookingFailed {
                        message: error.to_string(),
                    })
                },
            }
        })]
    }

    fn booking_created(
        state: &mut BookingState,
        booking_id: BookingId,
        env: &BookingEnvironment<C, G, B>,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.status != SessionStatus::Submitting {
            return smallvec![Effect::None];
        }
        state.booking_id = Some(booking_id.clone());
        Self::open_gateway(state, booking_id, env)
    }

    fn open_gateway(
        state: &mut BookingState,
        booking_id: BookingId,
        env: &BookingEnvironment<C, G, B>,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        state.status = SessionStatus::AwaitingGateway;
        let order = GatewayOrder {
            amount: state.total(),
            currency: env.config.currency.clone(),
            reference: booking_id.to_string(),
            description: format!("Payment for {}", state.service_name),
            prefill_phone: None,
        };
        let gateway = env.gateway.clone();
        smallvec![Effect::future(async move {
            let outcome = gateway.open(order).await;
            Some(BookingAction::GatewayReturned(outcome))
        })]
    }

    fn gateway_returned(
        state: &mut BookingState,
        outcome: GatewayOutcome,
        env: &BookingEnvironment<C, G, B>,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        if state.status != SessionStatus::AwaitingGateway {
            return smallvec![Effect::None];
        }
        match outcome {
            GatewayOutcome::Success(proof) => {
                let Some(booking_id) = state.booking_id.clone() else {
                    // Cannot happen: the gateway only opens after BookingCreated.
                    state.status = SessionStatus::Failed {
                        message: PAID_BUT_UNCONFIRMED.to_owned(),
                    };
                    return smallvec![Effect::None];
                };
                state.status = SessionStatus::Confirming;
                let request = VerifyPayment {
                    booking_id,
                    razorpay_payment_id: proof.payment_id,
                    razorpay_order_id: proof.order_id,
                    razorpay_signature: proof.signature,
                    amount: state.total(),
                };
                let backend = env.backend.clone();
                smallvec![Effect::future(async move {
                    match backend.verify_payment(request).await {
                        Ok(()) => Some(BookingAction::VerificationSucceeded),
                        Err(error) => {
                            tracing::error!(%error, "payment verification failed after payment");
                            Some(BookingAction::VerificationFailed {
                                message: PAID_BUT_UNCONFIRMED.to_owned(),
                            })
                        },
                    }
                })]
            },
            GatewayOutcome::Dismissed => {
                // The booking stays on the backend as unpaid; the user can
                // re-initiate from the same session.
                state.status = SessionStatus::Draft;
                state.notice = Some(PAYMENT_CANCELLED.to_owned());
                smallvec![Effect::None]
            },
            GatewayOutcome::Failed { reason } => {
                tracing::warn!(%reason, "gateway reported payment failure");
                state.status = SessionStatus::Failed {
                    message: PAYMENT_FAILED.to_owned(),
                };
                smallvec![Effect::None]
            },
        }
    }
}

impl<C, G, B> Reducer for BookingReducer<C, G, B>
where
    C: Clock,
    G: PaymentGateway + Clone + 'static,
    B: BookingApi + Clone + 'static,
{
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment<C, G, B>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::SetDate(value) => {
                if state.status == SessionStatus::Draft {
                    state.schedule_input.date = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            BookingAction::SetTime(value) => {
                if state.status == SessionStatus::Draft {
                    state.schedule_input.time = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            BookingAction::PlaceMarker(point) => {
                if state.status == SessionStatus::Draft {
                    state.schedule_input.geo = Some(point);
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            BookingAction::SetRequirements(value) => {
                if state.status == SessionStatus::Draft {
                    state.schedule_input.requirements = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            BookingAction::Next => {
                if state.status != SessionStatus::Draft {
                    return smallvec![Effect::None];
                }
                if state.step == BookingStep::ScheduleLocation {
                    match Schedule::parse(&state.schedule_input, env.clock.now()) {
                        Ok(schedule) => {
                            state.schedule = Some(schedule);
                            state.step = BookingStep::Payment;
                            state.notice = None;
                        },
                        Err(error) => {
                            state.notice = Some(error.to_string());
                        },
                    }
                }
                smallvec![Effect::None]
            },
            BookingAction::Back => {
                if state.status == SessionStatus::Draft {
                    if let Some(previous) = state.step.retreat() {
                        state.step = previous;
                        state.notice = None;
                    }
                }
                smallvec![Effect::None]
            },
            BookingAction::InitiatePayment => Self::initiate(state, env),
            BookingAction::BookingCreated { booking_id } => {
                Self::booking_created(state, booking_id, env)
            },
            BookingAction::BookingFailed { message } => {
                if state.status == SessionStatus::Submitting {
                    // Nothing was charged and nothing was created; let the
                    // user try again from the form.
                    state.status = SessionStatus::Draft;
                    state.notice = Some(message);
                }
                smallvec![Effect::None]
            },
            BookingAction::GatewayReturned(outcome) => {
                Self::gateway_returned(state, outcome, env)
            },
            BookingAction::VerificationSucceeded => {
                if state.status == SessionStatus::Confirming {
                    state.status = SessionStatus::Confirmed;
                }
                smallvec![Effect::None]
            },
            BookingAction::VerificationFailed { message } => {
                if state.status == SessionStatus::Confirming {
                    state.status = SessionStatus::Failed { message };
                }
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockBookingApi, MockGateway};
    use crate::types::GeoPoint;
    use pestaway_testing::{FixedClock, ReducerTest, assertions, test_clock};

    type TestReducer = BookingReducer<FixedClock, MockGateway, MockBookingApi>;

    fn test_env() -> BookingEnvironment<FixedClock, MockGateway, MockBookingApi> {
        BookingEnvironment {
            clock: test_clock(),
            gateway: MockGateway::new(),
            backend: MockBookingApi::new(),
            config: GatewayConfig::new("rzp_test_key"),
        }
    }

    fn draft_state() -> BookingState {
        BookingState::new(
            ServiceId::new("svc-1"),
            "Termite Treatment",
            Money::from_rupees(500),
        )
    }

    #[test]
    fn total_adds_gst_to_the_service_price() {
        assert_eq!(draft_state().total(), Money::from_rupees(590));
    }

    #[test]
    fn next_without_a_marker_stays_on_the_schedule_step() {
        let mut state = draft_state();
        state.schedule_input.date = "2025-06-15".into();
        state.schedule_input.time = "10:30".into();
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::Next)
            .then_state(|state| {
                assert_eq!(state.step, BookingStep::ScheduleLocation);
                assert_eq!(
                    state.notice.as_deref(),
                    Some("Please select a location on the map")
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn initiate_on_payment_step_books_first() {
        let mut state = draft_state();
        state.schedule_input.date = "2025-06-15".into();
        state.schedule_input.time = "10:30".into();
        state.schedule_input.geo = Some(GeoPoint::new(19.07, 72.87));
        state.schedule = Some(
            Schedule::parse(&state.schedule_input, test_clock().now()).unwrap(),
        );
        state.step = BookingStep::Payment;
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::InitiatePayment)
            .then_state(|state| {
                assert_eq!(state.status, SessionStatus::Submitting);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn retry_with_an_existing_booking_skips_booking_creation() {
        let mut state = draft_state();
        state.schedule_input.date = "2025-06-15".into();
        state.schedule_input.time = "10:30".into();
        state.schedule_input.geo = Some(GeoPoint::new(19.07, 72.87));
        state.schedule = Some(
            Schedule::parse(&state.schedule_input, test_clock().now()).unwrap(),
        );
        state.step = BookingStep::Payment;
        state.booking_id = Some(BookingId::new("booking_7"));
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::InitiatePayment)
            .then_state(|state| {
                // Straight to the gateway, no second booking call.
                assert_eq!(state.status, SessionStatus::AwaitingGateway);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn booking_failure_returns_to_draft_with_the_message() {
        let mut state = draft_state();
        state.step = BookingStep::Payment;
        state.status = SessionStatus::Submitting;
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::BookingFailed {
                message: "Slot no longer available".into(),
            })
            .then_state(|state| {
                assert_eq!(state.status, SessionStatus::Draft);
                assert_eq!(state.notice.as_deref(), Some("Slot no longer available"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
