//! Product checkout flow
//!
//! A three-step form (address, contact, payment) followed by the gateway
//! and a backend confirmation call. The reducer owns every transition;
//! the gateway and backend are reached only through effects.

use std::marker::PhantomData;

use pestaway_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use uuid::Uuid;

use crate::backend::{CheckoutApi, ConfirmCartPayment};
use crate::error::{
    PAID_BUT_UNCONFIRMED, PAYMENT_CANCELLED, PAYMENT_FAILED, SessionError, ValidationError,
};
use crate::gateway::{GatewayConfig, GatewayOrder, GatewayOutcome, PaymentGateway};
use crate::selection::Selection;
use crate::steps::{CheckoutStep, SessionStatus};
use crate::types::{Address, AddressInput, Contact, Money};

/// Everything the checkout reducer needs from the outside world
#[derive(Debug, Clone)]
pub struct CheckoutEnvironment<G, B> {
    /// Payment gateway
    pub gateway: G,
    /// Backend API client
    pub backend: B,
    /// Gateway configuration
    pub config: GatewayConfig,
}

/// State of one product checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutState {
    /// Items being paid for, fixed at session start
    pub selection: Selection,
    /// Current form step
    pub step: CheckoutStep,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Raw address fields
    pub address_input: AddressInput,
    /// Validated address, set when the address step passes
    pub address: Option<Address>,
    /// Raw phone field
    pub phone_input: String,
    /// Validated contact, set when the contact step passes
    pub contact: Option<Contact>,
    /// Message shown next to the form, if any
    pub notice: Option<String>,
}

impl CheckoutState {
    /// Start a session over a selection
    #[must_use]
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            step: CheckoutStep::FIRST,
            status: SessionStatus::Draft,
            address_input: AddressInput::default(),
            address: None,
            phone_input: String::new(),
            contact: None,
            notice: None,
        }
    }

    /// Amount the session will charge
    ///
    /// Product orders charge the subtotal exactly; there is no tax or
    /// shipping line.
    #[must_use]
    pub fn total(&self) -> Money {
        self.selection.subtotal()
    }
}

/// Actions driving a checkout session
#[derive(Debug, Clone)]
pub enum CheckoutAction {
    /// The user edited the location field
    SetLocation(String),
    /// The user edited the street address field
    SetAddressLine(String),
    /// The user edited the pincode field
    SetPincode(String),
    /// The user edited the phone field
    SetPhone(String),
    /// The user asked to move to the next step
    Next,
    /// The user asked to move to the previous step
    Back,
    /// The user pressed pay
    InitiatePayment,
    /// The gateway window closed
    GatewayReturned(GatewayOutcome),
    /// The backend confirmed the order
    ConfirmationSucceeded,
    /// The backend rejected or never answered the confirmation
    ConfirmationFailed {
        /// Message to surface
        message: String,
    },
}

/// Reducer for the product checkout flow
pub struct CheckoutReducer<G, B> {
    _marker: PhantomData<(G, B)>,
}

impl<G, B> Default for CheckoutReducer<G, B> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<G, B> CheckoutReducer<G, B>
where
    G: PaymentGateway + Clone + 'static,
    B: CheckoutApi + Clone + 'static,
{
    fn initiate(
        state: &mut CheckoutState,
        env: &CheckoutEnvironment<G, B>,
    ) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        if state.step != CheckoutStep::Payment || state.status != SessionStatus::Draft {
            // Already in flight or not on the payment step yet.
            return smallvec![Effect::None];
        }
        if state.selection.is_empty() {
            state.notice = Some(ValidationError::EmptySelection.to_string());
            return smallvec![Effect::None];
        }
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
        let order = GatewayOrder {
            amount: state.total(),
            currency: env.config.currency.clone(),
            reference: format!("order_{}", Uuid::new_v4()),
            description: "Order payment".to_owned(),
            prefill_phone: state.contact.as_ref().map(|c| c.phone().to_owned()),
        };
        state.notice = None;
        state.status = SessionStatus::AwaitingGateway;
        let gateway = env.gateway.clone();
        smallvec![Effect::future(async move {
            let outcome = gateway.open(order).await;
            Some(CheckoutAction::GatewayReturned(outcome))
        })]
    }

    fn gateway_returned(
        state: &mut CheckoutState,
        outcome: GatewayOutcome,
        env: &CheckoutEnvironment<G, B>,
    ) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        if state.status != SessionStatus::AwaitingGateway {
            // Late callback into a session that already moved on.
            return smallvec![Effect::None];
        }
        match outcome {
            GatewayOutcome::Success(proof) => {
                state.status = SessionStatus::Confirming;
                let request = ConfirmCartPayment {
                    cart_ids: state.selection.cart_ids(),
                    delivery_address: state
                        .address
                        .as_ref()
                        .map(Address::full_line)
                        .unwrap_or_default(),
                    phone: state
                        .contact
                        .as_ref()
                        .map(|c| c.phone().to_owned())
                        .unwrap_or_default(),
                    razorpay_payment_id: proof.payment_id,
                };
                let backend = env.backend.clone();
                smallvec![Effect::future(async move {
                    match backend.confirm_cart_payment(request).await {
                        Ok(()) => Some(CheckoutAction::ConfirmationSucceeded),
                        Err(error) => {
                            tracing::error!(%error, "order confirmation failed after payment");
                            Some(CheckoutAction::ConfirmationFailed {
                                message: PAID_BUT_UNCONFIRMED.to_owned(),
                            })
                        },
                    }
                })]
            },
            GatewayOutcome::Dismissed => {
                // Cancellation, not an error. Back to the form.
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

impl<G, B> Reducer for CheckoutReducer<G, B>
where
    G: PaymentGateway + Clone + 'static,
    B: CheckoutApi + Clone + 'static,
{
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment<G, B>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::SetLocation(value) => {
                if state.status == SessionStatus::Draft {
                    state.address_input.location = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            CheckoutAction::SetAddressLine(value) => {
                if state.status == SessionStatus::Draft {
                    state.address_input.address_line = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            CheckoutAction::SetPincode(value) => {
                if state.status == SessionStatus::Draft {
                    state.address_input.pincode = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            CheckoutAction::SetPhone(value) => {
                if state.status == SessionStatus::Draft {
                    state.phone_input = value;
                    state.notice = None;
                }
                smallvec![Effect::None]
            },
            CheckoutAction::Next => {
                if state.status != SessionStatus::Draft {
                    return smallvec![Effect::None];
                }
                match state.step {
                    CheckoutStep::Address => match Address::parse(&state.address_input) {
                        Ok(address) => {
                            state.address = Some(address);
                            state.step = CheckoutStep::Contact;
                            state.notice = None;
                        },
                        Err(error) => {
                            state.notice = Some(error.to_string());
                        },
                    },
                    CheckoutStep::Contact => match Contact::parse(&state.phone_input) {
                        Ok(contact) => {
                            state.contact = Some(contact);
                            state.step = CheckoutStep::Payment;
                            state.notice = None;
                        },
                        Err(error) => {
                            state.notice = Some(error.to_string());
                        },
                    },
                    CheckoutStep::Payment => {},
                }
                smallvec![Effect::None]
            },
            CheckoutAction::Back => {
                if state.status == SessionStatus::Draft {
                    if let Some(previous) = state.step.retreat() {
                        state.step = previous;
                        state.notice = None;
                    }
                }
                smallvec![Effect::None]
            },
            CheckoutAction::InitiatePayment => Self::initiate(state, env),
            CheckoutAction::GatewayReturned(outcome) => {
                Self::gateway_returned(state, outcome, env)
            },
            CheckoutAction::ConfirmationSucceeded => {
                if state.status == SessionStatus::Confirming {
                    state.status = SessionStatus::Confirmed;
                }
                smallvec![Effect::None]
            },
            CheckoutAction::ConfirmationFailed { message } => {
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
    use crate::mocks::{MockCheckoutApi, MockGateway};
    use crate::types::SelectionItem;
    use pestaway_testing::{ReducerTest, assertions};

    type TestReducer = CheckoutReducer<MockGateway, MockCheckoutApi>;

    fn test_env() -> CheckoutEnvironment<MockGateway, MockCheckoutApi> {
        CheckoutEnvironment {
            gateway: MockGateway::new(),
            backend: MockCheckoutApi::new(),
            config: GatewayConfig::new("rzp_test_key"),
        }
    }

    fn state_at_payment() -> CheckoutState {
        let mut state = CheckoutState::new(Selection::from_cart(vec![SelectionItem::new(
            "prod-1",
            "Ant Spray",
            Money::from_rupees(250),
            1,
        )]));
        state.address = Some(
            Address::parse(&AddressInput {
                location: "Mumbai".into(),
                address_line: "12 MG Road".into(),
                pincode: "400001".into(),
            })
            .unwrap(),
        );
        state.contact = Some(Contact::parse("9876543210").unwrap());
        state.step = CheckoutStep::Payment;
        state
    }

    #[test]
    fn next_with_blank_address_stays_on_the_first_step() {
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(CheckoutState::new(Selection::default()))
            .when_action(CheckoutAction::Next)
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::Address);
                assert!(state.notice.is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn initiate_on_payment_step_opens_the_gateway() {
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(state_at_payment())
            .when_action(CheckoutAction::InitiatePayment)
            .then_state(|state| {
                assert_eq!(state.status, SessionStatus::AwaitingGateway);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn initiate_while_awaiting_gateway_is_a_no_op() {
        let mut state = state_at_payment();
        state.status = SessionStatus::AwaitingGateway;
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(state)
            .when_action(CheckoutAction::InitiatePayment)
            .then_state(|state| {
                assert_eq!(state.status, SessionStatus::AwaitingGateway);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn initiate_off_the_payment_step_is_a_no_op() {
        ReducerTest::new(TestReducer::default())
            .with_env(test_env())
            .given_state(CheckoutState::new(Selection::default()))
            .when_action(CheckoutAction::InitiatePayment)
            .then_state(|state| {
                assert_eq!(state.status, SessionStatus::Draft);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
