//! End-to-end tests for the service booking flow, driven through a Store

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use pestaway_runtime::Store;
use pestaway_sessions::booking::{
    BookingAction, BookingEnvironment, BookingReducer, BookingState,
};
use pestaway_sessions::error::{PAID_BUT_UNCONFIRMED, PAYMENT_CANCELLED, PAYMENT_FAILED};
use pestaway_sessions::gateway::{GatewayConfig, GatewayOutcome, GatewayProof};
use pestaway_sessions::mocks::{MockBookingApi, MockGateway};
use pestaway_sessions::types::{GeoPoint, Money, ServiceId};
use pestaway_sessions::{BackendError, BookingId, BookingStep, SessionStatus};
use pestaway_testing::{FixedClock, test_clock};

type BookingStore = Store<
    BookingState,
    BookingAction,
    BookingEnvironment<FixedClock, MockGateway, MockBookingApi>,
    BookingReducer<FixedClock, MockGateway, MockBookingApi>,
>;

fn booking_store(gateway: MockGateway, backend: MockBookingApi) -> BookingStore {
    Store::new(
        BookingState::new(
            ServiceId::new("svc-1"),
            "Termite Treatment",
            Money::from_rupees(500),
        ),
        BookingReducer::default(),
        BookingEnvironment {
            clock: test_clock(),
            gateway,
            backend,
            config: GatewayConfig::new("rzp_test_key"),
        },
    )
}

async fn send(store: &BookingStore, action: BookingAction) {
    let handle = store.send(action).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();
}

async fn fill_schedule_to_payment(store: &BookingStore) {
    send(store, BookingAction::SetDate("2025-06-15".into())).await;
    send(store, BookingAction::SetTime("10:30".into())).await;
    send(store, BookingAction::PlaceMarker(GeoPoint::new(19.07, 72.87))).await;
    send(store, BookingAction::Next).await;
}

#[tokio::test]
async fn happy_path_books_and_verifies() {
    let gateway = MockGateway::new();
    let backend = MockBookingApi::new();
    let store = booking_store(gateway.clone(), backend.clone());

    fill_schedule_to_payment(&store).await;
    assert_eq!(store.state(|s| s.step).await, BookingStep::Payment);

    send(&store, BookingAction::InitiatePayment).await;

    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Confirmed);
    assert_eq!(backend.book_calls(), 1);
    assert_eq!(backend.verify_calls(), 1);
    assert_eq!(gateway.opens(), 1);

    // 500 rupees plus 18% GST is 590 rupees, charged as 59000 paise.
    let order = gateway.last_order().unwrap();
    assert_eq!(order.amount, Money::from_paise(59_000));
    assert_eq!(order.reference, "booking_1");

    let book = backend.last_book_request().unwrap();
    assert_eq!(book.service, ServiceId::new("svc-1"));
    assert!((book.lat - 19.07).abs() < f64::EPSILON);
    assert_eq!(book.booking_date.to_rfc3339(), "2025-06-15T10:30:00+00:00");

    let verify = backend.last_verify_request().unwrap();
    assert_eq!(verify.booking_id, BookingId::new("booking_1"));
    assert_eq!(verify.razorpay_payment_id, "pay_mock_1");
    assert_eq!(verify.amount, Money::from_paise(59_000));
}

#[tokio::test]
async fn past_date_is_rejected_and_one_second_future_passes() {
    // The fixed clock sits at 2025-01-01T00:00:00Z.
    let store = booking_store(MockGateway::new(), MockBookingApi::new());

    send(&store, BookingAction::SetDate("2025-01-01".into())).await;
    send(&store, BookingAction::SetTime("00:00:00".into())).await;
    send(&store, BookingAction::PlaceMarker(GeoPoint::new(19.07, 72.87))).await;
    send(&store, BookingAction::Next).await;
    assert_eq!(store.state(|s| s.step).await, BookingStep::ScheduleLocation);
    assert_eq!(
        store.state(|s| s.notice.clone()).await.as_deref(),
        Some("Booking date must be in the future")
    );

    send(&store, BookingAction::SetTime("00:00:01".into())).await;
    send(&store, BookingAction::Next).await;
    assert_eq!(store.state(|s| s.step).await, BookingStep::Payment);
}

#[tokio::test]
async fn missing_map_marker_blocks_the_schedule_step() {
    let store = booking_store(MockGateway::new(), MockBookingApi::new());

    send(&store, BookingAction::SetDate("2025-06-15".into())).await;
    send(&store, BookingAction::SetTime("10:30".into())).await;
    send(&store, BookingAction::Next).await;

    assert_eq!(store.state(|s| s.step).await, BookingStep::ScheduleLocation);
    assert_eq!(
        store.state(|s| s.notice.clone()).await.as_deref(),
        Some("Please select a location on the map")
    );
}

#[tokio::test]
async fn booking_creation_failure_returns_to_draft() {
    let gateway = MockGateway::new();
    let backend = MockBookingApi::new();
    backend.script_book(Err(BackendError::Network("connection refused".into())));
    let store = booking_store(gateway.clone(), backend.clone());
    fill_schedule_to_payment(&store).await;

    send(&store, BookingAction::InitiatePayment).await;

    // Nothing was charged; the gateway never opened and a retry works.
    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Draft);
    assert_eq!(gateway.opens(), 0);
    assert!(store.state(|s| s.notice.is_some()).await);

    send(&store, BookingAction::InitiatePayment).await;
    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Confirmed);
}

#[tokio::test]
async fn gateway_failure_and_verification_failure_stay_distinct() {
    let gateway = MockGateway::new();
    let backend = MockBookingApi::new();
    gateway.script_outcome(GatewayOutcome::Failed {
        reason: "card declined".into(),
    });
    let store = booking_store(gateway, backend.clone());
    fill_schedule_to_payment(&store).await;
    send(&store, BookingAction::InitiatePayment).await;

    let gateway_message = match store.state(|s| s.status.clone()).await {
        SessionStatus::Failed { message } => message,
        status => panic!("expected Failed, got {status:?}"),
    };
    assert_eq!(gateway_message, PAYMENT_FAILED);
    assert_eq!(backend.verify_calls(), 0);

    let backend = MockBookingApi::new();
    backend.script_verify(Err(BackendError::Rejected {
        status: 400,
        message: "signature mismatch".into(),
    }));
    let store = booking_store(MockGateway::new(), backend.clone());
    fill_schedule_to_payment(&store).await;
    send(&store, BookingAction::InitiatePayment).await;

    let verify_message = match store.state(|s| s.status.clone()).await {
        SessionStatus::Failed { message } => message,
        status => panic!("expected Failed, got {status:?}"),
    };
    assert_eq!(verify_message, PAID_BUT_UNCONFIRMED);
    assert_ne!(gateway_message, verify_message);
}

#[tokio::test]
async fn dismissal_keeps_the_booking_and_returns_to_draft() {
    let gateway = MockGateway::new();
    let backend = MockBookingApi::new();
    gateway.script_outcome(GatewayOutcome::Dismissed);
    let store = booking_store(gateway.clone(), backend.clone());
    fill_schedule_to_payment(&store).await;

    send(&store, BookingAction::InitiatePayment).await;

    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Draft);
    assert_eq!(
        store.state(|s| s.notice.clone()).await.as_deref(),
        Some(PAYMENT_CANCELLED)
    );
    assert_eq!(
        store.state(|s| s.booking_id.clone()).await,
        Some(BookingId::new("booking_1"))
    );
    assert_eq!(backend.verify_calls(), 0);
}

#[tokio::test]
async fn retry_after_dismissal_pays_against_the_same_booking() {
    let gateway = MockGateway::new();
    let backend = MockBookingApi::new();
    gateway.script_outcome(GatewayOutcome::Dismissed);
    let store = booking_store(gateway.clone(), backend.clone());
    fill_schedule_to_payment(&store).await;

    send(&store, BookingAction::InitiatePayment).await;
    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Draft);

    // The unpaid booking is still on the backend; the retry reopens the
    // gateway against it instead of booking again.
    send(&store, BookingAction::InitiatePayment).await;

    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Confirmed);
    assert_eq!(backend.book_calls(), 1);
    assert_eq!(gateway.opens(), 2);
    let verify = backend.last_verify_request().unwrap();
    assert_eq!(verify.booking_id, BookingId::new("booking_1"));
}

#[tokio::test]
async fn double_submit_creates_one_booking() {
    let gateway = MockGateway::new();
    let backend = MockBookingApi::new();
    let store = booking_store(gateway.clone(), backend.clone());
    fill_schedule_to_payment(&store).await;

    let first = store.send(BookingAction::InitiatePayment).await.unwrap();
    let second = store.send(BookingAction::InitiatePayment).await.unwrap();
    first
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();
    second
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(backend.book_calls(), 1);
    assert_eq!(gateway.opens(), 1);
}

#[tokio::test]
async fn gateway_success_after_session_moved_on_is_a_no_op() {
    let store = booking_store(MockGateway::new(), MockBookingApi::new());
    fill_schedule_to_payment(&store).await;

    // A stray gateway callback with no payment in flight changes nothing.
    send(
        &store,
        BookingAction::GatewayReturned(GatewayOutcome::Success(GatewayProof {
            payment_id: "pay_stray".into(),
            order_id: None,
            signature: None,
        })),
    )
    .await;

    assert_eq!(store.state(|s| s.status.clone()).await, SessionStatus::Draft);
}
