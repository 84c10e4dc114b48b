//! Scriptable in-memory implementations of the gateway and backend seams
//!
//! These back the integration tests: outcomes are queued up front and the
//! mocks record every call so tests can assert on counts and payloads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::{
    BackendError, BookService, BookingApi, CheckoutApi, ConfirmCartPayment, VerifyPayment,
};
use crate::gateway::{GatewayOrder, GatewayOutcome, GatewayProof, PaymentGateway};
use crate::types::BookingId;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted payment gateway
///
/// Queued outcomes are returned in order; once the queue is empty every
/// open succeeds with a fresh payment id.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    inner: Arc<MockGatewayInner>,
}

#[derive(Debug)]
struct MockGatewayInner {
    ready: AtomicBool,
    opens: AtomicUsize,
    outcomes: Mutex<VecDeque<GatewayOutcome>>,
    last_order: Mutex<Option<GatewayOrder>>,
}

impl Default for MockGatewayInner {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(true),
            opens: AtomicUsize::new(0),
            outcomes: Mutex::new(VecDeque::new()),
            last_order: Mutex::new(None),
        }
    }
}

impl MockGateway {
    /// A ready gateway where every open succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose script never loaded
    #[must_use]
    pub fn unready() -> Self {
        let gateway = Self::default();
        gateway.inner.ready.store(false, Ordering::SeqCst);
        gateway
    }

    /// Queue an outcome for the next open
    pub fn script_outcome(&self, outcome: GatewayOutcome) {
        lock(&self.inner.outcomes).push_back(outcome);
    }

    /// How many times the gateway window was opened
    #[must_use]
    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    /// The order from the most recent open, if any
    #[must_use]
    pub fn last_order(&self) -> Option<GatewayOrder> {
        lock(&self.inner.last_order).clone()
    }
}

impl PaymentGateway for MockGateway {
    fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    fn open(&self, order: GatewayOrder) -> impl Future<Output = GatewayOutcome> + Send {
        let count = self.inner.opens.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.inner.last_order) = Some(order);
        let outcome = lock(&self.inner.outcomes).pop_front().unwrap_or_else(|| {
            GatewayOutcome::Success(GatewayProof {
                payment_id: format!("pay_mock_{count}"),
                order_id: None,
                signature: None,
            })
        });
        async move { outcome }
    }
}

/// A scripted backend for the product checkout flow
#[derive(Debug, Clone, Default)]
pub struct MockCheckoutApi {
    inner: Arc<MockCheckoutInner>,
}

#[derive(Debug, Default)]
struct MockCheckoutInner {
    confirms: AtomicUsize,
    results: Mutex<VecDeque<Result<(), BackendError>>>,
    last_request: Mutex<Option<ConfirmCartPayment>>,
}

impl MockCheckoutApi {
    /// A backend where every confirmation succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next confirmation call
    pub fn script_confirm(&self, result: Result<(), BackendError>) {
        lock(&self.inner.results).push_back(result);
    }

    /// How many confirmation calls were made
    #[must_use]
    pub fn confirm_calls(&self) -> usize {
        self.inner.confirms.load(Ordering::SeqCst)
    }

    /// The payload of the most recent confirmation call, if any
    #[must_use]
    pub fn last_request(&self) -> Option<ConfirmCartPayment> {
        lock(&self.inner.last_request).clone()
    }
}

impl CheckoutApi for MockCheckoutApi {
    fn confirm_cart_payment(
        &self,
        request: ConfirmCartPayment,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        self.inner.confirms.fetch_add(1, Ordering::SeqCst);
        *lock(&self.inner.last_request) = Some(request);
        let result = lock(&self.inner.results).pop_front().unwrap_or(Ok(()));
        async move { result }
    }
}

/// A scripted backend for the service booking flow
#[derive(Debug, Clone, Default)]
pub struct MockBookingApi {
    inner: Arc<MockBookingInner>,
}

#[derive(Debug, Default)]
struct MockBookingInner {
    books: AtomicUsize,
    verifies: AtomicUsize,
    book_results: Mutex<VecDeque<Result<BookingId, BackendError>>>,
    verify_results: Mutex<VecDeque<Result<(), BackendError>>>,
    last_book: Mutex<Option<BookService>>,
    last_verify: Mutex<Option<VerifyPayment>>,
}

impl MockBookingApi {
    /// A backend where booking and verification both succeed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next booking call
    pub fn script_book(&self, result: Result<BookingId, BackendError>) {
        lock(&self.inner.book_results).push_back(result);
    }

    /// Queue a result for the next verification call
    pub fn script_verify(&self, result: Result<(), BackendError>) {
        lock(&self.inner.verify_results).push_back(result);
    }

    /// How many booking calls were made
    #[must_use]
    pub fn book_calls(&self) -> usize {
        self.inner.books.load(Ordering::SeqCst)
    }

    /// How many verification calls were made
    #[must_use]
    pub fn verify_calls(&self) -> usize {
        self.inner.verifies.load(Ordering::SeqCst)
    }

    /// The payload of the most recent booking call, if any
    #[must_use]
    pub fn last_book_request(&self) -> Option<BookService> {
        lock(&self.inner.last_book).clone()
    }

    /// The payload of the most recent verification call, if any
    #[must_use]
    pub fn last_verify_request(&self) -> Option<VerifyPayment> {
        lock(&self.inner.last_verify).clone()
    }
}

impl BookingApi for MockBookingApi {
    fn book_service(
        &self,
        request: BookService,
    ) -> impl Future<Output = Result<BookingId, BackendError>> + Send {
        let count = self.inner.books.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.inner.last_book) = Some(request);
        let result = lock(&self.inner.book_results)
            .pop_front()
            .unwrap_or_else(|| Ok(BookingId::new(format!("booking_{count}"))));
        async move { result }
    }

    fn verify_payment(
        &self,
        request: VerifyPayment,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        self.inner.verifies.fetch_add(1, Ordering::SeqCst);
        *lock(&self.inner.last_verify) = Some(request);
        let result = lock(&self.inner.verify_results).pop_front().unwrap_or(Ok(()));
        async move { result }
    }
}
