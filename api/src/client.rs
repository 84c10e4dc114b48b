//! The REST client
//!
//! One `ApiClient` serves every surface: it implements the session
//! traits (`CheckoutApi`, `BookingApi`) and the feed trait
//! (`FeedSource`) against the live backend, plus the auth, cart, admin
//! and notification endpoints.

use pestaway_projections::records::{
    BookingRecord, LeaveId, LeaveRecord, LeaveStatus, OrderId, OrderRecord, OrderStatus,
};
use pestaway_projections::source::FeedSource;
use pestaway_sessions::backend::{
    BackendError, BookService, BookingApi, CheckoutApi, ConfirmCartPayment, VerifyPayment,
};
use pestaway_sessions::types::BookingId;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::auth::AuthContext;
use crate::config::ApiConfig;
use crate::error::{ApiError, extract_message};
use crate::wire::{
    AddToCart, BlogRecord, BookResponse, CartEntry, FeedbackRequest, LoginRequest, LoginResponse,
    NotificationRecord, ProductPayload, RegisterRequest, ReportRecord, ServicePayload, StatusPatch,
    UserRecord,
};

/// HTTP client for the Pestaway backend
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from configuration
    ///
    /// The configured timeout applies to every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the underlying client cannot be
    /// constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    /// Attach a bearer token to every subsequent request
    #[must_use]
    pub fn with_auth(mut self, context: &AuthContext) -> Self {
        self.token = Some(context.token().to_owned());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.exchange(builder).await?;
        serde_json::from_str(&body).map_err(|error| ApiError::Decode(error.to_string()))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.exchange(builder).await.map(|_| ())
    }

    async fn exchange(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = self.authed(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            let message = extract_message(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    // --- auth ---

    /// Log in and build an auth context from the returned token
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection, or [`ApiError::InvalidToken`] if
    /// the returned token cannot be decoded.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthContext, ApiError> {
        let request = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let response: LoginResponse = self
            .fetch(self.http.post(self.url("/auth/login")).json(&request))
            .await?;
        AuthContext::from_token(response.token)
    }

    /// Register a new account
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("/auth/register")).json(request))
            .await
    }

    // --- cart ---

    /// Fetch the current cart
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn cart(&self) -> Result<Vec<CartEntry>, ApiError> {
        self.fetch(self.http.get(self.url("/user/cart"))).await
    }

    /// Add a product to the cart
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection, including out-of-stock errors.
    pub async fn add_to_cart(&self, request: &AddToCart) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("/user/cart/add")).json(request))
            .await
    }

    /// Remove a cart row
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn remove_from_cart(
        &self,
        cart_id: &pestaway_sessions::CartId,
    ) -> Result<(), ApiError> {
        self.execute(
            self.http
                .delete(self.url(&format!("/user/cart/remove/{cart_id}"))),
        )
        .await
    }

    // --- admin: catalog ---

    /// Create a product
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn create_product(&self, payload: &ProductPayload) -> Result<(), ApiError> {
        self.execute(
            self.http
                .post(self.url("/admin/store/products"))
                .json(payload),
        )
        .await
    }

    /// Update a product
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn update_product(
        &self,
        product_id: &str,
        payload: &ProductPayload,
    ) -> Result<(), ApiError> {
        self.execute(
            self.http
                .put(self.url(&format!("/admin/store/products/{product_id}")))
                .json(payload),
        )
        .await
    }

    /// Delete a product
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), ApiError> {
        self.execute(
            self.http
                .delete(self.url(&format!("/admin/store/products/{product_id}"))),
        )
        .await
    }

    /// Create a service
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn create_service(&self, payload: &ServicePayload) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("/admin/services")).json(payload))
            .await
    }

    /// Update a service
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn update_service(
        &self,
        service_id: &pestaway_sessions::ServiceId,
        payload: &ServicePayload,
    ) -> Result<(), ApiError> {
        self.execute(
            self.http
                .put(self.url(&format!("/admin/services/{service_id}")))
                .json(payload),
        )
        .await
    }

    /// Delete a service
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn delete_service(
        &self,
        service_id: &pestaway_sessions::ServiceId,
    ) -> Result<(), ApiError> {
        self.execute(
            self.http
                .delete(self.url(&format!("/admin/services/{service_id}"))),
        )
        .await
    }

    // --- admin: users ---

    /// Fetch every registered account
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn users(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.fetch(self.http.get(self.url("/admin/users"))).await
    }

    /// Delete an account
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.execute(
            self.http
                .delete(self.url(&format!("/admin/users/{user_id}"))),
        )
        .await
    }

    // --- admin: reports and blogs ---

    /// Fetch generated reports
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn reports(&self) -> Result<Vec<ReportRecord>, ApiError> {
        self.fetch(self.http.get(self.url("/admin/reports"))).await
    }

    /// Ask the backend to generate a fresh report
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn generate_report(&self) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("/admin/generate-report")))
            .await
    }

    /// Fetch published blog posts
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn blogs(&self) -> Result<Vec<BlogRecord>, ApiError> {
        self.fetch(self.http.get(self.url("/admin/blogs"))).await
    }

    /// Trigger the weekly blog generation job
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn run_weekly_blog(&self) -> Result<(), ApiError> {
        self.execute(self.http.post(self.url("/admin/run-weekly-blog")))
            .await
    }

    // --- notifications ---

    /// Fetch the user's notifications
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn notifications(&self) -> Result<Vec<NotificationRecord>, ApiError> {
        self.fetch(self.http.get(self.url("/notifications"))).await
    }

    /// Mark a notification as seen
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection.
    pub async fn mark_notification_seen(&self, notification_id: &str) -> Result<(), ApiError> {
        self.execute(
            self.http
                .patch(self.url(&format!("/notifications/{notification_id}/seen"))),
        )
        .await
    }
}

impl CheckoutApi for ApiClient {
    fn confirm_cart_payment(
        &self,
        request: ConfirmCartPayment,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        async move {
            self.execute(
                self.http
                    .post(self.url("/user/cart/confirm-payment"))
                    .json(&request),
            )
            .await
            .map_err(BackendError::from)
        }
    }
}

impl BookingApi for ApiClient {
    fn book_service(
        &self,
        request: BookService,
    ) -> impl Future<Output = Result<BookingId, BackendError>> + Send {
        async move {
            let response: BookResponse = self
                .fetch(
                    self.http
                        .post(self.url(&format!("/user/service/{}/book", request.service)))
                        .json(&request),
                )
                .await
                .map_err(BackendError::from)?;
            Ok(response.booking_id)
        }
    }

    fn verify_payment(
        &self,
        request: VerifyPayment,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        async move {
            self.execute(self.http.post(self.url("/payment/verify")).json(&request))
                .await
                .map_err(BackendError::from)
        }
    }
}

impl FeedSource for ApiClient {
    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<OrderRecord>, BackendError>> + Send {
        async move {
            self.fetch(self.http.get(self.url("/user/cart/orders")))
                .await
                .map_err(BackendError::from)
        }
    }

    fn fetch_bookings(
        &self,
    ) -> impl Future<Output = Result<Vec<BookingRecord>, BackendError>> + Send {
        async move {
            self.fetch(self.http.get(self.url("/user/bookings")))
                .await
                .map_err(BackendError::from)
        }
    }

    fn fetch_leaves(&self) -> impl Future<Output = Result<Vec<LeaveRecord>, BackendError>> + Send {
        async move {
            self.fetch(self.http.get(self.url("/admin/technician-leaves")))
                .await
                .map_err(BackendError::from)
        }
    }

    fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let builder = self
            .http
            .patch(self.url(&format!("/admin/store/orders/{id}")))
            .json(&StatusPatch { status });
        async move { self.execute(builder).await.map_err(BackendError::from) }
    }

    fn set_leave_status(
        &self,
        id: &LeaveId,
        status: LeaveStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let builder = self
            .http
            .patch(self.url(&format!("/admin/technician-leaves/{id}")))
            .json(&StatusPatch { status });
        async move { self.execute(builder).await.map_err(BackendError::from) }
    }

    fn submit_feedback(
        &self,
        id: &BookingId,
        feedback: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let builder = self.http.patch(self.url("/user/feedback")).json(&FeedbackRequest {
            booking_id: id.clone(),
            feedback: feedback.to_owned(),
        });
        async move { self.execute(builder).await.map_err(BackendError::from) }
    }
}
