//! Router harness driving the API through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
use serde_json::{Value, json};
use tower::ServiceExt;

use tiffin_api::{AppState, app};
use tiffin_core::{ServiceState, TiffinConfig};
use tiffin_engine::Engine;
use tiffin_store::Store;

/// Pincode served by the seeded zone.
pub const PINCODE: &str = "560038";

/// An API router over an in-memory store.
pub struct ApiHarness {
    /// State shared with the router
    pub state: AppState,
    router: Router,
}

impl ApiHarness {
    /// Creates a harness whose service is already ready.
    pub fn new() -> Self {
        Self::with_store(Store::in_memory())
    }

    /// Creates a ready harness over `store`.
    pub fn with_store(store: Store) -> Self {
        let engine = Engine::new(store, &TiffinConfig::default());
        let state = AppState::new(engine);
        state.service.set_state(ServiceState::Ready);
        let router = app(state.clone());
        Self { state, router }
    }

    /// Sends a request and decodes the JSON response.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response should be JSON")
        };
        (status, value)
    }

    /// GET shorthand.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    /// POST shorthand.
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Registers a user and returns its id.
    pub async fn user(&self, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/users",
                json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Creates the zone serving [`PINCODE`].
    pub async fn zone(&self) -> String {
        let (status, body) = self
            .post(
                "/api/zones",
                json!({
                    "name": "Indiranagar",
                    "city": "Bengaluru",
                    "pincodes": [PINCODE],
                    "base_delivery_fee": 3000
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Registers and verifies a vegetarian home chef in `zone`.
    pub async fn vendor(&self, zone: &str, name: &str, capacity: u32) -> String {
        let owner = self.user(&format!("owner{}", name.replace(' ', ""))).await;
        let (status, body) = self
            .post(
                "/api/vendors",
                json!({
                    "owner": owner,
                    "business_name": name,
                    "category": "home_chef",
                    "food_type": "veg",
                    "cuisines": ["South Indian"],
                    "zones": [zone],
                    "max_subscribers": capacity
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = id_of(&body);
        let (status, _) = self
            .post(&format!("/api/vendors/{id}/verify"), json!({ "verified": true }))
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    /// Creates a vegetarian lunch plan with one vendor switch.
    pub async fn plan(&self, credits: u32) -> String {
        let (status, body) = self
            .post(
                "/api/plans",
                json!({
                    "name": "Veg lunch",
                    "food_type": "veg",
                    "meal_types": ["lunch"],
                    "duration_days": 30,
                    "total_credits": credits,
                    "price": 250000,
                    "vendor_switches_allowed": 1
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Purchases `plan` for `user`; returns the response body.
    pub async fn purchase(&self, user: &str, plan: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/subscriptions",
                json!({
                    "user": user,
                    "plan": plan,
                    "delivery": { "address": "100 Feet Road", "pincode": PINCODE }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

/// The `id` field of a response body.
pub fn id_of(body: &Value) -> String {
    body["id"]
        .as_str()
        .expect("body should carry an id")
        .to_string()
}
