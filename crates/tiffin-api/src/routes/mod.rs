//! Router and handlers.

mod assignments;
mod catalog;
mod health;
mod orders;
mod promos;
mod reviews;
mod subscriptions;
mod users;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

/// Builds the API router without middleware.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Users and referrals
        .route("/users", post(users::register).get(users::list))
        .route("/users/{id}", get(users::get))
        .route("/users/{id}/referrals", get(users::referrals))
        // Zones
        .route("/zones", get(catalog::list_zones).post(catalog::create_zone))
        .route(
            "/zones/{id}",
            get(catalog::get_zone)
                .put(catalog::update_zone)
                .delete(catalog::delete_zone),
        )
        .route(
            "/zones/serviceability/{pincode}",
            get(catalog::serviceability),
        )
        // Vendors
        .route(
            "/vendors",
            get(catalog::list_vendors).post(catalog::register_vendor),
        )
        .route(
            "/vendors/{id}",
            get(catalog::get_vendor)
                .put(catalog::update_vendor)
                .delete(catalog::delete_vendor),
        )
        .route("/vendors/{id}/verify", post(catalog::verify_vendor))
        .route("/vendors/{id}/availability", put(catalog::vendor_availability))
        // Plans
        .route("/plans", get(catalog::list_plans).post(catalog::create_plan))
        .route(
            "/plans/{id}",
            get(catalog::get_plan).put(catalog::update_plan),
        )
        // Menus
        .route("/menus", get(catalog::list_menus).post(catalog::create_menu))
        .route(
            "/menus/{id}",
            get(catalog::get_menu)
                .put(catalog::update_menu)
                .delete(catalog::delete_menu),
        )
        // Subscriptions
        .route(
            "/subscriptions",
            get(subscriptions::list).post(subscriptions::purchase),
        )
        .route("/subscriptions/{id}", get(subscriptions::get))
        .route("/subscriptions/{id}/pause", post(subscriptions::pause))
        .route("/subscriptions/{id}/resume", post(subscriptions::resume))
        .route("/subscriptions/{id}/cancel", post(subscriptions::cancel))
        // Orders
        .route("/orders", get(orders::list).post(orders::place))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/status", post(orders::advance))
        .route("/orders/{id}/cancel", post(orders::cancel))
        // Promo codes
        .route("/promo-codes", get(promos::list).post(promos::create))
        .route("/promo-codes/validate", post(promos::validate))
        .route(
            "/promo-codes/{id}",
            get(promos::get).put(promos::update).delete(promos::deactivate),
        )
        // Reviews
        .route("/reviews", get(reviews::list).post(reviews::submit))
        .route(
            "/reviews/{id}",
            get(reviews::get).put(reviews::update).delete(reviews::delete),
        )
        // Vendor assignment
        .route("/assignments", get(assignments::queue))
        .route("/assignments/stats", get(assignments::stats))
        .route("/assignments/initial", post(assignments::request_initial))
        .route("/assignments/switch", post(assignments::request_switch))
        .route("/assignments/auto-assign", post(assignments::auto_assign))
        .route("/assignments/{id}", get(assignments::get))
        .route("/assignments/{id}/candidates", get(assignments::candidates))
        .route("/assignments/{id}/approve", post(assignments::approve))
        .route("/assignments/{id}/reject", post(assignments::reject))
        .route("/assignments/{id}/cancel", post(assignments::cancel));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/api", api)
        .with_state(state)
}
