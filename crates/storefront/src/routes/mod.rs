//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog grid)
//! GET  /experiences            - Browse, optionally `?search=`
//! GET  /experience/{id}        - Experience detail
//!
//! # Cart
//! GET  /cart                   - Cart page (sign-in prompt when anonymous)
//! POST /cart/add               - Add to cart (returns badge, triggers cart-updated)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires sign-in)
//! POST /checkout               - Create gateway order, render payment page
//! POST /checkout/complete      - Gateway success callback
//! POST /checkout/failed        - Gateway failure callback
//!
//! # Search overlay (HTMX fragments)
//! GET  /search/overlay         - Open overlay
//! GET  /search/overlay/close   - Close overlay
//! GET  /search/suggest?q=      - Results panel (at most 5)
//! POST /search                 - Submit (204 when blank)
//! GET  /search/select/{id}     - Pick a result
//! GET  /search/term?q=         - Pick a popular or recent term
//!
//! # Navigation (HTMX fragments)
//! POST /nav/dropdown/{menu}    - Toggle company|support|cart|account
//! POST /nav/mobile             - Toggle mobile menu
//!
//! # Auth
//! GET  /auth/sign-in           - Redirect to identity provider
//! GET  /auth/callback          - Provider callback
//! POST /auth/sign-out          - Sign out
//!
//! # Admin
//! GET  /admin/login            - Login page
//! POST /admin/login            - Login action
//! POST /admin/logout           - Logout action
//! GET  /admin                  - Dashboard
//!
//! GET  /{slug}                 - Markdown content page
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod experiences;
pub mod layout;
pub mod nav;
pub mod pages;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .layer(api_rate_limiter())
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::begin))
        .route("/complete", post(checkout::complete))
        .route("/failed", post(checkout::failed))
        .layer(api_rate_limiter())
}

/// Create the search overlay routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(search::submit))
        .route("/overlay", get(search::open))
        .route("/overlay/close", get(search::close))
        .route("/suggest", get(search::suggest))
        .route("/select/{id}", get(search::select))
        .route("/term", get(search::term))
}

/// Create the navigation toggle routes router.
pub fn nav_routes() -> Router<AppState> {
    Router::new()
        .route("/dropdown/{menu}", post(nav::toggle_dropdown))
        .route("/mobile", post(nav::toggle_mobile_menu))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in))
        .route("/callback", get(auth::callback))
        .route("/sign-out", post(auth::sign_out))
        .layer(auth_rate_limiter())
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route(
            "/login",
            get(admin::login_page).merge(post(admin::login).layer(auth_rate_limiter())),
        )
        .route("/logout", post(admin::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(experiences::home))
        .route("/experiences", get(experiences::index))
        .route("/experience/{id}", get(experiences::show))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/search", search_routes())
        .nest("/nav", nav_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .route("/{slug}", get(pages::show))
}
