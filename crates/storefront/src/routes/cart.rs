//! Cart route handlers.
//!
//! The cart lives in the session. Mutations answer HTMX with a fragment and
//! an `HX-Trigger: cart-updated` header so the badge refreshes itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::Cart;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, Viewer, is_htmx};
use crate::models::AuthState;
use crate::routes::layout::{CartView, ShellView};
use crate::state::AppState;

/// Event HTMX listeners refresh on.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub experience_id: String,
    pub quantity: Option<u32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub experience_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub shell: ShellView,
    pub cart: CartView,
    pub busy: bool,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub busy: bool,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Load the cart and drop snapshots the catalog no longer lists.
async fn load_fresh(state: &AppState, session: &Session) -> Result<Cart> {
    let mut cart = Cart::load(session).await;
    let before = cart.lines().count();
    cart.evict_stale(state.catalog());
    if cart.lines().count() != before {
        cart.save(session).await?;
    }
    Ok(cart)
}

/// Display the cart page.
///
/// Anonymous visitors get a sign-in prompt instead of the contents.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let cart = load_fresh(&state, &session).await?;
    let busy = state.in_flight().is_busy(cart.id());
    let cart = CartView::new(&cart, state.config().currency);
    let shell = ShellView::page(&state, &session, auth, nonce, "/cart").await?;

    Ok(CartShowTemplate { shell, cart, busy })
}

/// Add an experience to the cart.
///
/// Unknown ids leave the cart untouched. Returns the badge fragment for
/// HTMX, or redirects back to the cart otherwise.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await;
    let quantity = form.quantity.unwrap_or(1);

    if cart.add_item(state.catalog(), &form.experience_id, quantity) {
        cart.save(&session).await?;
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("experience_id", form.experience_id.as_str())]),
        );
    }

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Remove an experience's line from the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session, auth, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await;
    if cart.remove_item(&form.experience_id) {
        cart.save(&session).await?;
    }

    Ok(items_response(&state, &cart, &auth, &headers))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    headers: HeaderMap,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await;
    cart.clear();
    cart.save(&session).await?;

    Ok(items_response(&state, &cart, &auth, &headers))
}

fn items_response(
    state: &AppState,
    cart: &Cart,
    auth: &AuthState,
    headers: &HeaderMap,
) -> Response {
    if !is_htmx(headers) || !auth.is_authenticated() {
        return Redirect::to("/cart").into_response();
    }

    (
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::new(cart, state.config().currency),
            busy: state.in_flight().is_busy(cart.id()),
        },
    )
        .into_response()
}

/// Cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: Cart::load(&session).await.item_count(),
    }
}
