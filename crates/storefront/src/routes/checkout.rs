//! Checkout route handlers.
//!
//! `POST /checkout` creates a gateway order and renders the payment page,
//! whose script opens the gateway widget. The widget reports back through
//! `POST /checkout/complete` (signed success) or `POST /checkout/failed`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::Cart;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, RequireAuth};
use crate::models::{AuthState, Notification, PendingCheckout, session_keys};
use crate::payments::PaymentCompletion;
use crate::routes::layout::{CartView, ShellView};
use crate::services::{CheckoutError, CheckoutService};
use crate::state::AppState;

const BOOKING_CONFIRMED: &str = "Booking confirmed successfully!";
const BOOKING_FAILED: &str = "Failed to process booking";

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/pay.html")]
pub struct PayTemplate {
    pub shell: ShellView,
    pub cart: CartView,
    /// Gateway widget options, serialized for the page script.
    pub options_json: String,
    /// Open gateway order; cancelling the payment reports it as failed.
    pub order_id: String,
}

/// Failure report from the gateway widget.
#[derive(Debug, Deserialize)]
pub struct FailedForm {
    pub order_id: Option<String>,
    pub error_description: Option<String>,
}

fn service(state: &AppState) -> CheckoutService<'_> {
    let config = state.config();
    CheckoutService::new(
        state.payments(),
        state.in_flight(),
        config.currency,
        &config.store_name,
    )
}

async fn load_pending(session: &Session) -> Option<PendingCheckout> {
    session
        .get::<PendingCheckout>(session_keys::PENDING_CHECKOUT)
        .await
        .ok()
        .flatten()
}

async fn release_pending(session: &Session) -> Result<()> {
    session
        .remove::<PendingCheckout>(session_keys::PENDING_CHECKOUT)
        .await?;
    Ok(())
}

/// Start checkout for the signed-in user's cart.
///
/// An empty cart (or one with nothing to pay) goes back to the cart page.
/// A gateway failure queues an error notification and leaves the cart as
/// it was. While the cart has an open gateway order for the same amount,
/// that order is shown again.
///
/// # Errors
///
/// Returns 409 if a checkout for this cart is already running, or its open
/// order is for a different amount.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let mut cart = Cart::load(&session).await;
    cart.evict_stale(state.catalog());

    let pending = load_pending(&session).await;

    let started = match service(&state)
        .begin(&cart, &user, pending.as_ref())
        .await
    {
        Ok(Some(started)) => started,
        Ok(None) => return Ok(Redirect::to("/cart").into_response()),
        Err(CheckoutError::InProgress) => return Err(CheckoutError::InProgress.into()),
        Err(e) => {
            tracing::error!("Failed to start checkout: {e}");
            Notification::error(BOOKING_FAILED).push(&session).await?;
            return Ok(Redirect::to("/cart").into_response());
        }
    };

    session
        .insert(session_keys::PENDING_CHECKOUT, &started.pending)
        .await?;
    add_breadcrumb(
        "checkout",
        "Gateway order created",
        Some(&[("order_id", started.pending.order_id.as_str())]),
    );

    // Emitted inside an inline script; `</script>` must not survive.
    let options_json = serde_json::to_string(&started.options)
        .map_err(|e| AppError::Internal(format!("checkout options: {e}")))?
        .replace('<', "\\u003c");
    let cart = CartView::new(&cart, state.config().currency);
    let shell = ShellView::page(
        &state,
        &session,
        AuthState::Authenticated(user),
        nonce,
        "/checkout",
    )
    .await?;

    Ok(PayTemplate {
        shell,
        cart,
        options_json,
        order_id: started.pending.order_id.into_inner(),
    }
    .into_response())
}

/// Handle the gateway's signed success callback.
///
/// On success the cart is cleared and the visitor lands on the home page
/// with a confirmation; on any failure the cart is untouched and the
/// visitor returns to it with an error notification. A completion for
/// another order leaves the open order in place.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all, fields(order_id = %completion.order_id))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Form(completion): Form<PaymentCompletion>,
) -> Result<Response> {
    let Some(pending) = load_pending(&session).await else {
        tracing::warn!("Payment completion without a pending checkout");
        Notification::error(BOOKING_FAILED).push(&session).await?;
        return Ok(Redirect::to("/cart").into_response());
    };

    let mut cart = Cart::load(&session).await;

    match service(&state)
        .complete(&mut cart, &pending, &completion)
        .await
    {
        Ok(confirmation) => {
            release_pending(&session).await?;
            cart.save(&session).await?;
            add_breadcrumb(
                "checkout",
                "Booking confirmed",
                Some(&[("payment_id", confirmation.payment_id.as_str())]),
            );
            Notification::success(BOOKING_CONFIRMED)
                .push(&session)
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!("Payment completion rejected: {e}");
            if !matches!(e, CheckoutError::OrderMismatch | CheckoutError::InProgress) {
                release_pending(&session).await?;
            }
            Notification::error(BOOKING_FAILED).push(&session).await?;
            Ok(Redirect::to("/cart").into_response())
        }
    }
}

/// Handle a payment failure reported by the gateway widget.
///
/// Only a failure for the open order closes it.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all, fields(order_id = ?form.order_id))]
pub async fn failed(
    session: Session,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<FailedForm>,
) -> Result<Response> {
    match load_pending(&session).await {
        Some(pending) if form.order_id.as_deref() == Some(pending.order_id.as_str()) => {
            release_pending(&session).await?;
        }
        Some(pending) => {
            tracing::warn!(open_order = %pending.order_id, "Payment failure for another order");
        }
        None => {}
    }

    let mut notification = Notification::error(BOOKING_FAILED);
    if let Some(description) = form.error_description.filter(|d| !d.trim().is_empty()) {
        notification = notification.with_description(description);
    }
    notification.push(&session).await?;

    Ok(Redirect::to("/cart").into_response())
}
