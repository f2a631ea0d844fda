//! Checkout service.
//!
//! Checkout runs in two steps around the gateway's browser widget:
//! [`CheckoutService::begin`] creates a gateway order for the cart total,
//! and [`CheckoutService::complete`] verifies the signed payment and clears
//! the cart. A cart id can have only one checkout step in flight at a time,
//! and only one gateway order open until that order completes or fails.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, instrument, warn};

use slash_core::{CartId, CurrencyCode, Price};

use crate::cart::Cart;
use crate::models::{CurrentUser, PendingCheckout};
use crate::payments::{
    CheckoutOptions, OrderRequest, PaymentCompletion, PaymentConfirmation, PaymentError,
    PaymentGateway, Prefill, Theme,
};

/// Errors that can occur during checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Another checkout step is running for this cart, or it has an open
    /// gateway order for a different amount.
    #[error("checkout already in progress")]
    InProgress,

    /// The completion refers to a different order than the pending one.
    #[error("order does not match pending checkout")]
    OrderMismatch,

    /// The cart changed after the gateway order was created.
    #[error("cart changed since checkout started")]
    CartChanged,

    /// The cart total cannot be expressed in minor units.
    #[error("invalid cart total")]
    InvalidAmount,

    /// Payment gateway error.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),
}

// =============================================================================
// In-flight registry
// =============================================================================

/// Cart ids with a checkout step in progress.
#[derive(Debug, Clone, Default)]
pub struct InFlightCheckouts {
    carts: Arc<Mutex<HashSet<CartId>>>,
}

impl InFlightCheckouts {
    /// Claim the cart, or `None` if it is already claimed.
    #[must_use]
    pub fn try_begin(&self, cart_id: &CartId) -> Option<CheckoutPermit> {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        if !carts.insert(cart_id.clone()) {
            return None;
        }
        Some(CheckoutPermit {
            carts: Arc::clone(&self.carts),
            cart_id: cart_id.clone(),
        })
    }

    #[must_use]
    pub fn is_busy(&self, cart_id: &CartId) -> bool {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(cart_id)
    }
}

/// Releases the cart claim when dropped.
#[derive(Debug)]
pub struct CheckoutPermit {
    carts: Arc<Mutex<HashSet<CartId>>>,
    cart_id: CartId,
}

impl Drop for CheckoutPermit {
    fn drop(&mut self) {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.cart_id);
    }
}

// =============================================================================
// Service
// =============================================================================

/// A created gateway order plus the options for the browser widget.
#[derive(Debug, Clone)]
pub struct StartedCheckout {
    pub pending: PendingCheckout,
    pub options: CheckoutOptions,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    gateway: &'a dyn PaymentGateway,
    in_flight: &'a InFlightCheckouts,
    currency: CurrencyCode,
    store_name: &'a str,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(
        gateway: &'a dyn PaymentGateway,
        in_flight: &'a InFlightCheckouts,
        currency: CurrencyCode,
        store_name: &'a str,
    ) -> Self {
        Self {
            gateway,
            in_flight,
            currency,
            store_name,
        }
    }

    /// Create a gateway order for the cart.
    ///
    /// Returns `Ok(None)` when there is nothing to pay for. If `pending` is
    /// an open order for this cart and amount, that order is reused instead
    /// of creating another one.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InProgress` if the cart is already checking
    /// out or has an open order for a different amount, or
    /// `CheckoutError::Payment` if the gateway rejects the order.
    #[instrument(skip_all, fields(cart_id = %cart.id()))]
    pub async fn begin(
        &self,
        cart: &Cart,
        user: &CurrentUser,
        pending: Option<&PendingCheckout>,
    ) -> Result<Option<StartedCheckout>, CheckoutError> {
        if cart.is_empty() {
            return Ok(None);
        }
        let amount = self.payable_amount(cart)?;
        if amount == 0 {
            return Ok(None);
        }

        let _permit = self
            .in_flight
            .try_begin(cart.id())
            .ok_or(CheckoutError::InProgress)?;

        if let Some(pending) = pending.filter(|p| &p.cart_id == cart.id()) {
            if pending.amount_minor != amount {
                warn!(order_id = %pending.order_id, "Open order is for a different amount");
                return Err(CheckoutError::InProgress);
            }
            info!(order_id = %pending.order_id, "Resuming open checkout");
            return Ok(Some(StartedCheckout {
                options: self.options(cart, user, pending),
                pending: pending.clone(),
            }));
        }

        let order = self
            .gateway
            .create_order(&OrderRequest {
                amount,
                currency: self.currency,
                receipt: cart.id().to_string(),
            })
            .await?;

        info!(order_id = %order.id, amount, "Checkout started");

        let pending = PendingCheckout {
            cart_id: cart.id().clone(),
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        };
        Ok(Some(StartedCheckout {
            options: self.options(cart, user, &pending),
            pending,
        }))
    }

    /// Verify the gateway's completion and clear the cart.
    ///
    /// The cart is left untouched on every error path.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InProgress` if another step holds the cart,
    /// `CheckoutError::OrderMismatch` or `CheckoutError::CartChanged` if the
    /// completion no longer matches the cart, and `CheckoutError::Payment`
    /// if the signature does not verify.
    #[instrument(skip_all, fields(cart_id = %cart.id(), order_id = %completion.order_id))]
    pub async fn complete(
        &self,
        cart: &mut Cart,
        pending: &PendingCheckout,
        completion: &PaymentCompletion,
    ) -> Result<PaymentConfirmation, CheckoutError> {
        let permit = self
            .in_flight
            .try_begin(cart.id())
            .ok_or(CheckoutError::InProgress)?;

        if completion.order_id != pending.order_id {
            return Err(CheckoutError::OrderMismatch);
        }
        if &pending.cart_id != cart.id() || self.payable_amount(cart)? != pending.amount_minor {
            warn!("Cart changed between order creation and payment");
            return Err(CheckoutError::CartChanged);
        }

        let confirmation = self.gateway.verify_payment(completion).await?;

        drop(permit);
        cart.clear();

        info!(payment_id = %confirmation.payment_id, "Checkout completed");
        Ok(confirmation)
    }

    fn options(&self, cart: &Cart, user: &CurrentUser, pending: &PendingCheckout) -> CheckoutOptions {
        let count = cart.item_count();
        CheckoutOptions {
            key: self.gateway.key_id().to_string(),
            amount: pending.amount_minor,
            currency: pending.currency,
            name: self.store_name.to_string(),
            description: if count == 1 {
                "Booking for 1 experience".to_string()
            } else {
                format!("Booking for {count} experiences")
            },
            order_id: pending.order_id.clone(),
            prefill: Prefill {
                name: user.name.clone(),
                email: Some(user.email.to_string()),
                contact: None,
            },
            theme: Theme {
                color: self.gateway.theme_color().to_string(),
            },
        }
    }

    fn payable_amount(&self, cart: &Cart) -> Result<i64, CheckoutError> {
        Price::new(cart.total(), self.currency)
            .to_minor_units()
            .ok_or(CheckoutError::InvalidAmount)
    }
}
