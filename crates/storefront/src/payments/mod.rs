//! Payment gateway integration.
//!
//! The storefront creates an order with the gateway, hands the browser the
//! gateway's checkout options, and verifies the signed completion the
//! gateway posts back. Settlement and refunds are the gateway's business.

mod razorpay;

pub use razorpay::RazorpayClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use slash_core::{CurrencyCode, OrderId, PaymentId};

/// Errors from the payment gateway.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway rejected the request.
    #[error("Gateway error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The completion signature did not match.
    #[error("Invalid payment signature")]
    InvalidSignature,
}

/// Request to create a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    pub currency: CurrencyCode,
    /// Merchant reference; the cart id.
    pub receipt: String,
}

/// An order created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: OrderId,
    pub amount: i64,
    pub currency: CurrencyCode,
}

/// Fields the gateway's checkout widget posts back after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentCompletion {
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: PaymentId,
    #[serde(rename = "razorpay_order_id")]
    pub order_id: OrderId,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

/// A verified payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
}

/// Options handed to the gateway's browser checkout widget.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub name: String,
    pub description: String,
    pub order_id: OrderId,
    pub prefill: Prefill,
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Prefill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub color: String,
}

/// A payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id the browser widget is initialised with.
    fn key_id(&self) -> &str;

    /// Theme colour for the browser widget.
    fn theme_color(&self) -> &str;

    /// Create an order for the given amount.
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, PaymentError>;

    /// Check the completion signature for an order.
    async fn verify_payment(
        &self,
        completion: &PaymentCompletion,
    ) -> Result<PaymentConfirmation, PaymentError>;
}
