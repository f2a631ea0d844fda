//! Razorpay orders API client.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, instrument, warn};

use super::{
    GatewayOrder, OrderRequest, PaymentCompletion, PaymentConfirmation, PaymentError,
    PaymentGateway,
};
use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    api_base: String,
    key_id: String,
    key_secret: SecretString,
    theme_color: String,
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("api_base", &self.api_base)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl RazorpayClient {
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            theme_color: config.theme_color.clone(),
        }
    }

    /// Hex HMAC-SHA256 of `order_id|payment_id` under the key secret.
    fn expected_signature(&self, order_id: &str, payment_id: &str) -> Result<HmacSha256, PaymentError> {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.expose_secret().as_bytes())
            .map_err(|_| PaymentError::InvalidSignature)?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(mac)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn theme_color(&self) -> &str {
        &self.theme_color
    }

    #[instrument(skip(self), fields(amount = request.amount, receipt = %request.receipt))]
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, PaymentError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.api_base))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Razorpay order creation failed");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = response.json().await?;
        debug!(order_id = %order.id, "Razorpay order created");
        Ok(order)
    }

    #[instrument(skip(self, completion), fields(order_id = %completion.order_id))]
    async fn verify_payment(
        &self,
        completion: &PaymentCompletion,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let signature =
            hex::decode(completion.signature.trim()).map_err(|_| PaymentError::InvalidSignature)?;

        self.expected_signature(
            completion.order_id.as_str(),
            completion.payment_id.as_str(),
        )?
        .verify_slice(&signature)
        .map_err(|_| PaymentError::InvalidSignature)?;

        debug!("Razorpay signature verified");

        Ok(PaymentConfirmation {
            order_id: completion.order_id.clone(),
            payment_id: completion.payment_id.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slash_core::{OrderId, PaymentId};

    use super::*;

    fn client(secret: &str) -> RazorpayClient {
        RazorpayClient::new(&PaymentConfig {
            api_base: "https://api.razorpay.com/".to_string(),
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from(secret.to_string()),
            theme_color: "#6D28D9".to_string(),
        })
    }

    fn sign(secret: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn completion(signature: String) -> PaymentCompletion {
        PaymentCompletion {
            payment_id: PaymentId::new("pay_29QQoUBi66xm2f"),
            order_id: OrderId::new("order_9A33XWu170gUtm"),
            signature,
        }
    }

    #[tokio::test]
    async fn test_signature_verification_valid() {
        let client = client("test-key-secret");
        let signature = sign("test-key-secret", "order_9A33XWu170gUtm|pay_29QQoUBi66xm2f");

        let confirmation = client.verify_payment(&completion(signature)).await.unwrap();
        assert_eq!(confirmation.payment_id.as_str(), "pay_29QQoUBi66xm2f");
    }

    #[tokio::test]
    async fn test_signature_verification_wrong_secret() {
        let client = client("test-key-secret");
        let signature = sign("another-secret", "order_9A33XWu170gUtm|pay_29QQoUBi66xm2f");

        let result = client.verify_payment(&completion(signature)).await;
        assert!(matches!(result, Err(PaymentError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_signature_verification_tampered_payment() {
        let client = client("test-key-secret");
        let signature = sign("test-key-secret", "order_9A33XWu170gUtm|pay_other");

        let result = client.verify_payment(&completion(signature)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_signature_verification_not_hex() {
        let client = client("test-key-secret");
        let result = client
            .verify_payment(&completion("not-a-signature".to_string()))
            .await;
        assert!(matches!(result, Err(PaymentError::InvalidSignature)));
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        assert_eq!(client("s").api_base, "https://api.razorpay.com");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", client("super-secret-value"));
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }
}
