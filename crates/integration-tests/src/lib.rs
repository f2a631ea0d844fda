//! Integration test harness for the Slash storefront.
//!
//! Builds the full application router in-process with an in-memory session
//! store and stub collaborators, so the tests need neither a database nor
//! network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p slash-integration-tests
//! ```
//!
//! Each [`TestContext`] is one browser: it keeps the session cookie between
//! requests and sends a fixed client IP so the rate limiters can key it.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use slash_core::{CurrencyCode, OrderId};
use slash_storefront::catalog::StaticCatalog;
use slash_storefront::config::{AdminConfig, IdentityConfig, PaymentConfig, StorefrontConfig};
use slash_storefront::content::ContentStore;
use slash_storefront::identity::{
    IdentityError, IdentityProfile, IdentityProvider, IdentityTokens,
};
use slash_storefront::middleware::create_session_layer;
use slash_storefront::payments::{
    GatewayOrder, OrderRequest, PaymentCompletion, PaymentConfirmation, PaymentError,
    PaymentGateway,
};
use slash_storefront::state::AppState;

/// Signature the stub gateway accepts.
pub const VALID_SIGNATURE: &str = "valid-signature";
/// Order id the stub gateway issues.
pub const ORDER_ID: &str = "order_test_1";
/// Admin login configured for tests.
pub const ADMIN_ID: &str = "ops";
pub const ADMIN_PASSWORD: &str = "balloon-over-jaipur";
/// Email of the stub identity provider's user.
pub const USER_EMAIL: &str = "asha@example.com";

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Payment gateway stub recording the orders it was asked to create.
#[derive(Debug, Default)]
pub struct StubGateway {
    orders: Mutex<Vec<OrderRequest>>,
}

impl StubGateway {
    /// Orders created so far.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().expect("orders lock").clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    fn key_id(&self) -> &str {
        "rzp_test_key"
    }

    fn theme_color(&self) -> &str {
        "#e11d48"
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, PaymentError> {
        self.orders.lock().expect("orders lock").push(request.clone());
        Ok(GatewayOrder {
            id: OrderId::new(ORDER_ID),
            amount: request.amount,
            currency: request.currency,
        })
    }

    async fn verify_payment(
        &self,
        completion: &PaymentCompletion,
    ) -> Result<PaymentConfirmation, PaymentError> {
        if completion.signature != VALID_SIGNATURE {
            return Err(PaymentError::InvalidSignature);
        }
        Ok(PaymentConfirmation {
            order_id: completion.order_id.clone(),
            payment_id: completion.payment_id.clone(),
        })
    }
}

/// Identity provider stub with a single user.
///
/// Its ID tokens carry the nonce from the latest authorization URL.
#[derive(Debug, Default)]
pub struct StubIdentity {
    /// Make token revocation fail.
    pub refuse_revoke: bool,
    /// Issue ID tokens with a nonce from some other sign-in.
    pub stale_nonce: bool,
    pub issued_nonce: Mutex<Option<String>>,
}

impl StubIdentity {
    fn id_token(&self) -> String {
        let nonce = if self.stale_nonce {
            "nonce-from-another-sign-in".to_string()
        } else {
            self.issued_nonce
                .lock()
                .expect("nonce lock")
                .clone()
                .unwrap_or_default()
        };
        let claims = format!(r#"{{"sub":"user-1","aud":"slash-test","nonce":"{nonce}"}}"#);
        format!(
            "{}.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        let mut url = url::Url::parse("https://accounts.test/authorize").expect("static url");
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state)
            .append_pair("nonce", nonce);
        *self.issued_nonce.lock().expect("nonce lock") = Some(nonce.to_string());
        url.into()
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<IdentityTokens, IdentityError> {
        if code != "good-code" {
            return Err(IdentityError::OAuth("invalid_grant".to_string()));
        }
        Ok(IdentityTokens {
            access_token: "access-token".to_string(),
            id_token: Some(self.id_token()),
            refresh_token: None,
            expires_in: Some(3600),
            obtained_at: 0,
        })
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<IdentityProfile, IdentityError> {
        Ok(IdentityProfile {
            sub: "user-1".to_string(),
            email: Some(USER_EMAIL.to_string()),
            name: Some("Asha Rao".to_string()),
            picture: None,
        })
    }

    async fn revoke(&self, _token: &str) -> Result<(), IdentityError> {
        if self.refuse_revoke {
            return Err(IdentityError::OAuth("revocation refused".to_string()));
        }
        Ok(())
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Target of a redirect (`Location`) or HTMX navigation (`HX-Redirect`).
    pub fn location(&self) -> Option<&str> {
        self.header("location").or_else(|| self.header("hx-redirect"))
    }
}

/// One simulated browser against a fresh application.
pub struct TestContext {
    router: Router,
    gateway: Arc<StubGateway>,
    cookie: Option<String>,
    client_ip: String,
}

impl TestContext {
    /// Application with default stubs.
    pub fn new() -> Self {
        Self::with_identity(StubIdentity::default())
    }

    /// Application with a custom identity provider stub.
    pub fn with_identity(identity: StubIdentity) -> Self {
        let config = test_config();
        let catalog = StaticCatalog::load(&config.content_dir.join("experiences.json"))
            .expect("load catalog");
        let content = ContentStore::load(&config.content_dir).expect("load content");
        let gateway = Arc::new(StubGateway::default());

        let state = AppState::new(
            config,
            Arc::new(catalog),
            content,
            gateway.clone(),
            Arc::new(identity),
        );
        let router = slash_storefront::app(state, create_session_layer(MemoryStore::default(), false));

        Self {
            router,
            gateway,
            cookie: None,
            client_ip: "198.51.100.23".to_string(),
        }
    }

    /// Orders the stub gateway received.
    pub fn gateway_orders(&self) -> Vec<OrderRequest> {
        self.gateway.orders()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, false).await
    }

    pub async fn htmx_get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, true).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, path, Some(encode_form(form)), false).await
    }

    pub async fn htmx_post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(Method::POST, path, Some(encode_form(form)), true).await
    }

    /// Current `name=value` session cookie, if one was issued.
    pub fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Complete the OAuth flow against the stub provider.
    pub async fn sign_in(&mut self) {
        let start = self.get("/auth/sign-in").await;
        let authorize = url::Url::parse(start.location().expect("authorize redirect"))
            .expect("authorize url");
        let state = authorize
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .expect("state parameter");

        let callback = self
            .get(&format!("/auth/callback?code=good-code&state={state}"))
            .await;
        assert_eq!(callback.location(), Some("/"), "sign-in should land on home");
    }

    async fn send(
        &mut self,
        method: Method,
        path: &str,
        form: Option<String>,
        htmx: bool,
    ) -> TestResponse {
        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .header("x-forwarded-for", &self.client_ip);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if htmx {
            request = request.header("hx-request", "true");
        }
        let body = match form {
            Some(form) => {
                request = request.header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                );
                Body::from(form)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("infallible router");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_form(form: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish()
}

fn test_config() -> StorefrontConfig {
    let content_dir =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/content");
    let password_hash = slash_storefront::services::auth::hash_password(ADMIN_PASSWORD)
        .expect("hash admin password");

    StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        store_name: "Slash".to_string(),
        currency: CurrencyCode::INR,
        content_dir,
        payment: PaymentConfig {
            api_base: "https://api.razorpay.test".to_string(),
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from("unused"),
            theme_color: "#e11d48".to_string(),
        },
        identity: IdentityConfig {
            client_id: "client".to_string(),
            client_secret: SecretString::from("unused"),
            authorize_url: "https://accounts.test/authorize".to_string(),
            token_url: "https://accounts.test/token".to_string(),
            userinfo_url: "https://accounts.test/userinfo".to_string(),
            revoke_url: "https://accounts.test/revoke".to_string(),
        },
        admin: Some(AdminConfig {
            id: ADMIN_ID.to_string(),
            password_hash: SecretString::from(password_hash),
        }),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
