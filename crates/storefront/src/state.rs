//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogAccessor, CatalogError, StaticCatalog};
use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::identity::{IdentityProvider, OAuthClient};
use crate::payments::{PaymentGateway, RazorpayClient};
use crate::services::InFlightCheckouts;

/// Error building application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog, external clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogAccessor>,
    content: ContentStore,
    payments: Arc<dyn PaymentGateway>,
    identity: Arc<dyn IdentityProvider>,
    in_flight: InFlightCheckouts,
}

impl AppState {
    /// Create application state from explicit collaborators.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogAccessor>,
        content: ContentStore,
        payments: Arc<dyn PaymentGateway>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                content,
                payments,
                identity,
                in_flight: InFlightCheckouts::default(),
            }),
        }
    }

    /// Load the catalog and content pages and build the production clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or content directory cannot be loaded.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = StaticCatalog::load(&config.content_dir.join("experiences.json"))?;
        let content = ContentStore::load(&config.content_dir)?;
        let payments = RazorpayClient::new(&config.payment);
        let identity = OAuthClient::new(&config.identity);

        Ok(Self::new(
            config,
            Arc::new(catalog),
            content,
            Arc::new(payments),
            Arc::new(identity),
        ))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the experience catalog.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogAccessor {
        self.inner.catalog.as_ref()
    }

    /// Get the markdown content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get the payment gateway client.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.inner.payments.as_ref()
    }

    /// Get the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get the in-flight checkout registry.
    #[must_use]
    pub fn in_flight(&self) -> &InFlightCheckouts {
        &self.inner.in_flight
    }
}
