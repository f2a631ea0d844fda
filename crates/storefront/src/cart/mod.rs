//! Session cart.
//!
//! The cart lives in the visitor's session. It holds one line per
//! experience plus a by-value snapshot of each experience, so the cart page
//! and badge render without going back to the catalog. A line whose
//! snapshot is missing is treated as stale: it is skipped when rendering and
//! contributes nothing to the total.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use slash_core::{CartId, ExperienceId};

use crate::catalog::{CatalogAccessor, Experience};
use crate::models::session_keys;

/// A cart line: intent to book `quantity` places on an experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub experience_id: ExperienceId,
    /// Always at least 1.
    pub quantity: u32,
}

/// A renderable cart line (item joined with its cached experience).
#[derive(Debug, Clone, Copy)]
pub struct CartLine<'a> {
    pub item: &'a CartItem,
    pub experience: &'a Experience,
}

impl CartLine<'_> {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.experience.price * Decimal::from(self.item.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    items: Vec<CartItem>,
    #[serde(default)]
    cached: HashMap<ExperienceId, Experience>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: fresh_id(),
            items: Vec::new(),
            cached: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &CartId {
        &self.id
    }

    /// Lines in insertion order, including stale ones.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cached snapshot for an experience in the cart.
    #[must_use]
    pub fn cached(&self, id: &str) -> Option<&Experience> {
        self.cached.get(id)
    }

    /// Add `quantity` places for an experience.
    ///
    /// Increments an existing line, otherwise resolves the experience in the
    /// catalog, appends a line and caches the snapshot. Unknown ids and a
    /// zero quantity leave the cart untouched. Returns whether the cart
    /// changed.
    pub fn add_item(
        &mut self,
        catalog: &dyn CatalogAccessor,
        experience_id: &str,
        quantity: u32,
    ) -> bool {
        if quantity == 0 {
            return false;
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.experience_id.as_str() == experience_id)
        {
            item.quantity = item.quantity.saturating_add(quantity);
            return true;
        }

        let Some(experience) = catalog.get(experience_id) else {
            tracing::debug!(experience_id, "Ignoring add for unknown experience");
            return false;
        };

        self.items.push(CartItem {
            experience_id: experience.id.clone(),
            quantity,
        });
        self.cached
            .insert(experience.id.clone(), experience.clone());
        true
    }

    /// Remove the whole line for an experience, along with its snapshot.
    ///
    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, experience_id: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| item.experience_id.as_str() != experience_id);
        self.cached.remove(experience_id);
        self.items.len() != before
    }

    /// Sum of quantities across all lines (drives the cart badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Lines that have a cached experience, in cart order.
    pub fn lines(&self) -> impl Iterator<Item = CartLine<'_>> {
        self.items.iter().filter_map(|item| {
            self.cached
                .get(&item.experience_id)
                .map(|experience| CartLine { item, experience })
        })
    }

    /// Σ(cached price × quantity); stale lines contribute nothing.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines().map(|line| line.line_total()).sum()
    }

    /// Drop snapshots for experiences the catalog no longer lists.
    ///
    /// The lines themselves stay so the visitor can still remove them; they
    /// simply stop rendering and stop counting towards the total.
    pub fn evict_stale(&mut self, catalog: &dyn CatalogAccessor) {
        self.cached.retain(|id, _| {
            let known = catalog.get(id.as_str()).is_some();
            if !known {
                tracing::info!(experience_id = %id, "Evicting stale cart snapshot");
            }
            known
        });
    }

    /// Empty the cart and start a new one under a fresh id.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Load the visitor's cart, starting an empty one when absent.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(session_keys::CART)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Persist the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::CART, self).await
    }
}

fn fresh_id() -> CartId {
    CartId::new(Uuid::new_v4().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::catalog::fixtures::{catalog, experience};

    #[test]
    fn test_repeated_adds_increment_single_line() {
        let catalog = catalog();
        let mut cart = Cart::new();

        for _ in 0..3 {
            assert!(cart.add_item(&catalog, "e1", 1));
        }
        cart.add_item(&catalog, "e2", 1);
        cart.add_item(&catalog, "e1", 1);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].experience_id.as_str(), "e1");
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(cart.items()[1].quantity, 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_unknown_experience_is_silent_noop() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert!(!cart.add_item(&catalog, "nope", 1));
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_zero_quantity_is_noop() {
        let catalog = catalog();
        let mut cart = Cart::new();
        assert!(!cart.add_item(&catalog, "e1", 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_drops_whole_line_and_snapshot() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "e1", 3);
        cart.add_item(&catalog, "e2", 1);

        assert!(cart.remove_item("e1"));
        assert_eq!(cart.item_count(), 1);
        assert!(cart.cached("e1").is_none());
        assert!(!cart.remove_item("e1"));
    }

    #[test]
    fn test_total_sums_cached_prices() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "e1", 2); // 2 × 50
        cart.add_item(&catalog, "e4", 1); // 1 × 90

        assert_eq!(cart.total(), Decimal::from(190));
    }

    #[test]
    fn test_stale_lines_excluded_from_total_and_lines() {
        let mut cart = Cart::new();
        cart.add_item(&catalog(), "e1", 2);
        cart.add_item(&catalog(), "e2", 1);

        // e2 is withdrawn from the catalog.
        let shrunk = StaticCatalog::new(vec![experience("e1", "Spa Day", "Goa", 50)]).unwrap();
        cart.evict_stale(&shrunk);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.lines().count(), 1);
        assert_eq!(cart.total(), Decimal::from(100));
        // Count still reflects every line the visitor holds.
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_clear_rotates_id() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "e1", 1);
        let old_id = cart.id().clone();

        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.cached("e1").is_none());
        assert_ne!(cart.id(), &old_id);
    }

    #[test]
    fn test_session_roundtrip_keeps_snapshots() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_item(&catalog, "e3", 2);

        let json = serde_json::to_value(&cart).unwrap();
        let restored: Cart = serde_json::from_value(json).unwrap();

        assert_eq!(restored.id(), cart.id());
        assert_eq!(restored.total(), Decimal::from(360));
    }
}
