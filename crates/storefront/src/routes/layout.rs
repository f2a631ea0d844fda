//! Page chrome shared by every template: navigation bar, menus, cart badge
//! and toasts.

use rust_decimal::Decimal;
use tower_sessions::Session;

use slash_core::{CurrencyCode, Price};

use crate::cart::{Cart, CartLine};
use crate::content::{MenuLink, MenuSection};
use crate::error::Result;
use crate::models::{AuthState, CurrentUser, Notification};
use crate::shell::{Dropdown, ShellState};
use crate::state::AppState;

/// Format a catalog amount in the store currency.
#[must_use]
pub fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).to_string()
}

// =============================================================================
// Cart display
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub url: String,
    pub title: String,
    pub location: String,
    pub date: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            lines: cart
                .lines()
                .map(|line| CartLineView::new(&line, currency))
                .collect(),
            total: format_price(cart.total(), currency),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl CartLineView {
    fn new(line: &CartLine<'_>, currency: CurrencyCode) -> Self {
        let experience = line.experience;
        Self {
            id: experience.id.to_string(),
            url: experience.url(),
            title: experience.title.clone(),
            location: experience.location.clone(),
            date: experience.date.clone(),
            image_url: experience.image_url.clone(),
            quantity: line.item.quantity,
            unit_price: format_price(experience.price, currency),
            line_total: format_price(line.line_total(), currency),
        }
    }
}

// =============================================================================
// Shell
// =============================================================================

/// Navigation shell display data.
pub struct ShellView {
    pub store_name: String,
    pub nonce: String,
    pub auth: AuthState,
    pub cart: CartView,
    pub primary_menu: Vec<MenuLink>,
    pub company_menu: Vec<MenuLink>,
    pub support_menu: Vec<MenuLink>,
    pub open_dropdown: Option<Dropdown>,
    pub mobile_menu_open: bool,
    pub search_query: String,
    pub admin_enabled: bool,
    pub notifications: Vec<Notification>,
}

impl ShellView {
    /// Chrome for a full page at `path`.
    ///
    /// Arriving at a page is a navigation: the overlay, dropdowns and mobile
    /// menu close, and queued notifications are drained for display.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell state cannot be saved.
    pub async fn page(
        state: &AppState,
        session: &Session,
        auth: AuthState,
        nonce: String,
        path: &str,
    ) -> Result<Self> {
        let mut shell = ShellState::load(session).await;
        shell.navigate(path);
        shell.save(session).await?;

        let mut view = Self::build(state, session, auth, nonce, &shell).await;
        view.notifications = Notification::take_all(session).await;
        Ok(view)
    }

    /// Chrome re-rendered in place after a toggle.
    pub async fn fragment(
        state: &AppState,
        session: &Session,
        auth: AuthState,
        shell: &ShellState,
    ) -> Self {
        Self::build(state, session, auth, String::new(), shell).await
    }

    async fn build(
        state: &AppState,
        session: &Session,
        auth: AuthState,
        nonce: String,
        shell: &ShellState,
    ) -> Self {
        let config = state.config();
        let content = state.content();
        let cart = Cart::load(session).await;

        let mut primary_menu = vec![MenuLink {
            title: "All Experiences".to_string(),
            summary: String::new(),
            href: "/experiences".to_string(),
        }];
        primary_menu.extend(content.menu(MenuSection::Primary));

        Self {
            store_name: config.store_name.clone(),
            nonce,
            auth,
            cart: CartView::new(&cart, config.currency),
            primary_menu,
            company_menu: content.menu(MenuSection::Company),
            support_menu: content.menu(MenuSection::Support),
            open_dropdown: shell.open_dropdown(),
            mobile_menu_open: shell.mobile_menu_open(),
            search_query: shell.search().query().to_string(),
            admin_enabled: config.admin.is_some(),
            notifications: Vec::new(),
        }
    }

    /// Whether the named dropdown is open.
    #[must_use]
    pub fn dropdown_open(&self, name: &str) -> bool {
        self.open_dropdown.is_some() && self.open_dropdown == Dropdown::parse(name)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        self.auth.user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_uses_currency_symbol() {
        assert_eq!(format_price(Decimal::from(50), CurrencyCode::INR), "₹50.00");
        assert_eq!(format_price(Decimal::new(1999, 2), CurrencyCode::USD), "$19.99");
    }
}
