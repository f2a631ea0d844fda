//! Navigation shell view state.
//!
//! Everything the navigation bar toggles lives on one struct, [`ShellState`],
//! stored in the visitor's session: the search overlay, the background
//! scroll lock that follows it, the open dropdown, and the mobile menu.
//! Every exit path out of the overlay goes through a method here so the
//! scroll lock is always released.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use slash_core::ExperienceId;

use crate::models::session_keys;
use crate::search::{RecentSearches, SearchOverlay, browse_url};

/// Navigation dropdowns. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dropdown {
    Company,
    Support,
    Cart,
    Account,
}

impl Dropdown {
    /// Parse the path segment used by the toggle route.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "company" => Some(Self::Company),
            "support" => Some(Self::Support),
            "cart" => Some(Self::Cart),
            "account" => Some(Self::Account),
            _ => None,
        }
    }
}

/// View state owned by the navigation shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellState {
    search: SearchOverlay,
    #[serde(default)]
    recent: RecentSearches,
    #[serde(default)]
    open_dropdown: Option<Dropdown>,
    #[serde(default)]
    mobile_menu_open: bool,
}

impl ShellState {
    #[must_use]
    pub const fn search(&self) -> &SearchOverlay {
        &self.search
    }

    #[must_use]
    pub const fn recent(&self) -> &RecentSearches {
        &self.recent
    }

    #[must_use]
    pub const fn open_dropdown(&self) -> Option<Dropdown> {
        self.open_dropdown
    }

    #[must_use]
    pub const fn mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    /// Background scrolling is suspended exactly while the overlay is open.
    #[must_use]
    pub const fn scroll_locked(&self) -> bool {
        self.search.is_open()
    }

    pub fn open_search(&mut self) {
        self.open_dropdown = None;
        self.search.open();
    }

    pub fn close_search(&mut self) {
        self.search.close();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.search.set_query(query);
    }

    /// Submit the overlay form.
    ///
    /// A blank query is a no-op (the overlay stays open). Otherwise the query
    /// is remembered, the overlay closes, and the browse URL is returned.
    pub fn submit_search(&mut self) -> Option<String> {
        let url = browse_url(self.search.query())?;
        self.recent.record(self.search.query());
        self.close_search();
        Some(url)
    }

    /// Pick a popular or recent term: it becomes the query and the visitor
    /// is sent to the browse page.
    pub fn choose_term(&mut self, term: &str) -> Option<String> {
        self.search.set_query(term);
        let url = browse_url(term)?;
        Some(self.navigate(&url))
    }

    /// Select an overlay result.
    pub fn select_result(&mut self, id: &ExperienceId) -> String {
        let url = format!("/experience/{}", urlencoding::encode(id.as_str()));
        self.navigate(&url)
    }

    /// Leave the current view: closes the overlay, dropdowns and mobile menu.
    pub fn navigate(&mut self, path: &str) -> String {
        self.close_search();
        self.open_dropdown = None;
        self.mobile_menu_open = false;
        path.to_string()
    }

    /// Toggle a dropdown, closing any other.
    pub fn toggle_dropdown(&mut self, dropdown: Dropdown) {
        self.open_dropdown = if self.open_dropdown == Some(dropdown) {
            None
        } else {
            Some(dropdown)
        };
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    /// Load the shell state from the session, defaulting when absent or
    /// unreadable.
    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(session_keys::SHELL)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Persist the shell state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::SHELL, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_drives_scroll_lock() {
        let mut shell = ShellState::default();
        assert!(!shell.scroll_locked());

        shell.open_search();
        assert!(shell.scroll_locked());

        shell.close_search();
        assert!(!shell.scroll_locked());
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut shell = ShellState::default();
        shell.open_search();
        shell.set_query("   ");

        assert_eq!(shell.submit_search(), None);
        assert!(shell.scroll_locked());
        assert!(shell.recent().is_empty());
    }

    #[test]
    fn test_submit_closes_overlay_and_records_query() {
        let mut shell = ShellState::default();
        shell.open_search();
        shell.set_query(" spa day ");

        assert_eq!(
            shell.submit_search().as_deref(),
            Some("/experiences?search=spa%20day")
        );
        assert!(!shell.scroll_locked());
        assert_eq!(shell.recent().iter().collect::<Vec<_>>(), vec!["spa day"]);
    }

    #[test]
    fn test_every_exit_path_releases_scroll_lock() {
        let mut shell = ShellState::default();

        shell.open_search();
        shell.select_result(&ExperienceId::new("e1"));
        assert!(!shell.scroll_locked());

        shell.open_search();
        assert_eq!(
            shell.choose_term("Hot Air Balloon").as_deref(),
            Some("/experiences?search=Hot%20Air%20Balloon")
        );
        assert!(!shell.scroll_locked());
        assert_eq!(shell.search().query(), "Hot Air Balloon");

        shell.open_search();
        shell.navigate("/about-us");
        assert!(!shell.scroll_locked());
    }

    #[test]
    fn test_single_dropdown_open() {
        let mut shell = ShellState::default();
        shell.toggle_dropdown(Dropdown::Company);
        assert_eq!(shell.open_dropdown(), Some(Dropdown::Company));

        shell.toggle_dropdown(Dropdown::Support);
        assert_eq!(shell.open_dropdown(), Some(Dropdown::Support));

        shell.toggle_dropdown(Dropdown::Support);
        assert_eq!(shell.open_dropdown(), None);
    }

    #[test]
    fn test_navigation_closes_menus() {
        let mut shell = ShellState::default();
        shell.toggle_dropdown(Dropdown::Account);
        shell.toggle_mobile_menu();

        assert_eq!(shell.navigate("/cart"), "/cart");
        assert_eq!(shell.open_dropdown(), None);
        assert!(!shell.mobile_menu_open());
    }

    #[test]
    fn test_opening_search_closes_dropdown() {
        let mut shell = ShellState::default();
        shell.toggle_dropdown(Dropdown::Cart);
        shell.open_search();
        assert_eq!(shell.open_dropdown(), None);
    }

    #[test]
    fn test_dropdown_parse() {
        assert_eq!(Dropdown::parse("company"), Some(Dropdown::Company));
        assert_eq!(Dropdown::parse("nope"), None);
    }
}
