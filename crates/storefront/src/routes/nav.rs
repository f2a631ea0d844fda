//! Navigation bar toggles (HTMX).
//!
//! Each toggle updates the session's shell state and re-renders the menu
//! bar in place.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::Viewer;
use crate::routes::layout::ShellView;
use crate::shell::{Dropdown, ShellState};
use crate::state::AppState;

/// Menu bar fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/nav_menus.html")]
pub struct NavMenusTemplate {
    pub shell: ShellView,
}

/// Toggle a dropdown menu, closing any other.
///
/// # Errors
///
/// Returns 404 for an unknown menu name.
#[instrument(skip(state, session, auth))]
pub async fn toggle_dropdown(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    Path(menu): Path<String>,
) -> Result<impl IntoResponse> {
    let dropdown =
        Dropdown::parse(&menu).ok_or_else(|| AppError::NotFound(format!("menu {menu}")))?;

    let mut shell = ShellState::load(&session).await;
    shell.toggle_dropdown(dropdown);
    shell.save(&session).await?;

    Ok(NavMenusTemplate {
        shell: ShellView::fragment(&state, &session, auth, &shell).await,
    })
}

/// Toggle the mobile menu.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn toggle_mobile_menu(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
) -> Result<impl IntoResponse> {
    let mut shell = ShellState::load(&session).await;
    shell.toggle_mobile_menu();
    shell.save(&session).await?;

    Ok(NavMenusTemplate {
        shell: ShellView::fragment(&state, &session, auth, &shell).await,
    })
}
