//! Markdown content page route handler.
//!
//! Serves the pages under `content/pages`, including everything linked from
//! the Company and Support menus.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, Viewer};
use crate::routes::layout::ShellView;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub shell: ShellView,
    pub title: String,
    pub summary: String,
    pub content_html: String,
}

/// Serve a content page by slug.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, session, auth, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = state
        .content()
        .get_page(&slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;
    let (title, summary, content_html) = (
        page.meta.title.clone(),
        page.meta.summary.clone().unwrap_or_default(),
        page.content_html.clone(),
    );

    let shell = ShellView::page(&state, &session, auth, nonce, &format!("/{slug}")).await?;

    Ok(ContentPageTemplate {
        shell,
        title,
        summary,
        content_html,
    })
}
