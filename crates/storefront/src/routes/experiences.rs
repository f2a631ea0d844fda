//! Catalog pages: home grid, browse results and experience detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use slash_core::CurrencyCode;

use crate::catalog::Experience;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, Viewer};
use crate::routes::layout::{ShellView, format_price};
use crate::search;
use crate::state::AppState;

/// Experience card display data for templates.
#[derive(Clone)]
pub struct ExperienceView {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub image_url: String,
    pub price: String,
}

impl ExperienceView {
    #[must_use]
    pub fn new(experience: &Experience, currency: CurrencyCode) -> Self {
        Self {
            id: experience.id.to_string(),
            url: experience.url(),
            title: experience.title.clone(),
            description: experience.description.clone(),
            location: experience.location.clone(),
            date: experience.date.clone(),
            image_url: experience.image_url.clone(),
            price: format_price(experience.price, currency),
        }
    }
}

fn cards<'a>(
    experiences: impl IntoIterator<Item = &'a Experience>,
    currency: CurrencyCode,
) -> Vec<ExperienceView> {
    experiences
        .into_iter()
        .map(|e| ExperienceView::new(e, currency))
        .collect()
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: ShellView,
    pub experiences: Vec<ExperienceView>,
}

/// Browse page template.
#[derive(Template, WebTemplate)]
#[template(path = "experiences/index.html")]
pub struct BrowseTemplate {
    pub shell: ShellView,
    pub search: String,
    pub experiences: Vec<ExperienceView>,
}

/// Experience detail template.
#[derive(Template, WebTemplate)]
#[template(path = "experiences/show.html")]
pub struct ShowTemplate {
    pub shell: ShellView,
    pub experience: ExperienceView,
}

/// Browse query parameters.
#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub search: String,
}

/// Display the home page.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let shell = ShellView::page(&state, &session, auth, nonce, "/").await?;
    let experiences = cards(state.catalog().get_all(), state.config().currency);

    Ok(HomeTemplate { shell, experiences })
}

/// Display the browse page, optionally filtered.
///
/// Uses the overlay's matching rules without the result cap.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session, auth, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
    Query(query): Query<BrowseQuery>,
) -> Result<impl IntoResponse> {
    let shell = ShellView::page(&state, &session, auth, nonce, "/experiences").await?;
    let search = query.search.trim().to_string();
    let currency = state.config().currency;

    let experiences = if search.is_empty() {
        cards(state.catalog().get_all(), currency)
    } else {
        cards(search::browse(state.catalog(), &search), currency)
    };

    Ok(BrowseTemplate {
        shell,
        search,
        experiences,
    })
}

/// Display an experience.
///
/// # Errors
///
/// Returns 404 if the catalog does not list the id.
#[instrument(skip(state, session, auth, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let experience = state
        .catalog()
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("experience {id}")))?;
    let experience = ExperienceView::new(experience, state.config().currency);

    let shell = ShellView::page(&state, &session, auth, nonce, &experience.url).await?;

    Ok(ShowTemplate { shell, experience })
}
