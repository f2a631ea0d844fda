//! Search overlay route handlers (HTMX).
//!
//! The overlay's open flag and query live in the session's [`ShellState`].
//! Every way out of the overlay goes through a `ShellState` method, which
//! also releases the background scroll lock.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use slash_core::ExperienceId;

use crate::error::Result;
use crate::middleware::is_htmx;
use crate::routes::experiences::ExperienceView;
use crate::search::{MIN_QUERY_CHARS, POPULAR_SEARCHES};
use crate::shell::ShellState;
use crate::state::AppState;

/// Search overlay fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_overlay.html")]
pub struct SearchOverlayTemplate {
    pub query: String,
    pub panel: SearchPanel,
}

/// Results / suggestions panel inside the overlay.
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_results.html")]
pub struct SearchResultsTemplate {
    pub panel: SearchPanel,
}

/// What the overlay shows below the input.
pub struct SearchPanel {
    /// Whether the query is long enough to search.
    pub searching: bool,
    pub results: Vec<ExperienceView>,
    pub popular: Vec<&'static str>,
    pub recent: Vec<String>,
}

impl SearchPanel {
    fn new(state: &AppState, shell: &ShellState) -> Self {
        let query = shell.search().query();
        let currency = state.config().currency;
        Self {
            searching: query.chars().count() >= MIN_QUERY_CHARS,
            results: shell
                .search()
                .results(state.catalog())
                .into_iter()
                .map(|e| ExperienceView::new(e, currency))
                .collect(),
            popular: POPULAR_SEARCHES.to_vec(),
            recent: shell.recent().iter().map(String::from).collect(),
        }
    }
}

/// Query string carrying the overlay input.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Send the browser to `url`, via `HX-Redirect` for HTMX requests.
fn navigate_to(headers: &HeaderMap, url: &str) -> Response {
    if is_htmx(headers) {
        ([("HX-Redirect", url.to_string())], StatusCode::OK).into_response()
    } else {
        Redirect::to(url).into_response()
    }
}

/// Open the overlay.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn open(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let mut shell = ShellState::load(&session).await;
    shell.open_search();
    shell.save(&session).await?;

    Ok(SearchOverlayTemplate {
        query: shell.search().query().to_string(),
        panel: SearchPanel::new(&state, &shell),
    })
}

/// Close the overlay (close button, click outside, Escape).
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn close(session: Session) -> Result<impl IntoResponse> {
    let mut shell = ShellState::load(&session).await;
    shell.close_search();
    shell.save(&session).await?;

    Ok(Html(""))
}

/// Update the query and return the results panel.
///
/// Fewer than two characters shows the popular and recent searches; longer
/// queries show at most five matches.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(state, session))]
pub async fn suggest(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let mut shell = ShellState::load(&session).await;
    shell.set_query(query.q);
    shell.save(&session).await?;

    Ok(SearchResultsTemplate {
        panel: SearchPanel::new(&state, &shell),
    })
}

/// Submit the overlay form.
///
/// A blank query answers 204 and leaves the overlay open.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(session, headers))]
pub async fn submit(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<SearchQuery>,
) -> Result<Response> {
    let mut shell = ShellState::load(&session).await;
    shell.set_query(form.q);

    let Some(url) = shell.submit_search() else {
        shell.save(&session).await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    shell.save(&session).await?;

    Ok(navigate_to(&headers, &url))
}

/// Select a result from the overlay.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(session, headers))]
pub async fn select(
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let mut shell = ShellState::load(&session).await;
    let url = shell.select_result(&ExperienceId::new(id));
    shell.save(&session).await?;

    Ok(navigate_to(&headers, &url))
}

/// Pick a popular or recent search term.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip(session, headers))]
pub async fn term(
    session: Session,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let mut shell = ShellState::load(&session).await;
    let url = shell.choose_term(&query.q);
    shell.save(&session).await?;

    Ok(url.map_or_else(
        || StatusCode::NO_CONTENT.into_response(),
        |url| navigate_to(&headers, &url),
    ))
}
