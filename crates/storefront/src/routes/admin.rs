//! Admin login and dashboard route handlers.
//!
//! A single operator credential from configuration (id + argon2 hash).
//! When it is not configured every admin route answers 404.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireAdmin, Viewer};
use crate::models::{CurrentAdmin, Notification, session_keys};
use crate::routes::experiences::ExperienceView;
use crate::routes::layout::ShellView;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Admin login form data.
#[derive(Deserialize)]
pub struct AdminLoginForm {
    pub id: String,
    pub password: String,
}

impl std::fmt::Debug for AdminLoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminLoginForm")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub shell: ShellView,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct DashboardTemplate {
    pub shell: ShellView,
    pub admin_id: String,
    pub signed_in_at: String,
    pub experiences: Vec<ExperienceView>,
}

fn ensure_enabled(state: &AppState) -> Result<()> {
    if state.config().admin.is_none() {
        return Err(AuthError::AdminDisabled.into());
    }
    Ok(())
}

/// Display the admin login page.
///
/// # Errors
///
/// Returns 404 if admin login is not configured.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    ensure_enabled(&state)?;
    let shell = ShellView::page(&state, &session, auth, nonce, "/admin/login").await?;
    Ok(LoginTemplate { shell })
}

/// Verify admin credentials.
///
/// # Errors
///
/// Returns 404 if admin login is not configured.
#[instrument(skip(state, session))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AdminLoginForm>,
) -> Result<Response> {
    let service = AuthService::new(state.identity(), state.config().admin.as_ref());

    match service.admin_login(&form.id, &form.password) {
        Ok(admin) => {
            session.cycle_id().await?;
            session.insert(session_keys::CURRENT_ADMIN, &admin).await?;
            Notification::success("Signed in successfully")
                .push(&session)
                .await?;
            tracing::info!(admin_id = %admin.id, "Admin signed in");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Admin login rejected");
            Notification::error("Error signing in")
                .with_description("Invalid admin ID or password.")
                .push(&session)
                .await?;
            Ok(Redirect::to("/admin/login").into_response())
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Sign the admin out.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    session.cycle_id().await?;
    Ok(Redirect::to("/").into_response())
}

/// Display the admin dashboard.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Viewer(auth): Viewer,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let shell = ShellView::page(&state, &session, auth, nonce, "/admin").await?;
    let currency = state.config().currency;

    Ok(DashboardTemplate {
        shell,
        admin_id: admin.id,
        signed_in_at: admin.signed_in_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        experiences: state
            .catalog()
            .get_all()
            .iter()
            .map(|e| ExperienceView::new(e, currency))
            .collect(),
    })
}
