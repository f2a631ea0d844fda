//! Identity provider sign-in route handlers.
//!
//! - Sign-in: stores CSRF state and nonce, redirects to the provider
//! - Callback: checks the state and the ID token nonce, stores the user
//! - Sign-out: revokes the provider token, then clears the user locally

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::identity::IdentityTokens;
use crate::middleware::auth::set_current_user;
use crate::models::{CurrentUser, Notification, PendingCheckout, session_keys};
use crate::services::{AuthService, StoredSignIn};
use crate::state::AppState;

/// Query parameters from the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.identity(), state.config().admin.as_ref())
}

fn callback_url(state: &AppState) -> String {
    state.config().url_for("/auth/callback")
}

async fn sign_in_failed(session: &Session) -> Result<Response> {
    Notification::error("Error signing in")
        .with_description("There was a problem signing in. Please try again.")
        .push(session)
        .await?;
    Ok(Redirect::to("/").into_response())
}

/// Redirect to the identity provider.
///
/// # Errors
///
/// Returns an error if the state and nonce cannot be stored.
#[instrument(skip_all)]
pub async fn sign_in(State(state): State<AppState>, session: Session) -> Result<Response> {
    let request = auth_service(&state).begin_sign_in(&callback_url(&state));

    session
        .insert(session_keys::OAUTH_STATE, &request.state)
        .await?;
    session
        .insert(session_keys::OAUTH_NONCE, &request.nonce)
        .await?;

    Ok(Redirect::to(&request.authorization_url).into_response())
}

/// Handle the identity provider callback.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Identity provider error: {error} - {description}");
        return sign_in_failed(&session).await;
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("Identity callback missing code or state");
        return sign_in_failed(&session).await;
    };

    // One-time use.
    let stored = StoredSignIn {
        state: session
            .remove(session_keys::OAUTH_STATE)
            .await
            .ok()
            .flatten(),
        nonce: session
            .remove(session_keys::OAUTH_NONCE)
            .await
            .ok()
            .flatten(),
    };

    let (user, tokens) = match auth_service(&state)
        .complete_sign_in(
            &stored,
            &returned_state,
            &code,
            &callback_url(&state),
        )
        .await
    {
        Ok(signed_in) => signed_in,
        Err(e) => {
            tracing::warn!("Sign-in failed: {e}");
            return sign_in_failed(&session).await;
        }
    };

    // New session id on privilege change.
    session.cycle_id().await?;
    set_current_user(&session, &user).await?;
    session.insert(session_keys::IDENTITY_TOKENS, &tokens).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "User signed in");
    Ok(Redirect::to("/").into_response())
}

/// Sign out.
///
/// The local session is cleared only after the provider accepts the token
/// revocation; otherwise the user stays signed in and sees an error.
///
/// # Errors
///
/// Returns an error if the session cannot be updated.
#[instrument(skip_all)]
pub async fn sign_out(State(state): State<AppState>, session: Session) -> Result<Response> {
    let tokens: Option<IdentityTokens> = session
        .get(session_keys::IDENTITY_TOKENS)
        .await
        .ok()
        .flatten();

    if let Err(e) = auth_service(&state).sign_out(tokens.as_ref()).await {
        tracing::error!("Error signing out: {e}");
        Notification::error("Error signing out")
            .with_description("There was a problem signing out. Please try again.")
            .push(&session)
            .await?;
        return Ok(Redirect::to("/").into_response());
    }

    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    session
        .remove::<IdentityTokens>(session_keys::IDENTITY_TOKENS)
        .await?;
    session
        .remove::<PendingCheckout>(session_keys::PENDING_CHECKOUT)
        .await?;
    session.cycle_id().await?;
    clear_sentry_user();

    Notification::success("Signed out successfully")
        .with_description("You have been signed out of your account.")
        .push(&session)
        .await?;

    Ok(Redirect::to("/").into_response())
}
