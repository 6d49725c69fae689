use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use domain::repositories::{email::MailboxOauthClient, settings::SettingsRepository};
use infra::{
    crypto::token_cipher::TokenCipher,
    db::{postgres_connection::PgPoolSquad, repositories::settings::SettingsPostgres},
    email::gmail_client::GmailApiClient,
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, config::config_model::DotEnvyConfig,
    usecases::gmail_oauth::GmailOauthUseCase,
};

pub struct GmailAuthState<S, O>
where
    S: SettingsRepository + Send + Sync + 'static,
    O: MailboxOauthClient + Send + Sync + 'static,
{
    oauth: GmailOauthUseCase<S, O>,
    app_base_url: String,
}

/// Google's callback carries either a code or an error, never both.
#[derive(Debug, Deserialize)]
pub struct OauthCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let settings_repository = Arc::new(SettingsPostgres::new(Arc::clone(&db_pool)));
    let gmail_client = Arc::new(GmailApiClient::new(
        config.gmail.client_id.clone(),
        config.gmail.client_secret.clone(),
        config.gmail.redirect_uri.clone(),
        TokenCipher::new(&config.encryption.key),
        Arc::clone(&settings_repository),
    ));
    let oauth = GmailOauthUseCase::new(settings_repository, gmail_client);

    Router::new()
        .route("/", get(connect))
        .route("/callback", get(callback))
        .route("/disconnect", post(disconnect))
        .with_state(Arc::new(GmailAuthState {
            oauth,
            app_base_url: config.app.base_url.clone(),
        }))
}

pub async fn connect<S, O>(
    State(state): State<Arc<GmailAuthState<S, O>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    S: SettingsRepository + Send + Sync + 'static,
    O: MailboxOauthClient + Send + Sync + 'static,
{
    info!(%user_id, "gmail oauth: consent redirect issued");
    Redirect::temporary(&state.oauth.connect_url(user_id)).into_response()
}

/// Unauthenticated: Google calls back without our bearer token, the user
/// id rides in `state`. The browser always ends up back on the settings
/// page, with the outcome in the query string.
pub async fn callback<S, O>(
    State(state): State<Arc<GmailAuthState<S, O>>>,
    Query(query): Query<OauthCallbackQuery>,
) -> Response
where
    S: SettingsRepository + Send + Sync + 'static,
    O: MailboxOauthClient + Send + Sync + 'static,
{
    let settings_page = format!("{}/settings", state.app_base_url.trim_end_matches('/'));

    let (code, oauth_state) = match (query.code, query.state, query.error) {
        (Some(code), Some(oauth_state), None) => (code, oauth_state),
        (_, _, error) => {
            warn!(provider_error = ?error, "gmail oauth: callback without a usable code");
            return Redirect::temporary(&format!("{settings_page}?error=oauth_failed"))
                .into_response();
        }
    };

    match state.oauth.complete_connection(oauth_state, code).await {
        Ok(()) => Redirect::temporary(&format!("{settings_page}?success=gmail_connected"))
            .into_response(),
        Err(err) => {
            warn!(oauth_error = ?err, "gmail oauth: connection failed");
            Redirect::temporary(&format!("{settings_page}?error=oauth_failed")).into_response()
        }
    }
}

pub async fn disconnect<S, O>(
    State(state): State<Arc<GmailAuthState<S, O>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    S: SettingsRepository + Send + Sync + 'static,
    O: MailboxOauthClient + Send + Sync + 'static,
{
    match state.oauth.disconnect(user_id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
