use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use domain::repositories::{
    campaigns::CampaignRepository, events::EventRepository, leads::LeadRepository,
    messages::MessageRepository,
};
use infra::db::{
    postgres_connection::PgPoolSquad,
    repositories::{
        campaigns::CampaignPostgres, events::EventPostgres, leads::LeadPostgres,
        messages::MessagePostgres,
    },
};

use crate::{
    config::config_model::DotEnvyConfig,
    usecases::{engagement::EngagementUseCase, tracking_links::TRACKING_PIXEL_GIF},
};

/// Unauthenticated by design: mail clients fetch these URLs on behalf of
/// the recipient. Both endpoints must answer normally no matter what
/// happens inside, so every internal error is logged and swallowed.
pub struct TrackingState<M, L, C, E>
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    engagement: EngagementUseCase<M, L, C, E>,
    app_base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    url: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let engagement = EngagementUseCase::new(
        Arc::new(MessagePostgres::new(Arc::clone(&db_pool))),
        Arc::new(LeadPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CampaignPostgres::new(Arc::clone(&db_pool))),
        Arc::new(EventPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/open/:message_id", get(track_open))
        .route("/click/:message_id", get(track_click))
        .with_state(Arc::new(TrackingState {
            engagement,
            app_base_url: config.app.base_url.clone(),
        }))
}

pub async fn track_open<M, L, C, E>(
    State(state): State<Arc<TrackingState<M, L, C, E>>>,
    Path(message_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    match message_id.parse::<Uuid>() {
        Ok(message_id) => {
            if let Err(err) = state
                .engagement
                .record_open(message_id, client_ip(&headers), user_agent(&headers))
                .await
            {
                error!(%message_id, tracking_error = ?err, "tracking: open signal failed");
            }
        }
        Err(_) => debug!(raw = %message_id, "tracking: open with malformed message id"),
    }

    pixel_response()
}

pub async fn track_click<M, L, C, E>(
    State(state): State<Arc<TrackingState<M, L, C, E>>>,
    Path(message_id): Path<String>,
    Query(query): Query<ClickQuery>,
    headers: HeaderMap,
) -> Response
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    let Some(destination) = query.url.filter(|url| !url.is_empty()) else {
        return Redirect::temporary(&state.app_base_url).into_response();
    };

    match message_id.parse::<Uuid>() {
        Ok(message_id) => {
            if let Err(err) = state
                .engagement
                .record_click(
                    message_id,
                    Some(destination.clone()),
                    client_ip(&headers),
                    user_agent(&headers),
                )
                .await
            {
                error!(%message_id, tracking_error = ?err, "tracking: click signal failed");
            }
        }
        Err(_) => debug!(raw = %message_id, "tracking: click with malformed message id"),
    }

    // The recipient's navigation is never blocked by tracking.
    Redirect::temporary(&destination).into_response()
}

fn pixel_response() -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, proxy-revalidate",
            ),
        ],
        TRACKING_PIXEL_GIF,
    )
        .into_response()
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
}
