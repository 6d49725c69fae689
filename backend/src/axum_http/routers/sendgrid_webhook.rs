use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use domain::repositories::{
    campaigns::CampaignRepository, events::EventRepository, leads::LeadRepository,
    messages::MessageRepository,
};
use infra::{
    db::{
        postgres_connection::PgPoolSquad,
        repositories::{
            campaigns::CampaignPostgres, events::EventPostgres, leads::LeadPostgres,
            messages::MessagePostgres,
        },
    },
    email::sendgrid_client::SendGridClient,
};

use crate::{config::config_model::DotEnvyConfig, usecases::engagement::EngagementUseCase};

const SIGNATURE_HEADER: &str = "x-webhook-signature";

pub struct SendGridWebhookState<M, L, C, E>
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    sendgrid: SendGridClient,
    engagement: EngagementUseCase<M, L, C, E>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let sendgrid = SendGridClient::new(
        config.sendgrid.api_key.clone(),
        config.sendgrid.from_email.clone(),
        config.sendgrid.from_name.clone(),
        config.sendgrid.webhook_secret.clone(),
    );
    let engagement = EngagementUseCase::new(
        Arc::new(MessagePostgres::new(Arc::clone(&db_pool))),
        Arc::new(LeadPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CampaignPostgres::new(Arc::clone(&db_pool))),
        Arc::new(EventPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/sendgrid", post(sendgrid_events))
        .with_state(Arc::new(SendGridWebhookState {
            sendgrid,
            engagement,
        }))
}

/// Provider event batch. Each event is applied independently; the whole
/// payload is acked as long as it is authentic and parseable.
pub async fn sendgrid_events<M, L, C, E>(
    State(state): State<Arc<SendGridWebhookState<M, L, C, E>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Err(err) = state.sendgrid.verify_webhook_signature(&body, signature) {
        warn!(verify_error = ?err, "sendgrid webhook: signature rejected");
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let raw_events = match SendGridClient::parse_events(&body) {
        Ok(events) => events,
        Err(err) => {
            warn!(parse_error = ?err, "sendgrid webhook: unparseable payload");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    let events: Vec<_> = raw_events
        .iter()
        .filter_map(SendGridClient::normalize_event)
        .collect();
    info!(
        received = raw_events.len(),
        attributable = events.len(),
        "sendgrid webhook: batch received"
    );

    state.engagement.process_provider_events(events).await;

    Json(json!({ "received": true })).into_response()
}
