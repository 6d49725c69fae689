use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use domain::{
    repositories::{
        campaigns::CampaignRepository,
        email::{MailboxEmailClient, TransactionalEmailClient},
        events::EventRepository,
        leads::LeadRepository,
        messages::MessageRepository,
        settings::SettingsRepository,
        text_generation::TextGenerationClient,
        usage::UsageRepository,
        users::UserRepository,
    },
    value_objects::{
        campaigns::{CreateCampaignModel, ListCampaignsFilter},
        email::TestSendModel,
        generation::PreviewRequest,
        leads::NewLeadModel,
        usage::Gated,
    },
};
use infra::{
    ai::{AiCredentials, AiTextClient},
    crypto::token_cipher::TokenCipher,
    db::{
        postgres_connection::PgPoolSquad,
        repositories::{
            campaigns::CampaignPostgres, events::EventPostgres, leads::LeadPostgres,
            messages::MessagePostgres, settings::SettingsPostgres, usage::UsagePostgres,
            users::UserPostgres,
        },
    },
    email::{gmail_client::GmailApiClient, sendgrid_client::SendGridClient},
};

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{
        campaign_send::CampaignSendUseCase, campaigns::CampaignsUseCase,
        email_dispatch::EmailDispatcherUseCase, generation::ContentGeneratorUseCase,
        previews::PreviewUseCase, quota::QuotaUseCase, reply_sync::ReplySyncUseCase,
        test_sends::TestSendUseCase,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let campaign_repository = Arc::new(CampaignPostgres::new(Arc::clone(&db_pool)));
    let lead_repository = Arc::new(LeadPostgres::new(Arc::clone(&db_pool)));
    let message_repository = Arc::new(MessagePostgres::new(Arc::clone(&db_pool)));
    let event_repository = Arc::new(EventPostgres::new(Arc::clone(&db_pool)));
    let settings_repository = Arc::new(SettingsPostgres::new(Arc::clone(&db_pool)));
    let usage_repository = Arc::new(UsagePostgres::new(Arc::clone(&db_pool)));
    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));

    let text_client = Arc::new(AiTextClient::from_provider(
        &config.ai.provider,
        AiCredentials {
            openai_api_key: config.ai.openai_api_key.clone(),
            openai_model: config.ai.openai_model.clone(),
            anthropic_api_key: config.ai.anthropic_api_key.clone(),
            anthropic_model: config.ai.anthropic_model.clone(),
        },
    ));
    let gmail_client = Arc::new(GmailApiClient::new(
        config.gmail.client_id.clone(),
        config.gmail.client_secret.clone(),
        config.gmail.redirect_uri.clone(),
        TokenCipher::new(&config.encryption.key),
        Arc::clone(&settings_repository),
    ));
    let sendgrid_client = Arc::new(SendGridClient::new(
        config.sendgrid.api_key.clone(),
        config.sendgrid.from_email.clone(),
        config.sendgrid.from_name.clone(),
        config.sendgrid.webhook_secret.clone(),
    ));

    let quota = Arc::new(QuotaUseCase::new(
        Arc::clone(&usage_repository),
        Arc::clone(&user_repository),
    ));
    let generator = Arc::new(ContentGeneratorUseCase::new(Arc::clone(&text_client)));
    let dispatcher = Arc::new(EmailDispatcherUseCase::new(
        Arc::clone(&settings_repository),
        Arc::clone(&gmail_client),
        Arc::clone(&sendgrid_client),
    ));

    let campaigns_usecase = CampaignsUseCase::new(
        Arc::clone(&campaign_repository),
        Arc::clone(&lead_repository),
    );
    let preview_usecase = PreviewUseCase::new(
        Arc::clone(&campaign_repository),
        Arc::clone(&lead_repository),
        Arc::clone(&quota),
        Arc::clone(&generator),
    );
    let send_usecase = CampaignSendUseCase::new(
        Arc::clone(&campaign_repository),
        Arc::clone(&lead_repository),
        Arc::clone(&message_repository),
        Arc::clone(&quota),
        Arc::clone(&generator),
        Arc::clone(&dispatcher),
        config.app.base_url.clone(),
    );
    let test_send_usecase = TestSendUseCase::new(Arc::clone(&user_repository), Arc::clone(&dispatcher));
    let reply_sync_usecase = ReplySyncUseCase::new(
        Arc::clone(&message_repository),
        Arc::clone(&lead_repository),
        Arc::clone(&campaign_repository),
        Arc::clone(&event_repository),
        Arc::clone(&gmail_client),
    );

    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/:campaign_id", get(campaign_detail))
        .route("/:campaign_id/leads", post(add_leads))
        .with_state(Arc::new(campaigns_usecase))
        .merge(
            Router::new()
                .route("/:campaign_id/preview", post(preview_lead))
                .with_state(Arc::new(preview_usecase)),
        )
        .merge(
            Router::new()
                .route("/:campaign_id/send", post(send_campaign))
                .with_state(Arc::new(send_usecase)),
        )
        .merge(
            Router::new()
                .route("/:campaign_id/test", post(send_test))
                .with_state(Arc::new(test_send_usecase)),
        )
        .merge(
            Router::new()
                .route("/:campaign_id/sync-replies", post(sync_replies))
                .with_state(Arc::new(reply_sync_usecase)),
        )
}

pub async fn list_campaigns<C, L>(
    State(usecase): State<Arc<CampaignsUseCase<C, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(filter): Query<ListCampaignsFilter>,
) -> Response
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
{
    match usecase.list_campaigns(user_id, filter).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn create_campaign<C, L>(
    State(usecase): State<Arc<CampaignsUseCase<C, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(create_campaign_model): Json<CreateCampaignModel>,
) -> Response
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
{
    match usecase.create_campaign(user_id, create_campaign_model).await {
        Ok(campaign) => (StatusCode::CREATED, Json(campaign)).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn campaign_detail<C, L>(
    State(usecase): State<Arc<CampaignsUseCase<C, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Response
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
{
    match usecase.campaign_detail(user_id, campaign_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn add_leads<C, L>(
    State(usecase): State<Arc<CampaignsUseCase<C, L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(campaign_id): Path<Uuid>,
    Json(leads): Json<Vec<NewLeadModel>>,
) -> Response
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
{
    match usecase.add_leads(user_id, campaign_id, leads).await {
        Ok(inserted) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "added": inserted })),
        )
            .into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn preview_lead<C, L, U, G, A>(
    State(usecase): State<Arc<PreviewUseCase<C, L, U, G, A>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<PreviewRequest>,
) -> Response
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
    A: TextGenerationClient + Send + Sync + 'static,
{
    match usecase.preview(user_id, campaign_id, request).await {
        Ok(Gated::Granted(preview)) => Json(preview).into_response(),
        Ok(Gated::QuotaExceeded { plan, limit }) => {
            AppError::QuotaExceeded { plan, limit }.into_response()
        }
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn send_campaign<C, L, M, U, G, A, S, Mb, T>(
    State(usecase): State<Arc<CampaignSendUseCase<C, L, M, U, G, A, S, Mb, T>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Response
where
    C: CampaignRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
    A: TextGenerationClient + Send + Sync + 'static,
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    info!(%user_id, %campaign_id, "campaigns: send request received");
    match usecase.send_campaign(user_id, campaign_id).await {
        Ok(Gated::Granted(report)) => Json(report).into_response(),
        Ok(Gated::QuotaExceeded { plan, limit }) => {
            AppError::QuotaExceeded { plan, limit }.into_response()
        }
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn send_test<G, S, Mb, T>(
    State(usecase): State<Arc<TestSendUseCase<G, S, Mb, T>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(campaign_id): Path<Uuid>,
    Json(test_send_model): Json<TestSendModel>,
) -> Response
where
    G: UserRepository + Send + Sync + 'static,
    S: SettingsRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
    T: TransactionalEmailClient + Send + Sync + 'static,
{
    info!(%user_id, %campaign_id, "campaigns: test send request received");
    match usecase.send_test(user_id, test_send_model).await {
        Ok(report) => Json(json!({
            "success": true,
            "message": format!("Test email sent to {}", report.recipient),
        }))
        .into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn sync_replies<M, L, C, E, Mb>(
    State(usecase): State<Arc<ReplySyncUseCase<M, L, C, E, Mb>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Response
where
    M: MessageRepository + Send + Sync + 'static,
    L: LeadRepository + Send + Sync + 'static,
    C: CampaignRepository + Send + Sync + 'static,
    E: EventRepository + Send + Sync + 'static,
    Mb: MailboxEmailClient + Send + Sync + 'static,
{
    info!(%user_id, %campaign_id, "campaigns: reply sync request received");
    match usecase.sync_replies(user_id, campaign_id).await {
        Ok(replies_found) => Json(json!({ "success": true, "replies_found": replies_found }))
            .into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
