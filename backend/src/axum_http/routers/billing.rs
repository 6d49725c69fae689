use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tracing::info;

use domain::{repositories::users::UserRepository, value_objects::billing::BillingActionRequest};
use infra::db::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::billing::BillingUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let billing_usecase = BillingUseCase::new(Arc::new(user_repository));

    Router::new()
        .route("/", get(billing_info).post(billing_action))
        .with_state(Arc::new(billing_usecase))
}

pub async fn billing_info<G>(
    State(usecase): State<Arc<BillingUseCase<G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    G: UserRepository + Send + Sync + 'static,
{
    match usecase.billing_info(user_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn billing_action<G>(
    State(usecase): State<Arc<BillingUseCase<G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(request): Json<BillingActionRequest>,
) -> Response
where
    G: UserRepository + Send + Sync + 'static,
{
    info!(%user_id, action = %request.action, "billing: action request received");
    match usecase.apply_action(user_id, &request.action).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
