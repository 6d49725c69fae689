use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use domain::repositories::{usage::UsageRepository, users::UserRepository};
use infra::db::{
    postgres_connection::PgPoolSquad,
    repositories::{usage::UsagePostgres, users::UserPostgres},
};

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::quota::QuotaUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let usage_repository = UsagePostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let quota_usecase = QuotaUseCase::new(Arc::new(usage_repository), Arc::new(user_repository));

    Router::new()
        .route("/", get(current_usage))
        .with_state(Arc::new(quota_usecase))
}

/// Current-month generated/sent counts against the plan limit, for the
/// dashboard quota widget.
pub async fn current_usage<U, G>(
    State(usecase): State<Arc<QuotaUseCase<U, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
{
    match usecase.user_usage(user_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
