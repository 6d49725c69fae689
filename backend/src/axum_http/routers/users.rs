use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::sync::Arc;

use domain::repositories::users::UserRepository;
use infra::db::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres};

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::users::UsersUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let users_usecase = UsersUseCase::new(Arc::new(user_repository));

    Router::new()
        .route("/me", get(current_user).delete(delete_account))
        .with_state(Arc::new(users_usecase))
}

/// Get-or-create: the row is materialized from the token on first contact.
pub async fn current_user<G>(
    State(usecase): State<Arc<UsersUseCase<G>>>,
    AuthUser { user_id, email }: AuthUser,
) -> Response
where
    G: UserRepository + Send + Sync + 'static,
{
    match usecase.ensure_user(user_id, email).await {
        Ok(user) => Json(user).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn delete_account<G>(
    State(usecase): State<Arc<UsersUseCase<G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    G: UserRepository + Send + Sync + 'static,
{
    match usecase.delete_account(user_id).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
