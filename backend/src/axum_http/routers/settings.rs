use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use domain::{
    repositories::settings::SettingsRepository, value_objects::settings::UpdateSettingsModel,
};
use infra::db::{postgres_connection::PgPoolSquad, repositories::settings::SettingsPostgres};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::settings::SettingsUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let settings_repository = SettingsPostgres::new(Arc::clone(&db_pool));
    let settings_usecase = SettingsUseCase::new(Arc::new(settings_repository));

    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .with_state(Arc::new(settings_usecase))
}

pub async fn get_settings<S>(
    State(usecase): State<Arc<SettingsUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Response
where
    S: SettingsRepository + Send + Sync + 'static,
{
    match usecase.get_settings(user_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}

pub async fn update_settings<S>(
    State(usecase): State<Arc<SettingsUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(update_settings_model): Json<UpdateSettingsModel>,
) -> Response
where
    S: SettingsRepository + Send + Sync + 'static,
{
    match usecase.update_settings(user_id, update_settings_model).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => AppError::from_usecase(err).into_response(),
    }
}
