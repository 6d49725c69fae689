use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use domain::{
    entities::users::InsertUserEntity,
    repositories::users::UserRepository,
    value_objects::{enums::plans::Plan, users::UserModel},
};

pub struct UsersUseCase<G>
where
    G: UserRepository + Send + Sync + 'static,
{
    user_repository: Arc<G>,
}

impl<G> UsersUseCase<G>
where
    G: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repository: Arc<G>) -> Self {
        Self { user_repository }
    }

    /// Materializes the users row on first authenticated contact. Repeat
    /// calls return the existing row untouched.
    pub async fn ensure_user(&self, user_id: Uuid, email: Option<String>) -> Result<UserModel> {
        let Some(email) = email.filter(|value| !value.trim().is_empty()) else {
            bail!("Email missing from token");
        };

        let now = Utc::now();
        let entity = self
            .user_repository
            .register_if_absent(InsertUserEntity {
                id: user_id,
                email,
                first_name: None,
                last_name: None,
                plan: Plan::Free.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to register user");
                err
            })?;

        info!(%user_id, "users: user bootstrapped");

        Ok(UserModel::from(entity))
    }

    /// The row delete cascades to campaigns, leads, messages, settings,
    /// usage logs and events.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        if self.user_repository.find_by_id(user_id).await?.is_none() {
            return Err(anyhow!("User not found"));
        }

        self.user_repository
            .delete_account(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to delete account");
                err
            })?;

        info!(%user_id, "users: account deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{entities::users::UserEntity, repositories::users::MockUserRepository};
    use mockall::predicate::eq;

    fn sample_user(id: Uuid, plan: &str) -> UserEntity {
        UserEntity {
            id,
            email: "alice@example.com".to_string(),
            first_name: None,
            last_name: None,
            plan: plan.to_string(),
            subscription_id: None,
            subscription_status: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_contact_registers_a_free_user() {
        let user_id = Uuid::new_v4();
        let entity = sample_user(user_id, "free");

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_register_if_absent()
            .withf(move |insert| {
                insert.id == user_id && insert.email == "alice@example.com" && insert.plan == "free"
            })
            .returning(move |_| {
                let entity = entity.clone();
                Box::pin(async move { Ok(entity) })
            });

        let use_case = UsersUseCase::new(Arc::new(user_repository));

        let user = use_case
            .ensure_user(user_id, Some("alice@example.com".to_string()))
            .await
            .unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.plan, "free");
    }

    #[tokio::test]
    async fn token_without_an_email_is_rejected() {
        let mut user_repository = MockUserRepository::new();
        user_repository.expect_register_if_absent().never();

        let use_case = UsersUseCase::new(Arc::new(user_repository));

        let result = use_case.ensure_user(Uuid::new_v4(), None).await;

        assert!(result.unwrap_err().to_string().contains("Email missing"));
    }

    #[tokio::test]
    async fn deleting_an_unknown_account_is_reported() {
        let user_id = Uuid::new_v4();

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(None) }));
        user_repository.expect_delete_account().never();

        let use_case = UsersUseCase::new(Arc::new(user_repository));

        let result = use_case.delete_account(user_id).await;

        assert!(result.unwrap_err().to_string().contains("User not found"));
    }

    #[tokio::test]
    async fn existing_account_is_deleted() {
        let user_id = Uuid::new_v4();
        let entity = sample_user(user_id, "pro");

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let entity = entity.clone();
                Box::pin(async move { Ok(Some(entity)) })
            });
        user_repository
            .expect_delete_account()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let use_case = UsersUseCase::new(Arc::new(user_repository));

        use_case.delete_account(user_id).await.unwrap();
    }
}
