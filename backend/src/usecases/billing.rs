use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use domain::{
    entities::users::UserBillingUpdateEntity,
    repositories::users::UserRepository,
    value_objects::{
        billing::{BillingAction, BillingActionView, BillingView},
        enums::plans::Plan,
    },
};

/// Self-serve plan switching. There is no payment processor behind this
/// yet; upgrades and cancellations only flip the plan columns.
pub struct BillingUseCase<G>
where
    G: UserRepository + Send + Sync + 'static,
{
    user_repository: Arc<G>,
}

impl<G> BillingUseCase<G>
where
    G: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repository: Arc<G>) -> Self {
        Self { user_repository }
    }

    pub async fn billing_info(&self, user_id: Uuid) -> Result<BillingView> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        let plan = Plan::from_str(&user.plan);
        let subscription_status = user
            .subscription_status
            .or_else(|| Some("active".to_string()));
        let next_billing_date = match plan {
            Plan::Pro => Some(first_of_next_month(Utc::now())),
            Plan::Free => None,
        };

        Ok(BillingView::for_plan(
            plan,
            subscription_status,
            next_billing_date,
        ))
    }

    pub async fn apply_action(&self, user_id: Uuid, action: &str) -> Result<BillingActionView> {
        let Some(action) = BillingAction::from_str(action) else {
            bail!("Invalid action");
        };

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        let plan = Plan::from_str(&user.plan);

        match (action, plan) {
            (BillingAction::Upgrade, Plan::Free) => {
                self.update_plan(user_id, Plan::Pro, "active").await?;
                info!(%user_id, "billing: upgraded to pro");
                Ok(BillingActionView {
                    success: true,
                    message: "Upgraded to Pro plan successfully!".to_string(),
                    checkout_url: Some("/billing".to_string()),
                })
            }
            (BillingAction::Cancel, Plan::Pro) => {
                self.update_plan(user_id, Plan::Free, "cancelled").await?;
                info!(%user_id, "billing: subscription cancelled");
                Ok(BillingActionView {
                    success: true,
                    message: "Subscription cancelled successfully".to_string(),
                    checkout_url: None,
                })
            }
            _ => bail!("Invalid action"),
        }
    }

    async fn update_plan(&self, user_id: Uuid, plan: Plan, status: &str) -> Result<()> {
        self.user_repository
            .update_billing(
                user_id,
                UserBillingUpdateEntity {
                    plan: plan.to_string(),
                    subscription_status: status.to_string(),
                    updated_at: Utc::now(),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "billing: failed to update plan");
                err
            })?;

        Ok(())
    }
}

fn first_of_next_month(now: DateTime<Utc>) -> String {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };

    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .map(|date| date.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{entities::users::UserEntity, repositories::users::MockUserRepository};
    use mockall::predicate::eq;

    fn sample_user(id: Uuid, plan: &str, subscription_status: Option<&str>) -> UserEntity {
        UserEntity {
            id,
            email: "alice@example.com".to_string(),
            first_name: None,
            last_name: None,
            plan: plan.to_string(),
            subscription_id: None,
            subscription_status: subscription_status.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn free_plan_has_no_next_billing_date() {
        let user_id = Uuid::new_v4();
        let user = sample_user(user_id, "free", None);

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });

        let use_case = BillingUseCase::new(Arc::new(user_repository));

        let view = use_case.billing_info(user_id).await.unwrap();

        assert_eq!(view.plan, "free");
        assert_eq!(view.monthly_email_limit, 25);
        assert_eq!(view.subscription_status.as_deref(), Some("active"));
        assert!(view.next_billing_date.is_none());
    }

    #[tokio::test]
    async fn pro_plan_bills_on_the_first_of_next_month() {
        let user_id = Uuid::new_v4();
        let user = sample_user(user_id, "pro", Some("active"));

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });

        let use_case = BillingUseCase::new(Arc::new(user_repository));

        let view = use_case.billing_info(user_id).await.unwrap();

        assert_eq!(view.plan, "pro");
        assert_eq!(view.monthly_email_limit, 10_000);

        let date = view.next_billing_date.unwrap();
        assert!(date.ends_with("+00:00") || date.ends_with('Z'));
        assert!(date.contains("-01T00:00:00"));
    }

    #[tokio::test]
    async fn upgrade_moves_a_free_user_to_pro() {
        let user_id = Uuid::new_v4();
        let user = sample_user(user_id, "free", None);

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        user_repository
            .expect_update_billing()
            .withf(move |id, update| {
                *id == user_id && update.plan == "pro" && update.subscription_status == "active"
            })
            .times(1)
            .returning(move |id, _| {
                let user = sample_user(id, "pro", Some("active"));
                Box::pin(async move { Ok(user) })
            });

        let use_case = BillingUseCase::new(Arc::new(user_repository));

        let view = use_case.apply_action(user_id, "upgrade").await.unwrap();

        assert!(view.success);
        assert_eq!(view.message, "Upgraded to Pro plan successfully!");
        assert_eq!(view.checkout_url.as_deref(), Some("/billing"));
    }

    #[tokio::test]
    async fn cancel_drops_a_pro_user_back_to_free() {
        let user_id = Uuid::new_v4();
        let user = sample_user(user_id, "pro", Some("active"));

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        user_repository
            .expect_update_billing()
            .withf(move |id, update| {
                *id == user_id && update.plan == "free" && update.subscription_status == "cancelled"
            })
            .times(1)
            .returning(move |id, _| {
                let user = sample_user(id, "free", Some("cancelled"));
                Box::pin(async move { Ok(user) })
            });

        let use_case = BillingUseCase::new(Arc::new(user_repository));

        let view = use_case.apply_action(user_id, "cancel").await.unwrap();

        assert!(view.success);
        assert_eq!(view.message, "Subscription cancelled successfully");
        assert!(view.checkout_url.is_none());
    }

    #[tokio::test]
    async fn upgrade_on_an_already_pro_user_is_invalid() {
        let user_id = Uuid::new_v4();
        let user = sample_user(user_id, "pro", Some("active"));

        let mut user_repository = MockUserRepository::new();
        user_repository
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        user_repository.expect_update_billing().never();

        let use_case = BillingUseCase::new(Arc::new(user_repository));

        let result = use_case.apply_action(user_id, "upgrade").await;

        assert!(result.unwrap_err().to_string().contains("Invalid action"));
    }

    #[tokio::test]
    async fn unknown_action_never_touches_the_user() {
        let mut user_repository = MockUserRepository::new();
        user_repository.expect_find_by_id().never();
        user_repository.expect_update_billing().never();

        let use_case = BillingUseCase::new(Arc::new(user_repository));

        let result = use_case.apply_action(Uuid::new_v4(), "refund").await;

        assert!(result.unwrap_err().to_string().contains("Invalid action"));
    }

    #[test]
    fn december_rolls_into_january() {
        let december = Utc.with_ymd_and_hms(2025, 12, 15, 10, 30, 0).unwrap();

        assert!(first_of_next_month(december).starts_with("2026-01-01T00:00:00"));
    }
}
