use anyhow::Result;
use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use domain::{
    entities::usage_logs::InsertUsageLogEntity,
    repositories::{usage::UsageRepository, users::UserRepository},
    value_objects::{
        enums::{plans::Plan, usage_actions::UsageAction},
        usage::{QuotaStatus, UsageSummary, UsageView},
    },
};

/// Plan-based monthly metering. Generation is the gated action; sends are
/// metered alongside it but never block on their own.
pub struct QuotaUseCase<U, G>
where
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
{
    usage_repository: Arc<U>,
    user_repository: Arc<G>,
}

impl<U, G> QuotaUseCase<U, G>
where
    U: UsageRepository + Send + Sync + 'static,
    G: UserRepository + Send + Sync + 'static,
{
    pub fn new(usage_repository: Arc<U>, user_repository: Arc<G>) -> Self {
        Self {
            usage_repository,
            user_repository,
        }
    }

    pub async fn check_quota(&self, user_id: Uuid) -> Result<QuotaStatus> {
        let plan = match self.user_repository.find_by_id(user_id).await? {
            Some(user) => Plan::from_str(&user.plan),
            None => Plan::default(),
        };
        let limit = plan.monthly_email_limit();

        let usage = self
            .usage_repository
            .sum_for_month(user_id, UsageAction::EmailGenerated, Self::current_month())
            .await?;

        debug!(
            %user_id,
            plan = %plan,
            usage,
            limit,
            "quota: monthly generation usage"
        );

        // A user sitting exactly at the limit is already over it.
        Ok(QuotaStatus {
            allowed: usage < limit,
            current_usage: usage,
            limit,
            plan,
        })
    }

    pub async fn record_usage(
        &self,
        user_id: Uuid,
        action: UsageAction,
        campaign_id: Option<Uuid>,
    ) -> Result<()> {
        let insert_usage_log_entity = InsertUsageLogEntity {
            user_id,
            action_type: action.to_string(),
            campaign_id,
            month: Self::current_month(),
            count: 1,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        };

        self.usage_repository.append(insert_usage_log_entity).await
    }

    pub async fn user_usage(&self, user_id: Uuid) -> Result<UsageView> {
        let quota = self.check_quota(user_id).await?;

        let emails_sent = self
            .usage_repository
            .sum_for_month(user_id, UsageAction::EmailSent, Self::current_month())
            .await?;

        Ok(UsageView {
            plan: quota.plan.to_string(),
            usage: UsageSummary {
                emails_generated: quota.current_usage,
                emails_sent,
                limit: quota.limit,
                remaining: (quota.limit - quota.current_usage).max(0),
                reset_date: Self::first_day_of_next_month(),
            },
        })
    }

    fn current_month() -> String {
        Utc::now().format("%Y-%m").to_string()
    }

    fn first_day_of_next_month() -> String {
        let now = Utc::now();
        let (year, month) = if now.month() == 12 {
            (now.year() + 1, 1)
        } else {
            (now.year(), now.month() + 1)
        };
        format!("{year:04}-{month:02}-01")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::entities::users::UserEntity;
    use domain::repositories::{usage::MockUsageRepository, users::MockUserRepository};
    use mockall::predicate::eq;

    fn sample_user(user_id: Uuid, plan: &str) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: user_id,
            email: "prospector@example.com".to_string(),
            first_name: None,
            last_name: None,
            plan: plan.to_string(),
            subscription_id: None,
            subscription_status: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn free_user_below_limit_is_allowed() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        let mut usage_repo = MockUsageRepository::new();

        let user = sample_user(user_id, "free");
        user_repo
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        usage_repo
            .expect_sum_for_month()
            .returning(|_, _, _| Box::pin(async { Ok(24) }));

        let quota = QuotaUseCase::new(Arc::new(usage_repo), Arc::new(user_repo));
        let status = quota.check_quota(user_id).await.unwrap();

        assert!(status.allowed);
        assert_eq!(status.current_usage, 24);
        assert_eq!(status.limit, 25);
    }

    #[tokio::test]
    async fn free_user_at_limit_is_refused() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        let mut usage_repo = MockUsageRepository::new();

        let user = sample_user(user_id, "free");
        user_repo
            .expect_find_by_id()
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        usage_repo
            .expect_sum_for_month()
            .returning(|_, _, _| Box::pin(async { Ok(25) }));

        let quota = QuotaUseCase::new(Arc::new(usage_repo), Arc::new(user_repo));
        let status = quota.check_quota(user_id).await.unwrap();

        assert!(!status.allowed);
        assert_eq!(status.plan, Plan::Free);
    }

    #[tokio::test]
    async fn unknown_user_is_metered_as_free() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        let mut usage_repo = MockUsageRepository::new();

        user_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        usage_repo
            .expect_sum_for_month()
            .returning(|_, _, _| Box::pin(async { Ok(0) }));

        let quota = QuotaUseCase::new(Arc::new(usage_repo), Arc::new(user_repo));
        let status = quota.check_quota(user_id).await.unwrap();

        assert_eq!(status.limit, 25);
        assert!(status.allowed);
    }

    #[tokio::test]
    async fn quota_reads_the_current_month_generation_meter() {
        let user_id = Uuid::new_v4();
        let current_month = Utc::now().format("%Y-%m").to_string();

        let mut user_repo = MockUserRepository::new();
        let mut usage_repo = MockUsageRepository::new();

        let user = sample_user(user_id, "pro");
        user_repo
            .expect_find_by_id()
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        usage_repo
            .expect_sum_for_month()
            .withf(move |uid, action, month| {
                *uid == user_id
                    && *action == UsageAction::EmailGenerated
                    && *month == current_month
            })
            .returning(|_, _, _| Box::pin(async { Ok(9_999) }));

        let quota = QuotaUseCase::new(Arc::new(usage_repo), Arc::new(user_repo));
        let status = quota.check_quota(user_id).await.unwrap();

        assert_eq!(status.limit, 10_000);
        assert!(status.allowed);
    }

    #[tokio::test]
    async fn usage_summary_clamps_remaining_at_zero() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        let mut usage_repo = MockUsageRepository::new();

        let user = sample_user(user_id, "free");
        user_repo
            .expect_find_by_id()
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        usage_repo
            .expect_sum_for_month()
            .with(eq(user_id), eq(UsageAction::EmailGenerated), mockall::predicate::always())
            .returning(|_, _, _| Box::pin(async { Ok(30) }));
        usage_repo
            .expect_sum_for_month()
            .with(eq(user_id), eq(UsageAction::EmailSent), mockall::predicate::always())
            .returning(|_, _, _| Box::pin(async { Ok(12) }));

        let quota = QuotaUseCase::new(Arc::new(usage_repo), Arc::new(user_repo));
        let view = quota.user_usage(user_id).await.unwrap();

        assert_eq!(view.usage.emails_generated, 30);
        assert_eq!(view.usage.emails_sent, 12);
        assert_eq!(view.usage.remaining, 0);
        assert!(view.usage.reset_date.ends_with("-01"));
    }

    #[tokio::test]
    async fn record_usage_appends_a_single_unit_row() {
        let user_id = Uuid::new_v4();
        let campaign_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        let mut usage_repo = MockUsageRepository::new();
        user_repo.expect_find_by_id().never();

        usage_repo
            .expect_append()
            .withf(move |entity| {
                entity.user_id == user_id
                    && entity.action_type == "email_sent"
                    && entity.campaign_id == Some(campaign_id)
                    && entity.count == 1
            })
            .returning(|_| Box::pin(async { Ok(()) }));

        let quota = QuotaUseCase::new(Arc::new(usage_repo), Arc::new(user_repo));
        quota
            .record_usage(user_id, UsageAction::EmailSent, Some(campaign_id))
            .await
            .unwrap();
    }
}
