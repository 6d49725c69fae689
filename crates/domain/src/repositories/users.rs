use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::users::{InsertUserEntity, UserBillingUpdateEntity, UserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>>;
    /// Insert-or-fetch keyed on the identity provider's subject id, so a
    /// first authenticated request materializes the row.
    async fn register_if_absent(&self, insert_user_entity: InsertUserEntity) -> Result<UserEntity>;
    async fn update_billing(
        &self,
        id: Uuid,
        update_entity: UserBillingUpdateEntity,
    ) -> Result<UserEntity>;
    async fn delete_account(&self, id: Uuid) -> Result<()>;
}
