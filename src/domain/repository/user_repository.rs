use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::user::User;

/// UserRepository はログインアカウントのリポジトリトレイト。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// アカウントを保存する。ユーザー名が重複している場合はエラーを返す。
    async fn create(&self, user: &User) -> anyhow::Result<()>;
}
