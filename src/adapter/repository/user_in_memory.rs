use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;

/// InMemoryUserRepository はデータベース未設定時に使うインメモリ実装。
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &User) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            anyhow::bail!("duplicate username: {}", user.username);
        }
        users.push(user.clone());
        Ok(())
    }
}
