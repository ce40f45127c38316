use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::request::{RequestRecord, RequestStatus};
use crate::domain::repository::RequestRepository;

/// InMemoryRequestRepository は申請種別ごとに使うインメモリ実装。
pub struct InMemoryRequestRepository<T> {
    requests: RwLock<Vec<T>>,
}

impl<T> InMemoryRequestRepository<T> {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for InMemoryRequestRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 挿入順を保ったまま新しい順に並べる。
fn newest_first<T: RequestRecord>(mut requests: Vec<T>) -> Vec<T> {
    requests.reverse();
    requests.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    requests
}

#[async_trait]
impl<T: RequestRecord> RequestRepository<T> for InMemoryRequestRepository<T> {
    async fn create(&self, request: &T) -> anyhow::Result<()> {
        let mut requests = self.requests.write().await;
        if requests.iter().any(|r| r.id() == request.id()) {
            anyhow::bail!("request already exists: {}", request.id());
        }
        requests.push(request.clone());
        Ok(())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<T>> {
        Ok(newest_first(self.requests.read().await.clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<T>> {
        let requests = self.requests.read().await;
        let own = requests
            .iter()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        Ok(newest_first(own))
    }

    async fn update_status(&self, id: Uuid, status: RequestStatus) -> anyhow::Result<Option<T>> {
        let mut requests = self.requests.write().await;
        Ok(requests.iter_mut().find(|r| r.id() == id).map(|r| {
            r.set_status(status, Utc::now());
            r.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|r| r.id() != id);
        Ok(requests.len() < before)
    }
}
