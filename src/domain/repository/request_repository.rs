use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::request::{RequestRecord, RequestStatus};

/// RequestRepository はクリアランス申請・ブロッター申請の永続化を担う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestRepository<T: RequestRecord>: Send + Sync {
    async fn create(&self, request: &T) -> anyhow::Result<()>;

    /// 全申請を作成日時の新しい順で取得する。
    async fn find_all(&self) -> anyhow::Result<Vec<T>>;

    /// 指定ユーザーが提出した申請を作成日時の新しい順で取得する。
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<T>>;

    /// 審査状態を更新し、更新後の申請を返す。対象が無ければ None。
    async fn update_status(&self, id: Uuid, status: RequestStatus) -> anyhow::Result<Option<T>>;

    /// 申請を削除する。対象が存在しない場合は false を返す。
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
