use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::resident::{Resident, ResidentStats};

/// ResidentRepository は住民台帳の永続化を担うリポジトリトレイト。
/// 取り込み処理は 1 行ごとに create を呼び、行をまたぐトランザクションは張らない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResidentRepository: Send + Sync {
    /// 住民を 1 件保存する。
    async fn create(&self, resident: &Resident) -> anyhow::Result<()>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Resident>>;

    /// 全住民を作成日時の新しい順で取得する。
    async fn find_all(&self) -> anyhow::Result<Vec<Resident>>;

    /// 既存住民を上書きする。対象が存在しない場合は false を返す。
    async fn update(&self, resident: &Resident) -> anyhow::Result<bool>;

    /// 住民を削除する。対象が存在しない場合は false を返す。
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// 性別・有権者登録・プロク別の集計を返す。
    async fn stats(&self) -> anyhow::Result<ResidentStats>;
}
