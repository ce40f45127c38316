use async_trait::async_trait;

use crate::domain::entity::profile_image::ProfileImage;

/// ProfileImageStorage は住民のプロフィール画像ファイルを保管する。
/// 住民レコードには save が返したファイル名のみを記録する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileImageStorage: Send + Sync {
    /// 画像を一意な名前で保存し、そのファイル名を返す。
    async fn save(&self, image: ProfileImage) -> anyhow::Result<String>;

    /// 画像を読み出す。存在しない場合は None を返す。
    async fn load(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// 画像を削除する。既に存在しない場合も成功扱い。
    async fn remove(&self, name: &str) -> anyhow::Result<()>;
}
