use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::domain::entity::profile_image::ProfileImage;
use crate::domain::repository::ProfileImageStorage;

/// UploadStore はアップロードファイルを指定ディレクトリに保存する。
/// CSV は取り込み用の一時ファイル、プロフィール画像は永続ファイルとして置く。
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// バイト列を upload_dir 配下の一意な一時ファイルに書き込む。
    pub async fn store<B>(&self, bytes: B) -> anyhow::Result<StoredUpload>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create upload dir: {}", self.dir.display()))?;

        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let mut file = tempfile::Builder::new()
                .prefix("residents-")
                .suffix(".csv")
                .tempfile_in(&dir)
                .context("failed to create upload file")?;
            file.write_all(bytes.as_ref())?;
            file.flush()?;
            Ok(StoredUpload { file })
        })
        .await?
    }

    /// ディレクトリ外を指す名前は None にする。
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let file_name = Path::new(name).file_name()?;
        (file_name == OsStr::new(name)).then(|| self.dir.join(file_name))
    }
}

#[async_trait]
impl ProfileImageStorage for UploadStore {
    async fn save(&self, image: ProfileImage) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create image dir: {}", self.dir.display()))?;

        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let suffix = format!(".{}", image.extension);
            let mut file = tempfile::Builder::new()
                .prefix("profileImage-")
                .suffix(&suffix)
                .tempfile_in(&dir)
                .context("failed to create image file")?;
            file.write_all(&image.bytes)?;
            file.flush()?;
            let (_, path) = file.keep().context("failed to keep image file")?;
            path.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
                .context("image file name is not valid UTF-8")
        })
        .await?
    }

    async fn load(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read image: {}", path.display())),
        }
    }

    async fn remove(&self, name: &str) -> anyhow::Result<()> {
        let Some(path) = self.resolve(name) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove image: {}", path.display())),
        }
    }
}

/// StoredUpload は保存済みのアップロードファイル。
/// discard を呼ぶか Drop された時点でファイルは削除される。
#[derive(Debug)]
pub struct StoredUpload {
    file: NamedTempFile,
}

impl StoredUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// ファイルを削除する。削除失敗は警告ログのみで取り込み結果には影響しない。
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove uploaded csv");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("csv"));

        let upload = store.store(b"First Name\nJuan\n".to_vec()).await.unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.starts_with(store.dir()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "First Name\nJuan\n");

        upload.discard();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dropped_upload_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let path = {
            let upload = store.store(Vec::new()).await.unwrap();
            upload.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_uploads_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let a = store.store(b"a".to_vec()).await.unwrap();
        let b = store.store(b"b".to_vec()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    fn png(bytes: &[u8]) -> ProfileImage {
        ProfileImage::from_upload("avatar.png", bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_profile_image_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("profiles"));

        let name = store.save(png(b"\x89PNG")).await.unwrap();
        assert!(name.starts_with("profileImage-"));
        assert!(name.ends_with(".png"));
        assert_eq!(store.load(&name).await.unwrap(), Some(b"\x89PNG".to_vec()));

        store.remove(&name).await.unwrap();
        assert_eq!(store.load(&name).await.unwrap(), None);
        // 二度目の削除もエラーにしない
        store.remove(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_profile_image_names_outside_dir_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.png"), b"x").unwrap();
        let store = UploadStore::new(dir.path().join("profiles"));

        assert_eq!(store.load("../secret.png").await.unwrap(), None);
        assert_eq!(store.load("").await.unwrap(), None);
        store.remove("../secret.png").await.unwrap();
        assert!(dir.path().join("secret.png").exists());
    }
}
