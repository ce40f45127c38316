/// プロフィール画像として受け付ける拡張子。
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// ProfileImageError はプロフィール画像の受付拒否理由。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileImageError {
    #[error("Only image files are allowed!")]
    NotAnImage,
}

/// ProfileImage はアップロードされたプロフィール画像の内容と拡張子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl ProfileImage {
    /// 元のファイル名の拡張子で画像かどうかを判定する。大文字の拡張子は受け付けない。
    pub fn from_upload(filename: &str, bytes: Vec<u8>) -> Result<Self, ProfileImageError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| IMAGE_EXTENSIONS.contains(ext))
            .ok_or(ProfileImageError::NotAnImage)?;
        Ok(Self {
            bytes,
            extension: extension.to_string(),
        })
    }
}

/// 保存済み画像のファイル名から Content-Type を決める。
pub fn content_type_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
