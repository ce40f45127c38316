use serde::{Deserialize, Serialize};

use crate::domain::entity::user::{User, UserRole};

/// Claims は台帳サーバーが発行する JWT のペイロード。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザー ID (UUID 文字列)
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// 発行時刻と有効期間 (秒) からクレームを組み立てる。
    pub fn for_user(user: &User, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: issued_at,
            exp: issued_at + ttl_secs,
        }
    }
}
