use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// UserRole はアカウントの権限区分を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User は台帳システムにログインできるアカウント。
/// password_hash は PHC 文字列形式の argon2id ハッシュ。
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// 外部に公開してよい属性のみを持つビューに変換する。
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// UserView はレスポンスやリクエストコンテキストに載せるユーザー情報。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(UserRole::User.to_string(), "user");
        assert!("Admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_view_hides_password_hash() {
        let user = User::new("kapitan".to_string(), "$argon2id$...".to_string(), UserRole::Admin);
        let json = serde_json::to_value(user.view()).unwrap();
        assert_eq!(json["username"], "kapitan");
        assert_eq!(json["role"], "admin");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
