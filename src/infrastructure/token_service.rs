use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::entity::claims::Claims;
use crate::domain::entity::user::User;

/// TokenService はアクセストークンの発行と検証を行うトレイト。
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> anyhow::Result<String>;

    /// 署名と有効期限を検証してクレームを返す。
    fn verify(&self, token: &str) -> anyhow::Result<Claims>;
}

/// JwtTokenService は共有鍵 (HS256) で JWT を扱う TokenService 実装。
pub struct JwtTokenService {
    secret: SecretString,
    ttl_secs: i64,
}

impl JwtTokenService {
    pub fn new(secret: SecretString, ttl_secs: i64) -> Self {
        Self { secret, ttl_secs }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> anyhow::Result<String> {
        let claims = Claims::for_user(user, Utc::now().timestamp(), self.ttl_secs);
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
    }

    fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let data = decode::<Claims>(token, &key, &Self::validation())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::UserRole;

    fn service(secret: &str, ttl: i64) -> JwtTokenService {
        JwtTokenService::new(SecretString::new(secret.to_string()), ttl)
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service("0123456789abcdef0123456789abcdef", 3600);
        let user = User::new("kapitan".to_string(), "hash".to_string(), UserRole::Admin);

        let token = svc.issue(&user).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "kapitan");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let user = User::new("kapitan".to_string(), "hash".to_string(), UserRole::User);
        let token = service("0123456789abcdef0123456789abcdef", 3600)
            .issue(&user)
            .unwrap();
        assert!(service("ffffffffffffffffffffffffffffffff", 3600)
            .verify(&token)
            .is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let svc = service("0123456789abcdef0123456789abcdef", -60);
        let user = User::new("kapitan".to_string(), "hash".to_string(), UserRole::User);
        let token = svc.issue(&user).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let svc = service("0123456789abcdef0123456789abcdef", 3600);
        assert!(svc.verify("not.a.jwt").is_err());
    }
}
