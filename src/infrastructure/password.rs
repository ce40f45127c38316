use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Argon2id 推奨パラメータ: memory = 19456 KiB, iterations = 2, parallelism = 1
fn argon2_instance() -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(19456, 2, 1, None)
        .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// パスワードをランダムソルト付きで argon2id ハッシュ化し、PHC 文字列で返す。
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2_instance()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// 保存済みハッシュとパスワードを照合する。ハッシュ文字列が壊れている場合はエラー。
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("invalid password hash: {}", e))?;
    Ok(argon2_instance()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
