//! # 密码哈希

use crate::error::Result;

/// bcrypt 密码哈希器
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// 计算密码摘要
    pub fn hash(&self, secret: &str) -> Result<String> {
        Ok(bcrypt::hash(secret, self.cost)?)
    }

    /// 校验密码，摘要格式错误视为不匹配
    #[must_use]
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        bcrypt::verify(secret, digest).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(4);
        let digest = hasher.hash("Admin123!").unwrap();

        assert_ne!(digest, "Admin123!");
        assert!(hasher.verify("Admin123!", &digest));
        assert!(!hasher.verify("admin123!", &digest));
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        let hasher = PasswordHasher::new(4);
        assert!(!hasher.verify("secret", "not-a-bcrypt-digest"));
    }
}
