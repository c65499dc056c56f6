use anyhow::{Context, Result};
use rand::{distributions::Alphanumeric, Rng};

/// Generate a random API key
pub fn generate_api_key() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    format!("rsk_{}", token)
}

/// Hash an API key for storage
pub fn hash_api_key(api_key: &str) -> Result<String> {
    bcrypt::hash(api_key, 10).context("Failed to hash API key")
}

/// Verify an API key against a hash
pub fn verify_api_key(api_key: &str, hash: &str) -> bool {
    bcrypt::verify(api_key, hash).unwrap_or(false)
}

/// Hash a login password for storage
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, 10).context("Failed to hash password")
}

/// Verify a login password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_generation() {
        let key = generate_api_key();
        assert!(key.starts_with("rsk_"));
        assert!(key.len() > 10);
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn test_api_key_hashing() {
        let key = generate_api_key();
        let hash = hash_api_key(&key).unwrap();

        assert!(verify_api_key(&key, &hash));
        assert!(!verify_api_key("wrong_key", &hash));
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }
}
