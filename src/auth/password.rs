use bcrypt::BcryptError;
use thiserror::Error;

/// Work factor used for every stored password.
pub const PASSWORD_HASH_COST: u32 = 12;

/// bcrypt ignores input past this many bytes, so longer passwords are refused
/// rather than silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password must be at most {} bytes", MAX_PASSWORD_BYTES)]
    TooLong,

    #[error(transparent)]
    Bcrypt(#[from] BcryptError),
}

/// One-way salted password hashing backed by bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            cost: PASSWORD_HASH_COST,
        }
    }

    /// Cheaper hasher so tests don't spend seconds in bcrypt.
    #[cfg(test)]
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong);
        }
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// A malformed stored hash verifies as `false`, and so does a password
    /// too long to have been hashed.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
