//! Password hashing for password-like attributes

use crate::error::{RecordError, RecordResult};
use crate::Attributes;
use elif_validation::traits::value_to_string;
use serde_json::Value;
use std::collections::HashMap;

#[cfg(feature = "argon2")]
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
#[cfg(feature = "argon2")]
use rand::thread_rng;

#[cfg(feature = "bcrypt")]
use bcrypt::{hash, verify, DEFAULT_COST};

/// One-way hashing primitive used for password attributes
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> RecordResult<String>;

    fn verify_password(&self, password: &str, hash: &str) -> RecordResult<bool>;

    fn hasher_name(&self) -> &str;
}

/// Argon2 password hasher implementation
#[cfg(feature = "argon2")]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

#[cfg(feature = "argon2")]
impl Argon2Hasher {
    /// Create a new Argon2 hasher with custom parameters
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Create an Argon2 hasher optimized for production
    pub fn production() -> Self {
        Self::new(65536, 4, 4)
    }

    /// Create an Argon2 hasher optimized for development (faster)
    pub fn development() -> Self {
        Self::new(4096, 2, 2)
    }

    fn argon2(&self) -> RecordResult<Argon2<'static>> {
        let params = argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| RecordError::hashing(e.to_string()))?;

        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

#[cfg(feature = "argon2")]
impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(
            65536, // 64 MB
            3,     // 3 iterations
            4,     // 4 lanes
        )
    }
}

#[cfg(feature = "argon2")]
impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> RecordResult<String> {
        let salt = SaltString::generate(&mut thread_rng());

        let password_hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| RecordError::hashing(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> RecordResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| RecordError::hashing(e.to_string()))?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn hasher_name(&self) -> &str {
        "argon2"
    }
}

/// bcrypt password hasher implementation
#[cfg(feature = "bcrypt")]
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BcryptHasher {
    /// Create a new bcrypt hasher with custom cost
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Create a bcrypt hasher optimized for production
    pub fn production() -> Self {
        Self { cost: 12 }
    }

    /// Create a bcrypt hasher optimized for development (faster)
    pub fn development() -> Self {
        Self { cost: 4 }
    }
}

#[cfg(feature = "bcrypt")]
impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> RecordResult<String> {
        hash(password, self.cost).map_err(|e| RecordError::hashing(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> RecordResult<bool> {
        verify(password, hash).map_err(|e| RecordError::hashing(e.to_string()))
    }

    fn hasher_name(&self) -> &str {
        "bcrypt"
    }
}

/// Password hasher factory for creating different hashers
pub struct PasswordHasherFactory;

impl PasswordHasherFactory {
    /// Create a password hasher by name
    pub fn create_hasher(
        algorithm: &str,
        config: &HashMap<String, Value>,
    ) -> RecordResult<Box<dyn PasswordHasher>> {
        let setting = |key: &str, default: u32| {
            config
                .get(key)
                .and_then(|v| v.as_u64())
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(default)
        };

        match algorithm {
            #[cfg(feature = "argon2")]
            "argon2" => Ok(Box::new(Argon2Hasher::new(
                setting("memory_cost", 65536),
                setting("time_cost", 3),
                setting("parallelism", 4),
            ))),
            #[cfg(feature = "bcrypt")]
            "bcrypt" => Ok(Box::new(BcryptHasher::new(setting("cost", DEFAULT_COST)))),
            _ => Err(RecordError::configuration(format!(
                "Unknown password hashing algorithm: {} (or feature not enabled)",
                algorithm
            ))),
        }
    }

    /// Create default hasher (Argon2, else bcrypt)
    pub fn default_hasher() -> RecordResult<Box<dyn PasswordHasher>> {
        #[cfg(feature = "argon2")]
        return Ok(Box::new(Argon2Hasher::default()));

        #[cfg(all(not(feature = "argon2"), feature = "bcrypt"))]
        return Ok(Box::new(BcryptHasher::default()));

        #[cfg(all(not(feature = "argon2"), not(feature = "bcrypt")))]
        return Err(RecordError::configuration(
            "No password hasher available. Enable either 'argon2' or 'bcrypt' feature",
        ));
    }
}

/// Replace changed password attributes with their hashes.
///
/// An attribute is hashed when it is listed in `password_attributes`, holds a
/// non-null value and differs from `original`. Everything else, unchanged
/// passwords included, passes through as-is.
pub fn hash_password_attributes(
    attributes: &Attributes,
    original: &Attributes,
    password_attributes: &[String],
    hasher: &dyn PasswordHasher,
) -> RecordResult<Attributes> {
    let mut result = Attributes::new();
    let mut hashed = 0usize;

    for (key, value) in attributes {
        let changed = !value.is_null() && original.get(key) != Some(value);

        if changed && password_attributes.iter().any(|attr| attr == key) {
            let digest = hasher.hash_password(&value_to_string(value))?;
            result.insert(key.clone(), Value::String(digest));
            hashed += 1;
        } else {
            result.insert(key.clone(), value.clone());
        }
    }

    if hashed > 0 {
        tracing::debug!(hashed, hasher = hasher.hasher_name(), "hashed password attributes");
    }

    Ok(result)
}
