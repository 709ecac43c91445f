//! Deterministic capabilities for tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{DomainError, DomainResult};
use crate::ports::{Clock, PasswordHasher};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Hashes to `hashed:<raw>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash(&self, raw: &str) -> DomainResult<String> {
        Ok(format!("hashed:{}", raw))
    }

    fn verify(&self, hash: &str, raw: &str) -> bool {
        hash.strip_prefix("hashed:") == Some(raw)
    }
}

/// Always fails to hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingHasher;

impl PasswordHasher for FailingHasher {
    fn hash(&self, _raw: &str) -> DomainResult<String> {
        Err(DomainError::hashing("hasher unavailable"))
    }

    fn verify(&self, _hash: &str, _raw: &str) -> bool {
        false
    }
}
