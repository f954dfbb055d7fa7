// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! API key handling and the credential store seam.
//!
//! SECURITY: keys are zeroed on drop, compared in constant time, and only
//! ever logged as a short SHA-256 fingerprint.

use std::fmt;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::transport::CompletionTransport;

/// Bearer credential for the completion API.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Wrap a raw key. Surrounding whitespace is dropped; blank keys are rejected.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let raw = Zeroizing::new(key.into());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_string())))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }

    /// First 8 hex chars of the key's SHA-256 digest, safe for logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time_compare(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl Eq for ApiKey {}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.fingerprint())
    }
}

/// Constant-time comparison to prevent timing attacks.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Where the API key lives between runs.
///
/// Persistence belongs to the embedding application; this crate only
/// reads the key at request time.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<ApiKey>;
    fn set(&self, key: ApiKey);
    fn clear(&self);

    fn has(&self) -> bool {
        self.get().is_some()
    }
}

/// Process-local credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    key: RwLock<Option<ApiKey>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: ApiKey) -> Self {
        Self { key: RwLock::new(Some(key)) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<ApiKey> {
        self.key.read().clone()
    }

    fn set(&self, key: ApiKey) {
        *self.key.write() = Some(key);
    }

    fn clear(&self) {
        self.key.write().take();
    }

    fn has(&self) -> bool {
        self.key.read().is_some()
    }
}

/// Check a candidate key against the auth endpoint and store it only if
/// the server accepts it.
pub async fn validate_and_store(
    transport: &dyn CompletionTransport,
    store: &dyn CredentialStore,
    candidate: ApiKey,
) -> bool {
    let fingerprint = candidate.fingerprint();
    if transport.validate_key(&candidate).await {
        store.set(candidate);
        tracing::info!(key = %fingerprint, "API key accepted and stored");
        true
    } else {
        tracing::warn!(key = %fingerprint, "API key rejected");
        false
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
