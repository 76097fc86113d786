//! In-memory collaborators for codec tests.

use crate::collab::{BlobStore, CollaboratorError, EncryptionContext, FieldEncryptor};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio_util::sync::CancellationToken;

///
/// MemoryBlobStore
///
/// Keeps blobs in a map keyed by `mem://{suggested key}` and counts calls.
///

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    stores: AtomicUsize,
    retrievals: AtomicUsize,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, reference: &str) -> Option<Vec<u8>> {
        self.blobs().get(reference).cloned()
    }

    #[must_use]
    pub fn references(&self) -> Vec<String> {
        let mut references: Vec<_> = self.blobs().keys().cloned().collect();
        references.sort();
        references
    }

    #[must_use]
    pub fn store_calls(&self) -> usize {
        self.stores.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn retrieve_calls(&self) -> usize {
        self.retrievals.load(Ordering::Relaxed)
    }

    fn blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(
        &self,
        data: Vec<u8>,
        suggested_key: &str,
        cancel: &CancellationToken,
    ) -> Result<String, CollaboratorError> {
        if cancel.is_cancelled() {
            return Err(CollaboratorError::Cancelled);
        }
        self.stores.fetch_add(1, Ordering::Relaxed);

        let reference = format!("mem://{suggested_key}");
        self.blobs().insert(reference.clone(), data);

        Ok(reference)
    }

    async fn retrieve(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError> {
        if cancel.is_cancelled() {
            return Err(CollaboratorError::Cancelled);
        }
        self.retrievals.fetch_add(1, Ordering::Relaxed);

        self.get(reference)
            .ok_or_else(|| CollaboratorError::NotFound(reference.to_string()))
    }
}

///
/// UnavailableBlobStore
///
/// Fails every call with a backend error.
///

#[derive(Debug, Default)]
pub struct UnavailableBlobStore;

#[async_trait]
impl BlobStore for UnavailableBlobStore {
    async fn store(
        &self,
        _data: Vec<u8>,
        _suggested_key: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Backend("store unavailable".to_string()))
    }

    async fn retrieve(
        &self,
        _reference: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError> {
        Err(CollaboratorError::Backend("store unavailable".to_string()))
    }
}

///
/// XorEncryptor
///
/// Reversible XOR "cipher" that records each call's property and context.
/// Not encryption; only for exercising the codec path.
///

#[derive(Debug)]
pub struct XorEncryptor {
    key: Vec<u8>,
    calls: Mutex<Vec<(String, EncryptionContext)>>,
}

impl XorEncryptor {
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            calls: Mutex::default(),
        }
    }

    /// Property name and context of every call so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, EncryptionContext)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn apply(
        &self,
        data: &[u8],
        property: &str,
        context: &EncryptionContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError> {
        if cancel.is_cancelled() {
            return Err(CollaboratorError::Cancelled);
        }
        if self.key.is_empty() {
            return Err(CollaboratorError::Backend("empty key".to_string()));
        }

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((property.to_string(), context.clone()));

        Ok(data
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect())
    }
}

#[async_trait]
impl FieldEncryptor for XorEncryptor {
    async fn encrypt(
        &self,
        plaintext: &[u8],
        property: &str,
        context: &EncryptionContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError> {
        self.apply(plaintext, property, context, cancel)
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        property: &str,
        context: &EncryptionContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError> {
        self.apply(ciphertext, property, context, cancel)
    }
}
