//! External collaborator boundary.
//!
//! Blob storage and field encryption may block on I/O, so they are async
//! traits taking a cooperative [`CancellationToken`]. The structured
//! serializer is synchronous.

mod json;

pub use json::JsonSerializer;

use crate::value::Value;
use async_trait::async_trait;
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;
use tokio_util::sync::CancellationToken;

/// Key/value context passed verbatim to the field encryptor.
pub type EncryptionContext = BTreeMap<String, String>;

///
/// CollaboratorError
///

#[derive(Debug, ThisError)]
pub enum CollaboratorError {
    #[error("{0}")]
    Backend(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("reference not found: {0}")]
    NotFound(String),
}

///
/// CollaboratorKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CollaboratorKind {
    BlobStore,
    Encryptor,
}

impl fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BlobStore => "blob store",
            Self::Encryptor => "encryptor",
        })
    }
}

///
/// BlobStore
///
/// Out-of-line payload storage. Only the returned reference string is kept
/// inline in the wire record.
///

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data`, returning the reference to persist inline.
    async fn store(
        &self,
        data: Vec<u8>,
        suggested_key: &str,
        cancel: &CancellationToken,
    ) -> Result<String, CollaboratorError>;

    async fn retrieve(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError>;
}

///
/// FieldEncryptor
///

#[async_trait]
pub trait FieldEncryptor: Send + Sync {
    async fn encrypt(
        &self,
        plaintext: &[u8],
        property: &str,
        context: &EncryptionContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError>;

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        property: &str,
        context: &EncryptionContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, CollaboratorError>;
}

///
/// SerializeError
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct SerializeError {
    pub message: String,
}

impl SerializeError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// StructuredSerializer
///
/// Text serializer used by `EmbeddedJson` properties and JSON blob payloads.
///

pub trait StructuredSerializer: Send + Sync {
    /// Identity reported in conversion errors.
    fn name(&self) -> &'static str;

    fn serialize(&self, value: &Value) -> Result<String, SerializeError>;

    fn deserialize(&self, text: &str) -> Result<Value, SerializeError>;
}
