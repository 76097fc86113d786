use crate::{
    collab::{BlobStore, EncryptionContext, FieldEncryptor, JsonSerializer, StructuredSerializer},
    obs::{CodecEvent, CodecTraceSink},
};
use std::{fmt, sync::Arc};

///
/// TtlRange
///
/// Representable epoch-seconds window for `Ttl` properties.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TtlRange {
    /// `[0, 2^31 - 1]`: 1970-01-01T00:00:00Z through 2038-01-19T03:14:07Z.
    #[default]
    Epoch32,
    Epoch64,
}

impl TtlRange {
    #[must_use]
    pub const fn min(self) -> i64 {
        match self {
            Self::Epoch32 | Self::Epoch64 => 0,
        }
    }

    #[must_use]
    pub const fn max(self) -> i64 {
        match self {
            Self::Epoch32 => 2_147_483_647,
            Self::Epoch64 => i64::MAX,
        }
    }

    #[must_use]
    pub const fn contains(self, seconds: i64) -> bool {
        seconds >= self.min() && seconds <= self.max()
    }
}

///
/// CodecConfig
///
/// Collaborators and policy for one compiled codec. Nested codecs compiled
/// through a registry carry their own config.
///

#[derive(Clone)]
pub struct CodecConfig {
    pub(crate) serializer: Arc<dyn StructuredSerializer>,
    pub(crate) blob_store: Option<Arc<dyn BlobStore>>,
    pub(crate) encryptor: Option<Arc<dyn FieldEncryptor>>,
    pub(crate) trace: Option<Arc<dyn CodecTraceSink>>,
    pub(crate) ttl_range: TtlRange,
    pub(crate) encryption_context: EncryptionContext,
}

impl CodecConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn StructuredSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    #[must_use]
    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_encryptor(mut self, encryptor: Arc<dyn FieldEncryptor>) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    #[must_use]
    pub fn with_trace_sink(mut self, sink: Arc<dyn CodecTraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    #[must_use]
    pub const fn with_ttl_range(mut self, range: TtlRange) -> Self {
        self.ttl_range = range;
        self
    }

    #[must_use]
    pub fn with_encryption_context(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.encryption_context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn ttl_range(&self) -> TtlRange {
        self.ttl_range
    }

    #[must_use]
    pub fn serializer(&self) -> &dyn StructuredSerializer {
        self.serializer.as_ref()
    }

    #[must_use]
    pub const fn encryption_context(&self) -> &EncryptionContext {
        &self.encryption_context
    }

    pub(crate) fn emit(&self, event: CodecEvent<'_>) {
        if let Some(sink) = &self.trace {
            sink.on_event(event);
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            serializer: Arc::new(JsonSerializer),
            blob_store: None,
            encryptor: None,
            trace: None,
            ttl_range: TtlRange::default(),
            encryption_context: EncryptionContext::new(),
        }
    }
}

impl fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecConfig")
            .field("serializer", &self.serializer.name())
            .field("blob_store", &self.blob_store.is_some())
            .field("encryptor", &self.encryptor.is_some())
            .field("trace", &self.trace.is_some())
            .field("ttl_range", &self.ttl_range)
            .field("encryption_context", &self.encryption_context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch32_bounds() {
        let range = TtlRange::Epoch32;

        assert!(range.contains(0));
        assert!(range.contains(2_147_483_647));
        assert!(!range.contains(-1));
        assert!(!range.contains(2_147_483_648));
        assert!(TtlRange::Epoch64.contains(2_147_483_648));
    }

    #[test]
    fn defaults_use_json_and_no_collaborators() {
        let config = CodecConfig::default().with_encryption_context("tenant", "t1");

        assert_eq!(config.serializer().name(), "json");
        assert!(config.blob_store.is_none());
        assert_eq!(
            config.encryption_context().get("tenant").map(String::as_str),
            Some("t1")
        );
    }
}
