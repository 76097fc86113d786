//! Strategies that leave the codec: structured serializer, blob store and
//! field encryptor.

use crate::{
    codec::{EntityCodec, encode::KeyScratch, scalar},
    collab::{CollaboratorError, CollaboratorKind},
    error::FieldError,
    obs::CodecEvent,
    value::{Record, Value},
    wire::WireValue,
};
use monotable_primitives::ScalarKind;
use monotable_schema::node::{BlobPayload, Property};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

impl EntityCodec {
    pub(crate) fn encode_json(&self, value: &Value) -> Result<WireValue, FieldError> {
        self.serialize(value, "EmbeddedJson").map(WireValue::String)
    }

    pub(crate) fn decode_json(&self, raw: &WireValue) -> Result<Value, FieldError> {
        let WireValue::String(text) = raw else {
            return Err(FieldError::conversion(
                raw,
                "EmbeddedJson",
                format!("expected S wire value, found {}", raw.tag()),
            ));
        };

        self.deserialize(text, "EmbeddedJson")
    }

    pub(crate) async fn store_blob(
        &self,
        payload: BlobPayload,
        property: &Property,
        value: &Value,
        record: &Record,
        keys: &KeyScratch<'_>,
        cancel: &CancellationToken,
    ) -> Result<WireValue, FieldError> {
        let store = self
            .config
            .blob_store
            .as_deref()
            .ok_or_else(|| missing(CollaboratorKind::BlobStore, property))?;

        let data = match (payload, value) {
            (BlobPayload::Bytes, Value::Blob(bytes)) => bytes.clone(),
            (BlobPayload::Text, Value::Text(text)) => text.clone().into_bytes(),
            (BlobPayload::Json, value) => {
                self.serialize(value, payload_label(payload))?.into_bytes()
            }
            (payload, value) => {
                return Err(FieldError::conversion(
                    value,
                    payload_label(payload),
                    format!("cannot store {} value as {payload:?}", value.label()),
                ));
            }
        };

        let key = self.blob_key(property, record, keys);
        self.before_call(CollaboratorKind::BlobStore, "store", property, Some(&key), cancel)?;

        let reference = store
            .store(data, &key, cancel)
            .await
            .map_err(|source| {
                collaborator(CollaboratorKind::BlobStore, "store", Some(key), source)
            })?;

        Ok(WireValue::String(reference))
    }

    pub(crate) async fn retrieve_blob(
        &self,
        payload: BlobPayload,
        property: &Property,
        raw: &WireValue,
        cancel: &CancellationToken,
    ) -> Result<Value, FieldError> {
        let store = self
            .config
            .blob_store
            .as_deref()
            .ok_or_else(|| missing(CollaboratorKind::BlobStore, property))?;

        let WireValue::String(reference) = raw else {
            return Err(FieldError::conversion(
                raw,
                payload_label(payload),
                format!("expected S reference, found {}", raw.tag()),
            ));
        };

        self.before_call(
            CollaboratorKind::BlobStore,
            "retrieve",
            property,
            Some(reference),
            cancel,
        )?;

        let data = store.retrieve(reference, cancel).await.map_err(|source| {
            collaborator(
                CollaboratorKind::BlobStore,
                "retrieve",
                Some(reference.clone()),
                source,
            )
        })?;

        match payload {
            BlobPayload::Bytes => Ok(Value::Blob(data)),
            BlobPayload::Text => String::from_utf8(data)
                .map(Value::Text)
                .map_err(|err| FieldError::conversion(err.as_bytes(), "Text", "invalid utf-8")),
            BlobPayload::Json => {
                let text = String::from_utf8(data).map_err(|err| {
                    FieldError::conversion(err.as_bytes(), payload_label(payload), "invalid utf-8")
                })?;
                self.deserialize(&text, payload_label(payload))
            }
        }
    }

    pub(crate) async fn encrypt(
        &self,
        kind: ScalarKind,
        property: &Property,
        value: &Value,
        cancel: &CancellationToken,
    ) -> Result<WireValue, FieldError> {
        let encryptor = self
            .config
            .encryptor
            .as_deref()
            .ok_or_else(|| missing(CollaboratorKind::Encryptor, property))?;

        let plain = scalar::to_plain(kind, value, property)?;
        self.before_call(CollaboratorKind::Encryptor, "encrypt", property, None, cancel)?;

        let cipher = encryptor
            .encrypt(&plain, &property.name, &self.config.encryption_context, cancel)
            .await
            .map_err(|source| collaborator(CollaboratorKind::Encryptor, "encrypt", None, source))?;

        Ok(WireValue::Binary(cipher))
    }

    pub(crate) async fn decrypt(
        &self,
        kind: ScalarKind,
        property: &Property,
        raw: &WireValue,
        cancel: &CancellationToken,
    ) -> Result<Value, FieldError> {
        let encryptor = self
            .config
            .encryptor
            .as_deref()
            .ok_or_else(|| missing(CollaboratorKind::Encryptor, property))?;

        let WireValue::Binary(cipher) = raw else {
            return Err(FieldError::conversion(
                raw,
                "Encrypted",
                format!("expected B ciphertext, found {}", raw.tag()),
            ));
        };

        self.before_call(CollaboratorKind::Encryptor, "decrypt", property, None, cancel)?;

        let plain = encryptor
            .decrypt(cipher, &property.name, &self.config.encryption_context, cancel)
            .await
            .map_err(|source| collaborator(CollaboratorKind::Encryptor, "decrypt", None, source))?;

        scalar::from_plain(kind, plain, property)
    }

    /// Suggested blob key: entity, a digest of the record's key text, and
    /// the property name. Records without a partition key value get a random
    /// identifier instead of the digest.
    pub(crate) fn blob_key(
        &self,
        property: &Property,
        record: &Record,
        keys: &KeyScratch<'_>,
    ) -> String {
        let key_text = |key: &Property| {
            keys.get(key.name.as_str())
                .or_else(|| record.present(&key.name))
                .and_then(Value::key_text)
        };

        let Some(partition) = self.schema.partition_key().and_then(key_text) else {
            return format!("{}/{}/{}", self.schema.name, Ulid::new(), property.name);
        };

        let mut hasher = Sha256::new();
        hasher.update(partition.as_bytes());
        if let Some(sort) = self.schema.sort_key().and_then(key_text) {
            hasher.update([0]);
            hasher.update(sort.as_bytes());
        }

        let mut digest = String::with_capacity(32);
        for byte in &hasher.finalize()[..16] {
            let _ = write!(digest, "{byte:02x}");
        }

        format!("{}/{digest}/{}", self.schema.name, property.name)
    }

    fn serialize(&self, value: &Value, target: &str) -> Result<String, FieldError> {
        let serializer = self.config.serializer();

        serializer.serialize(value).map_err(|err| {
            FieldError::conversion(
                value,
                format!("{target} via {}", serializer.name()),
                err.message,
            )
        })
    }

    fn deserialize(&self, text: &str, target: &str) -> Result<Value, FieldError> {
        let serializer = self.config.serializer();

        serializer.deserialize(text).map_err(|err| {
            FieldError::conversion(
                text,
                format!("{target} via {}", serializer.name()),
                err.message,
            )
        })
    }

    // cancellation is checked before the call and the call is traced
    fn before_call(
        &self,
        kind: CollaboratorKind,
        operation: &'static str,
        property: &Property,
        key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), FieldError> {
        if cancel.is_cancelled() {
            return Err(collaborator(
                kind,
                operation,
                key.map(str::to_string),
                CollaboratorError::Cancelled,
            ));
        }

        self.config.emit(CodecEvent::CollaboratorCall {
            entity: &self.schema.name,
            property: &property.name,
            collaborator: kind,
            op: operation,
        });

        Ok(())
    }
}

const fn payload_label(payload: BlobPayload) -> &'static str {
    match payload {
        BlobPayload::Bytes => "ExternalBlob<Bytes>",
        BlobPayload::Json => "EmbeddedJson+ExternalBlob",
        BlobPayload::Text => "ExternalBlob<Text>",
    }
}

fn missing(kind: CollaboratorKind, property: &Property) -> FieldError {
    FieldError::Configuration(format!(
        "property '{}' ({}) needs a {kind} but none is configured",
        property.name,
        property.kind.label()
    ))
}

const fn collaborator(
    collaborator: CollaboratorKind,
    operation: &'static str,
    key: Option<String>,
    source: CollaboratorError,
) -> FieldError {
    FieldError::Collaborator {
        collaborator,
        operation,
        key,
        source,
    }
}
