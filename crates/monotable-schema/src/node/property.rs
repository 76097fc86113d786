use crate::prelude::*;

///
/// Property
///
/// One schema property: logical name, wire attribute name, codec kind and
/// key designation.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub wire_name: String,
    pub kind: PropertyKind,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partition_key: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sort_key: bool,

    /// Accepted names for enum scalars; empty accepts any name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_variants: Vec<String>,
}

impl Property {
    /// Property whose wire name equals its logical name.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        let name = name.into();

        Self {
            wire_name: name.clone(),
            name,
            kind,
            nullable: false,
            partition_key: false,
            sort_key: false,
            enum_variants: Vec::new(),
        }
    }

    #[must_use]
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, PropertyKind::Scalar(kind))
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Text)
    }

    #[must_use]
    pub fn wire(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn partition_key(mut self) -> Self {
        self.partition_key = true;
        self
    }

    #[must_use]
    pub const fn sort_key(mut self) -> Self {
        self.sort_key = true;
        self
    }

    #[must_use]
    pub fn variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_variants = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this property occupies an attribute in the wire record.
    #[must_use]
    pub const fn is_wire_mapped(&self) -> bool {
        self.kind.is_wire_mapped()
    }

    /// Whether this property is a partition or sort key.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        self.partition_key || self.sort_key
    }

    /// Whether the structural discrimination heuristic requires this attribute.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.partition_key || (!self.nullable && matches!(self.kind, PropertyKind::Scalar(_)))
    }

    /// Whether encode/decode of this property must go through the async path.
    #[must_use]
    pub const fn requires_async(&self) -> bool {
        self.kind.requires_async()
    }

    /// Whether an enum name is accepted by this property.
    #[must_use]
    pub fn accepts_variant(&self, name: &str) -> bool {
        self.enum_variants.is_empty() || self.enum_variants.iter().any(|v| v == name)
    }
}

///
/// PropertyKind
///
/// Closed codec taxonomy. Each variant maps to one encode/decode strategy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum PropertyKind {
    /// Composite key assembled from other properties at encode time.
    ComputedKey(ComputedKeyFormula),
    /// Single embedded sub-record, encoded with the named schema's codec.
    Document(String),
    /// Structured value serialized to JSON text.
    EmbeddedJson,
    /// Scalar converted to text, encrypted, stored as binary.
    Encrypted(ScalarKind),
    /// Payload stored through the blob collaborator; only the reference is inline.
    ExternalBlob(BlobPayload),
    /// Key component split out of another property on decode. Not wire-mapped.
    ExtractedKey(ExtractedKeyRule),
    /// Ordered list of scalars.
    List(ScalarKind),
    /// Keyed sub-document.
    Map(MapValueKind),
    /// Related record(s) assembled by multi-record reconstruction. Not wire-mapped.
    Related,
    Scalar(ScalarKind),
    /// Unordered set of unique scalars.
    Set(ScalarKind),
    /// Expiry timestamp stored as whole epoch seconds.
    Ttl,
}

impl PropertyKind {
    #[must_use]
    pub const fn is_wire_mapped(&self) -> bool {
        !matches!(self, Self::ExtractedKey(_) | Self::Related)
    }

    #[must_use]
    pub const fn requires_async(&self) -> bool {
        matches!(self, Self::Encrypted(_) | Self::ExternalBlob(_))
    }

    /// Whether values of this kind are collections assembled across records.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_))
    }

    /// Name of a nested schema this kind depends on, if any.
    #[must_use]
    pub fn nested_schema(&self) -> Option<&str> {
        match self {
            Self::Document(schema)
            | Self::Map(MapValueKind::Record(schema)) => Some(schema.as_str()),
            _ => None,
        }
    }

    /// Scalar kind for key participation checks.
    #[must_use]
    pub const fn key_scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            Self::ComputedKey(_) | Self::ExtractedKey(_) => Some(ScalarKind::Text),
            _ => None,
        }
    }

    /// Stable label used in diagnostics and conversion errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ComputedKey(_) => "ComputedKey",
            Self::Document(_) => "Document",
            Self::EmbeddedJson => "EmbeddedJson",
            Self::Encrypted(_) => "Encrypted",
            Self::ExternalBlob(BlobPayload::Json) => "EmbeddedJson+ExternalBlob",
            Self::ExternalBlob(_) => "ExternalBlob",
            Self::ExtractedKey(_) => "ExtractedKey",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Related => "Related",
            Self::Scalar(_) => "Scalar",
            Self::Set(_) => "Set",
            Self::Ttl => "Ttl",
        }
    }
}

///
/// MapValueKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MapValueKind {
    /// string → string
    Text,
    /// string → any value, each wrapped as its own wire value
    Opaque,
    /// string → nested record described by the named schema
    Record(String),
}

///
/// BlobPayload
///
/// How an externally stored value becomes a byte stream.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BlobPayload {
    Bytes,
    Text,
    /// JSON-serialize first, then store the bytes externally.
    Json,
}
