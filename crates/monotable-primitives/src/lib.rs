//! Scalar kind registry shared by the schema and core crates.
//!
//! Every scalar the codec understands is listed exactly once in
//! `scalar_kind_registry_entries!`; capability lookups are expanded from that
//! table so schema validation and the property dispatcher never disagree.

#[macro_use]
mod macros;

use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// ScalarKind
///
/// Canonical scalar kind used for shared capability metadata.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum ScalarKind {
    Blob,
    Bool,
    Decimal,
    Enum,
    Float64,
    Int,
    Text,
    Timestamp,
    Uint,
    Ulid,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    /// Stable human-readable label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        scalar_kind_registry!(label_from_registry, self)
    }

    /// Return the wire variant family this scalar encodes into.
    #[must_use]
    pub const fn wire_family(self) -> WireFamily {
        self.metadata().wire
    }

    /// Return the set encoding family, if sets of this scalar are representable.
    #[must_use]
    pub const fn set_family(self) -> Option<SetFamily> {
        self.metadata().set_family
    }

    /// Return whether this scalar encodes as decimal text.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.metadata().is_numeric
    }

    /// Return whether this scalar may participate in a key attribute or a
    /// composite key formula.
    #[must_use]
    pub const fn is_keyable(self) -> bool {
        self.metadata().is_keyable
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared across schema/core layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScalarMetadata {
    pub wire: WireFamily,
    pub set_family: Option<SetFamily>,
    pub is_numeric: bool,
    pub is_keyable: bool,
}

///
/// WireFamily
///
/// Wire variant a single scalar value lands in.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum WireFamily {
    Binary,
    Bool,
    Number,
    String,
}

///
/// SetFamily
///
/// Wire set variant used for an unordered collection of one scalar kind.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum SetFamily {
    BinarySet,
    NumberSet,
    StringSet,
}

/// Ordered list of all scalar kinds in registry order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 10] = scalar_kind_registry!(all_kinds_from_registry);

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_every_kind_once() {
        let mut kinds = ALL_SCALAR_KINDS.to_vec();
        kinds.sort();
        kinds.dedup();

        assert_eq!(kinds.len(), ALL_SCALAR_KINDS.len());
    }

    #[test]
    fn set_families_follow_wire_families() {
        for kind in ALL_SCALAR_KINDS {
            match (kind.wire_family(), kind.set_family()) {
                (WireFamily::String, Some(set)) => assert_eq!(set, SetFamily::StringSet),
                (WireFamily::Number, Some(set)) => assert_eq!(set, SetFamily::NumberSet),
                (WireFamily::Binary, Some(set)) => assert_eq!(set, SetFamily::BinarySet),
                (WireFamily::Bool, set) => assert!(set.is_none(), "bool sets are unsupported"),
                (family, None) => panic!("{kind} ({family}) should have a set family"),
            }
        }
    }

    #[test]
    fn numeric_kinds_encode_as_numbers() {
        for kind in ALL_SCALAR_KINDS {
            assert_eq!(kind.is_numeric(), kind.wire_family() == WireFamily::Number);
        }
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for kind in ALL_SCALAR_KINDS {
            let parsed: ScalarKind = kind.label().parse().expect("label should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn kinds_serialize_as_plain_names() {
        let json = serde_json::to_string(&ScalarKind::Timestamp).expect("serialize");
        assert_eq!(json, "\"Timestamp\"");
    }
}
