use crate::{codec::EntityCodec, error::CodecError, obs::CodecEvent, wire::WireRecord};

///
/// Verdict
///
/// Outcome of discriminating one wire record against a schema.
///

enum Verdict<'a> {
    Match,
    Miss {
        property: &'a str,
        expected: String,
        actual: Option<String>,
        reason: &'static str,
    },
}

impl EntityCodec {
    /// Whether a raw record plausibly belongs to this schema.
    ///
    /// A configured discriminator decides alone; a missing discriminator
    /// attribute never matches. Without one, every required attribute must
    /// be present.
    #[must_use]
    pub fn matches_entity(&self, wire: &WireRecord) -> bool {
        self.matches_scoped(wire, None)
    }

    /// As [`Self::matches_entity`], for a record read through `index`. The
    /// index's own discriminator overrides the entity-level one.
    #[must_use]
    pub fn matches_entity_for_index(&self, wire: &WireRecord, index: &str) -> bool {
        self.matches_scoped(wire, Some(index))
    }

    /// Validation-flavored discrimination: a miss is a
    /// [`CodecError::DiscriminationMismatch`] naming expected and actual
    /// values.
    pub fn validate_discriminator(
        &self,
        wire: &WireRecord,
        index: Option<&str>,
    ) -> Result<(), CodecError> {
        match self.discriminate(wire, index) {
            Verdict::Match => Ok(()),
            Verdict::Miss {
                property,
                expected,
                actual,
                ..
            } => Err(CodecError::DiscriminationMismatch {
                entity: self.schema.name.clone(),
                property: property.to_string(),
                expected,
                actual,
            }),
        }
    }

    fn matches_scoped(&self, wire: &WireRecord, index: Option<&str>) -> bool {
        match self.discriminate(wire, index) {
            Verdict::Match => true,
            Verdict::Miss { reason, .. } => {
                self.config.emit(CodecEvent::DiscriminationMiss {
                    entity: &self.schema.name,
                    reason,
                });
                false
            }
        }
    }

    fn discriminate<'a>(&'a self, wire: &WireRecord, index: Option<&str>) -> Verdict<'a> {
        if let Some(config) = self.schema.discriminator_for(index) {
            let attribute = self.schema.discriminator_wire_name(config);

            return match wire.get(attribute).map(|value| value.as_text()) {
                None => Verdict::Miss {
                    property: attribute,
                    expected: config.expected(),
                    actual: None,
                    reason: "discriminator attribute missing",
                },
                Some(Some(text)) if config.matches(text) => Verdict::Match,
                Some(text) => Verdict::Miss {
                    property: attribute,
                    expected: config.expected(),
                    actual: Some(text.map_or_else(|| "non-text value".to_string(), str::to_string)),
                    reason: "discriminator value mismatch",
                },
            };
        }

        // structural fallback: required attributes must all be present
        match self
            .schema
            .properties
            .iter()
            .find(|p| p.is_required() && p.is_wire_mapped() && !wire.contains_key(&p.wire_name))
        {
            Some(missing) => Verdict::Miss {
                property: &missing.wire_name,
                expected: "present".to_string(),
                actual: None,
                reason: "required attribute missing",
            },
            None => Verdict::Match,
        }
    }
}
