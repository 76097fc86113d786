use crate::collab::{CollaboratorError, CollaboratorKind};
use std::fmt;
use thiserror::Error as ThisError;

///
/// CodecError
///
/// Every failure crossing the codec boundary. Per-property failures abort the
/// whole record; no partial wire or typed record is ever returned.
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("{entity}: property '{property}' requires the async entry point")]
    AsyncRequired { entity: String, property: String },

    #[error(
        "{entity}.{property}: {collaborator} {operation} failed{}: {source}",
        key_suffix(.key.as_deref())
    )]
    Collaborator {
        entity: String,
        property: String,
        collaborator: CollaboratorKind,
        operation: &'static str,
        key: Option<String>,
        source: CollaboratorError,
    },

    #[error("{entity}: configuration error: {message}")]
    Configuration { entity: String, message: String },

    #[error("{entity}.{property}: cannot convert {value} to {target}: {reason}")]
    Conversion {
        entity: String,
        property: String,
        value: String,
        target: String,
        reason: String,
    },

    #[error(
        "{entity}: discriminator '{property}' expected {expected}, found {}",
        .actual.as_deref().unwrap_or("property not found")
    )]
    DiscriminationMismatch {
        entity: String,
        property: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("{entity}.{property}: epoch seconds {seconds} outside [{min}, {max}]")]
    Range {
        entity: String,
        property: String,
        seconds: i64,
        min: i64,
        max: i64,
    },

    #[error("{entity}: reconstruction failed at record {record}: {reason}")]
    Reconstruction {
        entity: String,
        record: String,
        reason: String,
        source: Option<Box<Self>>,
    },

    #[error("{entity}.{property}: unsupported {context} element type {element}")]
    UnsupportedType {
        entity: String,
        property: String,
        context: &'static str,
        element: String,
    },
}

impl CodecError {
    pub(crate) fn configuration(entity: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    /// Stable classification independent of message text.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AsyncRequired { .. } | Self::Configuration { .. } => ErrorClass::Configuration,
            Self::Collaborator { .. } => ErrorClass::Collaborator,
            Self::Conversion { .. } => ErrorClass::Conversion,
            Self::DiscriminationMismatch { .. } => ErrorClass::Mismatch,
            Self::Range { .. } => ErrorClass::Range,
            Self::Reconstruction { .. } => ErrorClass::Reconstruction,
            Self::UnsupportedType { .. } => ErrorClass::Unsupported,
        }
    }

    /// Entity named by this error.
    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            Self::AsyncRequired { entity, .. }
            | Self::Collaborator { entity, .. }
            | Self::Configuration { entity, .. }
            | Self::Conversion { entity, .. }
            | Self::DiscriminationMismatch { entity, .. }
            | Self::Range { entity, .. }
            | Self::Reconstruction { entity, .. }
            | Self::UnsupportedType { entity, .. } => entity,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

fn key_suffix(key: Option<&str>) -> String {
    key.map(|key| format!(" (key '{key}')")).unwrap_or_default()
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    Collaborator,
    Configuration,
    Conversion,
    Mismatch,
    Range,
    Reconstruction,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Collaborator => "collaborator",
            Self::Configuration => "configuration",
            Self::Conversion => "conversion",
            Self::Mismatch => "discrimination_mismatch",
            Self::Range => "range",
            Self::Reconstruction => "reconstruction",
            Self::Unsupported => "unsupported",
        };

        write!(f, "{label}")
    }
}

///
/// FieldError
///
/// Property-level failure raised by a codec strategy before the owning
/// entity and property are known; `at` attaches that context.
///

#[derive(Debug)]
pub(crate) enum FieldError {
    Collaborator {
        collaborator: CollaboratorKind,
        operation: &'static str,
        key: Option<String>,
        source: CollaboratorError,
    },
    Configuration(String),
    Conversion {
        value: String,
        target: String,
        reason: String,
    },
    /// Failure inside a nested record codec; already fully attributed.
    Nested(Box<CodecError>),
    Range {
        seconds: i64,
        min: i64,
        max: i64,
    },
    Unsupported {
        context: &'static str,
        element: String,
    },
}

impl FieldError {
    pub(crate) fn conversion(
        value: impl fmt::Debug,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            value: format!("{value:?}"),
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn at(self, entity: &str, property: &str) -> CodecError {
        let entity = entity.to_string();
        let property = property.to_string();

        match self {
            Self::Collaborator {
                collaborator,
                operation,
                key,
                source,
            } => CodecError::Collaborator {
                entity,
                property,
                collaborator,
                operation,
                key,
                source,
            },
            Self::Configuration(message) => CodecError::Configuration { entity, message },
            Self::Conversion {
                value,
                target,
                reason,
            } => CodecError::Conversion {
                entity,
                property,
                value,
                target,
                reason,
            },
            Self::Nested(err) => *err,
            Self::Range { seconds, min, max } => CodecError::Range {
                entity,
                property,
                seconds,
                min,
                max,
            },
            Self::Unsupported { context, element } => CodecError::UnsupportedType {
                entity,
                property,
                context,
                element,
            },
        }
    }
}

impl From<CodecError> for FieldError {
    fn from(err: CodecError) -> Self {
        Self::Nested(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_reports_missing_property() {
        let err = CodecError::DiscriminationMismatch {
            entity: "User".into(),
            property: "entity_type".into(),
            expected: "USER#*".into(),
            actual: None,
        };

        assert_eq!(err.class(), ErrorClass::Mismatch);
        assert!(err.to_string().contains("property not found"), "{err}");
    }

    #[test]
    fn field_errors_pick_up_entity_context() {
        let err = FieldError::conversion("abc", "Int", "invalid digit").at("Order", "total");

        assert_eq!(err.class(), ErrorClass::Conversion);
        assert_eq!(err.entity(), "Order");
        assert_eq!(
            err.to_string(),
            "Order.total: cannot convert \"abc\" to Int: invalid digit"
        );
    }

    #[test]
    fn nested_errors_keep_their_own_attribution() {
        let inner = FieldError::Range {
            seconds: -1,
            min: 0,
            max: 10,
        }
        .at("Address", "expires");
        let err = FieldError::from(inner).at("User", "address");

        assert_eq!(err.entity(), "Address");
        assert_eq!(err.class(), ErrorClass::Range);
    }

    #[test]
    fn collaborator_errors_name_the_key() {
        let err = FieldError::Collaborator {
            collaborator: CollaboratorKind::BlobStore,
            operation: "store",
            key: Some("User/abc/avatar".into()),
            source: CollaboratorError::Cancelled,
        }
        .at("User", "avatar");

        let text = err.display_with_class();
        assert!(text.starts_with("collaborator: "), "{text}");
        assert!(text.contains("key 'User/abc/avatar'"), "{text}");
    }
}
