//! Discriminator analysis.
//!
//! Normalizes a raw discriminator specification (explicit literal, wildcard
//! pattern, or legacy marker) into a [`DiscriminatorConfig`] whose
//! [`DiscriminatorConfig::matches`] never allocates.

use crate::DEFAULT_DISCRIMINATOR_PROPERTY;
use serde::{Deserialize, Serialize};

const WILDCARD: char = '*';

///
/// DiscriminatorSpec
///
/// Raw, un-normalized discriminator input as authored by ingestion.
/// When both `value` and `pattern` are present the literal wins.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DiscriminatorSpec {
    #[serde(default = "default_property")]
    pub property: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn default_property() -> String {
    DEFAULT_DISCRIMINATOR_PROPERTY.to_string()
}

impl DiscriminatorSpec {
    /// Explicit comparison literal on `property`.
    #[must_use]
    pub fn literal(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: Some(value.into()),
            pattern: None,
        }
    }

    /// Wildcard pattern on `property`.
    #[must_use]
    pub fn pattern(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: None,
            pattern: Some(pattern.into()),
        }
    }

    /// Legacy single-field marker; the property is always `entity_type`.
    #[must_use]
    pub fn legacy(marker: impl Into<String>) -> Self {
        Self::literal(DEFAULT_DISCRIMINATOR_PROPERTY, marker)
    }

    /// Attach a pattern alongside an existing literal.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Whether both a literal and a pattern were supplied (the pattern is ignored).
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        self.value.is_some() && self.pattern.is_some()
    }

    /// Normalize into a resolved configuration.
    #[must_use]
    pub fn analyze(&self) -> DiscriminatorConfig {
        analyze(self)
    }
}

///
/// MatchStrategy
///

#[derive(Clone, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum MatchStrategy {
    /// Interior wildcards. Each literal part is checked independently; the
    /// relative order of middle parts is not verified.
    Complex {
        parts: Vec<String>,
        leading_wildcard: bool,
        trailing_wildcard: bool,
    },
    Contains,
    EndsWith,
    ExactMatch,
    None,
    StartsWith,
}

impl MatchStrategy {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Complex { .. } => "complex",
            Self::Contains => "contains",
            Self::EndsWith => "ends_with",
            Self::ExactMatch => "exact",
            Self::None => "none",
            Self::StartsWith => "starts_with",
        }
    }
}

///
/// DiscriminatorConfig
///
/// Normalized `{ property, strategy, literal }` tuple. For `Complex` the
/// literal keeps the original pattern text for diagnostics.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "DiscriminatorSpec", into = "DiscriminatorSpec")]
pub struct DiscriminatorConfig {
    pub property: String,
    pub strategy: MatchStrategy,
    pub literal: String,
}

impl DiscriminatorConfig {
    /// Configuration for a bare wildcard pattern.
    #[must_use]
    pub fn from_pattern(property: impl Into<String>, pattern: &str) -> Self {
        let property = property.into();
        let (strategy, literal) = classify_pattern(pattern);

        Self {
            property,
            strategy,
            literal,
        }
    }

    /// Whether this configuration participates in discrimination at all.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.strategy, MatchStrategy::None)
    }

    /// Apply the configured comparison to one attribute value.
    ///
    /// `None` never matches: a record cannot be identified by an inactive
    /// discriminator.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let literal = self.literal.as_str();

        match &self.strategy {
            MatchStrategy::None => false,
            MatchStrategy::ExactMatch => value == literal,
            MatchStrategy::StartsWith => value.starts_with(literal),
            MatchStrategy::EndsWith => value.ends_with(literal),
            MatchStrategy::Contains => value.contains(literal),
            MatchStrategy::Complex {
                parts,
                leading_wildcard,
                trailing_wildcard,
            } => matches_complex(value, parts, *leading_wildcard, *trailing_wildcard),
        }
    }

    /// The comparison text reported in mismatch diagnostics.
    #[must_use]
    pub fn expected(&self) -> String {
        match &self.strategy {
            MatchStrategy::None | MatchStrategy::ExactMatch | MatchStrategy::Complex { .. } => {
                self.literal.clone()
            }
            MatchStrategy::StartsWith => format!("{}{WILDCARD}", self.literal),
            MatchStrategy::EndsWith => format!("{WILDCARD}{}", self.literal),
            MatchStrategy::Contains => format!("{WILDCARD}{}{WILDCARD}", self.literal),
        }
    }
}

impl From<DiscriminatorSpec> for DiscriminatorConfig {
    fn from(spec: DiscriminatorSpec) -> Self {
        analyze(&spec)
    }
}

impl From<DiscriminatorConfig> for DiscriminatorSpec {
    fn from(config: DiscriminatorConfig) -> Self {
        match config.strategy {
            MatchStrategy::None => Self {
                property: config.property,
                value: None,
                pattern: None,
            },
            MatchStrategy::ExactMatch => Self::literal(config.property, config.literal),
            MatchStrategy::Complex { .. } => Self::pattern(config.property, config.literal),
            _ => {
                let pattern = config.expected();
                Self::pattern(config.property, pattern)
            }
        }
    }
}

/// Resolve a raw specification into a normalized configuration.
#[must_use]
pub fn analyze(spec: &DiscriminatorSpec) -> DiscriminatorConfig {
    let property = spec.property.clone();

    if let Some(value) = &spec.value {
        return DiscriminatorConfig {
            property,
            strategy: MatchStrategy::ExactMatch,
            literal: value.clone(),
        };
    }

    match &spec.pattern {
        Some(pattern) => DiscriminatorConfig::from_pattern(property, pattern),
        None => DiscriminatorConfig {
            property,
            strategy: MatchStrategy::None,
            literal: String::new(),
        },
    }
}

// Classify one pattern into its strategy and comparison literal.
fn classify_pattern(pattern: &str) -> (MatchStrategy, String) {
    if pattern.len() == 1 && pattern.starts_with(WILDCARD) {
        return (MatchStrategy::Contains, String::new());
    }

    let leading = pattern.starts_with(WILDCARD);
    let trailing = pattern.ends_with(WILDCARD);
    let start = usize::from(leading);
    let end = pattern.len() - usize::from(trailing);
    let inner = &pattern[start..end];

    if inner.contains(WILDCARD) {
        let parts = pattern
            .split(WILDCARD)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        return (
            MatchStrategy::Complex {
                parts,
                leading_wildcard: leading,
                trailing_wildcard: trailing,
            },
            pattern.to_string(),
        );
    }

    let strategy = match (leading, trailing) {
        (false, false) => MatchStrategy::ExactMatch,
        (false, true) => MatchStrategy::StartsWith,
        (true, false) => MatchStrategy::EndsWith,
        (true, true) => MatchStrategy::Contains,
    };

    (strategy, inner.to_string())
}

// Interior-wildcard matching: anchored first/last parts, independent middle parts.
fn matches_complex(value: &str, parts: &[String], leading: bool, trailing: bool) -> bool {
    let last = parts.len().saturating_sub(1);

    parts.iter().enumerate().all(|(i, part)| {
        let part = part.as_str();
        let anchor_start = i == 0 && !leading;
        let anchor_end = i == last && !trailing;

        match (anchor_start, anchor_end) {
            (true, true) => value.starts_with(part) && value.ends_with(part),
            (true, false) => value.starts_with(part),
            (false, true) => value.ends_with(part),
            (false, false) => value.contains(part),
        }
    })
}

///
/// TESTS
///
