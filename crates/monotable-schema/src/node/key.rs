use crate::prelude::*;

///
/// ComputedKeyFormula
///
/// Ordered source properties plus the rule joining their key text.
/// Sources must be populated before the owning key is computed.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ComputedKeyFormula {
    pub sources: Vec<String>,
    pub format: KeyFormat,
}

impl ComputedKeyFormula {
    /// Join `sources` with `separator`.
    #[must_use]
    pub fn joined<I, S>(sources: I, separator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            format: KeyFormat::Separator(separator.into()),
        }
    }

    /// Substitute `sources` into a `{0}`, `{1}`, ... template.
    #[must_use]
    pub fn template<I, S>(sources: I, template: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            format: KeyFormat::Template(template.into()),
        }
    }
}

///
/// KeyFormat
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum KeyFormat {
    Separator(String),
    Template(String),
}

impl KeyFormat {
    /// Render key text from already-stringified parts.
    ///
    /// Template placeholders outside `parts` render as empty text; schema
    /// validation rejects such templates before they reach a codec.
    #[must_use]
    pub fn render(&self, parts: &[&str]) -> String {
        match self {
            Self::Separator(separator) => parts.join(separator),
            Self::Template(template) => {
                let capacity = template.len() + parts.iter().map(|p| p.len()).sum::<usize>();
                let mut out = String::with_capacity(capacity);

                for segment in TemplateSegments::new(template) {
                    match segment {
                        TemplateSegment::Literal(text) => out.push_str(text),
                        TemplateSegment::Placeholder(index) => {
                            out.push_str(parts.get(index).copied().unwrap_or_default());
                        }
                    }
                }

                out
            }
        }
    }

    /// Placeholder indices referenced by a template, in order of appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<usize> {
        match self {
            Self::Separator(_) => Vec::new(),
            Self::Template(template) => TemplateSegments::new(template)
                .filter_map(|segment| match segment {
                    TemplateSegment::Placeholder(index) => Some(index),
                    TemplateSegment::Literal(_) => None,
                })
                .collect(),
        }
    }
}

///
/// ExtractedKeyRule
///
/// Positional split of another property's decoded key text.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExtractedKeyRule {
    pub source: String,
    pub separator: String,
    pub index: usize,
}

impl ExtractedKeyRule {
    #[must_use]
    pub fn new(source: impl Into<String>, separator: impl Into<String>, index: usize) -> Self {
        Self {
            source: source.into(),
            separator: separator.into(),
            index,
        }
    }

    /// Token at `index` after splitting `source` on the separator.
    ///
    /// Empty input or an out-of-range index yields `None`; extraction is
    /// best-effort and never an error.
    #[must_use]
    pub fn extract<'a>(&self, source: &'a str) -> Option<&'a str> {
        if source.is_empty() || self.separator.is_empty() {
            return None;
        }

        source.split(self.separator.as_str()).nth(self.index)
    }
}

///
/// TemplateSegment
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TemplateSegment<'a> {
    Literal(&'a str),
    Placeholder(usize),
}

// Iterator over literal runs and `{N}` placeholders; malformed braces are literal.
struct TemplateSegments<'a> {
    rest: &'a str,
}

impl<'a> TemplateSegments<'a> {
    const fn new(template: &'a str) -> Self {
        Self { rest: template }
    }
}

impl<'a> Iterator for TemplateSegments<'a> {
    type Item = TemplateSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        if let Some((index, consumed)) = parse_placeholder(self.rest) {
            self.rest = &self.rest[consumed..];
            return Some(TemplateSegment::Placeholder(index));
        }

        // literal run up to the next '{' that starts a valid placeholder
        let mut end = self.rest.len();
        for (pos, _) in self.rest.match_indices('{').filter(|(pos, _)| *pos > 0) {
            if parse_placeholder(&self.rest[pos..]).is_some() {
                end = pos;
                break;
            }
        }

        let (literal, rest) = self.rest.split_at(end);
        self.rest = rest;

        Some(TemplateSegment::Literal(literal))
    }
}

// Parse a leading `{digits}`; returns the index and consumed byte length.
fn parse_placeholder(text: &str) -> Option<(usize, usize)> {
    let body = text.strip_prefix('{')?;
    let close = body.find('}')?;
    let digits = &body[..close];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let index = digits.parse().ok()?;

    Some((index, close + 2))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn separator_joins_parts_in_order() {
        let format = KeyFormat::Separator("#".to_string());

        assert_eq!(format.render(&["t1", "42"]), "t1#42");
    }

    #[test]
    fn template_substitutes_positional_placeholders() {
        let format = KeyFormat::Template("TENANT#{0}#USER#{1}".to_string());

        assert_eq!(format.render(&["t1", "42"]), "TENANT#t1#USER#42");
        assert_eq!(format.placeholders(), vec![0, 1]);
    }

    #[test]
    fn template_allows_reordering_and_repeats() {
        let format = KeyFormat::Template("{1}-{0}-{1}".to_string());

        assert_eq!(format.render(&["a", "b"]), "b-a-b");
    }

    #[test]
    fn malformed_braces_stay_literal() {
        let format = KeyFormat::Template("{x}{0}{".to_string());

        assert_eq!(format.render(&["v"]), "{x}v{");
        assert_eq!(format.placeholders(), vec![0]);
    }

    #[test]
    fn extract_takes_positional_token() {
        let rule = ExtractedKeyRule::new("pk", "#", 1);

        assert_eq!(rule.extract("t1#42"), Some("42"));
    }

    #[test]
    fn extract_out_of_range_is_none() {
        let rule = ExtractedKeyRule::new("pk", "#", 5);

        assert_eq!(rule.extract("t1#42"), None);
    }

    #[test]
    fn extract_empty_source_is_none() {
        let rule = ExtractedKeyRule::new("pk", "#", 0);

        assert_eq!(rule.extract(""), None);
    }

    proptest! {
        #[test]
        fn joined_parts_split_back(parts in proptest::collection::vec("[a-z0-9]{1,6}", 1..6)) {
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
            let key = KeyFormat::Separator("#".to_string()).render(&refs);

            for (index, part) in parts.iter().enumerate() {
                let rule = ExtractedKeyRule::new("pk", "#", index);
                prop_assert_eq!(rule.extract(&key), Some(part.as_str()));
            }
        }
    }
}
