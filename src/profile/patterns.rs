// Phrasing tables for client-profile extraction
//
// Each field owns an ordered list of regex alternatives. They are tried in
// order and the first one that matches wins, so more specific phrasings go
// first. Adding a phrasing means adding a row here; the extractor does not
// change.

use anyhow::{Context, Result};
use regex::Regex;

use super::client_info::ClientField;

/// Raw phrasing table: (field, [(pattern name, regex source)])
///
/// All sources are compiled case-insensitively.
const PHRASINGS: &[(ClientField, &[(&str, &str)])] = &[
    (
        ClientField::Name,
        &[
            ("client-name-is", r"client(?:'s)? name(?:d|:)?\s+(?:is\s+)?([a-z]+)"),
            ("name-is", r"name(?:d|:)?\s+(?:is\s+)?([a-z]+)"),
            ("named-or-called", r"(?:named|called)\s+([a-z]+)"),
        ],
    ),
    (
        ClientField::Disability,
        &[
            ("disability-is", r"disability(?:.*?)(?:is|:)\s+([a-z\s]+?)(?:,|\.|and)"),
            ("has-a-disability", r"has\s+(?:a|an)\s+([a-z\s]+?)\s+disability"),
            ("with-a-disability", r"with\s+(?:a|an)\s+([a-z\s]+?)\s+disability"),
            (
                "kind-of-impairment",
                r"(?:visual|hearing|cognitive|physical|mobility|intellectual|learning)\s+(?:disability|impairment)",
            ),
        ],
    ),
    (
        ClientField::Age,
        &[
            ("age-is", r"age(?:d)?(?:.*?)(?:is|:)\s+(\d+)"),
            ("years-old", r"(\d+)(?:\s+|-)?years?\s+old"),
            ("n-year-old", r"(\d+)-year-old"),
            ("age-n", r"\baged?\s+(?:of\s+)?(\d{1,3})\b"),
        ],
    ),
    (
        ClientField::MedicalConditions,
        &[
            (
                "medical-conditions-include",
                r"medical\s+condition(?:s)?(?:.*?)(?:include|:)\s+([a-z\s,]+)(?:\.|\s+and)",
            ),
            ("conditions-include", r"condition(?:s)?(?:.*?)(?:include|:)\s+([a-z\s,]+)(?:\.|\s+and)"),
            (
                "diagnosed-with",
                r"has\s+(?:also\s+)?(?:been\s+)?diagnosed\s+with\s+([a-z\s,]+)(?:\.|\s+and)",
            ),
        ],
    ),
    (
        ClientField::JobInterests,
        &[
            (
                "job-interests-include",
                r"job\s+interest(?:s)?(?:.*?)(?:include|:)\s+([a-z\s,]+)(?:\.|\s+and)",
            ),
            ("interested-in", r"interested\s+in\s+([a-z\s,]+?)\s+(?:job|work|field)"),
            (
                "would-like-to-work",
                r"would\s+like\s+to\s+work\s+(?:in|as)\s+(?:a|an)?\s+([a-z\s,]+)(?:\.|\s+and)",
            ),
        ],
    ),
    (
        ClientField::SkillLevel,
        &[
            ("skill-level-is", r"skill\s+level(?:.*?)(?:is|:)\s+([a-z]+)"),
            ("named-level", r"(?:beginner|intermediate|advanced)\s+level"),
            ("has-level", r"has\s+([a-z]+)\s+(?:level|experience)"),
        ],
    ),
];

/// A single named phrasing for one field
#[derive(Debug, Clone)]
pub struct FieldPattern {
    name: &'static str,
    regex: Regex,
}

impl FieldPattern {
    pub fn new(name: &'static str, source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("(?i){}", source))
            .with_context(|| format!("Invalid client pattern '{}'", name))?;
        Ok(Self { name, regex })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Captured value: group 1 when the pattern has one, otherwise the
    /// whole match.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let captures = self.regex.captures(text)?;
        captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|m| m.as_str())
    }
}

/// Ordered phrasings for one field
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    pub field: ClientField,
    pub patterns: Vec<FieldPattern>,
}

impl FieldPatterns {
    /// First matching phrasing, with its name
    pub fn first_match<'t>(&self, text: &'t str) -> Option<(&'static str, &'t str)> {
        self.patterns
            .iter()
            .find_map(|p| p.capture(text).map(|value| (p.name(), value)))
    }
}

/// Compile the built-in phrasing table
pub fn default_patterns() -> Result<Vec<FieldPatterns>> {
    PHRASINGS
        .iter()
        .map(|(field, rows)| {
            let patterns = rows
                .iter()
                .map(|(name, source)| FieldPattern::new(name, source))
                .collect::<Result<Vec<_>>>()?;
            Ok(FieldPatterns {
                field: *field,
                patterns,
            })
        })
        .collect()
}
