//! Parser configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::MetadataKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parser config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options that change how a BEL document is parsed and validated.
///
/// Every field has a default, so a config file only needs the options it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Normalise smart quotes, non-breaking spaces and whitespace runs before
    /// a statement is parsed.
    pub autostreamline: bool,

    /// Reject `tloc(...)` without `fromLoc`/`toLoc`.
    pub disallow_unqualified_translocations: bool,

    /// Reject names without a namespace. When off, naked names are accepted
    /// and reported once per occurrence.
    pub strict_naked_names: bool,

    /// Accept `A increases (B decreases C)`.
    pub allow_nested: bool,

    /// A new citation clears evidence and annotations, and evidence or
    /// annotations cannot be set without a citation.
    pub citation_clearing: bool,

    /// Treat every `...Exception` kind as fatal for the document.
    pub escalate_exceptions: bool,

    /// Annotations every qualified statement must carry.
    pub required_annotations: Vec<String>,

    /// Metadata without which the document is rejected.
    pub required_metadata: Vec<MetadataKey>,

    /// Metadata whose absence is reported but tolerated.
    pub recommended_metadata: Vec<MetadataKey>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            autostreamline: true,
            disallow_unqualified_translocations: false,
            strict_naked_names: true,
            allow_nested: false,
            citation_clearing: true,
            escalate_exceptions: false,
            required_annotations: Vec::new(),
            required_metadata: vec![
                MetadataKey::Name,
                MetadataKey::Version,
                MetadataKey::Description,
            ],
            recommended_metadata: Vec::new(),
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ParserConfig::from_json_str(
            r#"{ "allow_nested": true, "required_annotations": ["Species"] }"#,
        )
        .expect("valid config");
        assert!(config.allow_nested);
        assert!(config.citation_clearing);
        assert_eq!(config.required_annotations, vec!["Species".to_string()]);
        assert_eq!(config.required_metadata.len(), 3);
    }

    #[test]
    fn metadata_keys_use_document_spelling() {
        let config = ParserConfig::from_json_str(r#"{ "recommended_metadata": ["ContactInfo"] }"#)
            .expect("valid config");
        assert_eq!(config.recommended_metadata, vec![MetadataKey::ContactInfo]);
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(ParserConfig::from_json_str(r#"{ "allow_nested": "yes" }"#).is_err());
    }
}
