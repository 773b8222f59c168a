//! Error taxonomy for BEL documents.
//!
//! Every problem the parser can report is one [`BelError`] variant. The
//! document loader decides what happens next: most errors skip the line and
//! become a [`WarningRecord`], a few halt the document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::ContextSnapshot;
use crate::language::{Function, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Syntax,
    Resolution,
    Provenance,
    Semantic,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BelError {
    // ------------------------------------------------------------------
    // Syntax
    // ------------------------------------------------------------------
    #[error("invalid BEL syntax at column {column}: {message}")]
    Syntax { column: usize, message: String },

    // ------------------------------------------------------------------
    // Term resolution
    // ------------------------------------------------------------------
    #[error("undefined namespace `{namespace}` (in `{namespace}:{name}`)")]
    UndefinedNamespace { namespace: String, name: String },

    #[error("`{name}` is not in namespace `{namespace}`")]
    MissingNamespaceName { namespace: String, name: String },

    #[error("`{name}` does not match pattern `{pattern}` of namespace `{namespace}`")]
    MissingNamespaceRegex {
        namespace: String,
        name: String,
        pattern: String,
    },

    #[error("naked name `{name}` has no namespace")]
    NakedName { name: String },

    // ------------------------------------------------------------------
    // Provenance and annotations
    // ------------------------------------------------------------------
    #[error("undefined annotation `{annotation}`")]
    UndefinedAnnotation { annotation: String },

    #[error("`{value}` is not a value of annotation `{annotation}`")]
    IllegalAnnotationValue { annotation: String, value: String },

    #[error("`{value}` does not match pattern `{pattern}` of annotation `{annotation}`")]
    MissingAnnotationRegex {
        annotation: String,
        value: String,
        pattern: String,
    },

    #[error("`{annotation}` is not set")]
    MissingAnnotationKey { annotation: String },

    #[error("statement is missing required annotations: {}", .missing.join(", "))]
    MissingAnnotation { missing: Vec<String> },

    #[error("citation must have 3 or 6 entries, got {length}")]
    InvalidCitationLength { length: usize },

    #[error("invalid citation type `{citation_type}`")]
    InvalidCitationType { citation_type: String },

    #[error("invalid PubMed identifier `{reference}`")]
    InvalidPubMedIdentifier { reference: String },

    #[error("no citation is set")]
    MissingCitation,

    #[error("no evidence is set")]
    MissingSupport,

    // ------------------------------------------------------------------
    // Semantics
    // ------------------------------------------------------------------
    #[error("invalid use of {function}: {detail}")]
    InvalidFunctionSemantic { function: Function, detail: String },

    #[error("unqualified translocation `{term}`")]
    MalformedTranslocation { term: String },

    #[error("nested statements are not allowed")]
    NestedRelation,

    #[error("placeholder amino acid in `{term}`")]
    PlaceholderAminoAcid { term: String },

    #[error("`{relation}` cannot relate `{term}` to itself")]
    SelfLoop { relation: Relation, term: String },

    #[error("`{term}` is already labeled \"{existing}\"")]
    Relabel { term: String, existing: String },

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------
    #[error("missing required document metadata `{key}`")]
    MissingMetadata { key: String },

    #[error("version `{version}` is not of the form X.Y.Z")]
    VersionFormat { version: String },

    #[error("unknown document metadata key `{key}`")]
    InvalidMetadata { key: String },

    #[error("{message}")]
    MalformedMetadata { message: String },

    #[error("namespace `{keyword}` is already defined")]
    RedefinedNamespace { keyword: String },

    #[error("annotation `{keyword}` is already defined")]
    RedefinedAnnotation { keyword: String },

    #[error("could not load `{keyword}` from {url}: {reason}")]
    UnresolvableResource {
        keyword: String,
        url: String,
        reason: String,
    },
}

impl BelError {
    pub fn syntax(column: usize, message: impl Into<String>) -> Self {
        BelError::Syntax {
            column,
            message: message.into(),
        }
    }

    /// Conventional class name of the error kind.
    pub fn name(&self) -> &'static str {
        match self {
            BelError::Syntax { .. } => "BELSyntaxError",
            BelError::UndefinedNamespace { .. } => "UndefinedNamespaceWarning",
            BelError::MissingNamespaceName { .. } => "MissingNamespaceNameWarning",
            BelError::MissingNamespaceRegex { .. } => "MissingNamespaceRegexWarning",
            BelError::NakedName { .. } => "NakedNameWarning",
            BelError::UndefinedAnnotation { .. } => "UndefinedAnnotationWarning",
            BelError::IllegalAnnotationValue { .. } => "IllegalAnnotationValueWarning",
            BelError::MissingAnnotationRegex { .. } => "MissingAnnotationRegexWarning",
            BelError::MissingAnnotationKey { .. } => "MissingAnnotationKeyWarning",
            BelError::MissingAnnotation { .. } => "MissingAnnotationWarning",
            BelError::InvalidCitationLength { .. } => "InvalidCitationLengthException",
            BelError::InvalidCitationType { .. } => "InvalidCitationType",
            BelError::InvalidPubMedIdentifier { .. } => "InvalidPubMedIdentifierWarning",
            BelError::MissingCitation => "MissingCitationException",
            BelError::MissingSupport => "MissingSupportWarning",
            BelError::InvalidFunctionSemantic { .. } => "InvalidFunctionSemantic",
            BelError::MalformedTranslocation { .. } => "MalformedTranslocationWarning",
            BelError::NestedRelation => "NestedRelationWarning",
            BelError::PlaceholderAminoAcid { .. } => "PlaceholderAminoAcidWarning",
            BelError::SelfLoop { .. } => "SelfLoopWarning",
            BelError::Relabel { .. } => "RelabelWarning",
            BelError::MissingMetadata { .. } => "MissingMetadataException",
            BelError::VersionFormat { .. } => "VersionFormatWarning",
            BelError::InvalidMetadata { .. } => "InvalidMetadataException",
            BelError::MalformedMetadata { .. } => "MalformedMetadataException",
            BelError::RedefinedNamespace { .. } => "RedefinedNamespaceError",
            BelError::RedefinedAnnotation { .. } => "RedefinedAnnotationError",
            BelError::UnresolvableResource { .. } => "UnresolvableResourceError",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BelError::Syntax { .. } => ErrorCategory::Syntax,
            BelError::UndefinedNamespace { .. }
            | BelError::MissingNamespaceName { .. }
            | BelError::MissingNamespaceRegex { .. }
            | BelError::NakedName { .. } => ErrorCategory::Resolution,
            BelError::UndefinedAnnotation { .. }
            | BelError::IllegalAnnotationValue { .. }
            | BelError::MissingAnnotationRegex { .. }
            | BelError::MissingAnnotationKey { .. }
            | BelError::MissingAnnotation { .. }
            | BelError::InvalidCitationLength { .. }
            | BelError::InvalidCitationType { .. }
            | BelError::InvalidPubMedIdentifier { .. }
            | BelError::MissingCitation
            | BelError::MissingSupport => ErrorCategory::Provenance,
            BelError::InvalidFunctionSemantic { .. }
            | BelError::MalformedTranslocation { .. }
            | BelError::NestedRelation
            | BelError::PlaceholderAminoAcid { .. }
            | BelError::SelfLoop { .. }
            | BelError::Relabel { .. } => ErrorCategory::Semantic,
            BelError::MissingMetadata { .. }
            | BelError::VersionFormat { .. }
            | BelError::InvalidMetadata { .. }
            | BelError::MalformedMetadata { .. }
            | BelError::RedefinedNamespace { .. }
            | BelError::RedefinedAnnotation { .. }
            | BelError::UnresolvableResource { .. } => ErrorCategory::Document,
        }
    }

    /// `...Exception` kinds, which strict documents escalate to fatal.
    pub fn is_exception(&self) -> bool {
        self.name().ends_with("Exception")
    }
}

/// One recorded, non-fatal problem.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningRecord {
    /// 1-based number of the first physical line; 0 for document-level records.
    pub line_number: usize,
    pub line: String,
    pub error: BelError,
    /// Control state in effect when the problem was found.
    pub context: ContextSnapshot,
}

impl WarningRecord {
    pub fn kind(&self) -> &'static str {
        self.error.name()
    }
}

impl std::fmt::Display for WarningRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: {}: {}",
            self.line_number,
            self.error.name(),
            self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_suffix_convention() {
        assert_eq!(BelError::MissingCitation.name(), "MissingCitationException");
        assert!(BelError::MissingCitation.is_exception());
        assert!(!BelError::MissingSupport.is_exception());
        assert!(BelError::InvalidCitationLength { length: 2 }.is_exception());
    }

    #[test]
    fn categories_group_kinds() {
        assert_eq!(
            BelError::syntax(3, "unexpected token").category(),
            ErrorCategory::Syntax
        );
        assert_eq!(
            BelError::NakedName {
                name: "AKT1".to_string()
            }
            .category(),
            ErrorCategory::Resolution
        );
        assert_eq!(BelError::NestedRelation.category(), ErrorCategory::Semantic);
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = BelError::MissingNamespaceName {
            namespace: "HGNC".to_string(),
            name: "AKT99".to_string(),
        };
        assert_eq!(err.to_string(), "`AKT99` is not in namespace `HGNC`");
    }
}
