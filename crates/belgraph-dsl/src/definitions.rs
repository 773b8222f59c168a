//! Namespace and annotation definitions.
//!
//! A document declares its vocabularies with `DEFINE NAMESPACE` and
//! `DEFINE ANNOTATION`. Each keyword maps to an enumerated value set or a
//! pattern. Loaded definitions are immutable and shared through `Arc`, so the
//! same resource can back many documents.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::errors::BelError;
use crate::language::ALL_ENCODINGS;
use crate::resource::ResourceLoader;

/// A regular expression that must match a whole name.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CompiledPattern {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceDefinition {
    /// Names with their encoding letters (`GRP`, `B`, ...).
    Enumerated(BTreeMap<String, String>),
    Pattern(CompiledPattern),
}

impl NamespaceDefinition {
    /// An enumerated namespace whose names admit every function.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NamespaceDefinition::Enumerated(
            names
                .into_iter()
                .map(|name| (name.into(), ALL_ENCODINGS.to_string()))
                .collect(),
        )
    }

    pub fn from_encoded<I, S, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, E)>,
        S: Into<String>,
        E: Into<String>,
    {
        NamespaceDefinition::Enumerated(
            entries
                .into_iter()
                .map(|(name, encoding)| (name.into(), encoding.into()))
                .collect(),
        )
    }

    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Ok(NamespaceDefinition::Pattern(CompiledPattern::new(source)?))
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            NamespaceDefinition::Enumerated(names) => Some(names.len()),
            NamespaceDefinition::Pattern(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationDefinition {
    Enumerated(BTreeSet<String>),
    Pattern(CompiledPattern),
}

impl AnnotationDefinition {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnnotationDefinition::Enumerated(values.into_iter().map(Into::into).collect())
    }

    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Ok(AnnotationDefinition::Pattern(CompiledPattern::new(source)?))
    }
}

/// Where a definition came from, as written after `AS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResourceSource {
    Url(String),
    Pattern(String),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct NamespaceEntry {
    pub source: ResourceSource,
    pub definition: Arc<NamespaceDefinition>,
}

#[derive(Debug, Clone)]
pub struct AnnotationEntry {
    pub source: ResourceSource,
    pub definition: Arc<AnnotationDefinition>,
}

/// All vocabularies visible to a document.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    namespaces: BTreeMap<String, NamespaceEntry>,
    annotations: BTreeMap<String, AnnotationEntry>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(&self, keyword: &str) -> Option<&NamespaceDefinition> {
        self.namespaces.get(keyword).map(|e| e.definition.as_ref())
    }

    pub fn annotation(&self, keyword: &str) -> Option<&AnnotationDefinition> {
        self.annotations.get(keyword).map(|e| e.definition.as_ref())
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &NamespaceEntry)> {
        self.namespaces.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn annotations(&self) -> impl Iterator<Item = (&str, &AnnotationEntry)> {
        self.annotations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn has_namespace(&self, keyword: &str) -> bool {
        self.namespaces.contains_key(keyword)
    }

    pub fn has_annotation(&self, keyword: &str) -> bool {
        self.annotations.contains_key(keyword)
    }

    pub fn insert_namespace(
        &mut self,
        keyword: &str,
        source: ResourceSource,
        definition: Arc<NamespaceDefinition>,
    ) -> Result<(), BelError> {
        if self.has_namespace(keyword) {
            return Err(BelError::RedefinedNamespace {
                keyword: keyword.to_string(),
            });
        }
        self.namespaces.insert(
            keyword.to_string(),
            NamespaceEntry { source, definition },
        );
        Ok(())
    }

    pub fn insert_annotation(
        &mut self,
        keyword: &str,
        source: ResourceSource,
        definition: Arc<AnnotationDefinition>,
    ) -> Result<(), BelError> {
        if self.has_annotation(keyword) {
            return Err(BelError::RedefinedAnnotation {
                keyword: keyword.to_string(),
            });
        }
        self.annotations.insert(
            keyword.to_string(),
            AnnotationEntry { source, definition },
        );
        Ok(())
    }

    /// Handles `DEFINE NAMESPACE keyword AS ...`.
    ///
    /// Redefinition is checked before anything is loaded.
    pub fn define_namespace(
        &mut self,
        keyword: &str,
        source: ResourceSource,
        loader: &dyn ResourceLoader,
    ) -> Result<(), BelError> {
        if self.has_namespace(keyword) {
            return Err(BelError::RedefinedNamespace {
                keyword: keyword.to_string(),
            });
        }
        let unresolvable = |url: &str, reason: String| BelError::UnresolvableResource {
            keyword: keyword.to_string(),
            url: url.to_string(),
            reason,
        };
        let definition = match &source {
            ResourceSource::Url(url) => loader
                .load_namespace(url)
                .map_err(|err| unresolvable(url, err.to_string()))?,
            ResourceSource::Pattern(pattern) => Arc::new(
                NamespaceDefinition::pattern(pattern)
                    .map_err(|err| unresolvable(pattern, err.to_string()))?,
            ),
            ResourceSource::List(values) => {
                Arc::new(NamespaceDefinition::from_names(values.iter().cloned()))
            }
        };
        tracing::debug!(
            keyword,
            names = ?definition.len(),
            "defined namespace"
        );
        self.insert_namespace(keyword, source, definition)
    }

    /// Handles `DEFINE ANNOTATION keyword AS ...`.
    pub fn define_annotation(
        &mut self,
        keyword: &str,
        source: ResourceSource,
        loader: &dyn ResourceLoader,
    ) -> Result<(), BelError> {
        if self.has_annotation(keyword) {
            return Err(BelError::RedefinedAnnotation {
                keyword: keyword.to_string(),
            });
        }
        let unresolvable = |url: &str, reason: String| BelError::UnresolvableResource {
            keyword: keyword.to_string(),
            url: url.to_string(),
            reason,
        };
        let definition = match &source {
            ResourceSource::Url(url) => loader
                .load_annotation(url)
                .map_err(|err| unresolvable(url, err.to_string()))?,
            ResourceSource::Pattern(pattern) => Arc::new(
                AnnotationDefinition::pattern(pattern)
                    .map_err(|err| unresolvable(pattern, err.to_string()))?,
            ),
            ResourceSource::List(values) => {
                Arc::new(AnnotationDefinition::from_values(values.iter().cloned()))
            }
        };
        tracing::debug!(keyword, "defined annotation");
        self.insert_annotation(keyword, source, definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::InMemoryResources;

    #[test]
    fn patterns_match_whole_names() {
        let pattern = CompiledPattern::new("[0-9]+").expect("valid regex");
        assert!(pattern.is_match("9606"));
        assert!(!pattern.is_match("9606a"));
        assert!(!pattern.is_match("a9606"));
    }

    #[test]
    fn redefinition_is_rejected() {
        let loader = InMemoryResources::new();
        let mut defs = Definitions::new();
        defs.define_namespace(
            "TEST",
            ResourceSource::List(vec!["A".to_string()]),
            &loader,
        )
        .expect("first definition");
        let err = defs
            .define_namespace("TEST", ResourceSource::Pattern(".*".to_string()), &loader)
            .expect_err("second definition");
        assert_eq!(err.name(), "RedefinedNamespaceError");
    }

    #[test]
    fn unknown_url_is_unresolvable() {
        let loader = InMemoryResources::new();
        let mut defs = Definitions::new();
        let err = defs
            .define_annotation(
                "Species",
                ResourceSource::Url("http://example.org/species.belanno".to_string()),
                &loader,
            )
            .expect_err("nothing registered");
        assert_eq!(err.name(), "UnresolvableResourceError");
        assert!(!defs.has_annotation("Species"));
    }

    #[test]
    fn invalid_pattern_is_unresolvable() {
        let loader = InMemoryResources::new();
        let mut defs = Definitions::new();
        let err = defs
            .define_namespace("BAD", ResourceSource::Pattern("(".to_string()), &loader)
            .expect_err("unbalanced group");
        assert!(matches!(err, BelError::UnresolvableResource { .. }));
    }
}
