//! Namespace and annotation resources.
//!
//! The parser never fetches anything itself: `DEFINE ... AS URL` goes through
//! a [`ResourceLoader`]. This module provides an in-memory loader and a
//! directory-backed one, plus readers for the `.belns` / `.belanno` formats:
//!
//! ```text
//! [Namespace]
//! Keyword=HGNC
//!
//! [Processing]
//! DelimiterString=|
//!
//! [Values]
//! AKT1|GRP
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::definitions::{AnnotationDefinition, NamespaceDefinition};
use crate::language::ALL_ENCODINGS;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("no resource registered for {url}")]
    NotFound { url: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed resource on line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Supplies the definitions behind `DEFINE ... AS URL "..."`.
pub trait ResourceLoader {
    fn load_namespace(&self, url: &str) -> Result<Arc<NamespaceDefinition>, ResourceError>;
    fn load_annotation(&self, url: &str) -> Result<Arc<AnnotationDefinition>, ResourceError>;
}

// ============================================================================
// Loaders
// ============================================================================

/// Definitions registered up front, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResources {
    namespaces: HashMap<String, Arc<NamespaceDefinition>>,
    annotations: HashMap<String, Arc<AnnotationDefinition>>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, url: &str, definition: NamespaceDefinition) -> Self {
        self.namespaces.insert(url.to_string(), Arc::new(definition));
        self
    }

    pub fn with_annotation(mut self, url: &str, definition: AnnotationDefinition) -> Self {
        self.annotations.insert(url.to_string(), Arc::new(definition));
        self
    }
}

impl ResourceLoader for InMemoryResources {
    fn load_namespace(&self, url: &str) -> Result<Arc<NamespaceDefinition>, ResourceError> {
        self.namespaces
            .get(url)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                url: url.to_string(),
            })
    }

    fn load_annotation(&self, url: &str) -> Result<Arc<AnnotationDefinition>, ResourceError> {
        self.annotations
            .get(url)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                url: url.to_string(),
            })
    }
}

/// Reads `.belns` / `.belanno` files from a local directory, using the last
/// path segment of the URL as the file name.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let file_name = url.rsplit('/').next().unwrap_or(url);
        self.root.join(file_name)
    }

    fn read(&self, url: &str) -> Result<String, ResourceError> {
        let path = self.path_for(url);
        if !path.is_file() {
            return Err(ResourceError::NotFound {
                url: url.to_string(),
            });
        }
        read_to_string(&path)
    }
}

fn read_to_string(path: &Path) -> Result<String, ResourceError> {
    std::fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl ResourceLoader for DirectoryResources {
    fn load_namespace(&self, url: &str) -> Result<Arc<NamespaceDefinition>, ResourceError> {
        Ok(Arc::new(parse_belns(&self.read(url)?)?))
    }

    fn load_annotation(&self, url: &str) -> Result<Arc<AnnotationDefinition>, ResourceError> {
        Ok(Arc::new(parse_belanno(&self.read(url)?)?))
    }
}

// ============================================================================
// Resource file formats
// ============================================================================

/// `(key, second column)` rows of the `[Values]` section.
fn parse_values_section(text: &str) -> Result<Vec<(String, Option<String>)>, ResourceError> {
    let mut section = String::new();
    let mut delimiter = "|".to_string();
    let mut saw_values = false;
    let mut rows = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = header.trim().to_string();
            saw_values |= section == "Values";
            continue;
        }

        match section.as_str() {
            "Processing" => {
                if let Some((key, value)) = line.split_once('=') {
                    if key.trim() == "DelimiterString" && !value.trim().is_empty() {
                        delimiter = value.trim().to_string();
                    }
                }
            }
            "Values" => {
                let (key, rest) = match line.split_once(delimiter.as_str()) {
                    Some((key, rest)) => (key.trim(), Some(rest.trim().to_string())),
                    None => (line, None),
                };
                if key.is_empty() {
                    return Err(ResourceError::Malformed {
                        line: line_no,
                        message: "empty value".to_string(),
                    });
                }
                rows.push((key.to_string(), rest));
            }
            _ => {}
        }
    }

    if !saw_values {
        return Err(ResourceError::Malformed {
            line: text.lines().count(),
            message: "missing [Values] section".to_string(),
        });
    }
    Ok(rows)
}

/// Reads a `.belns` namespace; rows without an encoding admit every function.
pub fn parse_belns(text: &str) -> Result<NamespaceDefinition, ResourceError> {
    let names: BTreeMap<String, String> = parse_values_section(text)?
        .into_iter()
        .map(|(name, encoding)| {
            let encoding = encoding
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| ALL_ENCODINGS.to_string());
            (name, encoding)
        })
        .collect();
    Ok(NamespaceDefinition::Enumerated(names))
}

/// Reads a `.belanno` annotation; only the key column is kept.
pub fn parse_belanno(text: &str) -> Result<AnnotationDefinition, ResourceError> {
    let values: BTreeSet<String> = parse_values_section(text)?
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    Ok(AnnotationDefinition::Enumerated(values))
}
