//! Control statements and the state they maintain.
//!
//! ```text
//! SET DOCUMENT Name = "Example"
//! DEFINE NAMESPACE HGNC AS URL "http://.../hgnc.belns"
//! SET Citation = {"PubMed", "Title", "12345"}
//! SET Evidence = "..."
//! SET Species = 9606
//! UNSET {Species, Evidence}
//! UNSET ALL
//! ```
//!
//! The parser reads these lines into [`ControlStatement`]s. [`ControlContext`]
//! holds the citation, evidence, annotations, statement group and document
//! metadata that apply to the statements that follow.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char as pchar, multispace0, multispace1},
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::definitions::{AnnotationDefinition, Definitions, ResourceSource};
use crate::errors::BelError;
use crate::grammar::quoted_string;

pub const CITATION: &str = "Citation";
pub const EVIDENCE: &str = "Evidence";
pub const SUPPORTING_TEXT: &str = "SupportingText";
pub const STATEMENT_GROUP: &str = "STATEMENT_GROUP";

// ============================================================================
// Document metadata
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetadataKey {
    Name,
    Version,
    Description,
    Authors,
    ContactInfo,
    Copyright,
    Licenses,
    Disclaimer,
    Project,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 9] = [
        MetadataKey::Name,
        MetadataKey::Version,
        MetadataKey::Description,
        MetadataKey::Authors,
        MetadataKey::ContactInfo,
        MetadataKey::Copyright,
        MetadataKey::Licenses,
        MetadataKey::Disclaimer,
        MetadataKey::Project,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Name => "Name",
            MetadataKey::Version => "Version",
            MetadataKey::Description => "Description",
            MetadataKey::Authors => "Authors",
            MetadataKey::ContactInfo => "ContactInfo",
            MetadataKey::Copyright => "Copyright",
            MetadataKey::Licenses => "Licenses",
            MetadataKey::Disclaimer => "Disclaimer",
            MetadataKey::Project => "Project",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == keyword)
    }
}

impl std::fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    entries: BTreeMap<MetadataKey, String>,
}

impl DocumentMetadata {
    pub fn get(&self, key: MetadataKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetadataKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn missing(&self, keys: &[MetadataKey]) -> Vec<MetadataKey> {
        keys.iter()
            .copied()
            .filter(|k| !self.entries.contains_key(k))
            .collect()
    }
}

fn is_semantic_version(version: &str) -> bool {
    static VERSION_RE: OnceLock<Option<Regex>> = OnceLock::new();
    VERSION_RE
        .get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.\-]+)?$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(version))
}

// ============================================================================
// Citations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CitationType {
    Book,
    PubMed,
    Journal,
    #[serde(rename = "Online Resource")]
    OnlineResource,
    #[serde(rename = "URL")]
    Url,
    #[serde(rename = "DOI")]
    Doi,
    Other,
}

impl CitationType {
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "Book" => CitationType::Book,
            "PubMed" => CitationType::PubMed,
            "Journal" => CitationType::Journal,
            "Online Resource" => CitationType::OnlineResource,
            "URL" => CitationType::Url,
            "DOI" => CitationType::Doi,
            "Other" => CitationType::Other,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub citation_type: CitationType,
    pub name: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Citation {
    /// Validates the entries of `SET Citation = {...}`.
    pub fn from_entries(entries: &[String]) -> Result<Self, BelError> {
        if entries.len() != 3 && entries.len() != 6 {
            return Err(BelError::InvalidCitationLength {
                length: entries.len(),
            });
        }
        let citation_type =
            CitationType::parse(&entries[0]).ok_or_else(|| BelError::InvalidCitationType {
                citation_type: entries[0].clone(),
            })?;
        let reference = entries[2].clone();
        if citation_type == CitationType::PubMed
            && (reference.is_empty() || !reference.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(BelError::InvalidPubMedIdentifier { reference });
        }
        let optional = |i: usize| entries.get(i).filter(|v| !v.is_empty()).cloned();
        Ok(Citation {
            citation_type,
            name: entries[1].clone(),
            reference,
            date: optional(3),
            authors: optional(4),
            comments: optional(5),
        })
    }
}

// ============================================================================
// Control statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsetTarget {
    Citation,
    Evidence,
    StatementGroup,
    Annotation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlStatement {
    SetDocument { key: String, value: String },
    DefineNamespace { keyword: String, source: ResourceSource },
    DefineAnnotation { keyword: String, source: ResourceSource },
    SetCitation(Vec<String>),
    SetEvidence(String),
    SetStatementGroup(String),
    SetAnnotation { key: String, values: Vec<String> },
    Unset(Vec<UnsetTarget>),
    UnsetAll,
}

impl ControlStatement {
    /// `SET DOCUMENT` and `DEFINE` lines belong before the first statement.
    pub fn is_header(&self) -> bool {
        matches!(
            self,
            ControlStatement::SetDocument { .. }
                | ControlStatement::DefineNamespace { .. }
                | ControlStatement::DefineAnnotation { .. }
        )
    }
}

enum SetValue {
    Single(String),
    List(Vec<String>),
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn bare_value(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '"')),
        str::to_string,
    )(input)
}

fn value(input: &str) -> IResult<&str, String> {
    alt((quoted_string, bare_value))(input)
}

fn value_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        pchar('{'),
        separated_list1(
            pchar(','),
            delimited(multispace0, value, multispace0),
        ),
        pchar('}'),
    )(input)
}

fn set_value(input: &str) -> IResult<&str, SetValue> {
    alt((map(value_list, SetValue::List), map(value, SetValue::Single)))(input)
}

fn equals(input: &str) -> IResult<&str, ()> {
    map(tuple((multispace0, pchar('='), multispace0)), |_| ())(input)
}

fn unset_target(name: &str) -> UnsetTarget {
    match name {
        CITATION => UnsetTarget::Citation,
        EVIDENCE | SUPPORTING_TEXT => UnsetTarget::Evidence,
        STATEMENT_GROUP => UnsetTarget::StatementGroup,
        other => UnsetTarget::Annotation(other.to_string()),
    }
}

fn resource_source(input: &str) -> IResult<&str, ResourceSource> {
    alt((
        map(
            preceded(tuple((tag("URL"), multispace1)), quoted_string),
            ResourceSource::Url,
        ),
        map(
            preceded(tuple((tag("PATTERN"), multispace1)), quoted_string),
            ResourceSource::Pattern,
        ),
        map(
            preceded(tuple((tag("LIST"), multispace0)), value_list),
            ResourceSource::List,
        ),
    ))(input)
}

fn define_statement(input: &str) -> IResult<&str, ControlStatement> {
    let (input, _) = tag("DEFINE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, is_namespace) = alt((
        map(tag("NAMESPACE"), |_| true),
        map(tag("ANNOTATION"), |_| false),
    ))(input)?;
    let (input, _) = multispace1(input)?;
    let (input, name) = keyword(input)?;
    let (input, _) = tuple((multispace1, tag("AS"), multispace1))(input)?;
    let (input, source) = resource_source(input)?;
    let (input, _) = multispace0(input)?;
    let keyword = name.to_string();
    let statement = if is_namespace {
        ControlStatement::DefineNamespace { keyword, source }
    } else {
        ControlStatement::DefineAnnotation { keyword, source }
    };
    Ok((input, statement))
}

fn set_document_statement(input: &str) -> IResult<&str, ControlStatement> {
    let (input, _) = tuple((tag("SET"), multispace1, tag("DOCUMENT"), multispace1))(input)?;
    let (input, key) = keyword(input)?;
    let (input, _) = equals(input)?;
    let (input, value) = value(input)?;
    let (input, _) = multispace0(input)?;
    Ok((
        input,
        ControlStatement::SetDocument {
            key: key.to_string(),
            value,
        },
    ))
}

fn set_statement(input: &str) -> IResult<&str, (String, SetValue)> {
    let (input, _) = tuple((tag("SET"), multispace1))(input)?;
    let (input, key) = keyword(input)?;
    let (input, _) = equals(input)?;
    let (input, value) = set_value(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (key.to_string(), value)))
}

fn unset_statement(input: &str) -> IResult<&str, ControlStatement> {
    let (input, _) = tuple((tag("UNSET"), multispace1))(input)?;
    let (input, names) = alt((
        delimited(
            pchar('{'),
            separated_list1(pchar(','), delimited(multispace0, keyword, multispace0)),
            pchar('}'),
        ),
        map(keyword, |k| vec![k]),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    if names == ["ALL"] {
        return Ok((input, ControlStatement::UnsetAll));
    }
    Ok((
        input,
        ControlStatement::Unset(names.into_iter().map(unset_target).collect()),
    ))
}

fn lower_set(key: String, value: SetValue) -> Result<ControlStatement, String> {
    Ok(match (key.as_str(), value) {
        (CITATION, SetValue::List(entries)) => ControlStatement::SetCitation(entries),
        (CITATION, SetValue::Single(entry)) => ControlStatement::SetCitation(vec![entry]),
        (EVIDENCE | SUPPORTING_TEXT, SetValue::Single(text)) => ControlStatement::SetEvidence(text),
        (STATEMENT_GROUP, SetValue::Single(name)) => ControlStatement::SetStatementGroup(name),
        (EVIDENCE | SUPPORTING_TEXT | STATEMENT_GROUP, SetValue::List(_)) => {
            return Err(format!("`{key}` takes a single value"));
        }
        (_, SetValue::Single(value)) => ControlStatement::SetAnnotation {
            key,
            values: vec![value],
        },
        (_, SetValue::List(values)) => ControlStatement::SetAnnotation { key, values },
    })
}

/// Parses a `SET`, `UNSET` or `DEFINE` line.
///
/// Returns `None` when the line is not a control line at all.
pub fn parse_control_line(line: &str) -> Option<Result<ControlStatement, BelError>> {
    let text = line.trim();
    let first = text.split_whitespace().next()?;
    if !matches!(first, "SET" | "UNSET" | "DEFINE") {
        return None;
    }

    let column_of = |rest: &str| text.len() - rest.len() + 1;
    let result = match first {
        "DEFINE" => all_consuming(define_statement)(text)
            .map(|(_, s)| s)
            .map_err(|err| syntax_error(err, &column_of, "expected `DEFINE NAMESPACE|ANNOTATION <Keyword> AS URL|PATTERN|LIST ...`")),
        "UNSET" => all_consuming(unset_statement)(text)
            .map(|(_, s)| s)
            .map_err(|err| syntax_error(err, &column_of, "expected `UNSET <Key>`, `UNSET {<Key>, ...}` or `UNSET ALL`")),
        _ if text.split_whitespace().nth(1) == Some("DOCUMENT") => {
            all_consuming(set_document_statement)(text)
                .map(|(_, s)| s)
                .map_err(|err| syntax_error(err, &column_of, "expected `SET DOCUMENT <Key> = <value>`"))
        }
        _ => all_consuming(set_statement)(text)
            .map_err(|err| syntax_error(err, &column_of, "expected `SET <Key> = <value>` or `SET <Key> = {<value>, ...}`"))
            .and_then(|(_, (key, value))| {
                lower_set(key, value).map_err(|message| BelError::syntax(1, message))
            }),
    };
    Some(result)
}

fn syntax_error(
    err: nom::Err<nom::error::Error<&str>>,
    column_of: &dyn Fn(&str) -> usize,
    expected: &str,
) -> BelError {
    let column = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => column_of(e.input),
        nom::Err::Incomplete(_) => 1,
    };
    BelError::syntax(column, expected)
}

// ============================================================================
// Control context
// ============================================================================

/// Copy of the control state attached to a warning record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_group: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ControlContext {
    citation: Option<Citation>,
    evidence: Option<String>,
    annotations: BTreeMap<String, BTreeSet<String>>,
    statement_group: Option<String>,
    metadata: DocumentMetadata,
    citation_clearing: bool,
}

impl ControlContext {
    pub fn new(citation_clearing: bool) -> Self {
        Self {
            citation_clearing,
            ..Self::default()
        }
    }

    pub fn citation(&self) -> Option<&Citation> {
        self.citation.as_ref()
    }

    pub fn evidence(&self) -> Option<&str> {
        self.evidence.as_deref()
    }

    pub fn annotations(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.annotations
    }

    pub fn statement_group(&self) -> Option<&str> {
        self.statement_group.as_deref()
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            citation: self.citation.clone(),
            evidence: self.evidence.clone(),
            annotations: self.annotations.clone(),
            statement_group: self.statement_group.clone(),
        }
    }

    /// Required annotations that are not currently set.
    pub fn missing_annotations(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|key| !self.annotations.contains_key(key.as_str()))
            .cloned()
            .collect()
    }

    /// `SET DOCUMENT key = value`.
    ///
    /// The value is stored even when a version string is reported as malformed.
    pub fn set_document(&mut self, key: &str, value: &str) -> Result<(), BelError> {
        let key = MetadataKey::from_keyword(key).ok_or_else(|| BelError::InvalidMetadata {
            key: key.to_string(),
        })?;
        if let Some(existing) = self.metadata.get(key) {
            tracing::warn!(key = %key, existing, ignored = value, "document metadata already set");
            return Ok(());
        }
        self.metadata.entries.insert(key, value.to_string());
        if key == MetadataKey::Version && !is_semantic_version(value) {
            return Err(BelError::VersionFormat {
                version: value.to_string(),
            });
        }
        Ok(())
    }

    fn clear_citation(&mut self) {
        self.citation = None;
        if self.citation_clearing {
            self.evidence = None;
            self.annotations.clear();
        }
    }

    fn require_citation(&self) -> Result<(), BelError> {
        if self.citation_clearing && self.citation.is_none() {
            return Err(BelError::MissingCitation);
        }
        Ok(())
    }

    /// `SET Citation = {...}`. The previous citation is dropped even when the
    /// new one is rejected.
    pub fn set_citation(&mut self, entries: &[String]) -> Result<(), BelError> {
        self.clear_citation();
        self.citation = Some(Citation::from_entries(entries)?);
        Ok(())
    }

    pub fn set_evidence(&mut self, text: &str) -> Result<(), BelError> {
        self.require_citation()?;
        self.evidence = Some(text.to_string());
        Ok(())
    }

    pub fn set_statement_group(&mut self, name: &str) {
        self.statement_group = Some(name.to_string());
    }

    /// `SET key = value` / `SET key = {v1, v2}`. Replaces any values already
    /// set for `key`.
    pub fn set_annotation(
        &mut self,
        key: &str,
        values: &[String],
        definitions: &Definitions,
    ) -> Result<(), BelError> {
        self.require_citation()?;
        let definition =
            definitions
                .annotation(key)
                .ok_or_else(|| BelError::UndefinedAnnotation {
                    annotation: key.to_string(),
                })?;
        for value in values {
            match definition {
                AnnotationDefinition::Enumerated(allowed) if !allowed.contains(value) => {
                    return Err(BelError::IllegalAnnotationValue {
                        annotation: key.to_string(),
                        value: value.clone(),
                    });
                }
                AnnotationDefinition::Pattern(pattern) if !pattern.is_match(value) => {
                    return Err(BelError::MissingAnnotationRegex {
                        annotation: key.to_string(),
                        value: value.clone(),
                        pattern: pattern.as_str().to_string(),
                    });
                }
                _ => {}
            }
        }
        self.annotations
            .insert(key.to_string(), values.iter().cloned().collect());
        Ok(())
    }

    /// `UNSET key` / `UNSET {k1, k2}`. Nothing is unset unless every target is set.
    pub fn unset(&mut self, targets: &[UnsetTarget]) -> Result<(), BelError> {
        for target in targets {
            let (is_set, name) = match target {
                UnsetTarget::Citation => (self.citation.is_some(), CITATION),
                UnsetTarget::Evidence => (self.evidence.is_some(), EVIDENCE),
                UnsetTarget::StatementGroup => (self.statement_group.is_some(), STATEMENT_GROUP),
                UnsetTarget::Annotation(key) => {
                    (self.annotations.contains_key(key.as_str()), key.as_str())
                }
            };
            if !is_set {
                return Err(BelError::MissingAnnotationKey {
                    annotation: name.to_string(),
                });
            }
        }
        for target in targets {
            match target {
                UnsetTarget::Citation => self.clear_citation(),
                UnsetTarget::Evidence => self.evidence = None,
                UnsetTarget::StatementGroup => self.statement_group = None,
                UnsetTarget::Annotation(key) => {
                    self.annotations.remove(key.as_str());
                }
            }
        }
        Ok(())
    }

    /// `UNSET ALL`: citation, evidence, annotations and statement group.
    pub fn unset_all(&mut self) {
        self.citation = None;
        self.evidence = None;
        self.annotations.clear();
        self.statement_group = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::InMemoryResources;

    fn citation() -> Vec<String> {
        ["PubMed", "TestName", "1235813"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn definitions() -> Definitions {
        let loader = InMemoryResources::new();
        let mut defs = Definitions::new();
        defs.define_annotation(
            "Species",
            ResourceSource::List(vec!["9606".to_string(), "10090".to_string()]),
            &loader,
        )
        .expect("list annotation");
        defs.define_annotation(
            "Confidence",
            ResourceSource::Pattern("[0-9]+".to_string()),
            &loader,
        )
        .expect("pattern annotation");
        defs
    }

    fn parse(line: &str) -> ControlStatement {
        parse_control_line(line)
            .expect("control line")
            .expect("valid control line")
    }

    #[test]
    fn parses_set_forms() {
        assert_eq!(
            parse(r#"SET Citation = {"PubMed","TestName","1235813"}"#),
            ControlStatement::SetCitation(citation())
        );
        assert_eq!(
            parse(r#"SET Evidence = "I read it on Twitter""#),
            ControlStatement::SetEvidence("I read it on Twitter".to_string())
        );
        assert_eq!(
            parse(r#"SET SupportingText = "x""#),
            ControlStatement::SetEvidence("x".to_string())
        );
        assert_eq!(
            parse("SET Species = 9606"),
            ControlStatement::SetAnnotation {
                key: "Species".to_string(),
                values: vec!["9606".to_string()],
            }
        );
        assert_eq!(
            parse(r#"SET Species = {"9606", 10090}"#),
            ControlStatement::SetAnnotation {
                key: "Species".to_string(),
                values: vec!["9606".to_string(), "10090".to_string()],
            }
        );
        assert_eq!(
            parse(r#"SET STATEMENT_GROUP = "Group 1""#),
            ControlStatement::SetStatementGroup("Group 1".to_string())
        );
    }

    #[test]
    fn parses_unset_and_define_forms() {
        assert_eq!(parse("UNSET ALL"), ControlStatement::UnsetAll);
        assert_eq!(
            parse("UNSET {Species, Evidence}"),
            ControlStatement::Unset(vec![
                UnsetTarget::Annotation("Species".to_string()),
                UnsetTarget::Evidence,
            ])
        );
        assert_eq!(
            parse(r#"DEFINE NAMESPACE HGNC AS URL "http://x/hgnc.belns""#),
            ControlStatement::DefineNamespace {
                keyword: "HGNC".to_string(),
                source: ResourceSource::Url("http://x/hgnc.belns".to_string()),
            }
        );
        assert_eq!(
            parse(r#"DEFINE ANNOTATION TextLocation AS LIST {"Abstract","Results"}"#),
            ControlStatement::DefineAnnotation {
                keyword: "TextLocation".to_string(),
                source: ResourceSource::List(vec![
                    "Abstract".to_string(),
                    "Results".to_string()
                ]),
            }
        );
        assert_eq!(
            parse(r#"SET DOCUMENT Version = "1.0.0""#),
            ControlStatement::SetDocument {
                key: "Version".to_string(),
                value: "1.0.0".to_string(),
            }
        );
    }

    #[test]
    fn statements_are_not_control_lines() {
        assert!(parse_control_line("p(HGNC:AKT1) -> p(HGNC:EGFR)").is_none());
        assert!(parse_control_line("SETTLE = 1").is_none());
    }

    #[test]
    fn malformed_control_lines_are_syntax_errors() {
        let err = parse_control_line("SET Evidence").expect("control line").expect_err("no value");
        assert_eq!(err.name(), "BELSyntaxError");
        let err = parse_control_line(r#"SET Evidence = {"a", "b"}"#)
            .expect("control line")
            .expect_err("list evidence");
        assert_eq!(err.name(), "BELSyntaxError");
    }

    #[test]
    fn citation_rules() {
        let mut ctx = ControlContext::new(true);
        let short: Vec<String> = vec!["PubMed".to_string(), "1234".to_string()];
        assert_eq!(
            ctx.set_citation(&short).expect_err("two entries").name(),
            "InvalidCitationLengthException"
        );
        let mut bad_type = citation();
        bad_type[0] = "Tweet".to_string();
        assert_eq!(
            ctx.set_citation(&bad_type).expect_err("unknown type").name(),
            "InvalidCitationType"
        );
        let mut bad_pmid = citation();
        bad_pmid[2] = "PMC1234".to_string();
        assert_eq!(
            ctx.set_citation(&bad_pmid).expect_err("non-numeric").name(),
            "InvalidPubMedIdentifierWarning"
        );
        assert!(ctx.citation().is_none());
        ctx.set_citation(&citation()).expect("valid citation");
        assert_eq!(ctx.citation().map(|c| c.reference.as_str()), Some("1235813"));
    }

    #[test]
    fn six_entry_citation_keeps_optional_fields() {
        let entries: Vec<String> = ["Journal", "Name", "ref", "2012-01-01", "A|B", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let citation = Citation::from_entries(&entries).expect("valid");
        assert_eq!(citation.date.as_deref(), Some("2012-01-01"));
        assert_eq!(citation.comments, None);
    }

    #[test]
    fn new_citation_clears_evidence_and_annotations() {
        let defs = definitions();
        let mut ctx = ControlContext::new(true);
        ctx.set_citation(&citation()).expect("citation");
        ctx.set_evidence("text").expect("evidence");
        ctx.set_annotation("Species", &["9606".to_string()], &defs)
            .expect("annotation");
        ctx.set_citation(&citation()).expect("citation");
        assert_eq!(ctx.evidence(), None);
        assert!(ctx.annotations().is_empty());
    }

    #[test]
    fn evidence_requires_citation_when_clearing() {
        let mut ctx = ControlContext::new(true);
        assert_eq!(ctx.set_evidence("text"), Err(BelError::MissingCitation));
        let mut lax = ControlContext::new(false);
        lax.set_evidence("text").expect("no citation needed");
    }

    #[test]
    fn annotation_values_are_checked() {
        let defs = definitions();
        let mut ctx = ControlContext::new(true);
        ctx.set_citation(&citation()).expect("citation");
        let err = ctx
            .set_annotation("Tissue", &["liver".to_string()], &defs)
            .expect_err("undefined");
        assert_eq!(err.name(), "UndefinedAnnotationWarning");
        let err = ctx
            .set_annotation("Species", &["9999".to_string()], &defs)
            .expect_err("not listed");
        assert_eq!(err.name(), "IllegalAnnotationValueWarning");
        let err = ctx
            .set_annotation("Confidence", &["high".to_string()], &defs)
            .expect_err("pattern mismatch");
        assert_eq!(err.name(), "MissingAnnotationRegexWarning");
        ctx.set_annotation("Confidence", &["3".to_string()], &defs)
            .expect("pattern match");
        ctx.set_annotation("Species", &["9606".to_string(), "10090".to_string()], &defs)
            .expect("listed values");
        assert_eq!(ctx.annotations().len(), 2);
    }

    #[test]
    fn unset_requires_target_to_be_set() {
        let defs = definitions();
        let mut ctx = ControlContext::new(true);
        ctx.set_citation(&citation()).expect("citation");
        ctx.set_annotation("Species", &["9606".to_string()], &defs)
            .expect("annotation");
        let err = ctx
            .unset(&[
                UnsetTarget::Annotation("Species".to_string()),
                UnsetTarget::Evidence,
            ])
            .expect_err("evidence not set");
        assert_eq!(err.name(), "MissingAnnotationKeyWarning");
        assert!(ctx.annotations().contains_key("Species"));
        ctx.unset(&[UnsetTarget::Annotation("Species".to_string())])
            .expect("species set");
        assert!(ctx.annotations().is_empty());
    }

    #[test]
    fn unset_all_clears_statement_state() {
        let defs = definitions();
        let mut ctx = ControlContext::new(true);
        ctx.set_citation(&citation()).expect("citation");
        ctx.set_evidence("text").expect("evidence");
        ctx.set_annotation("Species", &["9606".to_string()], &defs)
            .expect("annotation");
        ctx.set_statement_group("group");
        ctx.unset_all();
        assert_eq!(ctx.snapshot(), ContextSnapshot::default());
    }

    #[test]
    fn metadata_rules() {
        let mut ctx = ControlContext::new(true);
        assert_eq!(
            ctx.set_document("Colour", "blue").expect_err("unknown key").name(),
            "InvalidMetadataException"
        );
        assert_eq!(
            ctx.set_document("Version", "0.0").expect_err("not semantic").name(),
            "VersionFormatWarning"
        );
        assert_eq!(ctx.metadata().get(MetadataKey::Version), Some("0.0"));
        ctx.set_document("Version", "1.0.0").expect("ignored overwrite");
        assert_eq!(ctx.metadata().get(MetadataKey::Version), Some("0.0"));
        ctx.set_document("Name", "Test").expect("name");
        assert_eq!(
            ctx.metadata().missing(&[MetadataKey::Name, MetadataKey::Description]),
            vec![MetadataKey::Description]
        );
    }

    #[test]
    fn only_semantic_versions_pass() {
        for good in ["1.0.0", "0.12.3", "2.0.0-rc.1", "1.2.3+build.7"] {
            assert!(is_semantic_version(good), "{good}");
        }
        for bad in ["", "1", "1.0", "v1.0.0", "1.0.0.0", "1.0.x", "latest"] {
            assert!(!is_semantic_version(bad), "{bad}");
        }
        let mut ctx = ControlContext::new(true);
        assert!(matches!(
            ctx.set_document("Version", "v2"),
            Err(BelError::VersionFormat { .. })
        ));
    }
}
