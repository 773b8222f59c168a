//! Document loader: BEL text in, [`BelDocument`] out.
//!
//! Lines are read in three sections, `Metadata → Definitions → Statements`.
//! Recoverable problems are recorded as [`WarningRecord`]s and the line is
//! skipped. Missing required metadata and unloadable resources halt the
//! document, as does any `...Exception` when `escalate_exceptions` is set.

use std::sync::Arc;

use thiserror::Error;

use belgraph_dsl::config::ParserConfig;
use belgraph_dsl::control::{parse_control_line, ControlStatement, DocumentMetadata};
use belgraph_dsl::definitions::Definitions;
use belgraph_dsl::errors::{BelError, WarningRecord};
use belgraph_dsl::grammar::Statement;
use belgraph_dsl::parser::{BelParser, CompiledStatement};
use belgraph_dsl::resource::ResourceLoader;
use belgraph_dsl::source::{logical_lines, LogicalLine};
use belgraph_dsl::validate::assertions;

use crate::{BelGraph, EdgeData, EdgeModifier, GraphError};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("line {line_number}: {}: {error}", .error.name())]
    Fatal {
        line_number: usize,
        line: String,
        error: BelError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl DocumentError {
    /// The BEL error that halted the document, if any.
    pub fn bel_error(&self) -> Option<&BelError> {
        match self {
            DocumentError::Fatal { error, .. } => Some(error),
            DocumentError::Graph(_) => None,
        }
    }
}

/// A parsed BEL document.
#[derive(Debug, Clone)]
pub struct BelDocument {
    pub graph: BelGraph,
    pub metadata: DocumentMetadata,
    pub definitions: Arc<Definitions>,
    pub warnings: Vec<WarningRecord>,
}

impl BelDocument {
    pub fn warnings_of(&self, kind: &str) -> impl Iterator<Item = &WarningRecord> {
        let kind = kind.to_string();
        self.warnings.iter().filter(move |w| w.kind() == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Metadata,
    Definitions,
    Statements,
}

struct Loader<'a> {
    config: &'a ParserConfig,
    loader: &'a dyn ResourceLoader,
    parser: BelParser,
    graph: BelGraph,
    warnings: Vec<WarningRecord>,
    section: Section,
    metadata_checked: bool,
}

/// Parses a whole BEL document into a graph.
pub fn parse_bel_document(
    text: &str,
    config: &ParserConfig,
    loader: &dyn ResourceLoader,
) -> Result<BelDocument, DocumentError> {
    let mut state = Loader {
        config,
        loader,
        parser: BelParser::new(config.clone()),
        graph: BelGraph::new(),
        warnings: Vec::new(),
        section: Section::Metadata,
        metadata_checked: false,
    };

    for line in logical_lines(text) {
        state.process(&line)?;
    }
    state.check_metadata(None)?;

    let Loader {
        parser,
        graph,
        warnings,
        ..
    } = state;
    let (definitions, context) = parser.into_parts();

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        warnings = warnings.len(),
        "parsed BEL document"
    );

    Ok(BelDocument {
        graph,
        metadata: context.metadata().clone(),
        definitions: Arc::new(definitions),
        warnings,
    })
}

impl Loader<'_> {
    fn process(&mut self, line: &LogicalLine) -> Result<(), DocumentError> {
        let prepared = self.parser.prepare(&line.text);
        if prepared.is_empty() {
            return Ok(());
        }

        match parse_control_line(&prepared) {
            Some(Ok(control)) => self.control(line, &control),
            Some(Err(err)) => self.record(line, err),
            None => {
                self.enter(line, Section::Statements)?;
                match self.parser.parse_statement(&prepared) {
                    Ok(compiled) => self.insert(line, compiled),
                    Err(err) => self.record(line, err),
                }
            }
        }
    }

    fn control(&mut self, line: &LogicalLine, control: &ControlStatement) -> Result<(), DocumentError> {
        if control.is_header() && self.section == Section::Statements {
            return self.record(
                line,
                BelError::MalformedMetadata {
                    message: format!(
                        "`{}` must come before the first statement",
                        line.text.trim()
                    ),
                },
            );
        }
        self.enter(line, control_section(control))?;
        match self.parser.apply_control(control, self.loader) {
            Ok(()) => Ok(()),
            Err(err) => self.record(line, err),
        }
    }

    /// Moves forward to `section`; leaving the header checks the metadata.
    fn enter(&mut self, line: &LogicalLine, section: Section) -> Result<(), DocumentError> {
        if section > self.section {
            self.section = section;
        }
        if self.section == Section::Statements {
            self.check_metadata(Some(line))?;
        }
        Ok(())
    }

    fn check_metadata(&mut self, line: Option<&LogicalLine>) -> Result<(), DocumentError> {
        if self.metadata_checked {
            return Ok(());
        }
        self.metadata_checked = true;

        let metadata = self.parser.context().metadata();
        if let Some(key) = metadata.missing(&self.config.required_metadata).first() {
            return Err(DocumentError::Fatal {
                line_number: line.map(|l| l.number).unwrap_or(0),
                line: line.map(|l| l.text.clone()).unwrap_or_default(),
                error: BelError::MissingMetadata {
                    key: key.to_string(),
                },
            });
        }
        for key in metadata.missing(&self.config.recommended_metadata) {
            let error = BelError::MissingMetadata {
                key: key.to_string(),
            };
            tracing::warn!(key = %key, "recommended document metadata is missing");
            self.warnings.push(WarningRecord {
                line_number: 0,
                line: String::new(),
                error,
                context: self.parser.context().snapshot(),
            });
        }
        Ok(())
    }

    /// Records a recoverable error, or halts when the error is fatal.
    fn record(&mut self, line: &LogicalLine, error: BelError) -> Result<(), DocumentError> {
        if is_fatal(self.config, &error) {
            tracing::error!(line = line.number, error = %error, "halting document");
            return Err(DocumentError::Fatal {
                line_number: line.number,
                line: line.text.clone(),
                error,
            });
        }
        tracing::warn!(
            line = line.number,
            kind = error.name(),
            error = %error,
            "recorded warning"
        );
        self.warnings.push(WarningRecord {
            line_number: line.number,
            line: line.text.clone(),
            error,
            context: self.parser.context().snapshot(),
        });
        Ok(())
    }

    fn insert(&mut self, line: &LogicalLine, compiled: CompiledStatement) -> Result<(), DocumentError> {
        for note in compiled.notes {
            self.record(line, note)?;
        }

        match &compiled.statement {
            Statement::Term { term } => {
                self.graph.add_node(&term.term)?;
            }
            Statement::Label { subject, label } => {
                if let Some(existing) = self.graph.set_description(&subject.term, label)? {
                    self.record(
                        line,
                        BelError::Relabel {
                            term: subject.term.to_string(),
                            existing,
                        },
                    )?;
                }
            }
            statement => {
                for (subject, relation, object) in assertions(statement) {
                    let data = if relation.is_unqualified() {
                        EdgeData::unqualified(relation)
                    } else {
                        let context = self.parser.context();
                        EdgeData {
                            relation,
                            citation: context.citation().cloned(),
                            evidence: context.evidence().map(str::to_string),
                            annotations: context.annotations().clone(),
                            subject: EdgeModifier::of(subject),
                            object: EdgeModifier::of(object),
                            line: Some(line.number),
                        }
                    };
                    let reverse = relation.is_two_way().then(|| data.reversed());
                    self.graph.add_edge(&subject.term, &object.term, data)?;
                    if let Some(reverse) = reverse {
                        self.graph.add_edge(&object.term, &subject.term, reverse)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn control_section(control: &ControlStatement) -> Section {
    match control {
        ControlStatement::SetDocument { .. } => Section::Metadata,
        ControlStatement::DefineNamespace { .. } | ControlStatement::DefineAnnotation { .. } => {
            Section::Definitions
        }
        _ => Section::Statements,
    }
}

fn is_fatal(config: &ParserConfig, error: &BelError) -> bool {
    matches!(
        error,
        BelError::UnresolvableResource { .. } | BelError::MissingMetadata { .. }
    ) || (config.escalate_exceptions && error.is_exception())
}

#[cfg(test)]
mod tests {
    use super::*;
    use belgraph_dsl::control::MetadataKey;
    use belgraph_dsl::definitions::{AnnotationDefinition, NamespaceDefinition};
    use belgraph_dsl::language::Relation;
    use belgraph_dsl::resource::InMemoryResources;
    use belgraph_dsl::term::Term;

    const HEADER: &str = r#"SET DOCUMENT Name = "Test Document"
SET DOCUMENT Version = "1.0.0"
SET DOCUMENT Description = "Unit test document"
DEFINE NAMESPACE HGNC AS URL "http://resources.example.org/hgnc.belns"
DEFINE ANNOTATION Species AS LIST {"9606", "10090"}
"#;

    fn resources() -> InMemoryResources {
        InMemoryResources::new().with_namespace(
            "http://resources.example.org/hgnc.belns",
            NamespaceDefinition::from_names(["AKT1", "EGFR", "FOXO3", "MAPK1", "MIA"]),
        )
    }

    fn parse(body: &str) -> BelDocument {
        parse_with(body, &ParserConfig::default())
    }

    fn parse_with(body: &str, config: &ParserConfig) -> BelDocument {
        parse_bel_document(&format!("{HEADER}{body}"), config, &resources()).expect("document parses")
    }

    fn akt1() -> Term {
        Term::protein("HGNC", "AKT1")
    }

    fn egfr() -> Term {
        Term::protein("HGNC", "EGFR")
    }

    #[test]
    fn qualified_edge_carries_provenance() {
        let doc = parse(
            r#"SET Citation = {"PubMed", "TestName", "1235813"}
SET Evidence = "I read it on Twitter"
SET Species = "9606"
p(HGNC:AKT1) increases p(HGNC:EGFR)
"#,
        );
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
        assert_eq!(doc.graph.node_count(), 2);
        assert_eq!(doc.graph.edge_count(), 1);
        let edges = doc.graph.edges_between(&akt1(), &egfr());
        let data = &edges[0].data;
        assert_eq!(data.relation, Relation::Increases);
        assert_eq!(data.citation.as_ref().map(|c| c.reference.as_str()), Some("1235813"));
        assert_eq!(data.evidence.as_deref(), Some("I read it on Twitter"));
        assert!(data.annotations["Species"].contains("9606"));
        assert_eq!(data.line, Some(9));
        assert_eq!(doc.metadata.get(MetadataKey::Name), Some("Test Document"));
    }

    #[test]
    fn unset_all_clears_provenance() {
        let doc = parse(
            r#"SET Citation = {"PubMed", "TestName", "1235813"}
SET Evidence = "e"
UNSET ALL
p(HGNC:AKT1) increases p(HGNC:EGFR)
"#,
        );
        assert_eq!(doc.graph.edge_count(), 0);
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind(), "MissingCitationException");
        assert_eq!(doc.warnings[0].line_number, 9);
    }

    #[test]
    fn missing_required_metadata_is_fatal() {
        let text = "SET DOCUMENT Name = \"x\"\np(HGNC:AKT1)\n";
        let err = parse_bel_document(text, &ParserConfig::default(), &resources()).expect_err("fatal");
        assert!(matches!(
            err.bel_error(),
            Some(BelError::MissingMetadata { key }) if key == "Version"
        ));
    }

    #[test]
    fn empty_document_still_needs_metadata() {
        let err = parse_bel_document("", &ParserConfig::default(), &resources()).expect_err("fatal");
        assert!(matches!(err, DocumentError::Fatal { line_number: 0, .. }));
    }

    #[test]
    fn recommended_metadata_is_reported_at_line_zero() {
        let config = ParserConfig {
            recommended_metadata: vec![MetadataKey::Authors],
            ..ParserConfig::default()
        };
        let doc = parse_with("p(HGNC:AKT1)\n", &config);
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].line_number, 0);
        assert_eq!(doc.warnings[0].kind(), "MissingMetadataException");
    }

    #[test]
    fn header_after_statements_is_malformed() {
        let doc = parse(
            r#"p(HGNC:AKT1)
SET DOCUMENT Authors = "late"
"#,
        );
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind(), "MalformedMetadataException");
        assert_eq!(doc.metadata.get(MetadataKey::Authors), None);
    }

    #[test]
    fn unresolvable_resource_halts() {
        let text = r#"SET DOCUMENT Name = "x"
DEFINE NAMESPACE CHEBI AS URL "http://resources.example.org/missing.belns"
"#;
        let err = parse_bel_document(text, &ParserConfig::default(), &resources()).expect_err("fatal");
        assert!(matches!(
            err,
            DocumentError::Fatal {
                line_number: 2,
                error: BelError::UnresolvableResource { .. },
                ..
            }
        ));
    }

    #[test]
    fn unqualified_translocation_is_skipped_with_a_warning() {
        let config = ParserConfig {
            disallow_unqualified_translocations: true,
            ..ParserConfig::default()
        };
        let doc = parse_with(
            r#"SET Citation = {"PubMed", "TestName", "1235813"}
SET Evidence = "e"
tloc(p(HGNC:FOXO3)) decreases p(HGNC:AKT1)
p(HGNC:AKT1) increases p(HGNC:EGFR)
"#,
            &config,
        );
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind(), "MalformedTranslocationWarning");
        assert_eq!(doc.warnings[0].line_number, 8);
        assert!(!doc.graph.contains(&Term::protein("HGNC", "FOXO3")));
        assert_eq!(doc.graph.edge_count(), 1);
    }

    #[test]
    fn two_way_relations_add_both_directions() {
        let doc = parse(
            r#"SET Citation = {"PubMed", "TestName", "1235813"}
SET Evidence = "e"
p(HGNC:AKT1) association p(HGNC:EGFR)
"#,
        );
        assert!(doc.graph.has_edge(&akt1(), Relation::Association, &egfr()));
        assert!(doc.graph.has_edge(&egfr(), Relation::Association, &akt1()));
        assert_eq!(doc.graph.edge_count(), 2);
    }

    #[test]
    fn repeated_statements_do_not_duplicate_edges() {
        let doc = parse(
            r#"SET Citation = {"PubMed", "TestName", "1235813"}
SET Evidence = "e"
p(HGNC:AKT1) increases p(HGNC:EGFR)
p(HGNC:AKT1) increases p(HGNC:EGFR)
SET Evidence = "other"
p(HGNC:AKT1) increases p(HGNC:EGFR)
"#,
        );
        assert_eq!(doc.graph.edge_count(), 2);
    }

    #[test]
    fn list_relations_expand_per_member() {
        let doc = parse("complex(p(HGNC:AKT1), p(HGNC:EGFR)) hasComponents list(p(HGNC:AKT1), p(HGNC:EGFR))\n");
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
        let complex = Term::complex_of(vec![akt1(), egfr()]);
        assert!(doc.graph.has_edge(&complex, Relation::HasComponent, &akt1()));
        assert!(doc.graph.has_edge(&complex, Relation::HasComponent, &egfr()));
        assert_eq!(doc.graph.edge_count(), 2);
        assert!(doc.graph.edges().all(|e| e.data.citation.is_none()));
    }

    #[test]
    fn relabeling_keeps_the_first_label() {
        let doc = parse(
            r#"p(HGNC:AKT1) labeled "AKT1 kinase"
p(HGNC:AKT1) labeled "something else"
"#,
        );
        assert_eq!(doc.graph.description(&akt1()), Some("AKT1 kinase"));
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind(), "RelabelWarning");
    }

    #[test]
    fn escalation_turns_exceptions_fatal() {
        let config = ParserConfig {
            escalate_exceptions: true,
            ..ParserConfig::default()
        };
        let text = format!("{HEADER}p(HGNC:AKT1) increases p(HGNC:EGFR)\n");
        let err = parse_bel_document(&text, &config, &resources()).expect_err("fatal");
        assert!(matches!(err.bel_error(), Some(BelError::MissingCitation)));
    }

    #[test]
    fn annotation_lists_are_kept() {
        let loader = resources().with_annotation(
            "http://resources.example.org/cell.belanno",
            AnnotationDefinition::from_values(["fibroblast", "neuron"]),
        );
        let text = format!(
            r#"{HEADER}DEFINE ANNOTATION Cell AS URL "http://resources.example.org/cell.belanno"
SET Citation = {{"PubMed", "TestName", "1235813"}}
SET Evidence = "e"
SET Cell = {{"fibroblast", "neuron"}}
p(HGNC:AKT1) increases p(HGNC:EGFR)
"#
        );
        let doc = parse_bel_document(&text, &ParserConfig::default(), &loader).expect("parses");
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
        let edge = doc.graph.edges().next().expect("one edge");
        assert_eq!(edge.data.annotations["Cell"].len(), 2);
        assert!(doc.definitions.has_annotation("Cell"));
    }
}
