//! Integration tests for the complete BEL pipeline
//!
//! These tests run whole documents through both crates:
//! - resource files on disk → definitions
//! - logical lines → control state and statements
//! - statements → graph nodes, edges and warnings
//!
//! Run with: cargo test --test integration_tests

use std::path::Path;

use tempfile::tempdir;

use belgraph_dsl::config::ParserConfig;
use belgraph_dsl::control::MetadataKey;
use belgraph_dsl::language::{Function, Relation};
use belgraph_dsl::resource::DirectoryResources;
use belgraph_dsl::term::{Concept, Term};
use belgraph_graph::{parse_bel_document, BelDocument, DocumentError};

const HGNC_BELNS: &str = "[Namespace]
Keyword=HGNC
NameString=HGNC Human Gene Symbols

[Processing]
DelimiterString=|

[Values]
AKT1|GRP
EGFR|GRP
FOXO3|GRP
MIA|GRP
MIR21|GRM
";

const CHEBI_BELNS: &str = "[Namespace]
Keyword=CHEBI

[Values]
superoxide|A
oxygen|A
hydrogen peroxide|A
";

const SPECIES_BELANNO: &str = "[AnnotationDefinition]
Keyword=Species

[Processing]
DelimiterString=~

[Values]
9606~Homo sapiens
10090~Mus musculus
";

const DOCUMENT: &str = r#"##################################################################################
# Document properties section
SET DOCUMENT Name = "Integration Test"
SET DOCUMENT Version = "1.0.0"
SET DOCUMENT Description = "End to end test document"
SET DOCUMENT Authors = "BEL Graph Team"

##################################################################################
# Definitions section
DEFINE NAMESPACE HGNC AS URL "http://resources.example.org/belns/hgnc.belns"
DEFINE NAMESPACE CHEBI AS URL "http://resources.example.org/belns/chebi.belns"
DEFINE NAMESPACE GO AS LIST {"nucleus", "cytoplasm", "apoptotic process"}
DEFINE ANNOTATION Species AS URL "http://resources.example.org/belanno/species.belanno"
DEFINE ANNOTATION TextLocation AS LIST {"Abstract", "Results"}

##################################################################################
# Statements section
SET Citation = {"PubMed", "That one article from last week", "123455"}
SET Evidence = "These are mostly made up"
SET Species = 9606
SET TextLocation = "Abstract"

p(HGNC:AKT1) increases p(HGNC:EGFR) # inline comment
act(p(HGNC:AKT1), ma(kin)) => \
    tloc(p(HGNC:FOXO3), fromLoc(GO:nucleus), toLoc(GO:cytoplasm))
rxn(reactants(a(CHEBI:superoxide)), products(a(CHEBI:"hydrogen peroxide"), a(CHEBI:oxygen))) \
    increases bp(GO:"apoptotic process")
p(HGNC:MIA) -- m(HGNC:MIR21)
p(HGNC:AKT1) labeled "AKT serine/threonine kinase 1"

UNSET {Species, TextLocation}
SET Evidence = "A second line of evidence"
deg(p(HGNC:EGFR)) decreases p(HGNC:FOXO3)
"#;

fn write_resources(dir: &Path) {
    std::fs::write(dir.join("hgnc.belns"), HGNC_BELNS).expect("write hgnc");
    std::fs::write(dir.join("chebi.belns"), CHEBI_BELNS).expect("write chebi");
    std::fs::write(dir.join("species.belanno"), SPECIES_BELANNO).expect("write species");
}

fn parse_in(dir: &Path, text: &str, config: &ParserConfig) -> Result<BelDocument, DocumentError> {
    parse_bel_document(text, config, &DirectoryResources::new(dir))
}

// ============================================================================
// Whole documents
// ============================================================================

#[test]
fn test_document_from_directory_resources() {
    let dir = tempdir().expect("tempdir");
    write_resources(dir.path());

    let doc = parse_in(dir.path(), DOCUMENT, &ParserConfig::default()).expect("document parses");
    assert!(doc.warnings.is_empty(), "{:#?}", doc.warnings);

    assert_eq!(doc.metadata.get(MetadataKey::Name), Some("Integration Test"));
    assert_eq!(doc.metadata.get(MetadataKey::Authors), Some("BEL Graph Team"));
    assert!(doc.definitions.has_namespace("CHEBI"));
    assert!(doc.definitions.has_annotation("TextLocation"));

    let akt1 = Term::protein("HGNC", "AKT1");
    let egfr = Term::protein("HGNC", "EGFR");
    let foxo3 = Term::protein("HGNC", "FOXO3");

    let first = doc.graph.edges_between(&akt1, &egfr);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].data.line, Some(23));
    assert!(first[0].data.annotations["Species"].contains("9606"));
    assert!(first[0].data.annotations["TextLocation"].contains("Abstract"));

    let continued = doc.graph.edges_between(&akt1, &foxo3);
    assert_eq!(continued.len(), 1);
    assert_eq!(continued[0].data.relation, Relation::DirectlyIncreases);
    assert_eq!(continued[0].data.line, Some(24));
    assert!(continued[0].data.object.is_some());

    assert!(doc.graph.has_edge(
        &Term::named(Function::MiRna, Concept::new("HGNC", "MIR21")).expect("nameable"),
        Relation::Association,
        &Term::protein("HGNC", "MIA")
    ));
    assert_eq!(doc.graph.description(&akt1), Some("AKT serine/threonine kinase 1"));

    let late = doc.graph.edges_between(&egfr, &foxo3);
    assert_eq!(late.len(), 1);
    assert!(late[0].data.annotations.is_empty());
    assert_eq!(late[0].data.evidence.as_deref(), Some("A second line of evidence"));

    assert_eq!(doc.graph.find_by_relation(Relation::HasReactant).len(), 1);
    assert_eq!(doc.graph.find_by_relation(Relation::HasProduct).len(), 2);
}

#[test]
fn test_document_parsing_is_deterministic() {
    let dir = tempdir().expect("tempdir");
    write_resources(dir.path());

    let a = parse_in(dir.path(), DOCUMENT, &ParserConfig::default()).expect("parses");
    let b = parse_in(dir.path(), DOCUMENT, &ParserConfig::default()).expect("parses");
    let keys = |doc: &BelDocument| doc.graph.edges().map(|e| e.key.clone()).collect::<Vec<_>>();
    assert_eq!(keys(&a), keys(&b));
    assert_eq!(a.graph.node_count(), b.graph.node_count());
}

#[test]
fn test_missing_resource_file_is_fatal() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("hgnc.belns"), HGNC_BELNS).expect("write hgnc");

    let err = parse_in(dir.path(), DOCUMENT, &ParserConfig::default()).expect_err("chebi is missing");
    let DocumentError::Fatal { line_number, error, .. } = err else {
        panic!("expected a fatal BEL error");
    };
    assert_eq!(line_number, 11);
    assert_eq!(error.name(), "UnresolvableResourceError");
}

#[test]
fn test_recoverable_errors_keep_going() {
    let dir = tempdir().expect("tempdir");
    write_resources(dir.path());

    let text = DOCUMENT.replace(
        "p(HGNC:AKT1) increases p(HGNC:EGFR) # inline comment",
        "p(HGNC:AKT1) increases p(HGNC:NOTAGENE)\nSET Species = 4932",
    );
    let doc = parse_in(dir.path(), &text, &ParserConfig::default()).expect("parses");
    let kinds: Vec<&str> = doc.warnings.iter().map(|w| w.kind()).collect();
    assert_eq!(
        kinds,
        vec!["MissingNamespaceNameWarning", "IllegalAnnotationValueWarning"]
    );
    assert_eq!(doc.warnings[0].line_number, 23);
    assert_eq!(doc.warnings[1].line_number, 24);
    let later = doc
        .graph
        .edges_between(&Term::protein("HGNC", "AKT1"), &Term::protein("HGNC", "FOXO3"));
    assert_eq!(later.len(), 1);
    assert!(later[0].data.annotations["Species"].contains("9606"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = tempdir().expect("tempdir");
    write_resources(dir.path());
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "required_annotations": ["Species"],
            "recommended_metadata": ["ContactInfo"]
        })
        .to_string(),
    )
    .expect("write config");

    let config = ParserConfig::from_json_str(&std::fs::read_to_string(&config_path).expect("read"))
        .expect("valid config");
    let doc = parse_in(dir.path(), DOCUMENT, &config).expect("parses");

    let kinds: Vec<&str> = doc.warnings.iter().map(|w| w.kind()).collect();
    assert_eq!(kinds, vec!["MissingMetadataException", "MissingAnnotationWarning"]);
    assert_eq!(doc.warnings[0].line_number, 0);
    assert_eq!(doc.warnings[1].line_number, 33);
}
