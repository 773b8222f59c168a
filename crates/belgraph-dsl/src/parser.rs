//! Line-level parser: one logical line in, one control update or one
//! validated statement out.
//!
//! [`BelParser`] owns the configuration, the document's definitions and the
//! control context. It does not know about the graph; the document loader
//! decides what to do with each [`ParsedLine`] and each error.

use crate::config::ParserConfig;
use crate::control::{parse_control_line, ControlContext, ControlStatement};
use crate::definitions::Definitions;
use crate::errors::BelError;
use crate::grammar::{parse_statement, Statement};
use crate::resource::ResourceLoader;
use crate::source::streamline;
use crate::validate::SemanticValidator;

/// A statement that passed validation, with any advisories it raised.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub statement: Statement,
    pub notes: Vec<BelError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Control(ControlStatement),
    Statement(CompiledStatement),
}

#[derive(Debug, Clone)]
pub struct BelParser {
    config: ParserConfig,
    definitions: Definitions,
    context: ControlContext,
}

impl BelParser {
    pub fn new(config: ParserConfig) -> Self {
        let context = ControlContext::new(config.citation_clearing);
        Self {
            config,
            definitions: Definitions::new(),
            context,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn context(&self) -> &ControlContext {
        &self.context
    }

    pub fn into_parts(self) -> (Definitions, ControlContext) {
        (self.definitions, self.context)
    }

    /// The line as the grammars will see it.
    pub fn prepare(&self, line: &str) -> String {
        if self.config.autostreamline {
            streamline(line)
        } else {
            line.trim().to_string()
        }
    }

    /// Applies a control statement to the definitions or the control context.
    pub fn apply_control(
        &mut self,
        statement: &ControlStatement,
        loader: &dyn ResourceLoader,
    ) -> Result<(), BelError> {
        match statement {
            ControlStatement::SetDocument { key, value } => self.context.set_document(key, value),
            ControlStatement::DefineNamespace { keyword, source } => {
                self.definitions
                    .define_namespace(keyword, source.clone(), loader)
            }
            ControlStatement::DefineAnnotation { keyword, source } => {
                self.definitions
                    .define_annotation(keyword, source.clone(), loader)
            }
            ControlStatement::SetCitation(entries) => self.context.set_citation(entries),
            ControlStatement::SetEvidence(text) => self.context.set_evidence(text),
            ControlStatement::SetStatementGroup(name) => {
                self.context.set_statement_group(name);
                Ok(())
            }
            ControlStatement::SetAnnotation { key, values } => {
                self.context.set_annotation(key, values, &self.definitions)
            }
            ControlStatement::Unset(targets) => self.context.unset(targets),
            ControlStatement::UnsetAll => {
                self.context.unset_all();
                Ok(())
            }
        }
    }

    /// Parses, resolves and validates a statement line. Never mutates state.
    pub fn parse_statement(&self, line: &str) -> Result<CompiledStatement, BelError> {
        let statement = parse_statement(line)?;
        let notes = SemanticValidator::new(&self.config, &self.definitions)
            .validate(&statement, &self.context)?;
        tracing::debug!(statement = %statement, notes = notes.len(), "parsed statement");
        Ok(CompiledStatement { statement, notes })
    }

    /// Parses one logical line of either kind.
    pub fn parse_line(
        &mut self,
        line: &str,
        loader: &dyn ResourceLoader,
    ) -> Result<ParsedLine, BelError> {
        let line = self.prepare(line);
        match parse_control_line(&line) {
            Some(control) => {
                let control = control?;
                self.apply_control(&control, loader)?;
                Ok(ParsedLine::Control(control))
            }
            None => self.parse_statement(&line).map(ParsedLine::Statement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::NamespaceDefinition;
    use crate::resource::InMemoryResources;

    fn loader() -> InMemoryResources {
        InMemoryResources::new().with_namespace(
            "http://resources.example.org/hgnc.belns",
            NamespaceDefinition::from_names(["AKT1", "EGFR"]),
        )
    }

    fn run(parser: &mut BelParser, lines: &[&str]) -> Vec<Result<ParsedLine, BelError>> {
        let loader = loader();
        lines
            .iter()
            .map(|line| parser.parse_line(line, &loader))
            .collect()
    }

    #[test]
    fn control_then_statement() {
        let mut parser = BelParser::new(ParserConfig::default());
        let results = run(
            &mut parser,
            &[
                r#"DEFINE NAMESPACE HGNC AS URL "http://resources.example.org/hgnc.belns""#,
                r#"SET Citation = {"PubMed", "TestName", "1235813"}"#,
                r#"SET Evidence = "I read it on Twitter""#,
                "p(HGNC:AKT1) increases p(HGNC:EGFR)",
            ],
        );
        assert!(results.iter().all(Result::is_ok));
        let Some(Ok(ParsedLine::Statement(compiled))) = results.last() else {
            panic!("expected a statement");
        };
        assert!(compiled.notes.is_empty());
        assert_eq!(
            parser.context().evidence(),
            Some("I read it on Twitter")
        );
        assert!(parser.definitions().has_namespace("HGNC"));
    }

    #[test]
    fn streamlining_is_configurable() {
        let parser = BelParser::new(ParserConfig::default());
        assert_eq!(
            parser.prepare("p(HGNC:AKT1)\t  increases\u{a0}p(HGNC:EGFR)"),
            "p(HGNC:AKT1) increases p(HGNC:EGFR)"
        );
        let raw = BelParser::new(ParserConfig {
            autostreamline: false,
            ..ParserConfig::default()
        });
        assert_eq!(raw.prepare("  a\t b  "), "a\t b");
    }

    #[test]
    fn failing_statement_leaves_state_untouched() {
        let mut parser = BelParser::new(ParserConfig::default());
        let results = run(
            &mut parser,
            &[
                r#"DEFINE NAMESPACE HGNC AS URL "http://resources.example.org/hgnc.belns""#,
                "p(HGNC:AKT1) increases p(HGNC:EGFR)",
            ],
        );
        assert_eq!(results[1], Err(BelError::MissingCitation));
        assert!(parser.context().citation().is_none());
    }

    #[test]
    fn unknown_resource_is_reported() {
        let mut parser = BelParser::new(ParserConfig::default());
        let results = run(
            &mut parser,
            &[r#"DEFINE NAMESPACE CHEBI AS URL "http://resources.example.org/chebi.belns""#],
        );
        assert!(matches!(
            results[0],
            Err(BelError::UnresolvableResource { .. })
        ));
    }
}
