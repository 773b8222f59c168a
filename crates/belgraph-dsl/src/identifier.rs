//! Name resolution against the document's namespaces.
//!
//! Every concept in a statement goes through [`TermResolver`]: entity names,
//! fusion partners, modification types, locations and activity effects.
//! Resolution is read-only and deterministic; it produces either a hard error
//! (the line is skipped) or a list of advisory notes (the line is kept).

use crate::definitions::{Definitions, NamespaceDefinition};
use crate::errors::BelError;
use crate::grammar::Statement;
use crate::language::{default_activity, Function, GMOD_NAMES, PMOD_NAMES};
use crate::term::{Concept, ConceptRole, Term, TermExpr};

/// A successfully resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub term: Term,
    /// Advisories for accepted-but-discouraged input (lenient naked names).
    pub notes: Vec<BelError>,
}

#[derive(Debug, Clone, Copy)]
pub struct TermResolver<'a> {
    definitions: &'a Definitions,
    strict_naked_names: bool,
}

impl<'a> TermResolver<'a> {
    pub fn new(definitions: &'a Definitions, strict_naked_names: bool) -> Self {
        Self {
            definitions,
            strict_naked_names,
        }
    }

    /// Resolves `namespace:name` (or a naked `name`) as a term of `function`.
    pub fn resolve(
        &self,
        function: Function,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Resolved, BelError> {
        let concept = Concept {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        };
        let notes: Vec<BelError> = self
            .check(&concept, ConceptRole::Entity)?
            .into_iter()
            .collect();
        let term = Term::named(function, concept).ok_or_else(|| BelError::InvalidFunctionSemantic {
            function,
            detail: "this function takes members, not a name".to_string(),
        })?;
        Ok(Resolved { term, notes })
    }

    /// Checks one concept; `Ok(Some(note))` means accepted with an advisory.
    pub fn check(&self, concept: &Concept, role: ConceptRole) -> Result<Option<BelError>, BelError> {
        let Some(namespace) = concept.namespace.as_deref() else {
            let naked = BelError::NakedName {
                name: concept.name.clone(),
            };
            return if self.strict_naked_names {
                Err(naked)
            } else {
                Ok(Some(naked))
            };
        };

        if concept.is_bel_default() {
            if let Some(known) = default_vocabulary(role, &concept.name) {
                return if known {
                    Ok(None)
                } else {
                    Err(missing_name(concept, namespace))
                };
            }
        }

        match self.definitions.namespace(namespace) {
            None => Err(BelError::UndefinedNamespace {
                namespace: namespace.to_string(),
                name: concept.name.clone(),
            }),
            Some(NamespaceDefinition::Enumerated(names)) => {
                if names.contains_key(&concept.name) {
                    Ok(None)
                } else {
                    Err(missing_name(concept, namespace))
                }
            }
            Some(NamespaceDefinition::Pattern(pattern)) => {
                if pattern.is_match(&concept.name) {
                    Ok(None)
                } else {
                    Err(BelError::MissingNamespaceRegex {
                        namespace: namespace.to_string(),
                        name: concept.name.clone(),
                        pattern: pattern.as_str().to_string(),
                    })
                }
            }
        }
    }

    /// Resolves every concept of `expr` left to right, collecting advisories.
    pub fn resolve_expr(&self, expr: &TermExpr, notes: &mut Vec<BelError>) -> Result<(), BelError> {
        let mut concepts = Vec::new();
        expr.visit_concepts(&mut |_, concept, role| concepts.push((concept, role)));
        for (concept, role) in concepts {
            notes.extend(self.check(concept, role)?);
        }
        Ok(())
    }

    pub fn resolve_statement(&self, statement: &Statement) -> Result<Vec<BelError>, BelError> {
        let mut notes = Vec::new();
        for expr in statement.term_exprs() {
            self.resolve_expr(expr, &mut notes)?;
        }
        Ok(notes)
    }

    /// Encoding letters of an enumerated name, when the namespace has them.
    pub fn encoding(&self, concept: &Concept) -> Option<&'a str> {
        match self.definitions.namespace(concept.namespace.as_deref()?)? {
            NamespaceDefinition::Enumerated(names) => names.get(&concept.name).map(String::as_str),
            NamespaceDefinition::Pattern(_) => None,
        }
    }
}

/// Membership in the built-in `bel` vocabulary for roles that have one.
fn default_vocabulary(role: ConceptRole, name: &str) -> Option<bool> {
    match role {
        ConceptRole::Activity => Some(default_activity(name).is_some()),
        ConceptRole::ProteinModification => Some(PMOD_NAMES.contains(&name)),
        ConceptRole::GeneModification => Some(GMOD_NAMES.contains(&name)),
        _ => None,
    }
}

fn missing_name(concept: &Concept, namespace: &str) -> BelError {
    BelError::MissingNamespaceName {
        namespace: namespace.to_string(),
        name: concept.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::ResourceSource;
    use crate::grammar::{parse_statement, parse_term};
    use crate::resource::InMemoryResources;

    fn definitions() -> Definitions {
        let loader = InMemoryResources::new();
        let mut defs = Definitions::new();
        defs.define_namespace(
            "HGNC",
            ResourceSource::List(vec!["AKT1".to_string(), "EGFR".to_string()]),
            &loader,
        )
        .expect("list namespace");
        defs.define_namespace(
            "dbSNP",
            ResourceSource::Pattern("rs[0-9]+".to_string()),
            &loader,
        )
        .expect("pattern namespace");
        defs.define_namespace(
            "GO",
            ResourceSource::List(vec!["nucleus".to_string(), "kinase activity".to_string()]),
            &loader,
        )
        .expect("list namespace");
        defs
    }

    #[test]
    fn enumerated_membership_is_case_sensitive() {
        let defs = definitions();
        let resolver = TermResolver::new(&defs, true);
        let ok = resolver
            .resolve(Function::Protein, Some("HGNC"), "AKT1")
            .expect("member");
        assert_eq!(ok.term, Term::protein("HGNC", "AKT1"));
        assert!(ok.notes.is_empty());
        let err = resolver
            .resolve(Function::Protein, Some("HGNC"), "akt1")
            .expect_err("wrong case");
        assert_eq!(err.name(), "MissingNamespaceNameWarning");
    }

    #[test]
    fn pattern_and_undefined_namespaces() {
        let defs = definitions();
        let resolver = TermResolver::new(&defs, true);
        assert!(resolver.resolve(Function::Gene, Some("dbSNP"), "rs123").is_ok());
        let err = resolver
            .resolve(Function::Gene, Some("dbSNP"), "rs12a")
            .expect_err("pattern mismatch");
        assert_eq!(err.name(), "MissingNamespaceRegexWarning");
        let err = resolver
            .resolve(Function::Protein, Some("NOPE"), "X")
            .expect_err("undefined");
        assert_eq!(err.name(), "UndefinedNamespaceWarning");
    }

    #[test]
    fn naked_names_follow_strictness() {
        let defs = definitions();
        let strict = TermResolver::new(&defs, true);
        assert!(matches!(
            strict.resolve(Function::Protein, None, "AKT1"),
            Err(BelError::NakedName { .. })
        ));
        let lenient = TermResolver::new(&defs, false);
        let resolved = lenient
            .resolve(Function::Protein, None, "AKT1")
            .expect("lenient");
        assert_eq!(resolved.notes.len(), 1);
        assert_eq!(resolved.notes[0].name(), "NakedNameWarning");
    }

    #[test]
    fn composites_cannot_be_named() {
        let defs = definitions();
        let resolver = TermResolver::new(&defs, true);
        assert!(matches!(
            resolver.resolve(Function::Composite, Some("HGNC"), "AKT1"),
            Err(BelError::InvalidFunctionSemantic { .. })
        ));
    }

    #[test]
    fn default_vocabulary_covers_activities_and_modifications() {
        let defs = definitions();
        let resolver = TermResolver::new(&defs, true);
        let expr = parse_term("act(p(HGNC:AKT1, pmod(Ph, Ser, 473)), ma(kin))").expect("term");
        let mut notes = Vec::new();
        resolver.resolve_expr(&expr, &mut notes).expect("all known");
        assert!(notes.is_empty());

        let expr = parse_term(r#"act(p(HGNC:AKT1), ma(GO:"kinase activity"))"#).expect("term");
        resolver.resolve_expr(&expr, &mut notes).expect("GO activity");

        let expr = parse_term("p(HGNC:AKT1, pmod(Foo))").expect("term");
        assert!(matches!(
            resolver.resolve_expr(&expr, &mut notes),
            Err(BelError::NakedName { .. })
        ));
    }

    #[test]
    fn statements_resolve_left_to_right() {
        let defs = definitions();
        let resolver = TermResolver::new(&defs, true);
        let statement =
            parse_statement("p(NOPE:A) increases p(HGNC:MISSING)").expect("syntax ok");
        let err = resolver.resolve_statement(&statement).expect_err("subject first");
        assert_eq!(err.name(), "UndefinedNamespaceWarning");

        let statement =
            parse_statement("p(HGNC:AKT1) increases tloc(p(HGNC:EGFR), fromLoc(GO:nucleus), toLoc(GO:cytosol))")
                .expect("syntax ok");
        let err = resolver.resolve_statement(&statement).expect_err("unknown location");
        assert_eq!(
            err,
            BelError::MissingNamespaceName {
                namespace: "GO".to_string(),
                name: "cytosol".to_string()
            }
        );
    }

    #[test]
    fn encodings_are_exposed_for_enumerated_names() {
        let loader = InMemoryResources::new().with_namespace(
            "http://x/hgnc.belns",
            NamespaceDefinition::from_encoded([("AKT1", "GRP"), ("MIR21", "GRM")]),
        );
        let mut defs = Definitions::new();
        defs.define_namespace(
            "HGNC",
            ResourceSource::Url("http://x/hgnc.belns".to_string()),
            &loader,
        )
        .expect("url namespace");
        let resolver = TermResolver::new(&defs, true);
        assert_eq!(resolver.encoding(&Concept::new("HGNC", "MIR21")), Some("GRM"));
        assert_eq!(resolver.encoding(&Concept::naked("MIR21")), None);
    }
}
