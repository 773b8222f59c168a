//! Statement-level semantic checks.
//!
//! Rules fire in a fixed order and the first failing rule wins:
//!
//! 1. name resolution, left to right ([`TermResolver`])
//! 2. function semantics: namespace encodings, member functions
//! 3. modifier targets and translocation qualification
//! 4. placeholder amino acids (advisory)
//! 5. nested statements
//! 6. relation signatures
//! 7. self loops
//! 8. provenance: citation, then evidence, then required annotations
//!
//! Advisories (lenient naked names, placeholder amino acids) do not reject the
//! statement; they are returned alongside it.

use crate::config::ParserConfig;
use crate::control::ControlContext;
use crate::definitions::Definitions;
use crate::errors::BelError;
use crate::grammar::Statement;
use crate::identifier::TermResolver;
use crate::language::{encoding_admits, Function, Relation};
use crate::term::{ConceptRole, Modifier, Term, TermExpr};

/// One `subject relation object` edge a statement asserts.
pub type Assertion<'s> = (&'s TermExpr, Relation, &'s TermExpr);

/// Edges asserted by a statement, in insertion order.
///
/// Nested statements assert `subject -> inner subject` and the inner triple;
/// list statements assert one member relation per list entry.
pub fn assertions(statement: &Statement) -> Vec<Assertion<'_>> {
    match statement {
        Statement::Term { .. } | Statement::Label { .. } => Vec::new(),
        Statement::Relation(triple) => vec![(&triple.subject, triple.relation, &triple.object)],
        Statement::Nested {
            subject,
            relation,
            inner,
        } => vec![
            (subject, *relation, &inner.subject),
            (&inner.subject, inner.relation, &inner.object),
        ],
        Statement::List {
            subject,
            relation,
            members,
        } => {
            let member_relation = relation.list_member_relation().unwrap_or(*relation);
            members
                .iter()
                .map(|member| (subject, member_relation, member))
                .collect()
        }
    }
}

/// Whether the statement needs a citation and evidence.
pub fn is_qualified(statement: &Statement) -> bool {
    assertions(statement)
        .iter()
        .any(|(_, relation, _)| !relation.is_unqualified())
}

pub struct SemanticValidator<'a> {
    config: &'a ParserConfig,
    resolver: TermResolver<'a>,
}

impl<'a> SemanticValidator<'a> {
    pub fn new(config: &'a ParserConfig, definitions: &'a Definitions) -> Self {
        Self {
            config,
            resolver: TermResolver::new(definitions, config.strict_naked_names),
        }
    }

    /// Checks a parsed statement against the current control state.
    ///
    /// Returns the advisories to record when the statement is accepted.
    pub fn validate(
        &self,
        statement: &Statement,
        context: &ControlContext,
    ) -> Result<Vec<BelError>, BelError> {
        let mut notes = self.resolver.resolve_statement(statement)?;
        let exprs = statement.term_exprs();

        for expr in &exprs {
            self.check_encodings(expr)?;
            check_members(&expr.term)?;
        }
        for expr in &exprs {
            self.check_modifier(expr)?;
        }
        for expr in &exprs {
            if has_placeholder(&expr.term) {
                notes.push(BelError::PlaceholderAminoAcid {
                    term: expr.to_string(),
                });
            }
        }
        if matches!(statement, Statement::Nested { .. }) && !self.config.allow_nested {
            return Err(BelError::NestedRelation);
        }

        let assertions = assertions(statement);
        for (subject, relation, object) in &assertions {
            check_signature(subject, *relation, object)?;
        }
        for (subject, relation, object) in &assertions {
            if subject.term == object.term && !relation.allows_self_loop() {
                return Err(BelError::SelfLoop {
                    relation: *relation,
                    term: subject.term.to_string(),
                });
            }
        }

        if is_qualified(statement) {
            self.check_provenance(context)?;
        }
        Ok(notes)
    }

    fn check_encodings(&self, expr: &TermExpr) -> Result<(), BelError> {
        let mut named = Vec::new();
        expr.visit_concepts(&mut |function, concept, role| {
            if matches!(role, ConceptRole::Entity | ConceptRole::FusionPartner) {
                named.push((function, concept));
            }
        });
        for (function, concept) in named {
            let Some(encoding) = self.resolver.encoding(concept) else {
                continue;
            };
            if !encoding.chars().any(|letter| encoding_admits(letter, function)) {
                return Err(BelError::InvalidFunctionSemantic {
                    function,
                    detail: format!("`{concept}` is encoded `{encoding}`"),
                });
            }
        }
        Ok(())
    }

    fn check_modifier(&self, expr: &TermExpr) -> Result<(), BelError> {
        let Some(modifier) = &expr.modifier else {
            return Ok(());
        };
        let function = expr.term.function();
        if !function.is_simple_abundance() {
            return Err(BelError::InvalidFunctionSemantic {
                function,
                detail: "activity, degradation and translocation apply to abundances".to_string(),
            });
        }
        if self.config.disallow_unqualified_translocations
            && modifier.is_unqualified_translocation()
        {
            return Err(BelError::MalformedTranslocation {
                term: expr.to_string(),
            });
        }
        Ok(())
    }

    fn check_provenance(&self, context: &ControlContext) -> Result<(), BelError> {
        if context.citation().is_none() {
            return Err(BelError::MissingCitation);
        }
        if context.evidence().is_none() {
            return Err(BelError::MissingSupport);
        }
        let missing = context.missing_annotations(&self.config.required_annotations);
        if !missing.is_empty() {
            return Err(BelError::MissingAnnotation { missing });
        }
        Ok(())
    }
}

fn check_members(term: &Term) -> Result<(), BelError> {
    let function = term.function();
    for member in term.members() {
        if !member.function().is_simple_abundance() {
            return Err(BelError::InvalidFunctionSemantic {
                function,
                detail: format!("member `{member}` is not an abundance"),
            });
        }
        check_members(member)?;
    }
    if let Some(reaction) = term.as_reaction() {
        for participant in reaction.reactants.iter().chain(&reaction.products) {
            if !participant.function().is_abundance() {
                return Err(BelError::InvalidFunctionSemantic {
                    function,
                    detail: format!("participant `{participant}` is not an abundance"),
                });
            }
            check_members(participant)?;
        }
    }
    Ok(())
}

fn has_placeholder(term: &Term) -> bool {
    term.variants().iter().any(|v| v.has_placeholder_amino_acid())
        || term.members().iter().any(has_placeholder)
        || term.as_reaction().is_some_and(|reaction| {
            reaction
                .reactants
                .iter()
                .chain(&reaction.products)
                .any(has_placeholder)
        })
}

/// Processes are `bp`/`path` terms and activities of any abundance.
fn is_process(expr: &TermExpr) -> bool {
    expr.term.function().is_process() || matches!(expr.modifier, Some(Modifier::Activity { .. }))
}

fn check_signature(subject: &TermExpr, relation: Relation, object: &TermExpr) -> Result<(), BelError> {
    let (s, o) = (subject.term.function(), object.term.function());
    let (ok, offender, expected) = match relation {
        Relation::TranscribedTo => (
            s == Function::Gene && o == Function::Rna,
            if s == Function::Gene { o } else { s },
            "a gene transcribed to an RNA",
        ),
        Relation::TranslatedTo => (
            s == Function::Rna && o == Function::Protein,
            if s == Function::Rna { o } else { s },
            "an RNA translated to a protein",
        ),
        Relation::RateLimitingStepOf => (
            o == Function::BiologicalProcess,
            o,
            "a biological process as object",
        ),
        Relation::SubProcessOf | Relation::BiomarkerFor | Relation::PrognosticBiomarkerFor => {
            (is_process(object), o, "a process as object")
        }
        Relation::HasComponent | Relation::HasComponents => (
            matches!(s, Function::Complex | Function::Composite),
            s,
            "a complex or composite as subject",
        ),
        Relation::HasVariant => (
            s.is_abundance() && o.is_abundance(),
            if s.is_abundance() { o } else { s },
            "abundances on both sides",
        ),
        Relation::HasReactant | Relation::HasProduct => {
            (s == Function::Reaction, s, "a reaction as subject")
        }
        _ => (true, s, ""),
    };
    if ok {
        return Ok(());
    }
    Err(BelError::InvalidFunctionSemantic {
        function: offender,
        detail: format!("{relation} needs {expected}"),
    })
}
