//! Typed BEL terms.
//!
//! A [`Term`] is what becomes a graph node: it is structurally compared and
//! hashed, and list-like parts (variants, complex members, reaction
//! participants) are sorted on construction so that equivalent spellings
//! intern to the same node.
//!
//! A [`TermExpr`] is a term as it appears in a statement: possibly wrapped in
//! a [`Modifier`] and/or placed at a location. Modifiers and locations describe
//! the edge, not the node.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language::{
    default_activity, default_gmod, default_pmod, Function, BEL_DEFAULT_NAMESPACE, CELL_SURFACE, EXTRACELLULAR_SPACE, GO_NAMESPACE,
    INTRACELLULAR, PLACEHOLDER_AMINO_ACID,
};

// ============================================================================
// Concepts
// ============================================================================

/// A (possibly naked) controlled-vocabulary reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Concept {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl Concept {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn naked(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn bel_default(name: impl Into<String>) -> Self {
        Self::new(BEL_DEFAULT_NAMESPACE, name)
    }

    pub fn is_bel_default(&self) -> bool {
        self.namespace.as_deref() == Some(BEL_DEFAULT_NAMESPACE)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Writes `text` as a BEL string literal.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_plain_name(name) {
        f.write_str(name)
    } else {
        write_quoted(f, name)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}:")?;
        }
        write_name(f, &self.name)
    }
}

/// A concept in a slot with a default vocabulary (`pmod`, `gmod`, `ma`).
///
/// Default-namespace names that read back unchanged are written bare.
struct Defaulted<'a>(&'a Concept, fn(&str) -> Option<&'static str>);

impl fmt::Display for Defaulted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Defaulted(concept, default) = self;
        if concept.is_bel_default() && default(&concept.name) == Some(concept.name.as_str()) {
            write_name(f, &concept.name)
        } else {
            write!(f, "{concept}")
        }
    }
}

// ============================================================================
// Variants
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Variant {
    /// `var("p.Ala127Tyr")`
    Hgvs { variant: String },
    /// `pmod(Ph, Ser, 473)`
    ProteinModification {
        concept: Concept,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u32>,
    },
    /// `gmod(Me)`
    GeneModification { concept: Concept },
    /// `frag("5_20", "description")`
    Fragment {
        range: FragmentRange,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Variant {
    pub fn hgvs(variant: impl Into<String>) -> Self {
        Variant::Hgvs {
            variant: variant.into(),
        }
    }

    /// Whether the variant mentions the unknown amino acid.
    pub fn has_placeholder_amino_acid(&self) -> bool {
        match self {
            Variant::Hgvs { variant } => {
                variant.starts_with("p.") && variant.contains(PLACEHOLDER_AMINO_ACID)
            }
            Variant::ProteinModification { code, .. } => {
                code.as_deref() == Some(PLACEHOLDER_AMINO_ACID)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FragmentRange {
    /// `frag("?")`
    Missing,
    Known { start: Bound, stop: Bound },
}

/// One end of a fragment or fusion range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bound {
    Position(u32),
    /// `?` (or `*` for a fragment running to the end)
    Unknown,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Position(p) => write!(f, "{p}"),
            Bound::Unknown => f.write_str("?"),
        }
    }
}

impl fmt::Display for FragmentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentRange::Missing => f.write_str("?"),
            FragmentRange::Known { start, stop } => write!(f, "{start}_{stop}"),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Hgvs { variant } => {
                f.write_str("var(")?;
                write_quoted(f, variant)?;
                f.write_str(")")
            }
            Variant::ProteinModification {
                concept,
                code,
                position,
            } => {
                write!(f, "pmod({}", Defaulted(concept, default_pmod))?;
                if let Some(code) = code {
                    write!(f, ", {code}")?;
                }
                if let Some(position) = position {
                    write!(f, ", {position}")?;
                }
                f.write_str(")")
            }
            Variant::GeneModification { concept } => {
                write!(f, "gmod({})", Defaulted(concept, default_gmod))
            }
            Variant::Fragment { range, description } => {
                write!(f, "frag(\"{range}\"")?;
                if let Some(description) = description {
                    f.write_str(", ")?;
                    write_quoted(f, description)?;
                }
                f.write_str(")")
            }
        }
    }
}

// ============================================================================
// Fusions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FusionRange {
    /// `"?"`
    Missing,
    /// `"r.1_79"`: reference sequence type, then the breakpoint bounds.
    Enumerated {
        reference: char,
        start: Bound,
        stop: Bound,
    },
}

impl fmt::Display for FusionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionRange::Missing => f.write_str("?"),
            FusionRange::Enumerated {
                reference,
                start,
                stop,
            } => write!(f, "{reference}.{start}_{stop}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fusion {
    pub partner_5p: Concept,
    pub range_5p: FusionRange,
    pub partner_3p: Concept,
    pub range_3p: FusionRange,
}

impl fmt::Display for Fusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fus({}, \"{}\", {}, \"{}\")",
            self.partner_5p, self.range_5p, self.partner_3p, self.range_3p
        )
    }
}

// ============================================================================
// Terms
// ============================================================================

/// Body of a gene, RNA, miRNA or protein term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CentralDogma {
    Entity {
        concept: Concept,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<Variant>,
    },
    Fusion { fusion: Fusion },
}

/// Body of a complex or composite: a named entity or a member list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListAbundance {
    Named { concept: Concept },
    Members { members: Vec<Term> },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reaction {
    pub reactants: Vec<Term>,
    pub products: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "function", content = "body", rename_all = "snake_case")]
pub enum Term {
    Abundance(Concept),
    Gene(CentralDogma),
    Rna(CentralDogma),
    MiRna(CentralDogma),
    Protein(CentralDogma),
    Complex(ListAbundance),
    Composite(ListAbundance),
    BiologicalProcess(Concept),
    Pathology(Concept),
    Reaction(Reaction),
}

impl Term {
    /// A term naming a single concept, for the functions that can be named.
    pub fn named(function: Function, concept: Concept) -> Option<Term> {
        fn entity(concept: Concept) -> CentralDogma {
            CentralDogma::Entity {
                concept,
                variants: Vec::new(),
            }
        }
        Some(match function {
            Function::Abundance => Term::Abundance(concept),
            Function::Gene => Term::Gene(entity(concept)),
            Function::Rna => Term::Rna(entity(concept)),
            Function::MiRna => Term::MiRna(entity(concept)),
            Function::Protein => Term::Protein(entity(concept)),
            Function::Complex => Term::Complex(ListAbundance::Named { concept }),
            Function::BiologicalProcess => Term::BiologicalProcess(concept),
            Function::Pathology => Term::Pathology(concept),
            Function::Composite | Function::Reaction => return None,
        })
    }

    /// Builds a central-dogma term with sorted variants.
    ///
    /// Returns `None` when `function` does not carry variants.
    pub fn with_variants(
        function: Function,
        concept: Concept,
        mut variants: Vec<Variant>,
    ) -> Option<Term> {
        variants.sort();
        let body = CentralDogma::Entity { concept, variants };
        Self::central_dogma(function, body)
    }

    pub fn fusion(function: Function, fusion: Fusion) -> Option<Term> {
        Self::central_dogma(function, CentralDogma::Fusion { fusion })
    }

    fn central_dogma(function: Function, body: CentralDogma) -> Option<Term> {
        Some(match function {
            Function::Gene => Term::Gene(body),
            Function::Rna => Term::Rna(body),
            Function::MiRna => Term::MiRna(body),
            Function::Protein => Term::Protein(body),
            _ => return None,
        })
    }

    pub fn complex_of(mut members: Vec<Term>) -> Term {
        members.sort();
        Term::Complex(ListAbundance::Members { members })
    }

    pub fn composite_of(mut members: Vec<Term>) -> Term {
        members.sort();
        Term::Composite(ListAbundance::Members { members })
    }

    pub fn reaction(mut reactants: Vec<Term>, mut products: Vec<Term>) -> Term {
        reactants.sort();
        products.sort();
        Term::Reaction(Reaction {
            reactants,
            products,
        })
    }

    pub fn protein(namespace: &str, name: &str) -> Term {
        Term::Protein(CentralDogma::Entity {
            concept: Concept::new(namespace, name),
            variants: Vec::new(),
        })
    }

    pub fn gene(namespace: &str, name: &str) -> Term {
        Term::Gene(CentralDogma::Entity {
            concept: Concept::new(namespace, name),
            variants: Vec::new(),
        })
    }

    pub fn rna(namespace: &str, name: &str) -> Term {
        Term::Rna(CentralDogma::Entity {
            concept: Concept::new(namespace, name),
            variants: Vec::new(),
        })
    }

    pub fn abundance(namespace: &str, name: &str) -> Term {
        Term::Abundance(Concept::new(namespace, name))
    }

    pub fn biological_process(namespace: &str, name: &str) -> Term {
        Term::BiologicalProcess(Concept::new(namespace, name))
    }

    pub fn pathology(namespace: &str, name: &str) -> Term {
        Term::Pathology(Concept::new(namespace, name))
    }

    pub fn function(&self) -> Function {
        match self {
            Term::Abundance(_) => Function::Abundance,
            Term::Gene(_) => Function::Gene,
            Term::Rna(_) => Function::Rna,
            Term::MiRna(_) => Function::MiRna,
            Term::Protein(_) => Function::Protein,
            Term::Complex(_) => Function::Complex,
            Term::Composite(_) => Function::Composite,
            Term::BiologicalProcess(_) => Function::BiologicalProcess,
            Term::Pathology(_) => Function::Pathology,
            Term::Reaction(_) => Function::Reaction,
        }
    }

    /// The concept this term names directly, if any.
    pub fn concept(&self) -> Option<&Concept> {
        match self {
            Term::Abundance(c) | Term::BiologicalProcess(c) | Term::Pathology(c) => Some(c),
            Term::Gene(body) | Term::Rna(body) | Term::MiRna(body) | Term::Protein(body) => {
                match body {
                    CentralDogma::Entity { concept, .. } => Some(concept),
                    CentralDogma::Fusion { .. } => None,
                }
            }
            Term::Complex(ListAbundance::Named { concept })
            | Term::Composite(ListAbundance::Named { concept }) => Some(concept),
            _ => None,
        }
    }

    pub fn variants(&self) -> &[Variant] {
        match self {
            Term::Gene(CentralDogma::Entity { variants, .. })
            | Term::Rna(CentralDogma::Entity { variants, .. })
            | Term::MiRna(CentralDogma::Entity { variants, .. })
            | Term::Protein(CentralDogma::Entity { variants, .. }) => variants,
            _ => &[],
        }
    }

    /// The same term without its variants, when it has any.
    pub fn parent(&self) -> Option<Term> {
        if self.variants().is_empty() {
            return None;
        }
        let concept = self.concept()?.clone();
        Term::named(self.function(), concept)
    }

    /// Complex or composite members.
    pub fn members(&self) -> &[Term] {
        match self {
            Term::Complex(ListAbundance::Members { members })
            | Term::Composite(ListAbundance::Members { members }) => members,
            _ => &[],
        }
    }

    pub fn as_reaction(&self) -> Option<&Reaction> {
        match self {
            Term::Reaction(reaction) => Some(reaction),
            _ => None,
        }
    }

    /// Visits every concept the term names, outermost first, left to right.
    ///
    /// Variant concepts are included; nested member terms are visited recursively.
    pub fn visit_concepts<'a>(&'a self, visit: &mut dyn FnMut(Function, &'a Concept, ConceptRole)) {
        let function = self.function();
        match self {
            Term::Abundance(c) | Term::BiologicalProcess(c) | Term::Pathology(c) => {
                visit(function, c, ConceptRole::Entity)
            }
            Term::Gene(body) | Term::Rna(body) | Term::MiRna(body) | Term::Protein(body) => {
                match body {
                    CentralDogma::Entity { concept, variants } => {
                        visit(function, concept, ConceptRole::Entity);
                        for variant in variants {
                            match variant {
                                Variant::ProteinModification { concept, .. } => {
                                    visit(function, concept, ConceptRole::ProteinModification)
                                }
                                Variant::GeneModification { concept } => {
                                    visit(function, concept, ConceptRole::GeneModification)
                                }
                                Variant::Hgvs { .. } | Variant::Fragment { .. } => {}
                            }
                        }
                    }
                    CentralDogma::Fusion { fusion } => {
                        visit(function, &fusion.partner_5p, ConceptRole::FusionPartner);
                        visit(function, &fusion.partner_3p, ConceptRole::FusionPartner);
                    }
                }
            }
            Term::Complex(list) | Term::Composite(list) => match list {
                ListAbundance::Named { concept } => visit(function, concept, ConceptRole::Entity),
                ListAbundance::Members { members } => {
                    for member in members {
                        member.visit_concepts(visit);
                    }
                }
            },
            Term::Reaction(reaction) => {
                for term in reaction.reactants.iter().chain(&reaction.products) {
                    term.visit_concepts(visit);
                }
            }
        }
    }
}

/// Where a concept occurs inside a term expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptRole {
    /// Names the entity of a term; checked against namespace encodings.
    Entity,
    FusionPartner,
    ProteinModification,
    GeneModification,
    Location,
    Activity,
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{term}")?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.function().short_name();
        match self {
            Term::Abundance(c) | Term::BiologicalProcess(c) | Term::Pathology(c) => {
                write!(f, "{function}({c})")
            }
            Term::Gene(body) | Term::Rna(body) | Term::MiRna(body) | Term::Protein(body) => {
                match body {
                    CentralDogma::Entity { concept, variants } => {
                        write!(f, "{function}({concept}")?;
                        for variant in variants {
                            write!(f, ", {variant}")?;
                        }
                        f.write_str(")")
                    }
                    CentralDogma::Fusion { fusion } => write!(f, "{function}({fusion})"),
                }
            }
            Term::Complex(list) | Term::Composite(list) => match list {
                ListAbundance::Named { concept } => write!(f, "{function}({concept})"),
                ListAbundance::Members { members } => {
                    write!(f, "{function}(")?;
                    write_terms(f, members)?;
                    f.write_str(")")
                }
            },
            Term::Reaction(reaction) => {
                f.write_str("rxn(reactants(")?;
                write_terms(f, &reaction.reactants)?;
                f.write_str("), products(")?;
                write_terms(f, &reaction.products)?;
                f.write_str("))")
            }
        }
    }
}

// ============================================================================
// Modifiers and term expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "modifier", rename_all = "snake_case")]
pub enum Modifier {
    Activity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        effect: Option<Concept>,
    },
    Degradation,
    Translocation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_loc: Option<Concept>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_loc: Option<Concept>,
    },
}

impl Modifier {
    pub fn cell_secretion() -> Self {
        Modifier::Translocation {
            from_loc: Some(Concept::new(GO_NAMESPACE, INTRACELLULAR)),
            to_loc: Some(Concept::new(GO_NAMESPACE, EXTRACELLULAR_SPACE)),
        }
    }

    pub fn cell_surface_expression() -> Self {
        Modifier::Translocation {
            from_loc: Some(Concept::new(GO_NAMESPACE, INTRACELLULAR)),
            to_loc: Some(Concept::new(GO_NAMESPACE, CELL_SURFACE)),
        }
    }

    /// A translocation with neither endpoint given.
    pub fn is_unqualified_translocation(&self) -> bool {
        matches!(
            self,
            Modifier::Translocation {
                from_loc: None,
                to_loc: None
            }
        )
    }
}

/// A term as written in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermExpr {
    pub term: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Concept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

impl TermExpr {
    pub fn bare(term: Term) -> Self {
        Self {
            term,
            location: None,
            modifier: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.location.is_none() && self.modifier.is_none()
    }

    /// Visits the term's concepts, then the location and modifier concepts.
    pub fn visit_concepts<'a>(&'a self, visit: &mut dyn FnMut(Function, &'a Concept, ConceptRole)) {
        self.term.visit_concepts(visit);
        let function = self.term.function();
        if let Some(location) = &self.location {
            visit(function, location, ConceptRole::Location);
        }
        match &self.modifier {
            Some(Modifier::Activity {
                effect: Some(effect),
            }) => visit(function, effect, ConceptRole::Activity),
            Some(Modifier::Translocation { from_loc, to_loc }) => {
                for loc in from_loc.iter().chain(to_loc) {
                    visit(function, loc, ConceptRole::Location);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for TermExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inner = self.term.to_string();
        if let Some(location) = &self.location {
            inner.pop();
            inner.push_str(&format!(", loc({location}))"));
        }
        match &self.modifier {
            None => f.write_str(&inner),
            Some(Modifier::Degradation) => write!(f, "deg({inner})"),
            Some(Modifier::Activity { effect: None }) => write!(f, "act({inner})"),
            Some(Modifier::Activity {
                effect: Some(effect),
            }) => write!(f, "act({inner}, ma({}))", Defaulted(effect, default_activity)),
            Some(Modifier::Translocation { from_loc, to_loc }) => {
                write!(f, "tloc({inner}")?;
                if let Some(from) = from_loc {
                    write!(f, ", fromLoc({from})")?;
                }
                if let Some(to) = to_loc {
                    write!(f, ", toLoc({to})")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_term;

    #[test]
    fn complex_members_are_order_insensitive() {
        let ab = Term::complex_of(vec![Term::protein("HGNC", "FOS"), Term::protein("HGNC", "JUN")]);
        let ba = Term::complex_of(vec![Term::protein("HGNC", "JUN"), Term::protein("HGNC", "FOS")]);
        assert_eq!(ab, ba);
        assert_eq!(ab.to_string(), "complex(p(HGNC:FOS), p(HGNC:JUN))");
    }

    #[test]
    fn display_quotes_names_with_spaces() {
        let term = Term::biological_process("GO", "cell death");
        assert_eq!(term.to_string(), "bp(GO:\"cell death\")");
    }

    #[test]
    fn parent_drops_variants() {
        let term = Term::with_variants(
            Function::Protein,
            Concept::new("HGNC", "AKT1"),
            vec![Variant::hgvs("p.Ala127Tyr")],
        )
        .expect("protein carries variants");
        assert_eq!(term.to_string(), "p(HGNC:AKT1, var(\"p.Ala127Tyr\"))");
        assert_eq!(term.parent(), Some(Term::protein("HGNC", "AKT1")));
        assert_eq!(Term::protein("HGNC", "AKT1").parent(), None);
    }

    #[test]
    fn expression_display_wraps_modifier_and_location() {
        let expr = TermExpr {
            term: Term::protein("HGNC", "AKT1"),
            location: Some(Concept::new("GO", "cell surface")),
            modifier: Some(Modifier::Activity {
                effect: Some(Concept::bel_default("kin")),
            }),
        };
        assert_eq!(
            expr.to_string(),
            "act(p(HGNC:AKT1, loc(GO:\"cell surface\")), ma(kin))"
        );
    }

    #[test]
    fn placeholder_amino_acid_is_detected() {
        let pmod = Variant::ProteinModification {
            concept: Concept::bel_default("Ph"),
            code: Some(PLACEHOLDER_AMINO_ACID.to_string()),
            position: None,
        };
        assert!(pmod.has_placeholder_amino_acid());
        assert!(Variant::hgvs("p.Ala127Xaa").has_placeholder_amino_acid());
        assert!(!Variant::hgvs("c.308G>A").has_placeholder_amino_acid());
    }

    #[test]
    fn default_namespace_is_written_only_where_it_reads_back() {
        let naked = Term::named(Function::Protein, Concept::naked("AKT1")).expect("nameable");
        let bel = Term::named(Function::Protein, Concept::bel_default("AKT1")).expect("nameable");
        assert_eq!(naked.to_string(), "p(AKT1)");
        assert_eq!(bel.to_string(), "p(bel:AKT1)");
        assert_eq!(parse_term(&bel.to_string()).expect("reparse").term, bel);

        let unknown = Term::with_variants(
            Function::Protein,
            Concept::new("HGNC", "AKT1"),
            vec![Variant::ProteinModification {
                concept: Concept::bel_default("Foo"),
                code: None,
                position: None,
            }],
        )
        .expect("protein carries variants");
        assert_eq!(unknown.to_string(), "p(HGNC:AKT1, pmod(bel:Foo))");
        assert_eq!(parse_term(&unknown.to_string()).expect("reparse").term, unknown);

        let gmod_only_in_pmod = Term::with_variants(
            Function::Gene,
            Concept::new("HGNC", "AKT1"),
            vec![Variant::GeneModification {
                concept: Concept::bel_default("Ph"),
            }],
        )
        .expect("gene carries variants");
        assert_eq!(gmod_only_in_pmod.to_string(), "g(HGNC:AKT1, gmod(bel:Ph))");
    }

    #[test]
    fn quotes_inside_literals_are_escaped() {
        let term = Term::with_variants(
            Function::Protein,
            Concept::new("HGNC", "AKT1"),
            vec![
                Variant::hgvs(r#"p.Ala127"Tyr"#),
                Variant::Fragment {
                    range: FragmentRange::Missing,
                    description: Some(r#"the "short" one \ cleaved"#.to_string()),
                },
            ],
        )
        .expect("protein carries variants");
        let rendered = term.to_string();
        assert!(rendered.contains(r#"var("p.Ala127\"Tyr")"#), "{rendered}");
        assert_eq!(parse_term(&rendered).expect("reparse").term, term);
    }
}
