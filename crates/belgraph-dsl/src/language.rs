//! BEL vocabulary: function kinds, modifier functions, relations and the
//! built-in default namespace.
//!
//! Every keyword table lives here so the grammar, the resolver and the
//! validator agree on one closed set of tags.

use serde::{Deserialize, Serialize};

/// Namespace used for names that BEL itself defines (default activities,
/// protein modifications and gene modifications).
pub const BEL_DEFAULT_NAMESPACE: &str = "bel";

/// Namespace of the GO cellular component terms used by `sec()` and `surf()`.
pub const GO_NAMESPACE: &str = "GO";

pub const INTRACELLULAR: &str = "intracellular";
pub const EXTRACELLULAR_SPACE: &str = "extracellular space";
pub const CELL_SURFACE: &str = "cell surface";

/// HGVS code for an unknown amino acid.
pub const PLACEHOLDER_AMINO_ACID: &str = "Xaa";

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Abundance,
    Gene,
    Rna,
    MiRna,
    Protein,
    Complex,
    Composite,
    BiologicalProcess,
    Pathology,
    Reaction,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Abundance,
        Function::Gene,
        Function::Rna,
        Function::MiRna,
        Function::Protein,
        Function::Complex,
        Function::Composite,
        Function::BiologicalProcess,
        Function::Pathology,
        Function::Reaction,
    ];

    /// Short and long keywords accepted in BEL text.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Function::Abundance => &["a", "abundance"],
            Function::Gene => &["g", "geneAbundance"],
            Function::Rna => &["r", "rnaAbundance"],
            Function::MiRna => &["m", "microRNAAbundance"],
            Function::Protein => &["p", "proteinAbundance"],
            Function::Complex => &["complex", "complexAbundance"],
            Function::Composite => &["composite", "compositeAbundance"],
            Function::BiologicalProcess => &["bp", "biologicalProcess"],
            Function::Pathology => &["path", "o", "pathology"],
            Function::Reaction => &["rxn", "reaction"],
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.keywords().contains(&keyword))
    }

    /// Short form used when a term is displayed.
    pub fn short_name(self) -> &'static str {
        self.keywords()[0]
    }

    /// Abundances that can be wrapped by a modifier or listed as a complex member.
    pub fn is_simple_abundance(self) -> bool {
        matches!(
            self,
            Function::Abundance
                | Function::Gene
                | Function::Rna
                | Function::MiRna
                | Function::Protein
                | Function::Complex
        )
    }

    pub fn is_abundance(self) -> bool {
        self.is_simple_abundance() || self == Function::Composite
    }

    pub fn is_process(self) -> bool {
        matches!(self, Function::BiologicalProcess | Function::Pathology)
    }

    /// Functions that accept `var`, `pmod`, `gmod` and `frag` arguments or fusions.
    pub fn is_central_dogma(self) -> bool {
        matches!(
            self,
            Function::Gene | Function::Rna | Function::MiRna | Function::Protein
        )
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keywords = self.keywords();
        f.write_str(keywords[keywords.len() - 1])
    }
}

/// Whether a namespace encoding letter (`.belns` `[Values]` column) admits a function.
///
/// `G` gene, `R` RNA (and miRNA), `M` miRNA, `P` protein, `A` any simple
/// abundance, `B` biological process (and pathology), `O` pathology, `C` complex.
pub fn encoding_admits(letter: char, function: Function) -> bool {
    match letter {
        'G' => function == Function::Gene,
        'R' => matches!(function, Function::Rna | Function::MiRna),
        'M' => function == Function::MiRna,
        'P' => function == Function::Protein,
        'A' => function.is_simple_abundance(),
        'B' => function.is_process(),
        'O' => function == Function::Pathology,
        'C' => function == Function::Complex,
        _ => false,
    }
}

/// Encoding given to names of namespaces defined inline with `AS LIST`.
pub const ALL_ENCODINGS: &str = "ABCGMOPR";

// ============================================================================
// Modifier functions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierFunction {
    Activity,
    Translocation,
    CellSecretion,
    CellSurfaceExpression,
    Degradation,
}

impl ModifierFunction {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "act" | "activity" => Some(ModifierFunction::Activity),
            "tloc" | "translocation" => Some(ModifierFunction::Translocation),
            "sec" | "cellSecretion" => Some(ModifierFunction::CellSecretion),
            "surf" | "cellSurfaceExpression" => Some(ModifierFunction::CellSurfaceExpression),
            "deg" | "degradation" => Some(ModifierFunction::Degradation),
            _ => None,
        }
    }
}

/// Maps a BEL 1.0 activity function (`kin`, `kinaseActivity`, ...) or a bare
/// `ma()` argument to its default activity name.
pub fn default_activity(keyword: &str) -> Option<&'static str> {
    let label = match keyword {
        "cat" | "catalyticActivity" => "cat",
        "chap" | "chaperoneActivity" => "chap",
        "gtp" | "gtpBoundActivity" => "gtp",
        "kin" | "kinaseActivity" => "kin",
        "pep" | "peptidaseActivity" => "pep",
        "phos" | "phosphataseActivity" => "phos",
        "ribo" | "ribosylationActivity" => "ribo",
        "tscript" | "transcriptionalActivity" => "tscript",
        "tport" | "transportActivity" => "tport",
        "gef" | "guanineNucleotideExchangeFactorActivity" => "gef",
        "gap" | "gtpaseActivatingProteinActivity" => "gap",
        "molecularActivity" => "molecularActivity",
        _ => return None,
    };
    Some(label)
}

/// Legacy activity functions usable in place of `act(..., ma(..))`.
pub fn legacy_activity_function(keyword: &str) -> Option<&'static str> {
    match keyword {
        "molecularActivity" => None,
        other => default_activity(other),
    }
}

// ============================================================================
// Variants
// ============================================================================

/// Default protein modification names.
pub const PMOD_NAMES: &[&str] = &[
    "Ac", "ADPRib", "Farn", "Gerger", "Glyco", "Hy", "ISG", "Me", "Me1", "Me2", "Me3", "Myr",
    "Nedd", "NGlyco", "NO", "OGlyco", "Palm", "Ph", "Sulf", "Sumo", "Ub", "UbK48", "UbK63",
    "UbMono", "UbPoly",
];

/// Resolves a `pmod()` type argument written without a namespace, upgrading
/// BEL 1.0 single-letter codes.
pub fn default_pmod(name: &str) -> Option<&'static str> {
    let legacy = match name {
        "P" => Some("Ph"),
        "A" => Some("Ac"),
        "F" => Some("Farn"),
        "G" => Some("Glyco"),
        "H" => Some("Hy"),
        "M" => Some("Me"),
        "R" => Some("ADPRib"),
        "S" => Some("Sumo"),
        "U" => Some("Ub"),
        _ => None,
    };
    legacy.or_else(|| PMOD_NAMES.iter().copied().find(|n| *n == name))
}

/// Default gene modification names.
pub const GMOD_NAMES: &[&str] = &["Me", "ADPRib"];

pub fn default_gmod(name: &str) -> Option<&'static str> {
    match name {
        "M" => Some("Me"),
        other => GMOD_NAMES.iter().copied().find(|n| *n == other),
    }
}

const AMINO_ACIDS: &[(char, &str)] = &[
    ('A', "Ala"),
    ('R', "Arg"),
    ('N', "Asn"),
    ('D', "Asp"),
    ('C', "Cys"),
    ('E', "Glu"),
    ('Q', "Gln"),
    ('G', "Gly"),
    ('H', "His"),
    ('I', "Ile"),
    ('L', "Leu"),
    ('K', "Lys"),
    ('M', "Met"),
    ('F', "Phe"),
    ('P', "Pro"),
    ('S', "Ser"),
    ('T', "Thr"),
    ('W', "Trp"),
    ('Y', "Tyr"),
    ('V', "Val"),
    ('X', PLACEHOLDER_AMINO_ACID),
];

/// Normalises a one- or three-letter amino acid code to its three-letter form.
pub fn amino_acid(code: &str) -> Option<&'static str> {
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => AMINO_ACIDS
            .iter()
            .find(|(one, _)| *one == c)
            .map(|(_, three)| *three),
        _ => AMINO_ACIDS
            .iter()
            .find(|(_, three)| *three == code)
            .map(|(_, three)| *three),
    }
}

/// Whether the text names the nucleotide of a legacy gene substitution.
pub fn is_nucleotide(code: &str) -> bool {
    matches!(code, "A" | "C" | "G" | "T" | "U")
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    Increases,
    DirectlyIncreases,
    Decreases,
    DirectlyDecreases,
    RateLimitingStepOf,
    CausesNoChange,
    Regulates,
    NegativeCorrelation,
    PositiveCorrelation,
    Association,
    Orthologous,
    TranscribedTo,
    TranslatedTo,
    HasMember,
    HasMembers,
    HasComponent,
    HasComponents,
    IsA,
    SubProcessOf,
    AnalogousTo,
    BiomarkerFor,
    PrognosticBiomarkerFor,
    HasVariant,
    HasReactant,
    HasProduct,
    EquivalentTo,
    PartOf,
}

impl Relation {
    pub const ALL: [Relation; 27] = [
        Relation::Increases,
        Relation::DirectlyIncreases,
        Relation::Decreases,
        Relation::DirectlyDecreases,
        Relation::RateLimitingStepOf,
        Relation::CausesNoChange,
        Relation::Regulates,
        Relation::NegativeCorrelation,
        Relation::PositiveCorrelation,
        Relation::Association,
        Relation::Orthologous,
        Relation::TranscribedTo,
        Relation::TranslatedTo,
        Relation::HasMember,
        Relation::HasMembers,
        Relation::HasComponent,
        Relation::HasComponents,
        Relation::IsA,
        Relation::SubProcessOf,
        Relation::AnalogousTo,
        Relation::BiomarkerFor,
        Relation::PrognosticBiomarkerFor,
        Relation::HasVariant,
        Relation::HasReactant,
        Relation::HasProduct,
        Relation::EquivalentTo,
        Relation::PartOf,
    ];

    /// Canonical keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Increases => "increases",
            Relation::DirectlyIncreases => "directlyIncreases",
            Relation::Decreases => "decreases",
            Relation::DirectlyDecreases => "directlyDecreases",
            Relation::RateLimitingStepOf => "rateLimitingStepOf",
            Relation::CausesNoChange => "causesNoChange",
            Relation::Regulates => "regulates",
            Relation::NegativeCorrelation => "negativeCorrelation",
            Relation::PositiveCorrelation => "positiveCorrelation",
            Relation::Association => "association",
            Relation::Orthologous => "orthologous",
            Relation::TranscribedTo => "transcribedTo",
            Relation::TranslatedTo => "translatedTo",
            Relation::HasMember => "hasMember",
            Relation::HasMembers => "hasMembers",
            Relation::HasComponent => "hasComponent",
            Relation::HasComponents => "hasComponents",
            Relation::IsA => "isA",
            Relation::SubProcessOf => "subProcessOf",
            Relation::AnalogousTo => "analogousTo",
            Relation::BiomarkerFor => "biomarkerFor",
            Relation::PrognosticBiomarkerFor => "prognosticBiomarkerFor",
            Relation::HasVariant => "hasVariant",
            Relation::HasReactant => "hasReactant",
            Relation::HasProduct => "hasProduct",
            Relation::EquivalentTo => "equivalentTo",
            Relation::PartOf => "partOf",
        }
    }

    /// Keyword abbreviations accepted besides the canonical keyword.
    fn abbreviation(self) -> Option<&'static str> {
        match self {
            Relation::CausesNoChange => Some("cnc"),
            Relation::Regulates => Some("reg"),
            Relation::NegativeCorrelation => Some("neg"),
            Relation::PositiveCorrelation => Some("pos"),
            Relation::EquivalentTo => Some("eq"),
            _ => None,
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == keyword || r.abbreviation() == Some(keyword))
    }

    /// Symbolic spellings, longest first within each shared prefix.
    pub const SYMBOLS: [(&'static str, Relation); 9] = [
        ("->", Relation::Increases),
        ("→", Relation::Increases),
        ("=>", Relation::DirectlyIncreases),
        ("⇒", Relation::DirectlyIncreases),
        ("-|", Relation::Decreases),
        ("=|", Relation::DirectlyDecreases),
        ("--", Relation::Association),
        (":>", Relation::TranscribedTo),
        (">>", Relation::TranslatedTo),
    ];

    /// Relations whose edges are mirrored in the graph.
    pub fn is_two_way(self) -> bool {
        matches!(
            self,
            Relation::Association
                | Relation::PositiveCorrelation
                | Relation::NegativeCorrelation
                | Relation::Orthologous
                | Relation::AnalogousTo
                | Relation::EquivalentTo
        )
    }

    /// Structural relations that need no citation or evidence.
    pub fn is_unqualified(self) -> bool {
        matches!(
            self,
            Relation::HasMember
                | Relation::HasMembers
                | Relation::HasComponent
                | Relation::HasComponents
                | Relation::HasVariant
                | Relation::HasReactant
                | Relation::HasProduct
        )
    }

    /// Relations whose object is a `list(...)`.
    pub fn is_list(self) -> bool {
        matches!(self, Relation::HasMembers | Relation::HasComponents)
    }

    /// Single-member form of a list relation.
    pub fn list_member_relation(self) -> Option<Relation> {
        match self {
            Relation::HasMembers => Some(Relation::HasMember),
            Relation::HasComponents => Some(Relation::HasComponent),
            _ => None,
        }
    }

    /// Directed causal relations; the only ones allowed around a nested statement.
    pub fn is_causal(self) -> bool {
        matches!(
            self,
            Relation::Increases
                | Relation::DirectlyIncreases
                | Relation::Decreases
                | Relation::DirectlyDecreases
        )
    }

    /// Relations for which an edge from a node to itself is meaningful (autoregulation).
    pub fn allows_self_loop(self) -> bool {
        self.is_causal() || self == Relation::Regulates
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
