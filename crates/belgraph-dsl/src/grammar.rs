//! BEL statement grammar.
//!
//! Parsing happens in two passes:
//!
//! 1. a nom grammar reads the line into a generic tree of function
//!    applications ([`Call`]) whose leaves are identifiers (`ns:name`, bare
//!    words, quoted strings);
//! 2. lowering turns that tree into typed [`TermExpr`]s and a [`Statement`],
//!    upgrading BEL 1.0 spellings (`kin(...)`, `sub(...)`, `trunc(...)`,
//!    positional `tloc`, legacy fusions) on the way.
//!
//! Supported statement shapes:
//!
//! ```text
//! p(HGNC:AKT1)                                         singleton
//! p(HGNC:AKT1) -> act(p(HGNC:EGFR), ma(kin))           relation
//! p(HGNC:A) increases (p(HGNC:B) decreases p(HGNC:C))  nested
//! p(SFAM:X) hasMembers list(p(HGNC:A), p(HGNC:B))      list
//! p(HGNC:AKT1) labeled "AKT serine/threonine kinase 1" label
//! ```
//!
//! Names are not checked here; see `identifier` and `validate`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char as pchar, multispace0, multispace1},
    combinator::{all_consuming, map, opt},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::BelError;
use crate::language::{
    amino_acid, default_activity, default_gmod, default_pmod, is_nucleotide,
    legacy_activity_function, Function, ModifierFunction, Relation,
};
use crate::term::{
    Bound, Concept, FragmentRange, Fusion, FusionRange, Modifier, Term, TermExpr, Variant,
};

// ============================================================================
// Call tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Call(Call),
    Ident(Ident),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub function: String,
    pub args: Vec<Arg>,
    /// Length of the input remaining where the call starts, for error columns.
    tail_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Object {
    Term(Call),
    Nested(Call, Relation, Call),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tail {
    Label(String),
    Relation(Relation, Object),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SyntaxStatement {
    subject: Call,
    tail: Option<Tail>,
}

// ============================================================================
// Lexical parsers
// ============================================================================

/// A double-quoted string with `\"` and `\\` escapes.
pub fn quoted_string(input: &str) -> IResult<&str, String> {
    let (body, _) = pchar('"')(input)?;
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((&body[i + 1..], out)),
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => out.push(escaped),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(nom::Err::Error(Error::new(input, ErrorKind::Char)))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '*' | '?' | '\'' | '/' | '+')
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

fn namespace_keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn name(input: &str) -> IResult<&str, String> {
    alt((quoted_string, map(word, str::to_string)))(input)
}

fn identifier(input: &str) -> IResult<&str, Ident> {
    alt((
        map(
            tuple((namespace_keyword, pchar(':'), name)),
            |(namespace, _, name)| Ident {
                namespace: Some(namespace.to_string()),
                name,
            },
        ),
        map(name, |name| Ident {
            namespace: None,
            name,
        }),
    ))(input)
}

fn comma(input: &str) -> IResult<&str, ()> {
    map(tuple((multispace0, pchar(','), multispace0)), |_| ())(input)
}

fn arg(input: &str) -> IResult<&str, Arg> {
    alt((map(call, Arg::Call), map(identifier, Arg::Ident)))(input)
}

fn call(input: &str) -> IResult<&str, Call> {
    let tail_len = input.len();
    let (input, function) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = pchar('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, args) = separated_list0(comma, arg)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = pchar(')')(input)?;
    Ok((
        input,
        Call {
            function: function.to_string(),
            args,
            tail_len,
        },
    ))
}

fn relation(input: &str) -> IResult<&str, Relation> {
    for (symbol, relation) in Relation::SYMBOLS {
        if let Some(rest) = input.strip_prefix(symbol) {
            return Ok((rest, relation));
        }
    }
    let (rest, keyword) = take_while1(|c: char| c.is_ascii_alphabetic())(input)?;
    match Relation::from_keyword(keyword) {
        Some(relation) => Ok((rest, relation)),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::Tag))),
    }
}

fn nested_object(input: &str) -> IResult<&str, Object> {
    let (input, _) = pchar('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, subject) = call(input)?;
    let (input, _) = multispace0(input)?;
    let (input, inner) = relation(input)?;
    let (input, _) = multispace0(input)?;
    let (input, object) = call(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = pchar(')')(input)?;
    Ok((input, Object::Nested(subject, inner, object)))
}

fn label_tail(input: &str) -> IResult<&str, Tail> {
    map(
        preceded(tuple((tag("labeled"), multispace1)), quoted_string),
        Tail::Label,
    )(input)
}

fn relation_tail(input: &str) -> IResult<&str, Tail> {
    let (input, relation) = relation(input)?;
    let (input, _) = multispace0(input)?;
    let (input, object) = alt((nested_object, map(call, Object::Term)))(input)?;
    Ok((input, Tail::Relation(relation, object)))
}

fn statement_syntax(input: &str) -> IResult<&str, SyntaxStatement> {
    let (input, _) = multispace0(input)?;
    let (input, subject) = call(input)?;
    let (input, tail) = opt(preceded(multispace0, alt((label_tail, relation_tail))))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, SyntaxStatement { subject, tail }))
}

// ============================================================================
// Typed statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: TermExpr,
    pub relation: Relation,
    pub object: TermExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Statement {
    /// A term on its own line: adds the node only.
    Term { term: TermExpr },
    Relation(Triple),
    /// `subject relation (inner)`
    Nested {
        subject: TermExpr,
        relation: Relation,
        inner: Box<Triple>,
    },
    /// `subject hasMembers list(...)` / `subject hasComponents list(...)`
    List {
        subject: TermExpr,
        relation: Relation,
        members: Vec<TermExpr>,
    },
    Label { subject: TermExpr, label: String },
}

impl Statement {
    /// Every term expression in the statement, left to right.
    pub fn term_exprs(&self) -> Vec<&TermExpr> {
        match self {
            Statement::Term { term } => vec![term],
            Statement::Relation(triple) => vec![&triple.subject, &triple.object],
            Statement::Nested { subject, inner, .. } => {
                vec![subject, &inner.subject, &inner.object]
            }
            Statement::List {
                subject, members, ..
            } => std::iter::once(subject).chain(members).collect(),
            Statement::Label { subject, .. } => vec![subject],
        }
    }

    pub fn subject(&self) -> &TermExpr {
        match self {
            Statement::Term { term } => term,
            Statement::Relation(triple) => &triple.subject,
            Statement::Nested { subject, .. }
            | Statement::List { subject, .. }
            | Statement::Label { subject, .. } => subject,
        }
    }

    /// The outermost relation, if the statement has one.
    pub fn relation(&self) -> Option<Relation> {
        match self {
            Statement::Relation(triple) => Some(triple.relation),
            Statement::Nested { relation, .. } | Statement::List { relation, .. } => {
                Some(*relation)
            }
            Statement::Term { .. } | Statement::Label { .. } => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Term { term } => write!(f, "{term}"),
            Statement::Relation(t) => write!(f, "{} {} {}", t.subject, t.relation, t.object),
            Statement::Nested {
                subject,
                relation,
                inner,
            } => write!(
                f,
                "{subject} {relation} ({} {} {})",
                inner.subject, inner.relation, inner.object
            ),
            Statement::List {
                subject,
                relation,
                members,
            } => {
                write!(f, "{subject} {relation} list(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
            Statement::Label { subject, label } => write!(f, "{subject} labeled \"{label}\""),
        }
    }
}

// ============================================================================
// Lowering
// ============================================================================

#[derive(Debug)]
struct LowerError {
    tail_len: usize,
    message: String,
}

fn fail<T>(call: &Call, message: impl Into<String>) -> Result<T, LowerError> {
    Err(LowerError {
        tail_len: call.tail_len,
        message: message.into(),
    })
}

fn expect_ident<'c>(call: &'c Call, arg: &'c Arg, what: &str) -> Result<&'c Ident, LowerError> {
    match arg {
        Arg::Ident(ident) => Ok(ident),
        Arg::Call(inner) => fail(
            inner,
            format!("expected {what} in {}(), found {}()", call.function, inner.function),
        ),
    }
}

fn expect_call<'c>(call: &'c Call, arg: &'c Arg, what: &str) -> Result<&'c Call, LowerError> {
    match arg {
        Arg::Call(inner) => Ok(inner),
        Arg::Ident(ident) => fail(
            call,
            format!("expected {what} in {}(), found `{}`", call.function, ident.name),
        ),
    }
}

/// A bare word or string with no namespace prefix.
fn literal<'c>(call: &'c Call, arg: &'c Arg, what: &str) -> Result<&'c str, LowerError> {
    let ident = expect_ident(call, arg, what)?;
    if ident.namespace.is_some() {
        return fail(call, format!("{what} in {}() takes no namespace", call.function));
    }
    Ok(&ident.name)
}

fn position(call: &Call, arg: &Arg) -> Result<u32, LowerError> {
    let text = literal(call, arg, "a position")?;
    text.parse::<u32>()
        .or_else(|_| fail(call, format!("`{text}` is not a position")))
}

fn concept(ident: &Ident) -> Concept {
    Concept {
        namespace: ident.namespace.clone(),
        name: ident.name.clone(),
    }
}

/// A concept that may be written as a bare default-vocabulary name.
fn defaulted_concept(ident: &Ident, default: impl Fn(&str) -> Option<&'static str>) -> Concept {
    match (&ident.namespace, default(&ident.name)) {
        (None, Some(name)) => Concept::bel_default(name),
        _ => concept(ident),
    }
}

fn arity(call: &Call, expected: &[usize]) -> Result<(), LowerError> {
    if expected.contains(&call.args.len()) {
        return Ok(());
    }
    let expected: Vec<String> = expected.iter().map(usize::to_string).collect();
    fail(
        call,
        format!(
            "{}() takes {} argument(s), got {}",
            call.function,
            expected.join(" or "),
            call.args.len()
        ),
    )
}

fn is_named(call: &Call, names: &[&str]) -> bool {
    names.contains(&call.function.as_str())
}

const LOCATION: &[&str] = &["loc", "location"];
const FUSION: &[&str] = &["fus", "fusion"];
const LIST: &[&str] = &["list"];

fn lower_location(call: &Call) -> Result<Concept, LowerError> {
    arity(call, &[1])?;
    Ok(concept(expect_ident(call, &call.args[0], "a location")?))
}

/// Splits a trailing `loc(...)` off the arguments.
fn split_location(call: &Call) -> Result<(Vec<&Arg>, Option<Concept>), LowerError> {
    let mut args: Vec<&Arg> = call.args.iter().collect();
    let location = match args.last() {
        Some(Arg::Call(inner)) if is_named(inner, LOCATION) => Some(lower_location(inner)?),
        _ => None,
    };
    if location.is_some() {
        args.pop();
    }
    if let Some(Arg::Call(inner)) = args.iter().find(|a| matches!(a, Arg::Call(c) if is_named(c, LOCATION))) {
        return fail(inner, "loc() must be the last argument");
    }
    Ok((args, location))
}

fn parse_bound(text: &str, allow_star: bool) -> Option<Bound> {
    match text {
        "" | "?" => Some(Bound::Unknown),
        "*" if allow_star => Some(Bound::Unknown),
        digits => digits.parse::<u32>().ok().map(Bound::Position),
    }
}

/// `"r.1_79"`, `"p.?_1875"`, `"?"`.
pub fn parse_fusion_range(text: &str) -> Option<FusionRange> {
    if text == "?" {
        return Some(FusionRange::Missing);
    }
    let (reference, range) = text.split_once('.')?;
    let mut reference_chars = reference.chars();
    let reference = match (reference_chars.next(), reference_chars.next()) {
        (Some(c @ ('p' | 'c' | 'r' | 'g' | 'm' | 'n')), None) => c,
        _ => return None,
    };
    let (start, stop) = range.split_once('_')?;
    Some(FusionRange::Enumerated {
        reference,
        start: parse_bound(start, false)?,
        stop: parse_bound(stop, false)?,
    })
}

/// `"5_20"`, `"?_*"`, `"?"`.
pub fn parse_fragment_range(text: &str) -> Option<FragmentRange> {
    if text == "?" {
        return Some(FragmentRange::Missing);
    }
    let (start, stop) = text.split_once('_')?;
    Some(FragmentRange::Known {
        start: parse_bound(start, false)?,
        stop: parse_bound(stop, true)?,
    })
}

fn lower_fusion(call: &Call) -> Result<Fusion, LowerError> {
    arity(call, &[4])?;
    let range = |arg: &Arg| -> Result<FusionRange, LowerError> {
        let text = literal(call, arg, "a fusion range")?;
        parse_fusion_range(text)
            .map_or_else(|| fail(call, format!("malformed fusion range `{text}`")), Ok)
    };
    Ok(Fusion {
        partner_5p: concept(expect_ident(call, &call.args[0], "a 5' partner")?),
        range_5p: range(&call.args[1])?,
        partner_3p: concept(expect_ident(call, &call.args[2], "a 3' partner")?),
        range_3p: range(&call.args[3])?,
    })
}

/// `p(HGNC:BCR, fus(HGNC:JAK2, 1875, 2626))`: the 5' partner ends at the first
/// position and the 3' partner starts at the second.
fn lower_legacy_fusion(
    function: Function,
    partner_5p: Concept,
    call: &Call,
) -> Result<Fusion, LowerError> {
    arity(call, &[1, 3])?;
    let partner_3p = concept(expect_ident(call, &call.args[0], "a 3' partner")?);
    let reference = match function {
        Function::Gene => 'c',
        Function::Protein => 'p',
        _ => 'r',
    };
    let (range_5p, range_3p) = if call.args.len() == 3 {
        let bound = |arg: &Arg| -> Result<Bound, LowerError> {
            let text = literal(call, arg, "a breakpoint")?;
            parse_bound(text, false).map_or_else(|| fail(call, format!("`{text}` is not a breakpoint")), Ok)
        };
        (
            FusionRange::Enumerated {
                reference,
                start: Bound::Unknown,
                stop: bound(&call.args[1])?,
            },
            FusionRange::Enumerated {
                reference,
                start: bound(&call.args[2])?,
                stop: Bound::Unknown,
            },
        )
    } else {
        (FusionRange::Missing, FusionRange::Missing)
    };
    Ok(Fusion {
        partner_5p,
        range_5p,
        partner_3p,
        range_3p,
    })
}

fn amino_acid_arg(call: &Call, arg: &Arg) -> Result<&'static str, LowerError> {
    let code = literal(call, arg, "an amino acid")?;
    amino_acid(code).map_or_else(|| fail(call, format!("unknown amino acid `{code}`")), Ok)
}

fn nucleotide_arg<'c>(call: &'c Call, arg: &'c Arg) -> Result<&'c str, LowerError> {
    let code = literal(call, arg, "a nucleotide")?;
    if is_nucleotide(code) {
        Ok(code)
    } else {
        fail(call, format!("unknown nucleotide `{code}`"))
    }
}

fn lower_variant(function: Function, call: &Call) -> Result<Variant, LowerError> {
    let only = |allowed: &[Function]| -> Result<(), LowerError> {
        if allowed.contains(&function) {
            Ok(())
        } else {
            fail(
                call,
                format!("{}() is not allowed in {}()", call.function, function.short_name()),
            )
        }
    };
    match call.function.as_str() {
        "var" | "variant" => {
            arity(call, &[1])?;
            let text = literal(call, &call.args[0], "an HGVS string")?;
            Ok(Variant::hgvs(text))
        }
        "pmod" | "proteinModification" => {
            only(&[Function::Protein])?;
            arity(call, &[1, 2, 3])?;
            let ident = expect_ident(call, &call.args[0], "a modification")?;
            let code = match call.args.get(1) {
                Some(arg) => Some(amino_acid_arg(call, arg)?.to_string()),
                None => None,
            };
            let position = match call.args.get(2) {
                Some(arg) => Some(position(call, arg)?),
                None => None,
            };
            Ok(Variant::ProteinModification {
                concept: defaulted_concept(ident, default_pmod),
                code,
                position,
            })
        }
        "gmod" | "geneModification" => {
            only(&[Function::Gene])?;
            arity(call, &[1])?;
            let ident = expect_ident(call, &call.args[0], "a modification")?;
            Ok(Variant::GeneModification {
                concept: defaulted_concept(ident, default_gmod),
            })
        }
        "frag" | "fragment" => {
            only(&[Function::Protein])?;
            arity(call, &[1, 2])?;
            let text = literal(call, &call.args[0], "a fragment range")?;
            let range = parse_fragment_range(text)
                .map_or_else(|| fail(call, format!("malformed fragment range `{text}`")), Ok)?;
            let description = match call.args.get(1) {
                Some(arg) => Some(literal(call, arg, "a description")?.to_string()),
                None => None,
            };
            Ok(Variant::Fragment { range, description })
        }
        "sub" | "substitution" => {
            arity(call, &[3])?;
            match function {
                Function::Protein => {
                    let reference = amino_acid_arg(call, &call.args[0])?;
                    let at = position(call, &call.args[1])?;
                    let variant = amino_acid_arg(call, &call.args[2])?;
                    Ok(Variant::hgvs(format!("p.{reference}{at}{variant}")))
                }
                Function::Gene => {
                    let reference = nucleotide_arg(call, &call.args[0])?;
                    let at = position(call, &call.args[1])?;
                    let variant = nucleotide_arg(call, &call.args[2])?;
                    Ok(Variant::hgvs(format!("c.{at}{reference}>{variant}")))
                }
                _ => fail(
                    call,
                    format!("{}() is not allowed in {}()", call.function, function.short_name()),
                ),
            }
        }
        "trunc" | "truncation" => {
            only(&[Function::Protein])?;
            arity(call, &[1])?;
            let at = position(call, &call.args[0])?;
            Ok(Variant::hgvs(format!("p.{at}*")))
        }
        other => fail(call, format!("unknown variant `{other}()`")),
    }
}

fn lower_central_dogma(function: Function, call: &Call, args: &[&Arg]) -> Result<Term, LowerError> {
    let Some((first, rest)) = args.split_first() else {
        return fail(call, format!("{}() needs a name or a fusion", call.function));
    };
    let entity = match first {
        Arg::Call(inner) if is_named(inner, FUSION) => {
            if !rest.is_empty() {
                return fail(call, "a fusion cannot carry variants");
            }
            let fusion = lower_fusion(inner)?;
            return Term::fusion(function, fusion)
                .map_or_else(|| fail(call, "fusions need a gene, RNA or protein"), Ok);
        }
        Arg::Call(inner) => {
            return fail(inner, format!("expected a name, found {}()", inner.function));
        }
        Arg::Ident(ident) => concept(ident),
    };
    if let [Arg::Call(inner)] = rest {
        if is_named(inner, FUSION) {
            let fusion = lower_legacy_fusion(function, entity, inner)?;
            return Term::fusion(function, fusion)
                .map_or_else(|| fail(call, "fusions need a gene, RNA or protein"), Ok);
        }
    }
    let mut variants = Vec::with_capacity(rest.len());
    for arg in rest {
        let inner = expect_call(call, arg, "a variant")?;
        variants.push(lower_variant(function, inner)?);
    }
    Term::with_variants(function, entity, variants)
        .map_or_else(|| fail(call, "variants need a gene, RNA or protein"), Ok)
}

/// Lowers a complex/composite member or reaction participant.
fn lower_member(call: &Call, arg: &Arg) -> Result<Term, LowerError> {
    let inner = expect_call(call, arg, "a term")?;
    let expr = lower_expr(inner)?;
    if expr.modifier.is_some() {
        return fail(inner, format!("{}() cannot contain a modified term", call.function));
    }
    Ok(expr.term)
}

fn lower_members(call: &Call, args: &[&Arg]) -> Result<Vec<Term>, LowerError> {
    args.iter().map(|arg| lower_member(call, arg)).collect()
}

fn lower_function(function: Function, call: &Call) -> Result<TermExpr, LowerError> {
    let (args, location) = split_location(call)?;
    if location.is_some() && matches!(function, Function::BiologicalProcess | Function::Pathology | Function::Reaction) {
        return fail(call, format!("{}() cannot carry a location", call.function));
    }
    let term = match function {
        Function::Abundance | Function::BiologicalProcess | Function::Pathology => {
            let [only] = args.as_slice() else {
                return fail(call, format!("{}() takes exactly one name", call.function));
            };
            let concept = concept(expect_ident(call, only, "a name")?);
            Term::named(function, concept)
                .map_or_else(|| fail(call, "function cannot be named"), Ok)?
        }
        Function::Gene | Function::Rna | Function::MiRna | Function::Protein => {
            lower_central_dogma(function, call, &args)?
        }
        Function::Complex => match args.as_slice() {
            [] => return fail(call, "complex() needs a name or members"),
            [Arg::Ident(ident)] => Term::named(function, concept(ident))
                .map_or_else(|| fail(call, "function cannot be named"), Ok)?,
            members => Term::complex_of(lower_members(call, members)?),
        },
        Function::Composite => {
            if args.is_empty() {
                return fail(call, "composite() needs members");
            }
            Term::composite_of(lower_members(call, &args)?)
        }
        Function::Reaction => {
            let [reactants, products] = args.as_slice() else {
                return fail(call, "rxn() takes reactants(...) and products(...)");
            };
            let reactants = expect_call(call, reactants, "reactants(...)")?;
            let products = expect_call(call, products, "products(...)")?;
            if reactants.function != "reactants" || products.function != "products" {
                return fail(call, "rxn() takes reactants(...) and products(...)");
            }
            let reactant_args: Vec<&Arg> = reactants.args.iter().collect();
            let product_args: Vec<&Arg> = products.args.iter().collect();
            Term::reaction(
                lower_members(reactants, &reactant_args)?,
                lower_members(products, &product_args)?,
            )
        }
    };
    Ok(TermExpr {
        term,
        location,
        modifier: None,
    })
}

/// The single wrapped term of a modifier function.
fn lower_target(call: &Call) -> Result<TermExpr, LowerError> {
    let Some(first) = call.args.first() else {
        return fail(call, format!("{}() needs a term", call.function));
    };
    let inner = expect_call(call, first, "a term")?;
    let target = lower_expr(inner)?;
    if target.modifier.is_some() {
        return fail(inner, "modifiers cannot be nested");
    }
    Ok(target)
}

fn lower_translocation(call: &Call) -> Result<Modifier, LowerError> {
    arity(call, &[1, 3])?;
    if call.args.len() == 1 {
        return Ok(Modifier::Translocation {
            from_loc: None,
            to_loc: None,
        });
    }
    let (from, to) = (&call.args[1], &call.args[2]);
    let (from_loc, to_loc) = match (from, to) {
        (Arg::Call(from), Arg::Call(to))
            if from.function == "fromLoc" && to.function == "toLoc" =>
        {
            arity(from, &[1])?;
            arity(to, &[1])?;
            (
                concept(expect_ident(from, &from.args[0], "a location")?),
                concept(expect_ident(to, &to.args[0], "a location")?),
            )
        }
        (Arg::Ident(from), Arg::Ident(to)) => (concept(from), concept(to)),
        _ => return fail(call, "tloc() takes fromLoc(...) and toLoc(...)"),
    };
    Ok(Modifier::Translocation {
        from_loc: Some(from_loc),
        to_loc: Some(to_loc),
    })
}

fn lower_modifier(kind: ModifierFunction, call: &Call) -> Result<TermExpr, LowerError> {
    let mut target = lower_target(call)?;
    let modifier = match kind {
        ModifierFunction::Activity => {
            arity(call, &[1, 2])?;
            let effect = match call.args.get(1) {
                None => None,
                Some(arg) => {
                    let ma = expect_call(call, arg, "ma(...)")?;
                    if !is_named(ma, &["ma", "molecularActivity"]) {
                        return fail(ma, format!("expected ma(...), found {}()", ma.function));
                    }
                    arity(ma, &[1])?;
                    let ident = expect_ident(ma, &ma.args[0], "an activity")?;
                    Some(defaulted_concept(ident, default_activity))
                }
            };
            Modifier::Activity { effect }
        }
        ModifierFunction::Translocation => lower_translocation(call)?,
        ModifierFunction::CellSecretion => {
            arity(call, &[1])?;
            Modifier::cell_secretion()
        }
        ModifierFunction::CellSurfaceExpression => {
            arity(call, &[1])?;
            Modifier::cell_surface_expression()
        }
        ModifierFunction::Degradation => {
            arity(call, &[1])?;
            Modifier::Degradation
        }
    };
    target.modifier = Some(modifier);
    Ok(target)
}

fn lower_expr(call: &Call) -> Result<TermExpr, LowerError> {
    if let Some(function) = Function::from_keyword(&call.function) {
        return lower_function(function, call);
    }
    if let Some(kind) = ModifierFunction::from_keyword(&call.function) {
        return lower_modifier(kind, call);
    }
    if let Some(activity) = legacy_activity_function(&call.function) {
        arity(call, &[1])?;
        let mut target = lower_target(call)?;
        target.modifier = Some(Modifier::Activity {
            effect: Some(Concept::bel_default(activity)),
        });
        return Ok(target);
    }
    fail(call, format!("unknown function `{}()`", call.function))
}

fn lower_statement(syntax: &SyntaxStatement) -> Result<Statement, LowerError> {
    let subject = lower_expr(&syntax.subject)?;
    let (relation, object) = match &syntax.tail {
        None => return Ok(Statement::Term { term: subject }),
        Some(Tail::Label(label)) => {
            return Ok(Statement::Label {
                subject,
                label: label.clone(),
            })
        }
        Some(Tail::Relation(relation, object)) => (*relation, object),
    };
    match object {
        Object::Term(call) if relation.is_list() => {
            if !is_named(call, LIST) {
                return fail(call, format!("{relation} takes list(...)"));
            }
            let members = call
                .args
                .iter()
                .map(|arg| expect_call(call, arg, "a term").and_then(lower_expr))
                .collect::<Result<Vec<_>, _>>()?;
            if members.is_empty() {
                return fail(call, "list() needs members");
            }
            Ok(Statement::List {
                subject,
                relation,
                members,
            })
        }
        Object::Term(call) => {
            if is_named(call, LIST) {
                return fail(call, format!("list() cannot follow {relation}"));
            }
            Ok(Statement::Relation(Triple {
                subject,
                relation,
                object: lower_expr(call)?,
            }))
        }
        Object::Nested(inner_subject, inner_relation, inner_object) => {
            if !relation.is_causal() || !inner_relation.is_causal() {
                return fail(
                    inner_subject,
                    "nested statements only use increases/decreases relations",
                );
            }
            Ok(Statement::Nested {
                subject,
                relation,
                inner: Box::new(Triple {
                    subject: lower_expr(inner_subject)?,
                    relation: *inner_relation,
                    object: lower_expr(inner_object)?,
                }),
            })
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

fn nom_error(text: &str, err: nom::Err<Error<&str>>) -> BelError {
    let rest = match &err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
        nom::Err::Incomplete(_) => "",
    };
    let column = text.len() - rest.len() + 1;
    let snippet: String = rest.chars().take(24).collect();
    if snippet.is_empty() {
        BelError::syntax(column, "unexpected end of statement")
    } else {
        BelError::syntax(column, format!("unexpected input `{snippet}`"))
    }
}

/// Parses one BEL statement line.
pub fn parse_statement(line: &str) -> Result<Statement, BelError> {
    let text = line.trim_end();
    let (_, syntax) = all_consuming(statement_syntax)(text).map_err(|err| nom_error(text, err))?;
    lower_statement(&syntax)
        .map_err(|err| BelError::syntax(text.len() - err.tail_len + 1, err.message))
}

/// Parses a single term expression such as `act(p(HGNC:AKT1), ma(kin))`.
pub fn parse_term(text: &str) -> Result<TermExpr, BelError> {
    let text = text.trim();
    let (_, call) = all_consuming(call)(text).map_err(|err| nom_error(text, err))?;
    lower_expr(&call).map_err(|err| BelError::syntax(text.len() - err.tail_len + 1, err.message))
}
