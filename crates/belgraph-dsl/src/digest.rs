//! Stable digests for terms and edges.
//!
//! - algorithm: **FNV-1a 64-bit**
//! - terms: the UTF-8 bytes of the canonical BEL rendering
//! - edges: source digest, target digest and the canonical JSON of the edge
//!   data, each field tagged and terminated
//!
//! Digests are identities, not security primitives. Two spellings of the same
//! term (`p(HGNC:AKT1, pmod(P, S, 473))` and `p(HGNC:AKT1, pmod(Ph, Ser, 473))`)
//! lower to equal terms and therefore share a digest.

use crate::term::Term;

/// Prefix used in serialized term digests.
pub const TERM_DIGEST_PREFIX: &str = "fnv1a64:";

/// Prefix used in serialized edge keys.
pub const EDGE_KEY_PREFIX: &str = "edgefnv1a64:";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;

fn add(hash: &mut u64, s: &str) {
    for b in s.as_bytes() {
        *hash ^= (*b) as u64;
        *hash = hash.wrapping_mul(FNV_PRIME);
    }
}

/// FNV-1a 64-bit over arbitrary text, as `"fnv1a64:<hex>"`.
pub fn fnv1a64_digest(text: &str) -> String {
    let mut hash = FNV_OFFSET_BASIS;
    add(&mut hash, text);
    format!("{TERM_DIGEST_PREFIX}{hash:016x}")
}

pub fn term_digest(term: &Term) -> String {
    fnv1a64_digest(&term.to_string())
}

/// Key identifying an edge among the parallel edges between two nodes.
///
/// `data_json` must be a canonical encoding (stable field order) of everything
/// that distinguishes one edge from another.
pub fn edge_key(source: &str, target: &str, data_json: &str) -> String {
    let mut hash = FNV_OFFSET_BASIS;
    add(&mut hash, "source=");
    add(&mut hash, source);
    add(&mut hash, "|target=");
    add(&mut hash, target);
    add(&mut hash, "|data=");
    add(&mut hash, data_json);
    add(&mut hash, ";");
    format!("{EDGE_KEY_PREFIX}{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_term;

    #[test]
    fn digest_has_expected_prefix_and_width() {
        let d = term_digest(&Term::protein("HGNC", "AKT1"));
        assert!(d.starts_with(TERM_DIGEST_PREFIX));
        assert_eq!(d.len(), TERM_DIGEST_PREFIX.len() + 16);
    }

    #[test]
    fn known_vector() {
        // FNV-1a 64 of the empty string is the offset basis.
        assert_eq!(fnv1a64_digest(""), "fnv1a64:cbf29ce484222325");
    }

    #[test]
    fn equivalent_spellings_share_a_digest() {
        let legacy = parse_term("p(HGNC:AKT1, pmod(P, S, 473))").expect("legacy");
        let modern = parse_term("p(HGNC:AKT1, pmod(Ph, Ser, 473))").expect("modern");
        assert_eq!(term_digest(&legacy.term), term_digest(&modern.term));
    }

    #[test]
    fn default_namespace_and_naked_names_differ() {
        let naked = parse_term("p(AKT1)").expect("naked");
        let bel = parse_term("p(bel:AKT1)").expect("bel");
        assert_ne!(naked.term, bel.term);
        assert_ne!(term_digest(&naked.term), term_digest(&bel.term));

        let plain = parse_term(r#"p(HGNC:AKT1, var("p.Ala127Tyr"))"#).expect("plain");
        let quoted = parse_term(r#"p(HGNC:AKT1, var("p.Ala127\"Tyr"))"#).expect("quoted");
        assert_ne!(term_digest(&plain.term), term_digest(&quoted.term));
    }

    #[test]
    fn edge_key_changes_with_any_field() {
        let a = edge_key("s", "t", "{}");
        assert!(a.starts_with(EDGE_KEY_PREFIX));
        assert_ne!(a, edge_key("t", "s", "{}"));
        assert_ne!(a, edge_key("s", "t", "{\"relation\":\"increases\"}"));
    }
}
