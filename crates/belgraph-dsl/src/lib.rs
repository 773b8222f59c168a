//! BEL (Biological Expression Language) front end.
//!
//! This crate turns BEL document lines into validated statements:
//!
//! - [`source`]: comments, continuations and typography clean-up
//! - [`control`]: `SET` / `UNSET` / `DEFINE` lines and the state they maintain
//! - [`grammar`]: statement grammar and lowering into typed [`term`]s
//! - [`identifier`]: name resolution against [`definitions`]
//! - [`validate`]: function, relation and provenance rules
//! - [`parser`]: the line-level facade combining the above
//!
//! Building a graph out of the statements lives in `belgraph-graph`.

pub mod config;
pub mod control;
pub mod definitions;
pub mod digest;
pub mod errors;
pub mod grammar;
pub mod identifier;
pub mod language;
pub mod parser;
pub mod resource;
pub mod source;
pub mod term;
pub mod validate;

pub use config::ParserConfig;
pub use errors::{BelError, WarningRecord};
pub use grammar::{parse_statement, parse_term, Statement, Triple};
pub use language::{Function, Relation};
pub use parser::{BelParser, CompiledStatement, ParsedLine};
pub use resource::{DirectoryResources, InMemoryResources, ResourceLoader};
pub use term::{Concept, Modifier, Term, TermExpr};
