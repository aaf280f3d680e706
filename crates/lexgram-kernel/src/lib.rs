//! # Lexgram Kernel
//!
//! Build-time construction of a weighted, semantically annotated
//! context-free grammar for a natural-language query interface.
//!
//! Content modules register symbols, rules, semantics and entity
//! categories against one explicit [`BuildContext`]. Finalization then
//! prunes what the start symbol cannot use, normalizes terminals to single
//! tokens, synthesizes insertion and transposition edit rules, and writes a
//! deterministic, name-keyed [`Grammar`] document for the parser.
//!
//! ## Architecture
//!
//! ```text
//! SemanticRegistry      ← Functions and arguments, trees, deferred chains
//!     │
//! GrammarBuilder        ← Symbols, rules, entity categories (validated)
//!     │
//! Term sequences        ← Words, verbs, pronouns, phrases
//! Conjunctions, negation, categories
//!     │
//! BuildContext          ← What a ContentModule registers against
//!     │
//! finalize              ← prune → normalize → edit rules → sort
//!     │
//! Grammar               ← JSON document with a content digest
//! ```

pub mod build;
pub mod category;
pub mod config;
pub mod conjunction;
pub mod error;
pub mod finalize;
pub mod names;
pub mod negation;
pub mod output;
pub mod registry;
pub mod rule;
pub mod semantic;
pub mod term_sequence;
pub mod toy;

pub use build::{BuildContext, BuildFailure, Compilation, ContentModule, ModuleFailure, compile};
pub use category::{Category, CategoryFactory, CategorySpec};
pub use config::BuildOptions;
pub use conjunction::Conjunctions;
pub use error::GrammarError;
pub use finalize::{Ambiguity, BuildReport, UnusedPolicy, finalize, remove_unused};
pub use negation::{NegationRuleSet, NegationRuleSets};
pub use output::{Grammar, RhsRow, RuleRow, SemanticRow};
pub use registry::{GrammarBuilder, START_SYMBOL};
pub use rule::{Features, RuleSpec, SymbolId, TermText};
pub use semantic::{RuleSemantic, Semantic, SemanticId, SemanticTree};
pub use term_sequence::{AcceptedTerm, PronounSpec, TermSequenceSpec, VerbSpec};
