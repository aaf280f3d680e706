//! Finalization pipeline.
//!
//! Runs once, after every content module has registered, in a fixed order:
//!
//! 1. Negation stop words, now that the conflicting symbols are complete.
//! 2. [`remove_unused`]: drop unproductive symbols, report unreachable ones.
//! 3. Terminal normalization: one token per terminal.
//! 4. Edit-rule synthesis: insertions and transpositions.
//! 5. Optional ambiguity report.
//! 6. Canonical sort and serialization into a [`Grammar`].

pub mod ambiguity;
mod edit_rules;
mod normalize;
mod prune;
pub(crate) mod sort;

pub use ambiguity::{Ambiguity, find_ambiguities};
pub use edit_rules::{EditStats, InsertionCandidate, insertion_candidates};
pub use normalize::{EMPTY_SYMBOL, EMPTY_TERMINAL};
pub use prune::{UnusedPolicy, remove_unused};

use crate::config::BuildOptions;
use crate::error::GrammarError;
use crate::output::Grammar;
use crate::registry::GrammarBuilder;
use serde::Serialize;

/// Counts and findings of one finalization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub symbols: usize,
    pub rules: usize,
    pub semantics: usize,
    pub entity_categories: usize,
    /// Unreachable components removed under the quiet policy.
    pub unused: Vec<String>,
    pub normalized_terminals: usize,
    pub insertable_symbols: usize,
    pub insertions: usize,
    pub transpositions: usize,
    pub ambiguities: Vec<Ambiguity>,
    pub digest: String,
}

pub fn finalize(
    builder: &mut GrammarBuilder,
    options: &BuildOptions,
) -> Result<(Grammar, BuildReport), GrammarError> {
    crate::negation::fill_stop_words(builder)?;
    let unused = remove_unused(builder, options.unused_policy())?;
    let normalized_terminals = normalize::normalize_terminals(builder);
    let edits = edit_rules::synthesize(builder, options.include_trees);
    let ambiguities = if options.check_ambiguity {
        find_ambiguities(builder)
    } else {
        Vec::new()
    };
    let grammar = Grammar::from_builder(builder)?;

    let report = BuildReport {
        symbols: grammar.rule_sets.len(),
        rules: grammar.rule_count(),
        semantics: grammar.semantics.len(),
        entity_categories: grammar.entity_categories.len(),
        unused,
        normalized_terminals,
        insertable_symbols: edits.insertable_symbols,
        insertions: edits.insertions,
        transpositions: edits.transpositions,
        ambiguities,
        digest: grammar.digest.clone(),
    };
    tracing::info!(
        symbols = report.symbols,
        rules = report.rules,
        digest = %report.digest,
        "grammar finalized"
    );
    Ok((grammar, report))
}
