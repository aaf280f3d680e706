//! Unused-component check.
//!
//! Symbols without a complete expansion (unproductive) are dropped together
//! with every rule that references them. This is silent: content modules
//! leave attachment points empty on purpose. Components that are productive
//! but unreachable from the start symbol are reported, then removed.

use crate::error::GrammarError;
use crate::registry::GrammarBuilder;
use crate::rule::{EntityCategoryId, RuleKind, SymbolId};
use crate::semantic::SemanticId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to do with unreachable components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnusedPolicy {
    /// Fail the build.
    #[default]
    Deny,
    /// Log each component and remove it.
    Warn,
}

/// Remove unproductive and unreachable components. Returns the names of the
/// unreachable ones. Running it again on its own output removes nothing.
pub fn remove_unused(
    builder: &mut GrammarBuilder,
    policy: UnusedPolicy,
) -> Result<Vec<String>, GrammarError> {
    let productive = productive_symbols(builder);
    let start = builder.start();
    if !productive.contains(&start) {
        return Err(GrammarError::EmptyGrammar(
            builder.symbol_name(start).to_string(),
        ));
    }

    let reachable = reachable_symbols(builder, &productive);
    let mut used_semantics = BTreeSet::new();
    let mut used_categories = BTreeSet::new();
    for &id in &reachable {
        for rule in builder.rules(id) {
            if !rule_is_productive(&rule.kind, &productive) {
                continue;
            }
            if let Some(semantic) = &rule.semantic {
                semantic.collect_ids(&mut used_semantics);
            }
            if let RuleKind::Placeholder { category } = rule.kind {
                used_categories.insert(category);
            }
        }
    }

    let live = builder.live_symbols();
    let unreachable_symbols: Vec<SymbolId> = live
        .iter()
        .copied()
        .filter(|id| productive.contains(id) && !reachable.contains(id))
        .collect();
    let unused_semantics: Vec<SemanticId> = builder
        .live_semantics()
        .map(|(id, _)| id)
        .filter(|id| !used_semantics.contains(id))
        .collect();
    let unused_categories: Vec<EntityCategoryId> = builder
        .live_entity_categories()
        .map(|(id, _)| id)
        .filter(|id| !used_categories.contains(id))
        .collect();

    let mut unused: BTreeSet<String> = unreachable_symbols
        .iter()
        .map(|&id| builder.symbol_name(id).to_string())
        .collect();
    unused.extend(
        unused_semantics
            .iter()
            .map(|&id| builder.semantics().name(id).to_string()),
    );
    unused.extend(
        unused_categories
            .iter()
            .map(|&id| builder.entity_category_name(id)),
    );
    let unused: Vec<String> = unused.into_iter().collect();

    if !unused.is_empty() && policy == UnusedPolicy::Deny {
        return Err(GrammarError::UnusedComponents(unused));
    }

    let mut dropped = 0usize;
    for &id in &live {
        if !productive.contains(&id) {
            tracing::debug!(symbol = %builder.symbol_name(id), "unproductive symbol removed");
            builder.prune_symbol(id);
            continue;
        }
        let rules = builder.rules_mut(id);
        let before = rules.len();
        rules.retain(|rule| rule_is_productive(&rule.kind, &productive));
        dropped += before - rules.len();
    }
    for id in unreachable_symbols {
        builder.prune_symbol(id);
    }
    for id in unused_semantics {
        builder.prune_semantic(id);
    }
    for id in unused_categories {
        builder.prune_entity_category(id);
    }
    for name in &unused {
        tracing::warn!(component = %name, "unused grammar component removed");
    }
    if dropped > 0 {
        tracing::debug!(rules = dropped, "rules referencing unproductive symbols removed");
    }
    Ok(unused)
}

fn rule_is_productive(kind: &RuleKind, productive: &BTreeSet<SymbolId>) -> bool {
    kind.rhs_symbols().iter().all(|id| productive.contains(id))
}

/// Least fixpoint: a symbol is productive once one of its rules has only
/// productive symbols on the right (lexical and placeholder rules trivially).
fn productive_symbols(builder: &GrammarBuilder) -> BTreeSet<SymbolId> {
    let live = builder.live_symbols();
    let mut productive = BTreeSet::new();
    loop {
        let mut changed = false;
        for &id in &live {
            if productive.contains(&id) {
                continue;
            }
            if builder
                .rules(id)
                .iter()
                .any(|rule| rule_is_productive(&rule.kind, &productive))
            {
                productive.insert(id);
                changed = true;
            }
        }
        if !changed {
            return productive;
        }
    }
}

fn reachable_symbols(
    builder: &GrammarBuilder,
    productive: &BTreeSet<SymbolId>,
) -> BTreeSet<SymbolId> {
    let mut reachable = BTreeSet::new();
    let mut stack = vec![builder.start()];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        for rule in builder.rules(id) {
            if rule_is_productive(&rule.kind, productive) {
                stack.extend(rule.kind.rhs_symbols());
            }
        }
    }
    reachable
}
