//! Edit-rule synthesis.
//!
//! First the cheapest insertion of every insertable symbol is computed to a
//! fixed point. A symbol is insertable through a lexical rule with an
//! insertion cost, a unary rule over an insertable symbol, or a binary rule
//! over two insertable symbols with no excluded position. Then every binary
//! rule `S -> A B` gains `S -> B` (A inserted before) and `S -> A` (B
//! inserted after) where allowed, and its transposition `S -> B A` if it has
//! a transposition cost.

use crate::error::GrammarError;
use crate::registry::GrammarBuilder;
use crate::rule::{
    Edit, InsertPosition, Insertion, InsertionTree, Rule, RuleKind, SymbolId, TermText,
    TextSegment,
};
use crate::semantic::{RuleSemantic, SemanticRegistry, SemanticTree};
use std::collections::{BTreeMap, BTreeSet};

/// The cheapest way to produce a symbol without matching input.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionCandidate {
    pub cost: f64,
    pub text: Vec<TextSegment>,
    pub semantic: Option<SemanticTree>,
    pub tree: InsertionTree,
    size: usize,
    key: String,
}

impl InsertionCandidate {
    /// Lower cost wins; ties go to the smaller derivation, then the
    /// lexicographically smaller rendering.
    fn better_than(&self, other: &Self) -> bool {
        self.cost < other.cost
            || (self.cost == other.cost && (self.size, &self.key) < (other.size, &other.key))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditStats {
    pub insertable_symbols: usize,
    pub insertions: usize,
    pub transpositions: usize,
}

pub(crate) fn synthesize(builder: &mut GrammarBuilder, include_trees: bool) -> EditStats {
    let candidates = insertion_candidates(builder);
    let mut stats = EditStats {
        insertable_symbols: candidates.len(),
        ..EditStats::default()
    };

    for id in builder.live_symbols() {
        let binaries: Vec<Rule> = builder
            .rules(id)
            .iter()
            .filter(|rule| !rule.is_edit() && matches!(rule.kind, RuleKind::Binary { .. }))
            .cloned()
            .collect();
        for rule in binaries {
            let RuleKind::Binary {
                rhs,
                transposition_cost,
                no_insertion_indexes,
            } = &rule.kind
            else {
                continue;
            };

            for (index, position) in [(0, InsertPosition::Before), (1, InsertPosition::After)] {
                if no_insertion_indexes.contains(&index) {
                    continue;
                }
                let Some(candidate) = candidates.get(&rhs[index]) else {
                    continue;
                };
                let kept = rhs[1 - index];
                if kept == id {
                    continue;
                }
                let insertion = Rule {
                    kind: RuleKind::Nonterminal {
                        rhs: kept,
                        no_insertion: false,
                    },
                    semantic: rule.semantic.clone(),
                    features: rule.features,
                    insertion_cost: None,
                    edit: Some(Edit::Insertion(Insertion {
                        cost: candidate.cost,
                        position,
                        text: candidate.text.clone(),
                        semantic: candidate.semantic.clone(),
                        tree: include_trees.then(|| candidate.tree.clone()),
                    })),
                };
                if builder.push_rule(id, insertion) {
                    stats.insertions += 1;
                }
            }

            if let Some(cost) = *transposition_cost {
                let swapped = Rule {
                    kind: RuleKind::Binary {
                        rhs: [rhs[1], rhs[0]],
                        transposition_cost: None,
                        no_insertion_indexes: no_insertion_indexes.iter().map(|i| 1 - i).collect(),
                    },
                    semantic: rule.semantic.clone(),
                    features: rule.features,
                    insertion_cost: None,
                    edit: Some(Edit::Transposition { cost }),
                };
                if builder.push_rule(id, swapped) {
                    stats.transpositions += 1;
                }
            }
        }
    }

    tracing::info!(
        insertable = stats.insertable_symbols,
        insertions = stats.insertions,
        transpositions = stats.transpositions,
        "edit rules synthesized"
    );
    stats
}

/// Cheapest insertion per insertable symbol.
pub fn insertion_candidates(builder: &GrammarBuilder) -> BTreeMap<SymbolId, InsertionCandidate> {
    let live = builder.live_symbols();
    let mut best: BTreeMap<SymbolId, InsertionCandidate> = BTreeMap::new();
    // An optimal derivation never repeats a symbol along a path, so its
    // height is bounded by the symbol count.
    for _ in 0..=live.len() {
        let mut changed = false;
        for &id in &live {
            for rule in builder.rules(id) {
                if rule.is_edit() {
                    continue;
                }
                let Some(candidate) = candidate_for(builder, id, rule, &best) else {
                    continue;
                };
                if best
                    .get(&id)
                    .is_none_or(|current| candidate.better_than(current))
                {
                    best.insert(id, candidate);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    best
}

fn candidate_for(
    builder: &GrammarBuilder,
    id: SymbolId,
    rule: &Rule,
    best: &BTreeMap<SymbolId, InsertionCandidate>,
) -> Option<InsertionCandidate> {
    let semantics = builder.semantics();
    let name = builder.symbol_name(id).to_string();
    match &rule.kind {
        RuleKind::Terminal { term, text } => {
            let cost = rule.insertion_cost?;
            let text = segments(text, || vec![TextSegment::Literal(term.clone())]);
            let semantic = semantic_over(semantics, rule.semantic.as_ref(), None).ok()?;
            Some(leaf(semantics, name, cost, text, semantic))
        }
        RuleKind::TermSequence { rhs, text } => {
            let cost = rule.insertion_cost?;
            let text = segments(text, || {
                rhs.iter()
                    .flat_map(|&part| display_text(builder, part, &mut BTreeSet::new()))
                    .collect()
            });
            let semantic = semantic_over(semantics, rule.semantic.as_ref(), None).ok()?;
            Some(leaf(semantics, name, cost, text, semantic))
        }
        RuleKind::Placeholder { .. } => None,
        RuleKind::Nonterminal { rhs, no_insertion } => {
            if *no_insertion {
                return None;
            }
            let child = best.get(rhs)?;
            compose(semantics, name, rule, &[child])
        }
        RuleKind::Binary {
            rhs,
            no_insertion_indexes,
            ..
        } => {
            if !no_insertion_indexes.is_empty() {
                return None;
            }
            let a = best.get(&rhs[0])?;
            let b = best.get(&rhs[1])?;
            compose(semantics, name, rule, &[a, b])
        }
    }
}

fn leaf(
    semantics: &SemanticRegistry,
    symbol: String,
    cost: f64,
    text: Vec<TextSegment>,
    semantic: Option<SemanticTree>,
) -> InsertionCandidate {
    let tree = InsertionTree {
        symbol,
        text: text.clone(),
        children: Vec::new(),
    };
    let key = candidate_key(semantics, &text, semantic.as_ref(), &tree);
    InsertionCandidate {
        cost,
        text,
        semantic,
        tree,
        size: 1,
        key,
    }
}

fn compose(
    semantics: &SemanticRegistry,
    symbol: String,
    rule: &Rule,
    children: &[&InsertionCandidate],
) -> Option<InsertionCandidate> {
    let mut inner: Option<SemanticTree> = None;
    for child in children {
        if let Some(tree) = &child.semantic {
            inner = Some(match inner {
                None => tree.clone(),
                Some(acc) => semantics.merge(&acc, tree).ok()?,
            });
        }
    }
    let semantic = semantic_over(semantics, rule.semantic.as_ref(), inner).ok()?;
    let text: Vec<TextSegment> = children
        .iter()
        .flat_map(|child| child.text.iter().cloned())
        .collect();
    let tree = InsertionTree {
        symbol,
        text: Vec::new(),
        children: children.iter().map(|child| child.tree.clone()).collect(),
    };
    let key = candidate_key(semantics, &text, semantic.as_ref(), &tree);
    Some(InsertionCandidate {
        cost: children.iter().map(|child| child.cost).sum(),
        text,
        semantic,
        tree,
        size: 1 + children.iter().map(|child| child.size).sum::<usize>(),
        key,
    })
}

/// The semantic a rule yields once its right-hand side produced `inner`.
fn semantic_over(
    semantics: &SemanticRegistry,
    rule: Option<&RuleSemantic>,
    inner: Option<SemanticTree>,
) -> Result<Option<SemanticTree>, GrammarError> {
    match rule {
        None => Ok(inner),
        Some(RuleSemantic::Fixed(tree)) => match inner {
            None => Ok(Some(tree.clone())),
            Some(inner) => semantics.merge(tree, &inner).map(Some),
        },
        Some(RuleSemantic::Deferred(deferred)) => semantics
            .apply_deferred(deferred, &inner.unwrap_or_default())
            .map(Some),
    }
}

fn segments(
    text: &TermText,
    verbatim: impl FnOnce() -> Vec<TextSegment>,
) -> Vec<TextSegment> {
    match text {
        TermText::Verbatim => verbatim(),
        TermText::Replace(text) => vec![TextSegment::Literal(text.clone())],
        TermText::Inflected(table) => vec![TextSegment::Inflected(table.clone())],
        TermText::Silent => Vec::new(),
    }
}

/// Display text of a symbol's first lexical expansion.
fn display_text(
    builder: &GrammarBuilder,
    id: SymbolId,
    path: &mut BTreeSet<SymbolId>,
) -> Vec<TextSegment> {
    if !path.insert(id) {
        return Vec::new();
    }
    let text = match builder.rules(id).first().map(|rule| &rule.kind) {
        Some(RuleKind::Terminal { term, text }) => {
            segments(text, || vec![TextSegment::Literal(term.clone())])
        }
        Some(RuleKind::TermSequence { rhs, text }) => segments(text, || {
            rhs.iter()
                .flat_map(|&part| display_text(builder, part, path))
                .collect()
        }),
        _ => Vec::new(),
    };
    path.remove(&id);
    text
}

/// Total order among equal-cost candidates, independent of registration order.
fn candidate_key(
    semantics: &SemanticRegistry,
    text: &[TextSegment],
    semantic: Option<&SemanticTree>,
    tree: &InsertionTree,
) -> String {
    format!(
        "{}|{}|{}",
        serde_json::to_string(text).unwrap_or_default(),
        semantic.map(|tree| semantics.render(tree)).unwrap_or_default(),
        serde_json::to_string(tree).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleSpec;
    use crate::semantic::Semantic;

    struct Fixture {
        builder: GrammarBuilder,
        sentence: SymbolId,
        subject: SymbolId,
        verb: SymbolId,
    }

    fn fixture() -> Fixture {
        let mut builder = GrammarBuilder::new();
        let me = builder.new_semantic(Semantic::argument("me")).unwrap();
        let likes = builder
            .new_semantic(Semantic::function("likes", 1, 1))
            .unwrap();
        let me = builder.leaf_semantic(me).unwrap();
        let pronoun = builder.add_word("i", &["i"], &[], Some(0.5)).unwrap();
        let subject = builder.new_symbol(&["subject"]).unwrap();
        builder
            .add_rule(subject, RuleSpec::unary(pronoun).fixed(me))
            .unwrap();
        let verb = builder.add_word("like", &["like"], &[], None).unwrap();
        let sentence = builder.new_symbol(&["sentence"]).unwrap();
        let deferred = builder.defer_semantic(&[likes]).unwrap();
        builder
            .new_binary_rule(
                sentence,
                RuleSpec::binary(subject, verb)
                    .deferred(deferred)
                    .transposition_cost(1.0),
            )
            .unwrap();
        Fixture {
            builder,
            sentence,
            subject,
            verb,
        }
    }

    fn edits(builder: &GrammarBuilder, id: SymbolId) -> Vec<&Rule> {
        builder.rules(id).iter().filter(|rule| rule.is_edit()).collect()
    }

    #[test]
    fn unary_chains_carry_fixed_semantics() {
        let Fixture { builder, subject, .. } = fixture();
        let candidates = insertion_candidates(&builder);
        let candidate = candidates.get(&subject).expect("subject insertable");
        assert_eq!(candidate.cost, 0.5);
        assert_eq!(candidate.text, vec![TextSegment::Literal("i".to_string())]);
        assert_eq!(
            builder.semantics().render(candidate.semantic.as_ref().unwrap()),
            "me"
        );
        assert_eq!(candidate.tree.symbol, "[subject]");
        assert_eq!(candidate.tree.children[0].symbol, "[i]");
    }

    #[test]
    fn binary_rules_gain_insertions_and_transpositions() {
        let Fixture {
            mut builder,
            sentence,
            subject,
            verb,
        } = fixture();
        let stats = synthesize(&mut builder, true);
        assert_eq!(stats.insertions, 1, "[like] has no insertion cost");
        assert_eq!(stats.transpositions, 1);

        let edits = edits(&builder, sentence);
        let insertion = edits
            .iter()
            .find(|rule| matches!(rule.edit, Some(Edit::Insertion(_))))
            .expect("insertion rule");
        assert_eq!(
            insertion.kind,
            RuleKind::Nonterminal {
                rhs: verb,
                no_insertion: false
            }
        );
        let Some(Edit::Insertion(edit)) = &insertion.edit else {
            unreachable!();
        };
        assert_eq!(edit.position, InsertPosition::Before);
        assert_eq!(edit.cost, 0.5);
        assert!(edit.tree.is_some());
        assert!(matches!(insertion.semantic, Some(RuleSemantic::Deferred(_))));

        let swapped = edits
            .iter()
            .find(|rule| matches!(rule.edit, Some(Edit::Transposition { .. })))
            .expect("transposed rule");
        assert!(matches!(
            &swapped.kind,
            RuleKind::Binary { rhs, .. } if *rhs == [verb, subject]
        ));
    }

    #[test]
    fn excluded_positions_and_trees_are_respected() {
        let mut builder = GrammarBuilder::new();
        let a = builder.add_word("a", &["a"], &[], Some(1.0)).unwrap();
        let b = builder.add_word("b", &["b"], &[], Some(2.0)).unwrap();
        let pair = builder.new_symbol(&["pair"]).unwrap();
        builder
            .add_rule(pair, RuleSpec::binary(a, b).no_insertion(&[0]))
            .unwrap();
        let stats = synthesize(&mut builder, false);
        assert_eq!(stats.insertions, 1);
        let rule = &builder.rules(pair)[1];
        let Some(Edit::Insertion(edit)) = &rule.edit else {
            panic!("expected insertion");
        };
        assert_eq!(edit.position, InsertPosition::After);
        assert_eq!(edit.cost, 2.0);
        assert!(edit.tree.is_none());
        // An excluded position also keeps the pair itself from being inserted.
        assert!(!insertion_candidates(&builder).contains_key(&pair));
    }

    #[test]
    fn cheapest_insertion_wins_and_self_loops_are_skipped() {
        let mut builder = GrammarBuilder::new();
        let cheap = builder.add_word("cheap", &["x"], &[], Some(1.0)).unwrap();
        let dear = builder.add_word("dear", &["y"], &[], Some(3.0)).unwrap();
        let either = builder.new_symbol(&["either"]).unwrap();
        builder.add_rule(either, RuleSpec::unary(dear)).unwrap();
        builder.add_rule(either, RuleSpec::unary(cheap)).unwrap();
        let list = builder.new_symbol(&["list"]).unwrap();
        builder
            .add_rule(list, RuleSpec::binary(either, list))
            .unwrap();
        builder.add_rule(list, RuleSpec::unary(either)).unwrap();

        let candidates = insertion_candidates(&builder);
        assert_eq!(candidates[&either].cost, 1.0);
        assert_eq!(candidates[&list].cost, 1.0);

        synthesize(&mut builder, true);
        // Omitting [either] from [list] -> [either] [list] would leave [list] -> [list].
        assert!(builder.rules(list).iter().all(|rule| {
            !matches!(rule.kind, RuleKind::Nonterminal { rhs, .. } if rhs == list)
        }));
    }
}
