//! Negation rule sets.
//!
//! A rule set expands to the marker `[not]`, optionally preceded by one
//! silent stop word ("do not", "have not"). Stop words that the conflicting
//! symbol itself can produce are dropped, so a verb like "do" never has its
//! own form swallowed as a stop word. The exclusion is resolved when the
//! build is finalized, so rules added to the conflicting symbol after the
//! set was created still count.

use crate::error::GrammarError;
use crate::names;
use crate::registry::GrammarBuilder;
use crate::rule::{RuleKind, RuleSpec, SymbolId, TermText};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "am", "are", "be", "been", "can", "could", "did", "do", "does", "had", "has", "have", "is",
    "may", "might", "must", "shall", "should", "was", "were", "will", "would",
];

/// Surface forms recognized as "not".
pub const CONTRACTIONS: &[&str] = &[
    "don't", "doesn't", "didn't", "can't", "cannot", "won't", "isn't", "aren't", "wasn't",
    "weren't", "haven't", "hasn't", "hadn't",
];

/// One generated negation symbol.
///
/// The stop-word rules are filled in at finalization, once every content
/// module has extended the conflicting symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegationRuleSet {
    pub symbol: SymbolId,
    pub stop_word_symbol: SymbolId,
    pub conflicting: Option<SymbolId>,
}

#[derive(Debug, Clone, Default)]
pub struct NegationRuleSets {
    not: Option<SymbolId>,
    sets: BTreeMap<Option<SymbolId>, NegationRuleSet>,
}

impl NegationRuleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule set excluding the terms of `conflicting`, or the unrestricted
    /// set for `None`. Sets are cached per argument.
    pub fn create_rule_set(
        &mut self,
        builder: &mut GrammarBuilder,
        conflicting: Option<SymbolId>,
    ) -> Result<NegationRuleSet, GrammarError> {
        if let Some(set) = self.sets.get(&conflicting) {
            return Ok(*set);
        }

        let (set_part, stop_part) = match conflicting {
            None => ("negation".to_string(), "negation-stop-word".to_string()),
            Some(id) => {
                let name = builder
                    .get(id)
                    .ok_or_else(|| GrammarError::UnknownSymbol(format!("#{}", id.0)))?
                    .name();
                let stem = names::stem(name);
                (
                    format!("negation-for-{stem}"),
                    format!("negation-stop-word-for-{stem}"),
                )
            }
        };
        for part in [&set_part, &stop_part] {
            builder.check_symbol_free(&names::symbol_name(&[part])?)?;
        }
        if self.not.is_none() {
            builder.check_symbol_free("[not]")?;
        }

        let not = self.not_symbol(builder)?;
        let symbol = builder.new_symbol(&[&set_part])?;
        let stop = builder.new_term_sequence_symbol(&[&stop_part])?;
        builder.add_rule(symbol, RuleSpec::unary(not))?;
        builder.new_binary_rule(symbol, RuleSpec::binary(stop, not).no_insertion(&[0]))?;
        builder.defer_stop_words(stop, conflicting);

        let set = NegationRuleSet {
            symbol,
            stop_word_symbol: stop,
            conflicting,
        };
        self.sets.insert(conflicting, set);
        Ok(set)
    }

    fn not_symbol(&mut self, builder: &mut GrammarBuilder) -> Result<SymbolId, GrammarError> {
        if let Some(not) = self.not {
            return Ok(not);
        }
        let not = builder.add_word("not", &["not"], CONTRACTIONS, None)?;
        self.not = Some(not);
        Ok(not)
    }
}

/// Give every pending stop-word symbol its silent terminals. Exclusions are
/// computed for all sets before any set is filled, so one set's stop words
/// never count as terms of another's conflicting symbol. A set whose stop
/// words are all excluded keeps an empty symbol, which pruning removes.
pub(crate) fn fill_stop_words(builder: &mut GrammarBuilder) -> Result<usize, GrammarError> {
    let pending: Vec<(SymbolId, BTreeSet<String>)> = builder
        .take_pending_stop_words()
        .into_iter()
        .map(|(stop, conflicting)| {
            let excluded = conflicting
                .map(|id| conflicting_terms(builder, id))
                .unwrap_or_default();
            (stop, excluded)
        })
        .collect();

    let mut filled = 0;
    for (stop, excluded) in pending {
        let mut kept = 0;
        for word in DEFAULT_STOP_WORDS.iter().filter(|word| !excluded.contains(**word)) {
            builder.add_rule(stop, RuleSpec::terminal(*word).text(TermText::Silent))?;
            kept += 1;
        }
        tracing::debug!(
            symbol = %builder.symbol_name(stop),
            kept,
            excluded = DEFAULT_STOP_WORDS.len() - kept,
            "negation stop words filled"
        );
        filled += 1;
    }
    Ok(filled)
}

/// Every token a symbol can produce through any of its expansions.
fn conflicting_terms(builder: &GrammarBuilder, root: SymbolId) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        for rule in builder.rules(id) {
            match &rule.kind {
                RuleKind::Terminal { term, .. } => {
                    tokens.extend(term.split_whitespace().map(str::to_string));
                }
                RuleKind::TermSequence { rhs, .. } => stack.extend(rhs.iter().copied()),
                RuleKind::Nonterminal { rhs, .. } => stack.push(*rhs),
                RuleKind::Binary { rhs, .. } => stack.extend(rhs.iter().copied()),
                RuleKind::Placeholder { .. } => {}
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term_sequence::VerbSpec;

    fn stop_words(builder: &GrammarBuilder, set: &NegationRuleSet) -> Vec<String> {
        builder
            .rules(set.stop_word_symbol)
            .iter()
            .filter_map(|rule| match &rule.kind {
                RuleKind::Terminal { term, .. } => Some(term.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unrestricted_set_keeps_every_stop_word() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        let set = negation.create_rule_set(&mut builder, None).unwrap();
        assert!(builder.rules(set.stop_word_symbol).is_empty());
        assert_eq!(fill_stop_words(&mut builder).unwrap(), 1);

        assert_eq!(stop_words(&builder, &set), DEFAULT_STOP_WORDS);
        assert_eq!(builder.symbol_name(set.symbol), "[negation]");
        assert!(builder.rules(set.stop_word_symbol).iter().all(|rule| {
            rule.insertion_cost.is_none()
                && matches!(&rule.kind, RuleKind::Terminal { text: TermText::Silent, .. })
        }));
        assert_eq!(builder.rules(set.symbol).len(), 2);
        assert_eq!(fill_stop_words(&mut builder).unwrap(), 0);
    }

    #[test]
    fn conflicting_terms_are_excluded() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        let verb = builder
            .add_verb(VerbSpec::regular("do", "do", "does", "did"))
            .unwrap();
        let wrapper = builder.new_symbol(&["do-wrapper"]).unwrap();
        builder.add_rule(wrapper, RuleSpec::unary(verb)).unwrap();
        let been = builder.add_word("have-been", &["have been"], &[], None).unwrap();
        builder.add_rule(wrapper, RuleSpec::unary(been)).unwrap();

        let set = negation.create_rule_set(&mut builder, Some(wrapper)).unwrap();
        fill_stop_words(&mut builder).unwrap();
        let kept = stop_words(&builder, &set);
        for word in ["do", "does", "did", "have", "been"] {
            assert!(!kept.iter().any(|w| w == word), "{word} kept");
        }
        assert_eq!(kept.len(), DEFAULT_STOP_WORDS.len() - 5);
        assert_eq!(
            builder.symbol_name(set.symbol),
            "[negation-for-do-wrapper]"
        );
    }

    #[test]
    fn terms_added_after_creation_are_excluded() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        let aux = builder.new_term_sequence_symbol(&["aux"]).unwrap();
        builder.add_rule(aux, RuleSpec::terminal("do")).unwrap();
        let set = negation.create_rule_set(&mut builder, Some(aux)).unwrap();
        builder.add_rule(aux, RuleSpec::terminal("have")).unwrap();

        fill_stop_words(&mut builder).unwrap();
        let kept = stop_words(&builder, &set);
        assert!(!kept.iter().any(|w| w == "do"));
        assert!(!kept.iter().any(|w| w == "have"));
        assert_eq!(kept.len(), DEFAULT_STOP_WORDS.len() - 2);
    }

    #[test]
    fn terms_under_binary_expansions_are_excluded() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        let verb = builder
            .add_verb(VerbSpec::regular("have", "have", "has", "had"))
            .unwrap();
        let particle = builder.add_word("to", &["to"], &[], None).unwrap();
        let phrase = builder.new_symbol(&["have-to"]).unwrap();
        builder
            .new_binary_rule(phrase, RuleSpec::binary(verb, particle))
            .unwrap();

        let set = negation.create_rule_set(&mut builder, Some(phrase)).unwrap();
        fill_stop_words(&mut builder).unwrap();
        let kept = stop_words(&builder, &set);
        for word in ["have", "has", "had"] {
            assert!(!kept.iter().any(|w| w == word), "{word} kept");
        }
        assert_eq!(kept.len(), DEFAULT_STOP_WORDS.len() - 3);
    }

    #[test]
    fn one_sets_stop_words_do_not_leak_into_another() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        let unrestricted = negation.create_rule_set(&mut builder, None).unwrap();
        let wrapper = builder.new_symbol(&["negated"]).unwrap();
        builder
            .add_rule(wrapper, RuleSpec::unary(unrestricted.symbol))
            .unwrap();
        let set = negation.create_rule_set(&mut builder, Some(wrapper)).unwrap();

        fill_stop_words(&mut builder).unwrap();
        assert_eq!(stop_words(&builder, &set), DEFAULT_STOP_WORDS);
    }

    #[test]
    fn rule_sets_are_cached_per_argument() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        let first = negation.create_rule_set(&mut builder, None).unwrap();
        let count = builder.symbol_count();
        assert_eq!(negation.create_rule_set(&mut builder, None).unwrap(), first);
        assert_eq!(builder.symbol_count(), count);
        assert_eq!(fill_stop_words(&mut builder).unwrap(), 1);
    }

    #[test]
    fn contractions_display_as_not() {
        let mut builder = GrammarBuilder::new();
        let mut negation = NegationRuleSets::new();
        negation.create_rule_set(&mut builder, None).unwrap();
        let not = builder.symbol("[not]").unwrap();
        let dont = builder
            .rules(not)
            .iter()
            .find(|rule| matches!(&rule.kind, RuleKind::Terminal { term, .. } if term == "don't"))
            .expect("don't is accepted");
        assert!(matches!(
            &dont.kind,
            RuleKind::Terminal { text: TermText::Replace(text), .. } if text == "not"
        ));
    }
}
