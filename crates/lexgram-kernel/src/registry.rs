//! Symbol & rule registry.
//!
//! [`GrammarBuilder`] owns every symbol, rule, semantic and entity category
//! of one build. Content modules receive it explicitly; there is no ambient
//! registry. Names are interned to handles at registration time and rule
//! right-hand sides are resolved immediately, so later stages never look a
//! name up again.

use crate::error::GrammarError;
use crate::names;
use crate::rule::{EntityCategoryId, RhsSpec, Rule, RuleKind, RuleSpec, SymbolId};
use crate::semantic::{
    DeferredSemantic, RuleSemantic, Semantic, SemanticId, SemanticRegistry, SemanticTree,
};
use std::collections::{BTreeMap, BTreeSet};

pub const START_SYMBOL: &str = "[start]";

/// A named nonterminal and its alternative expansions.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    rules: Vec<Rule>,
    term_sequence: bool,
    pruned: bool,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether every rule of this symbol is lexical.
    pub fn is_term_sequence(&self) -> bool {
        self.term_sequence
    }
}

/// A placeholder source bound to an external list of named instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCategory {
    pub name: String,
    pub instances: Vec<String>,
    pruned: bool,
}

/// The registry every content module builds into.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    symbols: Vec<Symbol>,
    symbol_index: BTreeMap<String, SymbolId>,
    semantics: SemanticRegistry,
    pruned_semantics: BTreeSet<SemanticId>,
    entities: Vec<EntityCategory>,
    entity_index: BTreeMap<String, EntityCategoryId>,
    /// Negation stop-word symbols and the symbol whose terms they exclude,
    /// filled at finalization.
    pending_stop_words: Vec<(SymbolId, Option<SymbolId>)>,
    start: SymbolId,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    /// An empty builder holding only the start symbol.
    pub fn new() -> Self {
        let mut builder = Self {
            symbols: Vec::new(),
            symbol_index: BTreeMap::new(),
            semantics: SemanticRegistry::new(),
            pruned_semantics: BTreeSet::new(),
            entities: Vec::new(),
            entity_index: BTreeMap::new(),
            pending_stop_words: Vec::new(),
            start: SymbolId(0),
        };
        builder.start = builder.insert_symbol(START_SYMBOL.to_string(), false);
        builder
    }

    pub fn start(&self) -> SymbolId {
        self.start
    }

    // ── symbols ──────────────────────────────────────────────────────────

    /// Register `[part-part...]`. Fails if the composed name exists.
    pub fn new_symbol<S: AsRef<str>>(&mut self, parts: &[S]) -> Result<SymbolId, GrammarError> {
        let name = names::symbol_name(parts)?;
        if self.symbol_index.contains_key(&name) {
            return Err(GrammarError::DuplicateSymbol(name));
        }
        Ok(self.insert_symbol(name, false))
    }

    /// Register a symbol whose rules will all be lexical.
    pub(crate) fn new_term_sequence_symbol<S: AsRef<str>>(
        &mut self,
        parts: &[S],
    ) -> Result<SymbolId, GrammarError> {
        let id = self.new_symbol(parts)?;
        self.symbols[id.index()].term_sequence = true;
        Ok(id)
    }

    /// Get or create a pipeline-synthesized symbol. Synthesized names are
    /// derived from their content, so an existing symbol with the same name
    /// already has the intended rules.
    pub(crate) fn synthesized_symbol(&mut self, name: String, term_sequence: bool) -> (SymbolId, bool) {
        if let Some(&id) = self.symbol_index.get(&name) {
            return (id, false);
        }
        (self.insert_symbol(name, term_sequence), true)
    }

    fn insert_symbol(&mut self, name: String, term_sequence: bool) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbol_index.insert(name.clone(), id);
        self.symbols.push(Symbol {
            name,
            rules: Vec::new(),
            term_sequence,
            pruned: false,
        });
        id
    }

    /// Fails with `DuplicateSymbol` if `name` is taken. Composite
    /// registrations check every name they will create before creating any.
    pub(crate) fn check_symbol_free(&self, name: &str) -> Result<(), GrammarError> {
        if self.lookup(name).is_some() {
            return Err(GrammarError::DuplicateSymbol(name.to_string()));
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbol_index
            .get(name)
            .copied()
            .filter(|id| !self.symbols[id.index()].pruned)
    }

    /// Resolve a symbol name, failing with `UnknownSymbol`.
    pub fn symbol(&self, name: &str) -> Result<SymbolId, GrammarError> {
        self.lookup(name)
            .ok_or_else(|| GrammarError::UnknownSymbol(name.to_string()))
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index()).filter(|symbol| !symbol.pruned)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols
            .get(id.index())
            .map_or("<unknown>", |symbol| symbol.name.as_str())
    }

    pub fn rules(&self, id: SymbolId) -> &[Rule] {
        self.get(id).map_or(&[], |symbol| symbol.rules.as_slice())
    }

    pub fn is_term_sequence(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(Symbol::is_term_sequence)
    }

    /// Handles of every symbol that has not been pruned, in registration order.
    pub fn live_symbols(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, symbol)| !symbol.pruned)
            .map(|(i, _)| SymbolId(i as u32))
            .collect()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.iter().filter(|symbol| !symbol.pruned).count()
    }

    pub(crate) fn rules_mut(&mut self, id: SymbolId) -> &mut Vec<Rule> {
        &mut self.symbols[id.index()].rules
    }

    /// Append a pipeline-built rule, skipping exact duplicates.
    pub(crate) fn push_rule(&mut self, id: SymbolId, rule: Rule) -> bool {
        let rules = self.rules_mut(id);
        if rules.contains(&rule) {
            return false;
        }
        rules.push(rule);
        true
    }

    pub(crate) fn defer_stop_words(&mut self, stop: SymbolId, conflicting: Option<SymbolId>) {
        self.pending_stop_words.push((stop, conflicting));
    }

    pub(crate) fn take_pending_stop_words(&mut self) -> Vec<(SymbolId, Option<SymbolId>)> {
        std::mem::take(&mut self.pending_stop_words)
    }

    pub(crate) fn prune_symbol(&mut self, id: SymbolId) {
        if let Some(symbol) = self.symbols.get_mut(id.index()) {
            symbol.pruned = true;
            symbol.rules.clear();
        }
    }

    // ── semantics ────────────────────────────────────────────────────────

    pub fn semantics(&self) -> &SemanticRegistry {
        &self.semantics
    }

    pub fn new_semantic(&mut self, semantic: Semantic) -> Result<SemanticId, GrammarError> {
        self.semantics.register(semantic)
    }

    pub fn leaf_semantic(&self, id: SemanticId) -> Result<SemanticTree, GrammarError> {
        self.semantics.leaf(id)
    }

    pub fn reduce_semantic(
        &self,
        parent: SemanticId,
        children: &SemanticTree,
    ) -> Result<SemanticTree, GrammarError> {
        self.semantics.reduce(parent, children)
    }

    pub fn defer_semantic(&self, chain: &[SemanticId]) -> Result<DeferredSemantic, GrammarError> {
        self.semantics.defer(chain)
    }

    pub fn live_semantics(&self) -> impl Iterator<Item = (SemanticId, &Semantic)> {
        self.semantics
            .iter()
            .filter(|(id, _)| !self.pruned_semantics.contains(id))
    }

    pub(crate) fn prune_semantic(&mut self, id: SemanticId) {
        self.pruned_semantics.insert(id);
    }

    // ── entity categories ────────────────────────────────────────────────

    /// Register the placeholder category `{name}` with its instance names.
    pub fn new_entity_category<S: AsRef<str>>(
        &mut self,
        name: &str,
        instances: &[S],
    ) -> Result<EntityCategoryId, GrammarError> {
        names::validate_part(name)?;
        if self.entity_index.contains_key(name) {
            return Err(GrammarError::DuplicateEntityCategory(name.to_string()));
        }
        let instances: BTreeSet<String> = instances
            .iter()
            .map(|instance| names::normalize_term(instance.as_ref()))
            .filter(|instance| !instance.is_empty())
            .collect();
        let id = EntityCategoryId(self.entities.len() as u32);
        self.entity_index.insert(name.to_string(), id);
        self.entities.push(EntityCategory {
            name: name.to_string(),
            instances: instances.into_iter().collect(),
            pruned: false,
        });
        Ok(id)
    }

    pub fn entity_category(&self, id: EntityCategoryId) -> Option<&EntityCategory> {
        self.entities.get(id.index()).filter(|category| !category.pruned)
    }

    pub fn entity_category_name(&self, id: EntityCategoryId) -> String {
        self.entities.get(id.index()).map_or_else(
            || "{unknown}".to_string(),
            |category| names::entity_category_name(&category.name),
        )
    }

    pub fn live_entity_categories(&self) -> impl Iterator<Item = (EntityCategoryId, &EntityCategory)> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, category)| !category.pruned)
            .map(|(i, category)| (EntityCategoryId(i as u32), category))
    }

    pub(crate) fn prune_entity_category(&mut self, id: EntityCategoryId) {
        if let Some(category) = self.entities.get_mut(id.index()) {
            category.pruned = true;
        }
    }

    // ── rules ────────────────────────────────────────────────────────────

    /// Validate and append a rule to `symbol`.
    ///
    /// Adding a rule identical to one the symbol already has is a no-op, so
    /// modules that declare overlapping rules do not multiply expansions.
    pub fn add_rule(&mut self, symbol: SymbolId, spec: RuleSpec) -> Result<SymbolId, GrammarError> {
        let rule = self.validate_rule(symbol, spec)?;
        let name = self.symbols[symbol.index()].name.clone();
        if !self.push_rule(symbol, rule) {
            tracing::debug!(symbol = %name, "identical rule already registered");
        }
        Ok(symbol)
    }

    /// Like [`Self::add_rule`], but the right-hand side must be exactly two
    /// symbols. The only rule shape that may declare a transposition cost.
    pub fn new_binary_rule(
        &mut self,
        symbol: SymbolId,
        spec: RuleSpec,
    ) -> Result<SymbolId, GrammarError> {
        let len = match &spec.rhs {
            RhsSpec::Symbols(ids) => ids.len(),
            RhsSpec::Named(names) => names.len(),
            _ => 0,
        };
        if len != 2 {
            return Err(GrammarError::RhsArity {
                symbol: self.symbol_name(symbol).to_string(),
                len,
                expected: "exactly 2",
            });
        }
        self.add_rule(symbol, spec)
    }

    fn validate_rule(&self, symbol: SymbolId, spec: RuleSpec) -> Result<Rule, GrammarError> {
        let owner_symbol = self
            .get(symbol)
            .ok_or_else(|| GrammarError::UnknownSymbol(format!("#{}", symbol.0)))?;
        let owner = owner_symbol.name.clone();
        let lexical_owner = owner_symbol.term_sequence;
        let RuleSpec {
            rhs,
            semantic,
            features,
            insertion_cost,
            transposition_cost,
            no_insertion_indexes,
        } = spec;

        let kind = match rhs {
            RhsSpec::Symbols(ids) => {
                self.symbol_rule_kind(&owner, ids, transposition_cost, &no_insertion_indexes)?
            }
            RhsSpec::Named(names) => {
                let ids = names
                    .iter()
                    .map(|name| self.symbol(name))
                    .collect::<Result<Vec<_>, _>>()?;
                self.symbol_rule_kind(&owner, ids, transposition_cost, &no_insertion_indexes)?
            }
            RhsSpec::Terminal { term, text } => {
                reject_symbol_modifiers(&owner, transposition_cost, &no_insertion_indexes)?;
                RuleKind::Terminal {
                    term: names::checked_term(&term)?,
                    text,
                }
            }
            RhsSpec::TermSequence { rhs, text } => {
                reject_symbol_modifiers(&owner, transposition_cost, &no_insertion_indexes)?;
                if rhs.is_empty() || rhs.len() > 2 {
                    return Err(GrammarError::RhsArity {
                        symbol: owner,
                        len: rhs.len(),
                        expected: "1 or 2",
                    });
                }
                for &id in &rhs {
                    let target = self
                        .get(id)
                        .ok_or_else(|| GrammarError::UnknownSymbol(format!("#{}", id.0)))?;
                    if !target.term_sequence {
                        return Err(GrammarError::NotATermSequence {
                            symbol: owner,
                            target: target.name.clone(),
                        });
                    }
                }
                RuleKind::TermSequence { rhs, text }
            }
            RhsSpec::Placeholder(category) => {
                reject_symbol_modifiers(&owner, transposition_cost, &no_insertion_indexes)?;
                if self.entity_category(category).is_none() {
                    return Err(GrammarError::UnknownEntityCategory(format!(
                        "#{}",
                        category.0
                    )));
                }
                RuleKind::Placeholder { category }
            }
        };

        if lexical_owner && !kind.is_lexical() {
            return Err(GrammarError::NonLexicalRule(owner));
        }

        if let Some(cost) = insertion_cost {
            check_cost(&owner, cost)?;
            if !kind.is_lexical() {
                return Err(GrammarError::InsertionOnNonLexical(owner));
            }
        }

        if let Some(semantic) = &semantic {
            let mut ids = BTreeSet::new();
            semantic.collect_ids(&mut ids);
            for id in ids {
                self.semantics.definition(id)?;
            }
            if matches!(semantic, RuleSemantic::Deferred(_))
                && matches!(kind, RuleKind::Terminal { .. })
            {
                return Err(GrammarError::InvalidAttachment {
                    symbol: owner,
                    reason: "a deferred function on a literal terminal has no arguments to consume"
                        .to_string(),
                });
            }
        }

        Ok(Rule {
            kind,
            semantic,
            features,
            insertion_cost,
            edit: None,
        })
    }

    fn symbol_rule_kind(
        &self,
        owner: &str,
        ids: Vec<SymbolId>,
        transposition_cost: Option<f64>,
        no_insertion_indexes: &[usize],
    ) -> Result<RuleKind, GrammarError> {
        for id in &ids {
            if self.get(*id).is_none() {
                return Err(GrammarError::UnknownSymbol(format!("#{}", id.0)));
            }
        }
        if ids.is_empty() || ids.len() > 2 {
            return Err(GrammarError::RhsArity {
                symbol: owner.to_string(),
                len: ids.len(),
                expected: "1 or 2",
            });
        }
        for &index in no_insertion_indexes {
            if index >= ids.len() {
                return Err(GrammarError::NoInsertionIndex {
                    symbol: owner.to_string(),
                    index,
                    len: ids.len(),
                });
            }
        }
        match ids.as_slice() {
            [a, b] => {
                if let Some(cost) = transposition_cost {
                    check_cost(owner, cost)?;
                }
                Ok(RuleKind::Binary {
                    rhs: [*a, *b],
                    transposition_cost,
                    no_insertion_indexes: no_insertion_indexes.iter().copied().collect(),
                })
            }
            _ => {
                if transposition_cost.is_some() {
                    return Err(GrammarError::TranspositionOnNonBinary(owner.to_string()));
                }
                Ok(RuleKind::Nonterminal {
                    rhs: ids[0],
                    no_insertion: !no_insertion_indexes.is_empty(),
                })
            }
        }
    }
}

fn reject_symbol_modifiers(
    owner: &str,
    transposition_cost: Option<f64>,
    no_insertion_indexes: &[usize],
) -> Result<(), GrammarError> {
    if transposition_cost.is_some() {
        return Err(GrammarError::TranspositionOnNonBinary(owner.to_string()));
    }
    if let Some(&index) = no_insertion_indexes.first() {
        return Err(GrammarError::NoInsertionIndex {
            symbol: owner.to_string(),
            index,
            len: 0,
        });
    }
    Ok(())
}

fn check_cost(owner: &str, cost: f64) -> Result<(), GrammarError> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(())
    } else {
        Err(GrammarError::InvalidCost {
            owner: format!("rule of {owner}"),
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::TermText;

    fn builder_with(names: &[&str]) -> (GrammarBuilder, Vec<SymbolId>) {
        let mut builder = GrammarBuilder::new();
        let ids = names
            .iter()
            .map(|name| builder.new_symbol(&[*name]).unwrap())
            .collect();
        (builder, ids)
    }

    #[test]
    fn symbol_names_are_unique() {
        let (mut builder, _) = builder_with(&["user"]);
        let err = builder
            .new_symbol(&["user"])
            .expect_err("second [user] must fail");
        assert_eq!(err, GrammarError::DuplicateSymbol("[user]".to_string()));
        assert_eq!(
            builder.new_symbol(&["start"]).unwrap_err(),
            GrammarError::DuplicateSymbol(START_SYMBOL.to_string())
        );
        assert_eq!(builder.symbol_count(), 2);
    }

    #[test]
    fn named_references_must_exist() {
        let (mut builder, ids) = builder_with(&["a"]);
        let err = builder
            .add_rule(ids[0], RuleSpec::named(&["[missing]"]))
            .expect_err("unknown name must fail");
        assert_eq!(err, GrammarError::UnknownSymbol("[missing]".to_string()));
        assert!(builder.rules(ids[0]).is_empty());
    }

    #[test]
    fn nonterminal_rules_take_one_or_two_symbols() {
        let (mut builder, ids) = builder_with(&["a", "b", "c"]);
        let err = builder
            .add_rule(ids[0], RuleSpec::symbols(&[ids[1], ids[2], ids[1]]))
            .expect_err("three symbols");
        assert!(matches!(err, GrammarError::RhsArity { len: 3, .. }));
        let err = builder
            .add_rule(ids[0], RuleSpec::symbols(&[]))
            .expect_err("zero symbols");
        assert!(matches!(err, GrammarError::RhsArity { len: 0, .. }));

        let err = builder
            .new_binary_rule(ids[0], RuleSpec::unary(ids[1]))
            .expect_err("binary sugar needs two");
        assert!(matches!(err, GrammarError::RhsArity { len: 1, .. }));
        builder
            .new_binary_rule(ids[0], RuleSpec::binary(ids[1], ids[2]).transposition_cost(1.0))
            .unwrap();
        assert_eq!(builder.rules(ids[0]).len(), 1);
    }

    #[test]
    fn transposition_requires_binary_rule() {
        let (mut builder, ids) = builder_with(&["a", "b"]);
        let err = builder
            .add_rule(ids[0], RuleSpec::unary(ids[1]).transposition_cost(1.0))
            .expect_err("unary transposition");
        assert_eq!(err, GrammarError::TranspositionOnNonBinary("[a]".to_string()));
        let err = builder
            .add_rule(ids[0], RuleSpec::terminal("x").transposition_cost(1.0))
            .expect_err("terminal transposition");
        assert!(matches!(err, GrammarError::TranspositionOnNonBinary(_)));
    }

    #[test]
    fn no_insertion_indexes_must_be_in_range() {
        let (mut builder, ids) = builder_with(&["a", "b", "c"]);
        let err = builder
            .add_rule(ids[0], RuleSpec::binary(ids[1], ids[2]).no_insertion(&[2]))
            .expect_err("index 2 of 2");
        assert!(matches!(
            err,
            GrammarError::NoInsertionIndex { index: 2, len: 2, .. }
        ));
        builder
            .add_rule(ids[0], RuleSpec::binary(ids[1], ids[2]).no_insertion(&[1]))
            .unwrap();
    }

    #[test]
    fn identical_rules_are_deduplicated() {
        let (mut builder, ids) = builder_with(&["a", "b"]);
        builder.add_rule(ids[0], RuleSpec::unary(ids[1])).unwrap();
        builder.add_rule(ids[0], RuleSpec::unary(ids[1])).unwrap();
        builder.add_rule(ids[0], RuleSpec::terminal("Hi")).unwrap();
        builder.add_rule(ids[0], RuleSpec::terminal("hi ")).unwrap();
        assert_eq!(builder.rules(ids[0]).len(), 2);
    }

    #[test]
    fn insertion_cost_is_lexical_only() {
        let (mut builder, ids) = builder_with(&["a", "b"]);
        let err = builder
            .add_rule(ids[0], RuleSpec::unary(ids[1]).insertion_cost(1.0))
            .expect_err("nonterminal insertion");
        assert_eq!(err, GrammarError::InsertionOnNonLexical("[a]".to_string()));
        let err = builder
            .add_rule(ids[0], RuleSpec::terminal("x").insertion_cost(f64::NAN))
            .expect_err("nan cost");
        assert!(matches!(err, GrammarError::InvalidCost { .. }));
        builder
            .add_rule(ids[0], RuleSpec::terminal("x").insertion_cost(0.5))
            .unwrap();
    }

    #[test]
    fn deferred_semantics_need_arguments() {
        let (mut builder, ids) = builder_with(&["a", "b"]);
        let not = builder.new_semantic(Semantic::function("not", 1, 1)).unwrap();
        let deferred = builder.defer_semantic(&[not]).unwrap();
        let err = builder
            .add_rule(ids[0], RuleSpec::terminal("x").deferred(deferred.clone()))
            .expect_err("deferred on terminal");
        assert!(matches!(err, GrammarError::InvalidAttachment { .. }));
        builder
            .add_rule(ids[0], RuleSpec::unary(ids[1]).deferred(deferred))
            .unwrap();
    }

    #[test]
    fn term_sequence_rules_reference_term_sequences() {
        let (mut builder, ids) = builder_with(&["plain"]);
        let word = builder.new_term_sequence_symbol(&["word"]).unwrap();
        let phrase = builder.new_term_sequence_symbol(&["phrase"]).unwrap();
        builder.add_rule(word, RuleSpec::terminal("word")).unwrap();
        builder
            .add_rule(
                phrase,
                RuleSpec::term_sequence(&[word, word]).text(TermText::Replace("w w".into())),
            )
            .unwrap();
        let err = builder
            .add_rule(phrase, RuleSpec::term_sequence(&[ids[0]]))
            .expect_err("plain symbol in term sequence");
        assert!(matches!(err, GrammarError::NotATermSequence { .. }));
    }

    #[test]
    fn term_sequence_symbols_only_take_lexical_rules() {
        let (mut builder, ids) = builder_with(&["other", "b"]);
        let word = builder.add_word("word", &["word"], &[], None).unwrap();
        for spec in [
            RuleSpec::unary(ids[0]),
            RuleSpec::binary(ids[0], ids[1]),
        ] {
            let err = builder.add_rule(word, spec).expect_err("non-lexical rule");
            assert_eq!(err, GrammarError::NonLexicalRule("[word]".to_string()));
        }
        assert_eq!(builder.rules(word).len(), 1);
        builder.add_rule(word, RuleSpec::terminal("words")).unwrap();
        assert_eq!(builder.rules(word).len(), 2);
    }

    #[test]
    fn reserved_terminals_are_rejected() {
        let (mut builder, ids) = builder_with(&["a"]);
        let err = builder
            .add_rule(ids[0], RuleSpec::terminal("<empty>"))
            .expect_err("epsilon marker as content");
        assert!(matches!(err, GrammarError::InvalidName { .. }));
        assert!(builder.rules(ids[0]).is_empty());

        let count = builder.symbol_count();
        let err = builder
            .add_word("tok", &["fine", "<tok:in>"], &[], None)
            .expect_err("reserved accepted term");
        assert!(matches!(err, GrammarError::InvalidName { .. }));
        assert_eq!(builder.symbol_count(), count);
    }

    #[test]
    fn entity_categories_are_unique_and_normalized() {
        let mut builder = GrammarBuilder::new();
        let id = builder
            .new_entity_category("user", &["Mary", "john", "mary", " "])
            .unwrap();
        assert_eq!(
            builder.entity_category(id).unwrap().instances,
            vec!["john".to_string(), "mary".to_string()]
        );
        assert_eq!(builder.entity_category_name(id), "{user}");
        assert!(matches!(
            builder.new_entity_category("user", &["x"]),
            Err(GrammarError::DuplicateEntityCategory(_))
        ));
    }
}
