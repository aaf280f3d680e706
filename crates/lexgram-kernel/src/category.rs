//! Category factory: the standard symbol bundle for one countable entity type.
//!
//! ```text
//! [user-head]    -> [user-term] | [user-adjective] [user-term]
//! [user-rhs]     -> [who] [user-subj-filter] | [user-obj-filter]
//!                 | [who] [user-obj-filter] | [user-passive]
//! [user-plural]  -> [user-head]                 all-users
//!                 | [user-head] [user-rhs+]
//! [user-possessive] -> [user-entity] [possessive-suffix]
//! ```
//!
//! Content modules extend the attachment points (`adjective`, `subj_filter`,
//! `obj_filter`, `passive`) after creation. Attachment points that never
//! receive rules are removed by pruning.

use crate::conjunction::Conjunctions;
use crate::error::GrammarError;
use crate::names;
use crate::registry::GrammarBuilder;
use crate::rule::{EntityCategoryId, RuleSpec, SymbolId};
use crate::semantic::{Semantic, SemanticId};
use std::collections::BTreeMap;

/// Cost of suggesting an omitted relative pronoun.
pub const RELATIVE_PRONOUN_INSERTION_COST: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySpec {
    pub singular: String,
    pub plural: String,
    /// Person categories accept "people" and use "who".
    pub is_person: bool,
    /// Named instances; non-empty adds an entity placeholder and a possessive.
    pub entities: Vec<String>,
}

impl CategorySpec {
    pub fn new(singular: &str, plural: &str) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            ..Self::default()
        }
    }

    pub fn person(mut self) -> Self {
        self.is_person = true;
        self
    }

    pub fn entities<S: AsRef<str>>(mut self, entities: &[S]) -> Self {
        self.entities = entities.iter().map(|e| e.as_ref().to_string()).collect();
        self
    }
}

/// Handles of one category's symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub term: SymbolId,
    pub adjective: SymbolId,
    pub head: SymbolId,
    pub subj_filter: SymbolId,
    pub obj_filter: SymbolId,
    pub passive: SymbolId,
    pub rhs: SymbolId,
    pub rhs_plus: SymbolId,
    pub plural: SymbolId,
    /// The `all-<plural>` argument attached to a bare head.
    pub all: SemanticId,
    pub entity_category: Option<EntityCategoryId>,
    pub entity: Option<SymbolId>,
    pub possessive: Option<SymbolId>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFactory {
    who: Option<SymbolId>,
    that: Option<SymbolId>,
    possessive_suffix: Option<SymbolId>,
    categories: BTreeMap<String, Category>,
}

impl CategoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A category created earlier, by singular name.
    pub fn get(&self, singular: &str) -> Option<&Category> {
        self.categories.get(&names::slug(singular))
    }

    pub fn create(
        &mut self,
        builder: &mut GrammarBuilder,
        conjunctions: &mut Conjunctions,
        spec: CategorySpec,
    ) -> Result<Category, GrammarError> {
        let singular = names::slug(&spec.singular);
        let plural = names::slug(&spec.plural);
        let parts = [
            "term",
            "adjective",
            "head",
            "subj-filter",
            "obj-filter",
            "passive",
            "rhs",
            "plural",
            "entity",
            "possessive",
        ]
        .map(|part| format!("{singular}-{part}"));
        for part in &parts {
            builder.check_symbol_free(&names::symbol_name(&[part])?)?;
        }
        let all_name = format!("all-{plural}");
        names::validate_part(&all_name)?;
        if builder.semantics().lookup(&all_name).is_some() {
            return Err(GrammarError::DuplicateSemantic(all_name));
        }
        let has_entities = !spec.entities.is_empty();
        if has_entities
            && builder
                .live_entity_categories()
                .any(|(_, category)| category.name == singular)
        {
            return Err(GrammarError::DuplicateEntityCategory(singular));
        }
        self.check_shared_words(builder, spec.is_person, has_entities)?;
        conjunctions.check_family(builder, &format!("{singular}-rhs"))?;

        let mut accepted = vec![spec.plural.clone()];
        let mut substituted = vec![spec.singular.clone()];
        if spec.is_person {
            accepted.push("people".to_string());
            substituted.push("person".to_string());
        }
        let [term, adjective, head, subj_filter, obj_filter, passive, rhs, plural_part, entity_part, possessive_part] =
            parts;
        let term = builder.add_word(&term, &accepted, &substituted, None)?;
        let adjective = builder.new_symbol(&[adjective])?;
        let head = builder.new_symbol(&[head])?;
        let subj_filter = builder.new_symbol(&[subj_filter])?;
        let obj_filter = builder.new_symbol(&[obj_filter])?;
        let passive = builder.new_symbol(&[passive])?;
        let rhs = builder.new_symbol(&[rhs])?;
        let plural_symbol = builder.new_symbol(&[plural_part])?;
        let all = builder.new_semantic(Semantic::argument(all_name))?;

        builder.add_rule(head, RuleSpec::unary(term))?;
        builder.new_binary_rule(head, RuleSpec::binary(adjective, term))?;

        let relative = self.relative_pronoun(builder, spec.is_person)?;
        builder.new_binary_rule(rhs, RuleSpec::binary(relative, subj_filter))?;
        builder.add_rule(rhs, RuleSpec::unary(obj_filter))?;
        builder.new_binary_rule(
            rhs,
            RuleSpec::binary(relative, obj_filter).no_insertion(&[0]),
        )?;
        builder.add_rule(rhs, RuleSpec::unary(passive))?;
        let rhs_plus = conjunctions.create(builder, rhs)?;

        let all_tree = builder.leaf_semantic(all)?;
        builder.add_rule(plural_symbol, RuleSpec::unary(head).fixed(all_tree))?;
        builder.new_binary_rule(plural_symbol, RuleSpec::binary(head, rhs_plus))?;

        let (entity_category, entity, possessive) = if has_entities {
            let category = builder.new_entity_category(&singular, &spec.entities)?;
            let entity = builder.new_symbol(&[entity_part])?;
            builder.add_rule(entity, RuleSpec::placeholder(category))?;
            let suffix = self.possessive_suffix(builder)?;
            let possessive = builder.new_symbol(&[possessive_part])?;
            builder.new_binary_rule(possessive, RuleSpec::binary(entity, suffix))?;
            (Some(category), Some(entity), Some(possessive))
        } else {
            (None, None, None)
        };

        let category = Category {
            term,
            adjective,
            head,
            subj_filter,
            obj_filter,
            passive,
            rhs,
            rhs_plus,
            plural: plural_symbol,
            all,
            entity_category,
            entity,
            possessive,
        };
        self.categories.insert(singular.clone(), category);
        tracing::debug!(category = %singular, person = spec.is_person, "category created");
        Ok(category)
    }

    /// The shared words this category would create on first use.
    fn check_shared_words(
        &self,
        builder: &GrammarBuilder,
        is_person: bool,
        has_entities: bool,
    ) -> Result<(), GrammarError> {
        let relative = if is_person {
            self.who.is_none().then_some("[who]")
        } else {
            self.that.is_none().then_some("[that]")
        };
        if let Some(name) = relative {
            builder.check_symbol_free(name)?;
        }
        if has_entities && self.possessive_suffix.is_none() {
            builder.check_symbol_free("[possessive-suffix]")?;
        }
        Ok(())
    }

    fn relative_pronoun(
        &mut self,
        builder: &mut GrammarBuilder,
        is_person: bool,
    ) -> Result<SymbolId, GrammarError> {
        let (slot, name, accepted) = if is_person {
            (&mut self.who, "who", ["who", "that"])
        } else {
            (&mut self.that, "that", ["that", "which"])
        };
        if let Some(id) = *slot {
            return Ok(id);
        }
        let id = builder.add_word(name, &accepted, &[], Some(RELATIVE_PRONOUN_INSERTION_COST))?;
        *slot = Some(id);
        Ok(id)
    }

    fn possessive_suffix(&mut self, builder: &mut GrammarBuilder) -> Result<SymbolId, GrammarError> {
        if let Some(id) = self.possessive_suffix {
            return Ok(id);
        }
        let id = builder.add_word("possessive-suffix", &["'s"], &["’s"], None)?;
        self.possessive_suffix = Some(id);
        Ok(id)
    }
}
