//! Conjunction combinator.
//!
//! `create(X)` derives a family of symbols accepting `X`, `X and X`,
//! `X, X and X` and or-groups of and-groups:
//!
//! ```text
//! [x+]      -> X | [x-and] | [x-or]
//! [x-and]   -> X [and+x]                      intersect(..), deferred
//! [and+x]   -> [and] X | [and] [x-and] | [comma] [x-and]
//! [x-and?]  -> X | [x-and]
//! [x-or]    -> [x-and?] [or+x]                union(..), deferred
//! [or+x]    -> [or] [x-and?] | [or] [x-or] | [comma] [x-or]
//! ```
//!
//! "and" binds tighter than "or" because an and-group never contains an
//! or-group. Operand positions exclude insertion; the connectives do not.

use crate::error::GrammarError;
use crate::names;
use crate::registry::GrammarBuilder;
use crate::rule::{RuleSpec, SymbolId};
use crate::semantic::{Semantic, SemanticId};
use std::collections::BTreeMap;

/// Cost of suggesting an omitted "and" between two operands.
pub const AND_INSERTION_COST: f64 = 2.0;

pub const INTERSECT: &str = "intersect";
pub const UNION: &str = "union";

const MAX_OPERANDS: usize = 100;

#[derive(Debug, Clone, Copy)]
struct Connectives {
    and: SymbolId,
    or: SymbolId,
    comma: SymbolId,
    intersect: SemanticId,
    union: SemanticId,
}

/// Lazily registered connectives plus the families created so far.
#[derive(Debug, Clone, Default)]
pub struct Conjunctions {
    connectives: Option<Connectives>,
    families: BTreeMap<SymbolId, SymbolId>,
}

impl Conjunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root of the family already built for `base`, if any.
    pub fn root(&self, base: SymbolId) -> Option<SymbolId> {
        self.families.get(&base).copied()
    }

    /// Build the conjunction family of `base` and return `[x+]`.
    /// A second call for the same base returns the existing root.
    pub fn create(
        &mut self,
        builder: &mut GrammarBuilder,
        base: SymbolId,
    ) -> Result<SymbolId, GrammarError> {
        if let Some(root) = self.root(base) {
            return Ok(root);
        }
        let stem = names::stem(
            builder
                .get(base)
                .ok_or_else(|| GrammarError::UnknownSymbol(format!("#{}", base.0)))?
                .name(),
        )
        .to_string();

        let parts = family_parts(builder, &stem)?;
        self.check_connectives_free(builder)?;
        let c = self.connectives(builder)?;

        let [root, and_group, and_tail, and_opt, or_group, or_tail] =
            parts.map(|part| builder.new_symbol(&[part]));
        let (root, and_group, and_tail, and_opt, or_group, or_tail) =
            (root?, and_group?, and_tail?, and_opt?, or_group?, or_tail?);

        let intersect = builder.defer_semantic(&[c.intersect])?;
        let union = builder.defer_semantic(&[c.union])?;

        builder.add_rule(root, RuleSpec::unary(base))?;
        builder.add_rule(root, RuleSpec::unary(and_group))?;
        builder.add_rule(root, RuleSpec::unary(or_group))?;

        builder.new_binary_rule(
            and_group,
            RuleSpec::binary(base, and_tail)
                .deferred(intersect)
                .no_insertion(&[0]),
        )?;
        builder.new_binary_rule(and_tail, RuleSpec::binary(c.and, base).no_insertion(&[1]))?;
        builder.new_binary_rule(and_tail, RuleSpec::binary(c.and, and_group).no_insertion(&[1]))?;
        builder.new_binary_rule(
            and_tail,
            RuleSpec::binary(c.comma, and_group).no_insertion(&[1]),
        )?;

        builder.add_rule(and_opt, RuleSpec::unary(base))?;
        builder.add_rule(and_opt, RuleSpec::unary(and_group))?;

        builder.new_binary_rule(
            or_group,
            RuleSpec::binary(and_opt, or_tail)
                .deferred(union)
                .no_insertion(&[0]),
        )?;
        builder.new_binary_rule(or_tail, RuleSpec::binary(c.or, and_opt).no_insertion(&[1]))?;
        builder.new_binary_rule(or_tail, RuleSpec::binary(c.or, or_group).no_insertion(&[1]))?;
        builder.new_binary_rule(or_tail, RuleSpec::binary(c.comma, or_group).no_insertion(&[1]))?;

        self.families.insert(base, root);
        tracing::debug!(base = %builder.symbol_name(base), root = %builder.symbol_name(root), "conjunction family created");
        Ok(root)
    }

    /// Fails if a family for a base with this stem could not be created.
    /// Lets composite registrations check before they mutate.
    pub(crate) fn check_family(
        &self,
        builder: &GrammarBuilder,
        stem: &str,
    ) -> Result<(), GrammarError> {
        family_parts(builder, stem)?;
        self.check_connectives_free(builder)
    }

    fn check_connectives_free(&self, builder: &GrammarBuilder) -> Result<(), GrammarError> {
        if self.connectives.is_some() {
            return Ok(());
        }
        for name in ["[and]", "[or]", "[comma]"] {
            builder.check_symbol_free(name)?;
        }
        for name in [INTERSECT, UNION] {
            if builder.semantics().lookup(name).is_some() {
                return Err(GrammarError::DuplicateSemantic(name.to_string()));
            }
        }
        Ok(())
    }

    fn connectives(&mut self, builder: &mut GrammarBuilder) -> Result<Connectives, GrammarError> {
        if let Some(connectives) = self.connectives {
            return Ok(connectives);
        }
        self.check_connectives_free(builder)?;

        let connectives = Connectives {
            and: builder.add_word("and", &["and"], &["&"], Some(AND_INSERTION_COST))?,
            or: builder.add_word("or", &["or"], &[], None)?,
            comma: builder.add_word("comma", &[","], &[], None)?,
            intersect: builder.new_semantic(Semantic::function(INTERSECT, 1, MAX_OPERANDS))?,
            union: builder.new_semantic(Semantic::function(UNION, 1, MAX_OPERANDS))?,
        };
        self.connectives = Some(connectives);
        Ok(connectives)
    }
}

fn family_parts(builder: &GrammarBuilder, stem: &str) -> Result<[String; 6], GrammarError> {
    let parts = [
        format!("{stem}+"),
        format!("{stem}-and"),
        format!("and+{stem}"),
        format!("{stem}-and?"),
        format!("{stem}-or"),
        format!("or+{stem}"),
    ];
    for part in &parts {
        builder.check_symbol_free(&names::symbol_name(&[part])?)?;
    }
    Ok(parts)
}
