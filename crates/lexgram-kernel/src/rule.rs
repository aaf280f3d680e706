//! Rules: the alternative expansions of a symbol.
//!
//! A rule is a tagged variant over its right-hand side. Each variant carries
//! only the fields that mean something for it: only binary rules can be
//! transposed, only symbol rules have positions to exclude from insertion,
//! only lexical rules can be inserted.

use crate::semantic::{DeferredSemantic, RuleSemantic, SemanticTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Interned handle of a registered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned handle of a registered entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityCategoryId(pub(crate) u32);

impl EntityCategoryId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonNumber {
    OneSg,
    ThreeSg,
    Pl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrammaticalCase {
    Nom,
    Obj,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tense {
    Present,
    Past,
}

/// Grammatical feature tags. Stored and emitted; never interpreted here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_number: Option<PersonNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<GrammaticalCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tense: Option<Tense>,
}

impl Features {
    pub fn is_empty(&self) -> bool {
        self.person_number.is_none() && self.case.is_none() && self.tense.is_none()
    }

    pub fn person_number(person_number: PersonNumber) -> Self {
        Self {
            person_number: Some(person_number),
            ..Self::default()
        }
    }

    pub fn case(case: GrammaticalCase) -> Self {
        Self {
            case: Some(case),
            ..Self::default()
        }
    }

    pub fn tense(tense: Tense) -> Self {
        Self {
            tense: Some(tense),
            ..Self::default()
        }
    }
}

/// Inflected forms of one lexical concept; the downstream consumer picks the
/// form matching the features of the surrounding derivation.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Inflections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_sg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_sg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<String>,
}

/// What a lexical rule contributes to the display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermText {
    /// The matched input itself.
    #[default]
    Verbatim,
    /// A canonical replacement (substitutions, normalized phrases).
    Replace(String),
    /// A conjugation table.
    Inflected(Inflections),
    /// Nothing: a stop word.
    Silent,
}

impl TermText {
    pub fn is_verbatim(&self) -> bool {
        matches!(self, TermText::Verbatim)
    }
}

/// A piece of inserted display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSegment {
    Literal(String),
    Inflected(Inflections),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertPosition {
    /// The omitted element stood before the remaining one.
    Before,
    /// The omitted element stood after the remaining one.
    After,
}

/// Provenance of an inserted element: the derivation that produced its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionTree {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<TextSegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InsertionTree>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub cost: f64,
    pub position: InsertPosition,
    pub text: Vec<TextSegment>,
    pub semantic: Option<SemanticTree>,
    pub tree: Option<InsertionTree>,
}

/// Marks a rule synthesized by the edit stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insertion(Insertion),
    Transposition { cost: f64 },
}

/// The shape of a rule's right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Nonterminal {
        rhs: SymbolId,
        no_insertion: bool,
    },
    Binary {
        rhs: [SymbolId; 2],
        transposition_cost: Option<f64>,
        no_insertion_indexes: BTreeSet<usize>,
    },
    Terminal {
        term: String,
        text: TermText,
    },
    /// One or two term-sequence symbols read as a single lexical unit.
    TermSequence {
        rhs: Vec<SymbolId>,
        text: TermText,
    },
    Placeholder {
        category: EntityCategoryId,
    },
}

impl RuleKind {
    /// Symbols referenced on the right-hand side.
    pub fn rhs_symbols(&self) -> Vec<SymbolId> {
        match self {
            RuleKind::Nonterminal { rhs, .. } => vec![*rhs],
            RuleKind::Binary { rhs, .. } => rhs.to_vec(),
            RuleKind::TermSequence { rhs, .. } => rhs.clone(),
            RuleKind::Terminal { .. } | RuleKind::Placeholder { .. } => Vec::new(),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            RuleKind::Terminal { .. } | RuleKind::TermSequence { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub semantic: Option<RuleSemantic>,
    pub features: Features,
    /// Only lexical rules carry one; finite means the rule's text may be
    /// suggested as an insertion at this cost.
    pub insertion_cost: Option<f64>,
    pub edit: Option<Edit>,
}

impl Rule {
    pub fn is_edit(&self) -> bool {
        self.edit.is_some()
    }
}

/// Right-hand side as written by a content module.
#[derive(Debug, Clone, PartialEq)]
pub enum RhsSpec {
    Symbols(Vec<SymbolId>),
    /// Symbol names resolved when the rule is added.
    Named(Vec<String>),
    Terminal { term: String, text: TermText },
    TermSequence { rhs: Vec<SymbolId>, text: TermText },
    Placeholder(EntityCategoryId),
}

/// Declarative input to [`crate::registry::GrammarBuilder::add_rule`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    pub rhs: RhsSpec,
    pub semantic: Option<RuleSemantic>,
    pub features: Features,
    pub insertion_cost: Option<f64>,
    pub transposition_cost: Option<f64>,
    pub no_insertion_indexes: Vec<usize>,
}

impl RuleSpec {
    fn with_rhs(rhs: RhsSpec) -> Self {
        Self {
            rhs,
            semantic: None,
            features: Features::default(),
            insertion_cost: None,
            transposition_cost: None,
            no_insertion_indexes: Vec::new(),
        }
    }

    pub fn symbols(rhs: &[SymbolId]) -> Self {
        Self::with_rhs(RhsSpec::Symbols(rhs.to_vec()))
    }

    pub fn unary(rhs: SymbolId) -> Self {
        Self::symbols(&[rhs])
    }

    pub fn binary(a: SymbolId, b: SymbolId) -> Self {
        Self::symbols(&[a, b])
    }

    pub fn named<S: AsRef<str>>(names: &[S]) -> Self {
        Self::with_rhs(RhsSpec::Named(
            names.iter().map(|name| name.as_ref().to_string()).collect(),
        ))
    }

    pub fn terminal(term: impl Into<String>) -> Self {
        Self::with_rhs(RhsSpec::Terminal {
            term: term.into(),
            text: TermText::Verbatim,
        })
    }

    pub fn term_sequence(rhs: &[SymbolId]) -> Self {
        Self::with_rhs(RhsSpec::TermSequence {
            rhs: rhs.to_vec(),
            text: TermText::Verbatim,
        })
    }

    pub fn placeholder(category: EntityCategoryId) -> Self {
        Self::with_rhs(RhsSpec::Placeholder(category))
    }

    /// Set the display text of a lexical rule; ignored on other shapes.
    pub fn text(mut self, new_text: TermText) -> Self {
        match &mut self.rhs {
            RhsSpec::Terminal { text, .. } | RhsSpec::TermSequence { text, .. } => {
                *text = new_text;
            }
            _ => {}
        }
        self
    }

    pub fn semantic(mut self, semantic: RuleSemantic) -> Self {
        self.semantic = Some(semantic);
        self
    }

    pub fn fixed(self, tree: SemanticTree) -> Self {
        self.semantic(RuleSemantic::Fixed(tree))
    }

    pub fn deferred(self, deferred: DeferredSemantic) -> Self {
        self.semantic(RuleSemantic::Deferred(deferred))
    }

    pub fn features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }

    pub fn transposition_cost(mut self, cost: f64) -> Self {
        self.transposition_cost = Some(cost);
        self
    }

    pub fn no_insertion(mut self, indexes: &[usize]) -> Self {
        self.no_insertion_indexes.extend_from_slice(indexes);
        self
    }
}
