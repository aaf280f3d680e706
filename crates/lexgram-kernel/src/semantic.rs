//! Semantic registry and composition.
//!
//! A semantic is a named primitive the downstream parser composes into a
//! query. Functions take `min_params..=max_params` children; arguments are
//! leaves standing for a literal value.
//!
//! Composition comes in two shapes:
//! - [`RuleSemantic::Fixed`]: a complete tree built now, with [`SemanticRegistry::reduce`].
//! - [`RuleSemantic::Deferred`]: a chain of functions the parser applies to
//!   the semantics of a rule's right-hand side at parse time.
//!
//! Trees are kept canonical: siblings sorted by rendered form and
//! deduplicated, so two builds that register semantics in different orders
//! still produce identical trees.

use crate::error::GrammarError;
use crate::names;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Interned handle of a registered semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticId(pub(crate) u32);

impl SemanticId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Definition of one semantic primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semantic {
    pub name: String,
    pub min_params: usize,
    pub max_params: usize,
    /// Ranking weight used downstream. Never enforced here.
    pub cost: f64,
    pub is_arg: bool,
    pub forbids_multiple: bool,
}

impl Semantic {
    pub fn function(name: impl Into<String>, min_params: usize, max_params: usize) -> Self {
        Self {
            name: name.into(),
            min_params,
            max_params,
            cost: 0.0,
            is_arg: false,
            forbids_multiple: false,
        }
    }

    pub fn argument(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_params: 0,
            max_params: 0,
            cost: 0.0,
            is_arg: true,
            forbids_multiple: false,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn forbidding_multiple(mut self) -> Self {
        self.forbids_multiple = true;
        self
    }
}

/// One node of a semantic tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticNode {
    semantic: SemanticId,
    children: Vec<SemanticNode>,
}

impl SemanticNode {
    pub fn semantic(&self) -> SemanticId {
        self.semantic
    }

    pub fn children(&self) -> &[SemanticNode] {
        &self.children
    }

    fn collect_ids(&self, out: &mut BTreeSet<SemanticId>) {
        out.insert(self.semantic);
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// An ordered, deduplicated list of sibling nodes.
///
/// Only [`SemanticRegistry`] builds non-empty trees, so every tree in a
/// builder satisfies the arity bounds of its function nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SemanticTree {
    nodes: Vec<SemanticNode>,
}

impl SemanticTree {
    pub fn nodes(&self) -> &[SemanticNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn collect_ids(&self, out: &mut BTreeSet<SemanticId>) {
        for node in &self.nodes {
            node.collect_ids(out);
        }
    }
}

/// Functions applied at parse time, outermost first.
///
/// `[not, users-followed]` attached to a rule whose right-hand side yields
/// `me` becomes `not(users-followed(me))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeferredSemantic {
    chain: Vec<SemanticId>,
}

impl DeferredSemantic {
    pub fn chain(&self) -> &[SemanticId] {
        &self.chain
    }
}

/// The semantic attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleSemantic {
    /// Eagerly reduced; merged with the right-hand side's semantics.
    Fixed(SemanticTree),
    /// Composed with the right-hand side's semantics at parse time.
    Deferred(DeferredSemantic),
}

impl RuleSemantic {
    pub(crate) fn collect_ids(&self, out: &mut BTreeSet<SemanticId>) {
        match self {
            RuleSemantic::Fixed(tree) => tree.collect_ids(out),
            RuleSemantic::Deferred(deferred) => out.extend(deferred.chain.iter().copied()),
        }
    }
}

/// Registry of semantic definitions for one build.
#[derive(Debug, Clone, Default)]
pub struct SemanticRegistry {
    defs: Vec<Semantic>,
    index: BTreeMap<String, SemanticId>,
}

impl SemanticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a semantic. Fails on a duplicate name, impossible arity
    /// bounds, or a negative / non-finite cost.
    pub fn register(&mut self, semantic: Semantic) -> Result<SemanticId, GrammarError> {
        names::validate_part(&semantic.name)?;
        if self.index.contains_key(&semantic.name) {
            return Err(GrammarError::DuplicateSemantic(semantic.name));
        }
        let arity_error = |reason| GrammarError::InvalidArity {
            name: semantic.name.clone(),
            min: semantic.min_params,
            max: semantic.max_params,
            reason,
        };
        if semantic.is_arg && semantic.max_params != 0 {
            return Err(arity_error("arguments take no parameters"));
        }
        if !semantic.is_arg && semantic.max_params == 0 {
            return Err(arity_error("functions take at least one parameter"));
        }
        if semantic.min_params > semantic.max_params {
            return Err(arity_error("minimum exceeds maximum"));
        }
        if !semantic.cost.is_finite() || semantic.cost < 0.0 {
            return Err(GrammarError::InvalidCost {
                owner: format!("semantic {}", semantic.name),
                cost: semantic.cost,
            });
        }

        let id = SemanticId(self.defs.len() as u32);
        self.index.insert(semantic.name.clone(), id);
        self.defs.push(semantic);
        Ok(id)
    }

    pub fn get(&self, id: SemanticId) -> Option<&Semantic> {
        self.defs.get(id.index())
    }

    pub fn definition(&self, id: SemanticId) -> Result<&Semantic, GrammarError> {
        self.get(id)
            .ok_or_else(|| GrammarError::UnknownSemantic(format!("#{}", id.0)))
    }

    pub fn lookup(&self, name: &str) -> Option<SemanticId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: SemanticId) -> &str {
        self.get(id).map_or("<unknown>", |def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemanticId, &Semantic)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (SemanticId(i as u32), def))
    }

    /// A tree holding one leaf: an argument, or a function whose minimum
    /// arity is zero.
    pub fn leaf(&self, id: SemanticId) -> Result<SemanticTree, GrammarError> {
        let def = self.definition(id)?;
        if !def.is_arg && def.min_params > 0 {
            return Err(GrammarError::ArityViolation {
                semantic: def.name.clone(),
                min: def.min_params,
                max: def.max_params,
                count: 0,
            });
        }
        Ok(SemanticTree {
            nodes: vec![SemanticNode {
                semantic: id,
                children: Vec::new(),
            }],
        })
    }

    /// Eagerly compose `parent(children...)`.
    ///
    /// Pure: the registry is never modified, so a failed reduction leaves
    /// nothing behind.
    pub fn reduce(
        &self,
        parent: SemanticId,
        children: &SemanticTree,
    ) -> Result<SemanticTree, GrammarError> {
        let def = self.definition(parent)?;
        if def.is_arg {
            return Err(GrammarError::ArgumentApplied(def.name.clone()));
        }
        self.check_forbidden(&children.nodes)?;
        let count = children.len();
        if count < def.min_params || count > def.max_params {
            return Err(GrammarError::ArityViolation {
                semantic: def.name.clone(),
                min: def.min_params,
                max: def.max_params,
                count,
            });
        }
        Ok(SemanticTree {
            nodes: vec![SemanticNode {
                semantic: parent,
                children: children.nodes.clone(),
            }],
        })
    }

    /// Union of two sibling lists.
    pub fn merge(
        &self,
        a: &SemanticTree,
        b: &SemanticTree,
    ) -> Result<SemanticTree, GrammarError> {
        let mut nodes = a.nodes.clone();
        nodes.extend(b.nodes.iter().cloned());
        self.canonical(nodes)
    }

    /// Validate a deferred chain. Every link must be a function, and every
    /// outer link receives exactly one child (the link inside it).
    pub fn defer(&self, chain: &[SemanticId]) -> Result<DeferredSemantic, GrammarError> {
        let Some((_, outer)) = chain.split_last() else {
            return Err(GrammarError::InvalidAttachment {
                symbol: "deferred semantic".to_string(),
                reason: "empty function chain".to_string(),
            });
        };
        for &id in chain {
            let def = self.definition(id)?;
            if def.is_arg {
                return Err(GrammarError::ArgumentApplied(def.name.clone()));
            }
        }
        for &id in outer {
            let def = self.definition(id)?;
            if def.min_params > 1 {
                return Err(GrammarError::ArityViolation {
                    semantic: def.name.clone(),
                    min: def.min_params,
                    max: def.max_params,
                    count: 1,
                });
            }
        }
        Ok(DeferredSemantic {
            chain: chain.to_vec(),
        })
    }

    /// Apply a deferred chain to concrete children, as the parser would.
    pub fn apply_deferred(
        &self,
        deferred: &DeferredSemantic,
        children: &SemanticTree,
    ) -> Result<SemanticTree, GrammarError> {
        let Some((&inner, outer)) = deferred.chain.split_last() else {
            return Ok(children.clone());
        };
        let mut tree = self.reduce(inner, children)?;
        for &id in outer.iter().rev() {
            tree = self.reduce(id, &tree)?;
        }
        Ok(tree)
    }

    /// Sum of every node's own cost.
    pub fn cost(&self, tree: &SemanticTree) -> f64 {
        tree.nodes.iter().map(|node| self.node_cost(node)).sum()
    }

    fn node_cost(&self, node: &SemanticNode) -> f64 {
        let own = self.get(node.semantic).map_or(0.0, |def| def.cost);
        own + node
            .children
            .iter()
            .map(|child| self.node_cost(child))
            .sum::<f64>()
    }

    /// Render a tree as `f(a,g(b))`; siblings are comma-separated.
    pub fn render(&self, tree: &SemanticTree) -> String {
        tree.nodes
            .iter()
            .map(|node| self.render_node(node))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn render_node(&self, node: &SemanticNode) -> String {
        let name = self.name(node.semantic);
        let is_arg = self.get(node.semantic).is_some_and(|def| def.is_arg);
        if is_arg && node.children.is_empty() {
            return name.to_string();
        }
        let children: Vec<String> = node
            .children
            .iter()
            .map(|child| self.render_node(child))
            .collect();
        format!("{name}({})", children.join(","))
    }

    pub fn render_rule_semantic(&self, semantic: &RuleSemantic) -> String {
        match semantic {
            RuleSemantic::Fixed(tree) => self.render(tree),
            RuleSemantic::Deferred(deferred) => {
                let mut out = String::new();
                for id in &deferred.chain {
                    out.push_str(self.name(*id));
                    out.push('(');
                }
                out.push_str(&")".repeat(deferred.chain.len()));
                out
            }
        }
    }

    fn canonical(&self, nodes: Vec<SemanticNode>) -> Result<SemanticTree, GrammarError> {
        let mut keyed: Vec<(String, SemanticNode)> = nodes
            .into_iter()
            .map(|node| (self.render_node(&node), node))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        let nodes: Vec<SemanticNode> = keyed.into_iter().map(|(_, node)| node).collect();
        self.check_forbidden(&nodes)?;
        Ok(SemanticTree { nodes })
    }

    fn check_forbidden(&self, nodes: &[SemanticNode]) -> Result<(), GrammarError> {
        let mut seen = BTreeSet::new();
        for node in nodes {
            let def = self.definition(node.semantic)?;
            if def.forbids_multiple && !seen.insert(node.semantic) {
                return Err(GrammarError::ForbiddenMultiple(def.name.clone()));
            }
        }
        Ok(())
    }
}
