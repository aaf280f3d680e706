//! The serialized grammar document handed to the downstream parser.
//!
//! Everything is keyed by name in `BTreeMap`s and rule rows are put in
//! canonical order, so the document depends only on what was registered,
//! not on the order it was registered in.

use crate::error::GrammarError;
use crate::finalize::sort;
use crate::registry::GrammarBuilder;
use crate::rule::{
    Edit, Features, InsertPosition, InsertionTree, Rule, RuleKind, SymbolId, TermText, TextSegment,
};
use crate::semantic::{RuleSemantic, SemanticNode, SemanticRegistry, SemanticTree};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SCHEMA: u32 = 1;
pub const GRAMMAR_KIND: &str = "lexgram.grammar.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grammar {
    pub schema: u32,
    pub grammar_kind: String,
    pub start_symbol: String,
    /// SHA-256 over `ruleSets`, `semantics` and `entityCategories`.
    pub digest: String,
    pub rule_sets: BTreeMap<String, Vec<RuleRow>>,
    pub semantics: BTreeMap<String, SemanticDef>,
    pub entity_categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticDef {
    pub min_params: usize,
    pub max_params: usize,
    pub cost: f64,
    pub is_arg: bool,
    pub forbids_multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RhsRow {
    Symbols(Vec<String>),
    Terminal(String),
    TermSequence(Vec<String>),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticNodeRow {
    pub semantic: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SemanticNodeRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticRow {
    Fixed(Vec<SemanticNodeRow>),
    /// Function names, outermost first.
    Deferred(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionRow {
    pub cost: f64,
    pub position: InsertPosition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<TextSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<Vec<SemanticNodeRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<InsertionTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditRow {
    Insertion(InsertionRow),
    Transposition { cost: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRow {
    pub rhs: RhsRow,
    /// Display text of lexical rules; absent means the matched input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TermText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticRow>,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub features: Features,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertion_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transposition_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_insertion_indexes: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditRow>,
}

impl RuleRow {
    pub fn new(rhs: RhsRow) -> Self {
        Self {
            rhs,
            text: None,
            semantic: None,
            features: Features::default(),
            insertion_cost: None,
            transposition_cost: None,
            no_insertion_indexes: Vec::new(),
            edit: None,
        }
    }

    /// Cost of taking this rule at parse time: the edit cost, if any.
    pub fn edit_cost(&self) -> f64 {
        match &self.edit {
            Some(EditRow::Insertion(insertion)) => insertion.cost,
            Some(EditRow::Transposition { cost }) => *cost,
            None => 0.0,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DigestInput<'a> {
    rule_sets: &'a BTreeMap<String, Vec<RuleRow>>,
    semantics: &'a BTreeMap<String, SemanticDef>,
    entity_categories: &'a BTreeMap<String, Vec<String>>,
}

impl Grammar {
    /// Serialize the builder's live components into a document.
    pub fn from_builder(builder: &GrammarBuilder) -> Result<Self, GrammarError> {
        let mut rule_sets = BTreeMap::new();
        for id in builder.live_symbols() {
            let mut rows: Vec<RuleRow> = builder
                .rules(id)
                .iter()
                .map(|rule| rule_row(builder, rule))
                .collect();
            sort::canonicalize(&mut rows)?;
            rule_sets.insert(builder.symbol_name(id).to_string(), rows);
        }

        let semantics = builder
            .live_semantics()
            .map(|(_, def)| {
                (
                    def.name.clone(),
                    SemanticDef {
                        min_params: def.min_params,
                        max_params: def.max_params,
                        cost: def.cost,
                        is_arg: def.is_arg,
                        forbids_multiple: def.forbids_multiple,
                    },
                )
            })
            .collect();

        let entity_categories = builder
            .live_entity_categories()
            .map(|(id, category)| {
                (
                    builder.entity_category_name(id),
                    category.instances.clone(),
                )
            })
            .collect();

        let mut grammar = Self {
            schema: SCHEMA,
            grammar_kind: GRAMMAR_KIND.to_string(),
            start_symbol: builder.symbol_name(builder.start()).to_string(),
            digest: String::new(),
            rule_sets,
            semantics,
            entity_categories,
        };
        grammar.digest = grammar.compute_digest()?;
        Ok(grammar)
    }

    /// Recompute the content digest.
    pub fn compute_digest(&self) -> Result<String, GrammarError> {
        let bytes = serde_json::to_vec(&DigestInput {
            rule_sets: &self.rule_sets,
            semantics: &self.semantics,
            entity_categories: &self.entity_categories,
        })
        .map_err(|e| GrammarError::Serialize(e.to_string()))?;
        let output = Sha256::digest(&bytes);
        let mut rendered = String::with_capacity(output.len() * 2);
        for byte in output {
            rendered.push_str(format!("{byte:02x}").as_str());
        }
        Ok(rendered)
    }

    pub fn rules(&self, symbol: &str) -> &[RuleRow] {
        self.rule_sets.get(symbol).map_or(&[], Vec::as_slice)
    }

    pub fn rule_count(&self) -> usize {
        self.rule_sets.values().map(Vec::len).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, GrammarError> {
        serde_json::to_string_pretty(self).map_err(|e| GrammarError::Serialize(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, GrammarError> {
        serde_json::from_str(text).map_err(|e| GrammarError::Serialize(e.to_string()))
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| GrammarError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Write the document atomically: a temp file next to `path`, then rename.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), GrammarError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| GrammarError::Io(format!("{}: {e}", parent.display())))?;
        }
        let payload = self.to_json_pretty()?;

        let tmp_path = tmp_write_path(path);
        let write_result = (|| -> Result<(), GrammarError> {
            let io = |e: std::io::Error| GrammarError::Io(format!("{}: {e}", tmp_path.display()));
            let file = File::create(&tmp_path).map_err(io)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(payload.as_bytes()).map_err(io)?;
            writer.write_all(b"\n").map_err(io)?;
            writer.flush().map_err(io)?;
            let file = writer.into_inner().map_err(|e| io(e.into_error()))?;
            file.sync_all().map_err(io)?;
            Ok(())
        })();
        if let Err(error) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(error);
        }

        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            GrammarError::Io(format!(
                "{} -> {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

fn rule_row(builder: &GrammarBuilder, rule: &Rule) -> RuleRow {
    let lexical_text = |text: &TermText| (!text.is_verbatim()).then(|| text.clone());

    let mut row = match &rule.kind {
        RuleKind::Nonterminal { rhs, no_insertion } => {
            let mut row = RuleRow::new(RhsRow::Symbols(symbol_names(builder, &[*rhs])));
            if *no_insertion {
                row.no_insertion_indexes = vec![0];
            }
            row
        }
        RuleKind::Binary {
            rhs,
            transposition_cost,
            no_insertion_indexes,
        } => {
            let mut row = RuleRow::new(RhsRow::Symbols(symbol_names(builder, rhs)));
            row.transposition_cost = *transposition_cost;
            row.no_insertion_indexes = no_insertion_indexes.iter().copied().collect();
            row
        }
        RuleKind::Terminal { term, text } => {
            let mut row = RuleRow::new(RhsRow::Terminal(term.clone()));
            row.text = lexical_text(text);
            row
        }
        RuleKind::TermSequence { rhs, text } => {
            let mut row = RuleRow::new(RhsRow::TermSequence(symbol_names(builder, rhs)));
            row.text = lexical_text(text);
            row
        }
        RuleKind::Placeholder { category } => {
            RuleRow::new(RhsRow::Placeholder(builder.entity_category_name(*category)))
        }
    };

    let semantics = builder.semantics();
    row.semantic = rule.semantic.as_ref().map(|semantic| match semantic {
        RuleSemantic::Fixed(tree) => SemanticRow::Fixed(tree_rows(semantics, tree)),
        RuleSemantic::Deferred(deferred) => SemanticRow::Deferred(
            deferred
                .chain()
                .iter()
                .map(|&id| semantics.name(id).to_string())
                .collect(),
        ),
    });
    row.features = rule.features;
    row.insertion_cost = rule.insertion_cost;
    row.edit = rule.edit.as_ref().map(|edit| match edit {
        Edit::Insertion(insertion) => EditRow::Insertion(InsertionRow {
            cost: insertion.cost,
            position: insertion.position,
            text: insertion.text.clone(),
            semantic: insertion
                .semantic
                .as_ref()
                .map(|tree| tree_rows(semantics, tree)),
            tree: insertion.tree.clone(),
        }),
        Edit::Transposition { cost } => EditRow::Transposition { cost: *cost },
    });
    row
}

fn symbol_names(builder: &GrammarBuilder, ids: &[SymbolId]) -> Vec<String> {
    ids.iter()
        .map(|&id| builder.symbol_name(id).to_string())
        .collect()
}

fn tree_rows(semantics: &SemanticRegistry, tree: &SemanticTree) -> Vec<SemanticNodeRow> {
    tree.nodes()
        .iter()
        .map(|node| node_row(semantics, node))
        .collect()
}

fn node_row(semantics: &SemanticRegistry, node: &SemanticNode) -> SemanticNodeRow {
    SemanticNodeRow {
        semantic: semantics.name(node.semantic()).to_string(),
        children: node
            .children()
            .iter()
            .map(|child| node_row(semantics, child))
            .collect(),
    }
}

/// Render semantic rows the way [`SemanticRegistry::render`] renders trees.
pub fn render_rows(rows: &[SemanticNodeRow], grammar: &Grammar) -> String {
    rows.iter()
        .map(|row| {
            let is_arg = grammar
                .semantics
                .get(&row.semantic)
                .is_some_and(|def| def.is_arg);
            if is_arg && row.children.is_empty() {
                row.semantic.clone()
            } else {
                format!("{}({})", row.semantic, render_rows(&row.children, grammar))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
