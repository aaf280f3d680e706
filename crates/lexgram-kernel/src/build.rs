//! Build driver.
//!
//! Content modules register their symbols against one explicit
//! [`BuildContext`]; once every module has run, the context is finalized
//! into a [`Grammar`]. Modules never see each other, only the shared
//! registries, so helpers here are get-or-create and module order does not
//! affect the output.

use crate::category::{Category, CategoryFactory, CategorySpec};
use crate::config::BuildOptions;
use crate::conjunction::Conjunctions;
use crate::error::GrammarError;
use crate::finalize::{self, BuildReport};
use crate::negation::{NegationRuleSet, NegationRuleSets};
use crate::output::Grammar;
use crate::registry::GrammarBuilder;
use crate::rule::SymbolId;
use crate::semantic::{Semantic, SemanticId};
use thiserror::Error;

/// Every registry a content module may touch.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub grammar: GrammarBuilder,
    pub conjunctions: Conjunctions,
    pub negation: NegationRuleSets,
    pub categories: CategoryFactory,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The category named `spec.singular`, created on first use.
    pub fn category(&mut self, spec: CategorySpec) -> Result<Category, GrammarError> {
        if let Some(category) = self.categories.get(&spec.singular) {
            return Ok(*category);
        }
        self.categories
            .create(&mut self.grammar, &mut self.conjunctions, spec)
    }

    /// A semantic by name, registered on first use. A later request with a
    /// different definition is a duplicate.
    pub fn semantic(&mut self, semantic: Semantic) -> Result<SemanticId, GrammarError> {
        let registry = self.grammar.semantics();
        if let Some(id) = registry.lookup(&semantic.name) {
            return match registry.get(id) {
                Some(existing) if *existing == semantic => Ok(id),
                _ => Err(GrammarError::DuplicateSemantic(semantic.name)),
            };
        }
        self.grammar.new_semantic(semantic)
    }

    pub fn conjunction(&mut self, base: SymbolId) -> Result<SymbolId, GrammarError> {
        self.conjunctions.create(&mut self.grammar, base)
    }

    pub fn negation(
        &mut self,
        conflicting: Option<SymbolId>,
    ) -> Result<NegationRuleSet, GrammarError> {
        self.negation.create_rule_set(&mut self.grammar, conflicting)
    }
}

/// A unit of grammar content.
pub trait ContentModule {
    fn name(&self) -> &str;
    fn register(&self, ctx: &mut BuildContext) -> Result<(), GrammarError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{module}: {error}")]
pub struct ModuleFailure {
    pub module: String,
    pub error: GrammarError,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildFailure {
    #[error("{} content module(s) failed: {}", .0.len(), render_failures(.0))]
    Modules(Vec<ModuleFailure>),
    #[error("finalization failed: {0}")]
    Finalize(#[from] GrammarError),
}

fn render_failures(failures: &[ModuleFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub grammar: Grammar,
    pub report: BuildReport,
}

/// Run every module, then finalize. Module failures are collected across
/// all modules; nothing is finalized if any module failed.
pub fn compile(
    modules: &[&dyn ContentModule],
    options: &BuildOptions,
) -> Result<Compilation, BuildFailure> {
    let mut ctx = BuildContext::new();
    let mut failures = Vec::new();
    for module in modules {
        match module.register(&mut ctx) {
            Ok(()) => tracing::debug!(module = module.name(), "content module registered"),
            Err(error) => {
                tracing::error!(module = module.name(), %error, "content module failed");
                failures.push(ModuleFailure {
                    module: module.name().to_string(),
                    error,
                });
            }
        }
    }
    if !failures.is_empty() {
        return Err(BuildFailure::Modules(failures));
    }

    let (grammar, report) = finalize::finalize(&mut ctx.grammar, options)?;
    tracing::info!(
        modules = modules.len(),
        rules = report.rules,
        "grammar compiled"
    );
    Ok(Compilation { grammar, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleSpec;

    struct Words;

    impl ContentModule for Words {
        fn name(&self) -> &str {
            "words"
        }

        fn register(&self, ctx: &mut BuildContext) -> Result<(), GrammarError> {
            let hello = ctx.grammar.add_word("hello", &["hello"], &["hi"], None)?;
            let start = ctx.grammar.start();
            ctx.grammar.add_rule(start, RuleSpec::unary(hello))?;
            Ok(())
        }
    }

    struct Broken(&'static str);

    impl ContentModule for Broken {
        fn name(&self) -> &str {
            self.0
        }

        fn register(&self, ctx: &mut BuildContext) -> Result<(), GrammarError> {
            let start = ctx.grammar.start();
            ctx.grammar
                .add_rule(start, RuleSpec::named(&["[missing]"]))
                .map(|_| ())
        }
    }

    #[test]
    fn modules_compile_into_a_grammar() {
        let compiled = compile(&[&Words], &BuildOptions::default()).unwrap();
        assert_eq!(compiled.grammar.start_symbol, "[start]");
        assert_eq!(compiled.grammar.rules("[hello]").len(), 2);
        assert_eq!(compiled.report.digest, compiled.grammar.digest);
    }

    #[test]
    fn every_module_failure_is_reported() {
        let err = compile(&[&Broken("first"), &Words, &Broken("second")], &BuildOptions::default())
            .expect_err("two modules fail");
        let BuildFailure::Modules(failures) = &err else {
            panic!("expected module failures, got {err}");
        };
        let modules: Vec<&str> = failures.iter().map(|f| f.module.as_str()).collect();
        assert_eq!(modules, vec!["first", "second"]);
        assert_eq!(
            failures[0].error,
            GrammarError::UnknownSymbol("[missing]".to_string())
        );
        assert!(err.to_string().starts_with("2 content module(s) failed"));
    }

    #[test]
    fn finalization_errors_surface() {
        let err = compile(&[], &BuildOptions::default()).expect_err("empty grammar");
        assert_eq!(err, BuildFailure::Finalize(GrammarError::EmptyGrammar("[start]".to_string())));
    }

    #[test]
    fn shared_semantics_are_get_or_create() {
        let mut ctx = BuildContext::new();
        let a = ctx.semantic(Semantic::function("follows", 1, 1)).unwrap();
        let b = ctx.semantic(Semantic::function("follows", 1, 1)).unwrap();
        assert_eq!(a, b);
        let err = ctx
            .semantic(Semantic::function("follows", 1, 2))
            .expect_err("conflicting definition");
        assert_eq!(err, GrammarError::DuplicateSemantic("follows".to_string()));
    }
}
