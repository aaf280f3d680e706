//! Best-effort ambiguity report.
//!
//! Only one class is detected: two rules of the same symbol with the same
//! right-hand side, which typically means an insertion rule duplicates an
//! existing expansion. Deeper ambiguity is left to the parser.

use crate::registry::GrammarBuilder;
use crate::rule::RuleKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ambiguity {
    pub symbol: String,
    pub rhs: Vec<String>,
    pub rules: usize,
}

pub fn find_ambiguities(builder: &GrammarBuilder) -> Vec<Ambiguity> {
    let mut found = Vec::new();
    for id in builder.live_symbols() {
        let mut groups: BTreeMap<Vec<String>, usize> = BTreeMap::new();
        for rule in builder.rules(id) {
            *groups.entry(rhs_key(builder, &rule.kind)).or_default() += 1;
        }
        let symbol = builder.symbol_name(id);
        for (rhs, rules) in groups {
            if rules > 1 {
                tracing::warn!(symbol = %symbol, rhs = %rhs.join(" "), rules, "ambiguous expansions");
                found.push(Ambiguity {
                    symbol: symbol.to_string(),
                    rhs,
                    rules,
                });
            }
        }
    }
    found.sort_by(|a, b| (&a.symbol, &a.rhs).cmp(&(&b.symbol, &b.rhs)));
    found
}

fn rhs_key(builder: &GrammarBuilder, kind: &RuleKind) -> Vec<String> {
    match kind {
        RuleKind::Terminal { term, .. } => vec![format!("{term:?}")],
        RuleKind::Placeholder { category } => vec![builder.entity_category_name(*category)],
        other => other
            .rhs_symbols()
            .into_iter()
            .map(|id| builder.symbol_name(id).to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleSpec;
    use crate::semantic::Semantic;

    #[test]
    fn rules_sharing_a_rhs_are_reported() {
        let mut builder = GrammarBuilder::new();
        let x = builder.new_semantic(Semantic::argument("x")).unwrap();
        let y = builder.new_semantic(Semantic::argument("y")).unwrap();
        let (x, y) = (builder.leaf_semantic(x).unwrap(), builder.leaf_semantic(y).unwrap());
        let word = builder.add_word("word", &["word"], &[], None).unwrap();
        let slot = builder.new_symbol(&["slot"]).unwrap();
        builder.add_rule(slot, RuleSpec::unary(word).fixed(x)).unwrap();
        builder.add_rule(slot, RuleSpec::unary(word).fixed(y)).unwrap();

        assert_eq!(
            find_ambiguities(&builder),
            vec![Ambiguity {
                symbol: "[slot]".to_string(),
                rhs: vec!["[word]".to_string()],
                rules: 2,
            }]
        );
    }

    #[test]
    fn distinct_expansions_are_not_ambiguous() {
        let mut builder = GrammarBuilder::new();
        builder.add_word("word", &["a", "b"], &[], None).unwrap();
        assert!(find_ambiguities(&builder).is_empty());
    }
}
