//! Terminal normalization.
//!
//! The parser matches one token per terminal. A multi-token terminal
//! `in the` is rewritten in place to a term-sequence rule over synthesized
//! single-token symbols:
//!
//! ```text
//! [x] -> "in the"      becomes      [x] -> <tok:in> <tok:the>
//! [x] -> "a b c"       becomes      [x] -> <tok:a> <seq:b c>,  <seq:b c> -> <tok:b> <tok:c>
//! ```
//!
//! An empty terminal becomes a reference to the shared epsilon symbol.

use crate::registry::GrammarBuilder;
use crate::rule::{Features, Rule, RuleKind, SymbolId, TermText};

pub const EMPTY_SYMBOL: &str = "<empty>";
/// The single terminal of [`EMPTY_SYMBOL`]; matches no input.
pub const EMPTY_TERMINAL: &str = "<empty>";

/// Rewrite every multi-token and empty terminal. Returns how many rules
/// were rewritten.
pub(crate) fn normalize_terminals(builder: &mut GrammarBuilder) -> usize {
    let mut rewritten = 0;
    for id in builder.live_symbols() {
        for index in 0..builder.rules(id).len() {
            let RuleKind::Terminal { term, text } = &builder.rules(id)[index].kind else {
                continue;
            };
            let tokens: Vec<String> = term.split_whitespace().map(str::to_string).collect();
            if tokens.len() == 1 {
                continue;
            }
            let text = match text {
                TermText::Verbatim => TermText::Replace(term.clone()),
                other => other.clone(),
            };
            let mut replacement = builder.rules(id)[index].clone();
            if tokens.is_empty() {
                replacement.kind = RuleKind::Nonterminal {
                    rhs: empty_symbol(builder),
                    no_insertion: false,
                };
                replacement.insertion_cost = None;
            } else {
                replacement.kind = RuleKind::TermSequence {
                    rhs: token_chain(builder, &tokens),
                    text,
                };
            }
            tracing::debug!(symbol = %builder.symbol_name(id), "terminal normalized");
            builder.rules_mut(id)[index] = replacement;
            rewritten += 1;
        }
    }
    rewritten
}

/// Symbols for `tokens[0]` and the rest of the chain.
fn token_chain(builder: &mut GrammarBuilder, tokens: &[String]) -> Vec<SymbolId> {
    match tokens {
        [] => Vec::new(),
        [only] => vec![token_symbol(builder, only)],
        [first, rest @ ..] => {
            let head = token_symbol(builder, first);
            let tail = if rest.len() == 1 {
                token_symbol(builder, &rest[0])
            } else {
                let name = format!("<seq:{}>", rest.join(" "));
                let (id, created) = builder.synthesized_symbol(name, true);
                if created {
                    let rhs = token_chain(builder, rest);
                    builder.push_rule(id, lexical_rule(RuleKind::TermSequence {
                        rhs,
                        text: TermText::Verbatim,
                    }));
                }
                id
            };
            vec![head, tail]
        }
    }
}

fn token_symbol(builder: &mut GrammarBuilder, token: &str) -> SymbolId {
    let (id, created) = builder.synthesized_symbol(format!("<tok:{token}>"), true);
    if created {
        builder.push_rule(id, lexical_rule(RuleKind::Terminal {
            term: token.to_string(),
            text: TermText::Verbatim,
        }));
    }
    id
}

fn empty_symbol(builder: &mut GrammarBuilder) -> SymbolId {
    let (id, created) = builder.synthesized_symbol(EMPTY_SYMBOL.to_string(), true);
    if created {
        builder.push_rule(id, lexical_rule(RuleKind::Terminal {
            term: EMPTY_TERMINAL.to_string(),
            text: TermText::Silent,
        }));
    }
    id
}

fn lexical_rule(kind: RuleKind) -> Rule {
    Rule {
        kind,
        semantic: None,
        features: Features::default(),
        insertion_cost: None,
        edit: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleSpec;

    #[test]
    fn multi_token_terminals_become_token_chains() {
        let mut builder = GrammarBuilder::new();
        let phrase = builder
            .add_word("phrase", &["in the end"], &[], Some(1.5))
            .unwrap();
        assert_eq!(normalize_terminals(&mut builder), 1);

        let rule = &builder.rules(phrase)[0];
        let RuleKind::TermSequence { rhs, text } = &rule.kind else {
            panic!("expected term sequence, got {:?}", rule.kind);
        };
        let names: Vec<&str> = rhs.iter().map(|&id| builder.symbol_name(id)).collect();
        assert_eq!(names, vec!["<tok:in>", "<seq:the end>"]);
        assert_eq!(text, &TermText::Replace("in the end".to_string()));
        assert_eq!(rule.insertion_cost, Some(1.5));

        let seq = builder.symbol("<seq:the end>").unwrap();
        let RuleKind::TermSequence { rhs, .. } = &builder.rules(seq)[0].kind else {
            panic!("sequence symbol holds a term sequence");
        };
        let names: Vec<&str> = rhs.iter().map(|&id| builder.symbol_name(id)).collect();
        assert_eq!(names, vec!["<tok:the>", "<tok:end>"]);
    }

    #[test]
    fn token_symbols_are_shared() {
        let mut builder = GrammarBuilder::new();
        builder.add_word("a", &["the end"], &[], None).unwrap();
        builder.add_word("b", &["the start"], &[], None).unwrap();
        normalize_terminals(&mut builder);
        let the = builder.symbol("<tok:the>").unwrap();
        assert_eq!(builder.rules(the).len(), 1);
    }

    #[test]
    fn empty_terminals_reference_epsilon() {
        let mut builder = GrammarBuilder::new();
        let slot = builder.new_symbol(&["optional"]).unwrap();
        builder.add_rule(slot, RuleSpec::terminal("")).unwrap();
        normalize_terminals(&mut builder);
        let empty = builder.symbol(EMPTY_SYMBOL).unwrap();
        assert_eq!(
            builder.rules(slot)[0].kind,
            RuleKind::Nonterminal {
                rhs: empty,
                no_insertion: false
            }
        );
        assert!(matches!(
            &builder.rules(empty)[0].kind,
            RuleKind::Terminal { text: TermText::Silent, .. }
        ));
    }
}
