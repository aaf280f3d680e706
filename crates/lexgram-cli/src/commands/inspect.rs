use crate::support::{print_json_or_exit, read_grammar_or_exit, yes_no};
use lexgram_kernel::output::{EditRow, Grammar, RhsRow, RuleRow, SemanticRow, render_rows};
use serde_json::json;

pub fn run(path: String, symbol: Option<String>, json_output: bool) {
    let grammar = read_grammar_or_exit(&path);
    let digest_ok = grammar
        .compute_digest()
        .is_ok_and(|digest| digest == grammar.digest);

    if let Some(symbol) = symbol {
        let Some(rows) = grammar.rule_sets.get(&symbol) else {
            eprintln!("error: symbol not found: {symbol}");
            std::process::exit(1);
        };
        if json_output {
            print_json_or_exit(&json!({ "symbol": symbol, "rules": rows }), "rules");
            return;
        }
        println!("{symbol}");
        for row in rows {
            println!("  {}", describe(&grammar, row));
        }
        return;
    }

    let edit_rules = grammar
        .rule_sets
        .values()
        .flatten()
        .filter(|row| row.edit.is_some())
        .count();
    if json_output {
        print_json_or_exit(
            &json!({
                "path": path,
                "schema": grammar.schema,
                "grammarKind": grammar.grammar_kind,
                "startSymbol": grammar.start_symbol,
                "digest": grammar.digest,
                "digestOk": digest_ok,
                "symbols": grammar.rule_sets.len(),
                "rules": grammar.rule_count(),
                "editRules": edit_rules,
                "semantics": grammar.semantics.len(),
                "entityCategories": grammar.entity_categories.len(),
            }),
            "inspect",
        );
    } else {
        println!("lexgram inspect");
        println!("  Path: {path}");
        println!("  Kind: {} (schema {})", grammar.grammar_kind, grammar.schema);
        println!("  Start symbol: {}", grammar.start_symbol);
        println!("  Digest: {}", grammar.digest);
        println!("  Digest verified: {}", yes_no(digest_ok));
        println!("  Symbols: {}", grammar.rule_sets.len());
        println!("  Rules: {} ({edit_rules} edit)", grammar.rule_count());
        println!("  Semantics: {}", grammar.semantics.len());
        println!("  Entity categories: {}", grammar.entity_categories.len());
    }
    if !digest_ok {
        std::process::exit(1);
    }
}

fn describe(grammar: &Grammar, row: &RuleRow) -> String {
    let mut out = match &row.rhs {
        RhsRow::Symbols(symbols) | RhsRow::TermSequence(symbols) => symbols.join(" "),
        RhsRow::Terminal(term) => format!("\"{term}\""),
        RhsRow::Placeholder(category) => category.clone(),
    };
    match &row.semantic {
        Some(SemanticRow::Fixed(rows)) => {
            out.push_str(&format!("  => {}", render_rows(rows, grammar)));
        }
        Some(SemanticRow::Deferred(chain)) => {
            out.push_str(&format!("  => {}(..)", chain.join("(")));
            out.push_str(&")".repeat(chain.len().saturating_sub(1)));
        }
        None => {}
    }
    if let Some(cost) = row.insertion_cost {
        out.push_str(&format!("  [insert {cost}]"));
    }
    match &row.edit {
        Some(EditRow::Insertion(insertion)) => {
            out.push_str(&format!(
                "  <inserted {:?} {}>",
                insertion.position, insertion.cost
            ));
        }
        Some(EditRow::Transposition { cost }) => {
            out.push_str(&format!("  <transposed {cost}>"));
        }
        None => {}
    }
    out
}
