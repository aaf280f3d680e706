use crate::support::{load_options_or_exit, print_json_or_exit, yes_no};
use lexgram_kernel::{BuildFailure, compile, toy::toy_modules};
use serde_json::json;

pub struct Args {
    pub output: String,
    pub config: Option<String>,
    pub trees: bool,
    pub quiet: bool,
    pub check_ambiguity: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut options = load_options_or_exit(args.config.as_deref());
    options.include_trees |= args.trees;
    options.quiet |= args.quiet;
    options.check_ambiguity |= args.check_ambiguity;

    let modules = toy_modules();
    let compiled = compile(&modules, &options).unwrap_or_else(|err| {
        match &err {
            BuildFailure::Modules(failures) => {
                for failure in failures {
                    eprintln!("error: {failure}");
                }
            }
            BuildFailure::Finalize(error) => eprintln!("error: {error}"),
        }
        std::process::exit(1);
    });

    compiled
        .grammar
        .write_to_path(&args.output)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        });
    tracing::info!(path = %args.output, digest = %compiled.report.digest, "grammar written");

    let report = &compiled.report;
    if args.json {
        print_json_or_exit(
            &json!({
                "output": args.output,
                "modules": modules.iter().map(|m| m.name()).collect::<Vec<_>>(),
                "report": report,
            }),
            "build report",
        );
        return;
    }

    println!("lexgram build");
    println!("  Output: {}", args.output);
    println!("  Digest: {}", report.digest);
    println!("  Symbols: {}", report.symbols);
    println!("  Rules: {}", report.rules);
    println!("  Semantics: {}", report.semantics);
    println!("  Entity categories: {}", report.entity_categories);
    println!("  Normalized terminals: {}", report.normalized_terminals);
    println!(
        "  Edit rules: {} insertions, {} transpositions ({} insertable symbols)",
        report.insertions, report.transpositions, report.insertable_symbols
    );
    println!("  Insertion trees: {}", yes_no(options.include_trees));
    if !report.unused.is_empty() {
        println!("  Unused (removed): {}", report.unused.join(", "));
    }
    if options.check_ambiguity {
        println!("  Ambiguous rule groups: {}", report.ambiguities.len());
        for ambiguity in &report.ambiguities {
            println!(
                "    - {} -> {} ({} rules)",
                ambiguity.symbol,
                ambiguity.rhs.join(" "),
                ambiguity.rules
            );
        }
    }
}
