use lexgram_kernel::{BuildOptions, Grammar};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so `--json` output stays clean.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_options_or_exit(path: Option<&str>) -> BuildOptions {
    let Some(path) = path else {
        return BuildOptions::default();
    };
    BuildOptions::load(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn read_grammar_or_exit(path: &str) -> Grammar {
    Grammar::read_from_path(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read grammar at {path}: {e}");
        std::process::exit(1);
    })
}

pub fn print_json_or_exit<T: serde::Serialize>(value: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("error: failed to render {label} json: {e}");
        std::process::exit(2);
    });
    println!("{rendered}");
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
