use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "lexgram-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_lexgram<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_lexgram");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("lexgram command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be valid json: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn build_into(dir: &Path, extra: &[&str]) -> (PathBuf, Output) {
    let grammar = dir.join("out").join("grammar.json");
    let mut args = vec![
        "build".to_string(),
        "--output".to_string(),
        grammar.display().to_string(),
    ];
    args.extend(extra.iter().map(|arg| arg.to_string()));
    let output = run_lexgram(&args);
    (grammar, output)
}

#[test]
fn build_json_smoke() {
    let tmp = TempDirGuard::new("build-json");
    let (grammar, output) = build_into(tmp.path(), &["--json"]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["modules"], serde_json::json!(["users", "repositories"]));
    let report = &payload["report"];
    assert!(report["rules"].as_u64().unwrap_or(0) > 0);
    assert!(report["insertions"].as_u64().unwrap_or(0) > 0);
    assert_eq!(report["unused"], serde_json::json!([]));

    let document: Value =
        serde_json::from_str(&fs::read_to_string(&grammar).expect("grammar written"))
            .expect("grammar is json");
    assert_eq!(document["grammarKind"], "lexgram.grammar.v1");
    assert_eq!(document["startSymbol"], "[start]");
    assert_eq!(document["digest"], report["digest"]);
}

#[test]
fn build_is_reproducible() {
    let tmp = TempDirGuard::new("build-repro");
    let (grammar, output) = build_into(tmp.path(), &[]);
    assert_success(&output);
    let first = fs::read(&grammar).expect("first build");
    let (_, output) = build_into(tmp.path(), &[]);
    assert_success(&output);
    let second = fs::read(&grammar).expect("second build");
    assert_eq!(first, second);
    assert!(stdout_text(&output).contains("lexgram build"));
}

#[test]
fn build_reads_config_file() {
    let tmp = TempDirGuard::new("build-config");
    let config = tmp.path().join("lexgram.toml");
    fs::write(&config, "[build]\ninclude-trees = true\ncheck-ambiguity = true\n")
        .expect("config written");
    let (grammar, output) = build_into(
        tmp.path(),
        &["--config", config.to_str().expect("utf-8 path")],
    );
    assert_success(&output);
    let text = stdout_text(&output);
    assert!(text.contains("Insertion trees: yes"));
    assert!(text.contains("Ambiguous rule groups:"));
    let document = fs::read_to_string(&grammar).expect("grammar written");
    assert!(document.contains("\"tree\""));
}

#[test]
fn build_rejects_bad_config() {
    let tmp = TempDirGuard::new("build-bad-config");
    let config = tmp.path().join("lexgram.toml");
    fs::write(&config, "[build]\nunknown-option = 1\n").expect("config written");
    let (grammar, output) = build_into(
        tmp.path(),
        &["--config", config.to_str().expect("utf-8 path")],
    );
    assert_failure(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
    assert!(!grammar.exists());
}

#[test]
fn inspect_json_smoke() {
    let tmp = TempDirGuard::new("inspect-json");
    let (grammar, output) = build_into(tmp.path(), &[]);
    assert_success(&output);

    let output = run_lexgram(["inspect", grammar.to_str().expect("utf-8 path"), "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["digestOk"], true);
    assert_eq!(payload["startSymbol"], "[start]");
    assert!(payload["editRules"].as_u64().unwrap_or(0) > 0);
    assert_eq!(payload["entityCategories"], 1);
}

#[test]
fn inspect_prints_symbol_rules() {
    let tmp = TempDirGuard::new("inspect-symbol");
    let (grammar, output) = build_into(tmp.path(), &[]);
    assert_success(&output);

    let output = run_lexgram([
        "inspect",
        grammar.to_str().expect("utf-8 path"),
        "--symbol",
        "[user-obj-filter]",
    ]);
    assert_success(&output);
    let text = stdout_text(&output);
    assert!(text.contains("[nom-1-sg] [follow-negated]  => not(users-followed(..))"));
    assert!(text.contains("<inserted Before 0.5>"));

    let output = run_lexgram([
        "inspect",
        grammar.to_str().expect("utf-8 path"),
        "--symbol",
        "[nowhere]",
    ]);
    assert_failure(&output);
}

#[test]
fn inspect_detects_tampering() {
    let tmp = TempDirGuard::new("inspect-tamper");
    let (grammar, output) = build_into(tmp.path(), &[]);
    assert_success(&output);

    let mut document: Value =
        serde_json::from_str(&fs::read_to_string(&grammar).expect("grammar written"))
            .expect("grammar is json");
    document["ruleSets"]["[by]"] = serde_json::json!([{ "rhs": { "terminal": "near" } }]);
    fs::write(&grammar, serde_json::to_string_pretty(&document).expect("render"))
        .expect("tampered grammar written");

    let output = run_lexgram(["inspect", grammar.to_str().expect("utf-8 path"), "--json"]);
    assert_failure(&output);
    assert_eq!(parse_json_stdout(&output)["digestOk"], false);
}
