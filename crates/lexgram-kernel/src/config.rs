//! Build options, optionally loaded from a TOML file:
//!
//! ```toml
//! [build]
//! include-trees = true
//! quiet = false
//! check-ambiguity = true
//! ```

use crate::error::GrammarError;
use crate::finalize::UnusedPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BuildOptions {
    /// Emit the provenance tree of every insertion.
    pub include_trees: bool,
    /// Downgrade unreachable components from an error to a warning.
    pub quiet: bool,
    /// Run the best-effort ambiguity report after edit-rule synthesis.
    pub check_ambiguity: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    build: BuildOptions,
}

impl BuildOptions {
    pub fn unused_policy(&self) -> UnusedPolicy {
        if self.quiet {
            UnusedPolicy::Warn
        } else {
            UnusedPolicy::Deny
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, GrammarError> {
        parse(text).map_err(|e| GrammarError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GrammarError::Config(format!("{}: {e}", path.display())))?;
        parse(&text).map_err(|e| GrammarError::Config(format!("{}: {e}", path.display())))
    }
}

fn parse(text: &str) -> Result<BuildOptions, toml::de::Error> {
    toml::from_str::<ConfigFile>(text).map(|file| file.build)
}
