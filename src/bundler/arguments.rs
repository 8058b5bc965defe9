//! Argument vector assembly for the packaging tool.
//!
//! Compiles a [`BuildConfig`] into the ordered tokens passed to the tool:
//!
//! ```text
//! --name <name> {--onefile|--onedir} [--icon <icon>] [--hidden-import <module>]*
//!     [--add-data <source><sep><dest>]* <script>
//! ```
//!
//! Assembly is a pure function of the configuration. Hidden imports and data
//! mappings keep their insertion order so repeated runs produce identical,
//! diffable command lines.

use crate::bundler::{BuildConfig, DataMapping, Platform};
use serde::Serialize;
use std::fmt;

/// Ordered tokens passed to the packaging tool, excluding the program itself.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    /// Tokens in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn push(&mut self, token: impl Into<String>) {
        self.0.push(token.into());
    }

    fn flag(&mut self, flag: &str, value: impl Into<String>) {
        self.push(flag);
        self.push(value);
    }
}

/// Renders the tokens as a copy-pasteable shell line.
impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let needs_quotes = token.is_empty()
                || token.contains(|c: char| c.is_whitespace() || "'\"$`;&|".contains(c));
            if needs_quotes {
                write!(f, "'{}'", token.replace('\'', r"'\''"))?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}

/// Joins a data mapping with the platform separator.
pub fn data_token(mapping: &DataMapping, platform: Platform) -> String {
    format!(
        "{}{}{}",
        mapping.source.to_string_lossy(),
        platform.data_separator(),
        mapping.dest
    )
}

/// Compiles a configuration into the tool's argument vector.
///
/// Expects a configuration that has already passed preflight: every icon and
/// data mapping present is emitted as-is.
pub fn assemble(config: &BuildConfig) -> ArgumentVector {
    let mut args = ArgumentVector::default();

    args.flag("--name", config.executable_name());
    args.push(config.mode().flag());

    if let Some(icon) = config.icon() {
        args.flag("--icon", icon.to_string_lossy());
    }

    for module in config.hidden_imports() {
        args.flag("--hidden-import", module.as_str());
    }

    for mapping in config.data() {
        args.flag("--add-data", data_token(mapping, config.platform()));
    }

    args.push(config.script().to_string_lossy());
    args
}
