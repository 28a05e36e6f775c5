//! Free-form argument parsing for the command surface
//!
//! The embedding shell hands each command a single raw string; the grammar
//! is free-form, so splitting is quote-aware and flags may appear anywhere
//! among the positionals.

use crate::core::types::{ProbeError, ProbeResult};
use std::collections::{HashMap, HashSet};

/// Splits a raw argument string on whitespace, honoring double quotes.
pub fn split_args(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in raw.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Tokens sorted into positionals, boolean flags, and valued options.
#[derive(Debug, Clone)]
pub struct ParsedArgs {
    positionals: Vec<String>,
    flags: HashSet<String>,
    options: HashMap<String, String>,
}

impl ParsedArgs {
    /// Parses `tokens` against the declared flag sets. Unknown `--` tokens
    /// and valued options missing their value are rejected.
    pub fn parse(
        tokens: &[String],
        valued: &[&str],
        boolean: &[&str],
    ) -> ProbeResult<Self> {
        let mut positionals = Vec::new();
        let mut flags = HashSet::new();
        let mut options = HashMap::new();

        let mut iter = tokens.iter();
        while let Some(token) = iter.next() {
            if !token.starts_with("--") {
                positionals.push(token.clone());
                continue;
            }
            if boolean.contains(&token.as_str()) {
                flags.insert(token.clone());
            } else if valued.contains(&token.as_str()) {
                let value = iter.next().ok_or_else(|| {
                    ProbeError::InvalidArgument(format!("{token} requires a value"))
                })?;
                options.insert(token.clone(), value.clone());
            } else {
                return Err(ProbeError::InvalidArgument(format!(
                    "unknown option: {token}"
                )));
            }
        }

        Ok(ParsedArgs {
            positionals,
            flags,
            options,
        })
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn has(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        self.options.get(option).map(String::as_str)
    }

    /// Parses a valued option, falling back to `default` when absent.
    pub fn get_usize(&self, option: &str, default: usize) -> ProbeResult<usize> {
        match self.get(option) {
            None => Ok(default),
            Some(text) => text.parse().map_err(|_| {
                ProbeError::InvalidArgument(format!("{option} expects a number, got {text}"))
            }),
        }
    }
}
