//! Order-sensitive flag scanner shared by every shell command.
//!
//! A command declares how many tokens each flag consumes. The special key
//! [`POSITIONAL`] stands for one contiguous run of bare arguments.

use std::collections::HashMap;

use crate::error::{OreganoError, Result};

pub const POSITIONAL: &str = "<>";

#[derive(Debug, Clone, Default)]
pub struct FlagSchema {
    arities: HashMap<String, usize>,
}

impl FlagSchema {
    pub fn new(entries: &[(&str, usize)]) -> Self {
        Self {
            arities: entries
                .iter()
                .map(|(flag, arity)| (flag.to_string(), *arity))
                .collect(),
        }
    }

    pub fn arity(&self, flag: &str) -> Option<usize> {
        self.arities.get(flag).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    values: HashMap<String, Vec<String>>,
}

impl ParsedFlags {
    pub fn get(&self, flag: &str) -> Option<&[String]> {
        self.values.get(flag).map(Vec::as_slice)
    }

    pub fn positional(&self) -> &[String] {
        self.get(POSITIONAL).unwrap_or(&[])
    }

    /// Value of whichever spelling was given, e.g. `first_of(&["-n", "--count"])`.
    pub fn first_of(&self, flags: &[&str]) -> Option<&[String]> {
        flags.iter().find_map(|flag| self.get(flag))
    }

    /// Single-argument convenience over `first_of`.
    pub fn value_of(&self, flags: &[&str]) -> Option<&str> {
        self.first_of(flags)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Parse `tokens` (command name first) against `schema`.
pub fn parse(tokens: &[String], schema: &FlagSchema) -> Result<ParsedFlags> {
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    let positional_arity = schema.arity(POSITIONAL);
    let mut i = 1;

    while i < tokens.len() {
        let token = &tokens[i];
        let (key, arity, start) = match schema.arity(token) {
            Some(arity) if token != POSITIONAL => (token.clone(), arity, i + 1),
            _ => match positional_arity {
                Some(arity) if !values.contains_key(POSITIONAL) => (POSITIONAL.to_string(), arity, i),
                _ => return Err(OreganoError::UnrecognizedFlag(token.clone())),
            },
        };

        let available = tokens.len() - start;
        if available < arity {
            return Err(OreganoError::MissingArguments {
                flag: key,
                expected: arity,
                found: available,
            });
        }
        values.insert(key, tokens[start..start + arity].to_vec());
        // A zero-arity positional would never advance.
        i = (start + arity).max(i + 1);
    }

    if positional_arity.is_some() && !values.contains_key(POSITIONAL) {
        return Err(OreganoError::MissingRequiredPositional);
    }
    Ok(ParsedFlags { values })
}
