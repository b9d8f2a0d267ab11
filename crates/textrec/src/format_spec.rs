// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text rendering configuration.

use crate::config::ConfigError;
use crate::error::CodecError;
use serde::{Deserialize, Serialize};

/// One step of the undeclared-type guess sequence.
///
/// Str is never listed: it is the fallback when every step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessKind {
    Bool,
    Int,
    Float,
    /// Exact match of the absence token.
    None,
}

/// Separators used by containers at one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separators {
    /// Between elements.
    pub item: char,
    /// Between a dict key and its value.
    pub kv: char,
}

impl Separators {
    pub const fn new(item: char, kv: char) -> Self {
        Self { item, kv }
    }
}

/// Per-kind rendering rules, container separators and the guess order.
///
/// Immutable for the duration of an encode/decode call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSpec {
    /// Field delimiter of the file layer; never emitted inside a field.
    pub delimiter: char,
    /// Rendering of `true`.
    pub true_token: String,
    /// Rendering of `false`.
    pub false_token: String,
    /// Texts accepted as `true`.
    pub truthy: Vec<String>,
    /// Texts accepted as `false`.
    pub falsy: Vec<String>,
    /// Fixed number of decimals; `None` renders the shortest exact form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_precision: Option<usize>,
    /// Rendering of an absent value.
    pub none_token: String,
    /// Trial order when no type is declared.
    pub guess_order: Vec<GuessKind>,
    /// Container separators, outermost level first.
    pub levels: Vec<Separators>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            delimiter: '|',
            true_token: "true".to_string(),
            false_token: "false".to_string(),
            truthy: vec!["true".to_string(), "True".to_string()],
            falsy: vec!["false".to_string(), "False".to_string()],
            float_precision: None,
            none_token: String::new(),
            guess_order: vec![GuessKind::Bool, GuessKind::Int, GuessKind::Float],
            levels: vec![
                Separators::new(',', '='),
                Separators::new(';', ':'),
                Separators::new('^', '~'),
            ],
        }
    }
}

impl FormatSpec {
    /// Render booleans as `1`/`0` and accept those digits when parsing.
    ///
    /// Under this spec `"1"` guesses as a boolean, not an integer.
    pub fn numeric_bools() -> Self {
        Self::default().with_bool_tokens("1", "0")
    }

    /// Set the rendered boolean tokens, adding them to the accepted sets.
    pub fn with_bool_tokens(mut self, true_token: &str, false_token: &str) -> Self {
        self.true_token = true_token.to_string();
        self.false_token = false_token.to_string();
        if !self.truthy.iter().any(|t| t == true_token) {
            self.truthy.insert(0, true_token.to_string());
        }
        if !self.falsy.iter().any(|t| t == false_token) {
            self.falsy.insert(0, false_token.to_string());
        }
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = Some(precision);
        self
    }

    pub fn with_none_token(mut self, token: impl Into<String>) -> Self {
        self.none_token = token.into();
        self
    }

    pub fn with_guess_order(mut self, order: Vec<GuessKind>) -> Self {
        self.guess_order = order;
        self
    }

    pub fn with_levels(mut self, levels: Vec<Separators>) -> Self {
        self.levels = levels;
        self
    }

    pub fn is_truthy(&self, text: &str) -> bool {
        self.truthy.iter().any(|t| t == text)
    }

    pub fn is_falsy(&self, text: &str) -> bool {
        self.falsy.iter().any(|t| t == text)
    }

    /// Separators for containers at `depth` (0 = the field itself).
    pub fn level(&self, depth: usize) -> Result<Separators, CodecError> {
        self.levels.get(depth).copied().ok_or_else(|| {
            CodecError::UnsupportedType(format!(
                "container nesting depth {} exceeds the {} configured separator levels",
                depth + 1,
                self.levels.len()
            ))
        })
    }

    /// Check the rules are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.truthy.is_empty() || self.falsy.is_empty() {
            return Err(ConfigError::Invalid(
                "truthy and falsy token sets must not be empty".into(),
            ));
        }
        if let Some(shared) = self.truthy.iter().find(|t| self.is_falsy(t)) {
            return Err(ConfigError::Invalid(format!(
                "token {:?} is both truthy and falsy",
                shared
            )));
        }
        if !self.is_truthy(&self.true_token) || !self.is_falsy(&self.false_token) {
            return Err(ConfigError::Invalid(
                "rendered boolean tokens must belong to their accepted sets".into(),
            ));
        }
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one separator level is required".into(),
            ));
        }

        let mut seen = vec![self.delimiter];
        for (depth, level) in self.levels.iter().enumerate() {
            for sep in [level.item, level.kv] {
                if seen.contains(&sep) {
                    return Err(ConfigError::Invalid(format!(
                        "separator {:?} at level {} is already in use",
                        sep, depth
                    )));
                }
                seen.push(sep);
            }
        }

        for token in self.truthy.iter().chain(&self.falsy).chain([&self.none_token]) {
            if let Some(sep) = token.chars().find(|c| seen.contains(c)) {
                return Err(ConfigError::Invalid(format!(
                    "token {:?} contains separator {:?}",
                    token, sep
                )));
            }
        }
        Ok(())
    }
}
