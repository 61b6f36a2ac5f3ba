//! Wildcard field masking
//!
//! Sensitive values are matched by glob-like patterns (`*` matches any run of
//! characters) against either a JSON property path (`user.token`,
//! `items[0].password`) or a flat key such as a header name. Matching is
//! anchored and case-insensitive. Matched values are replaced wholesale by a
//! mask literal; nothing is ever removed, reordered, or reshaped.

use crate::config::ConfigError;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// A set of wildcard patterns compiled for repeated matching.
///
/// Compilation happens once, at options construction time; a pattern that
/// cannot compile is a configuration error surfaced before any call is made.
#[derive(Debug, Clone, Default)]
pub struct MaskSet {
    patterns: Vec<Regex>,
}

impl MaskSet {
    /// Compile a list of wildcard patterns.
    ///
    /// Every character is taken literally except `*`, which matches zero or
    /// more characters. The whole pattern must match the whole path.
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let anchored = format!("^{}$", regex::escape(pattern).replace("\\*", ".*"));
            let regex = RegexBuilder::new(&anchored)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidMaskPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// Returns true if any pattern matches the given path.
    ///
    /// An empty set never matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }

    /// Returns true if the set contains no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Mask matched properties in a parsed JSON tree.
///
/// Walks the tree depth-first. Each object property is addressed by its path
/// from the root (`a.b`, `a[0].b`); a matched property's value is replaced by
/// the mask literal and not descended into. Arrays are recursed element-wise
/// without testing the array itself. A non-container root, or an empty
/// pattern set, returns the input unchanged.
pub fn mask_fields(mut value: Value, masks: &MaskSet, mask: &str) -> Value {
    if masks.is_empty() {
        return value;
    }
    mask_in_place(&mut value, "", masks, mask);
    value
}

fn mask_in_place(value: &mut Value, path: &str, masks: &MaskSet, mask: &str) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                if masks.is_match(&child_path) {
                    *child = Value::String(mask.to_owned());
                } else {
                    mask_in_place(child, &child_path, masks, mask);
                }
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                let child_path = format!("{path}[{index}]");
                mask_in_place(child, &child_path, masks, mask);
            }
        }
        _ => {}
    }
}

/// Mask a flat key → values map such as an HTTP header set.
///
/// A matched key keeps its name but has all of its values replaced by a
/// single mask literal. Unmatched entries pass through untouched and entry
/// order is preserved.
pub fn mask_pairs(
    pairs: Vec<(String, Vec<String>)>,
    masks: &MaskSet,
    mask: &str,
) -> Vec<(String, Vec<String>)> {
    pairs
        .into_iter()
        .map(|(key, values)| {
            if masks.is_match(&key) {
                (key, vec![mask.to_owned()])
            } else {
                (key, values)
            }
        })
        .collect()
}
