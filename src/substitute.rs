/*
 *  substitute.rs
 *  (c) 2025 Teodor Potancok
 *
 *  This Source Code Form is subject to the terms of the Mozilla Public
 *  License, v. 2.0. If a copy of the MPL was not distributed with this
 *  file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use regex::{NoExpand, Regex};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub placeholder: String,
    pub value: String,
}

impl Substitution {
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug)]
pub struct Substituted {
    pub text: String,
    /// Occurrences replaced per placeholder, in substitution order.
    pub counts: Vec<(String, usize)>,
}

/// Applies each substitution to the output of the previous one. A value
/// containing a later placeholder gets rewritten by that later step.
pub fn apply(template: &str, substitutions: &[Substitution]) -> Result<Substituted, Error> {
    let mut text = template.to_string();
    let mut counts = Vec::with_capacity(substitutions.len());

    for sub in substitutions {
        let re = Regex::new(&regex::escape(&sub.placeholder))?;
        let found = re.find_iter(&text).count();

        if found > 0 {
            text = re
                .replace_all(&text, NoExpand(sub.value.as_str()))
                .into_owned();
        }

        log::debug!("Replaced {} occurrence(s) of {}", found, sub.placeholder);
        counts.push((sub.placeholder.clone(), found));
    }

    Ok(Substituted { text, counts })
}

/// Distinct `##NAME` tokens still present, in order of first appearance.
pub fn leftover_placeholders(text: &str) -> Result<Vec<String>, Error> {
    let re = Regex::new(r"##[A-Z][A-Z0-9_]*")?;
    let mut found: Vec<String> = Vec::new();

    for m in re.find_iter(text) {
        if !found.iter().any(|f| f == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }

    Ok(found)
}
