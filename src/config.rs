/*
 *  config.rs
 *  (c) 2025 Teodor Potancok
 *
 *  This Source Code Form is subject to the terms of the Mozilla Public
 *  License, v. 2.0. If a copy of the MPL was not distributed with this
 *  file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::variant::{PLACEHOLDER_PREFIX, Variant};

fn default_atomic() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct MainConfig {
    pub file: Option<PathBuf>,
    #[serde(default = "default_atomic")]
    pub atomic: bool,
    #[serde(default)]
    pub strict: bool,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            file: None,
            atomic: true,
            strict: false,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct VariantConfig {
    pub name: String,
    pub file: Option<PathBuf>,
    pub placeholders: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub substitutor: MainConfig,
    #[serde(default, rename = "variant")]
    pub variants: Vec<VariantConfig>,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Error reading file: {0}")]
    ReadFile(std::io::Error),
    #[error("Error deserializing file: {}", .0.message())]
    Deserialize(toml::de::Error),
    #[error("Placeholder {placeholder:?} in variant {variant} must start with \"##\" and name a token")]
    InvalidPlaceholder {
        variant: String,
        placeholder: String,
    },
    #[error("Variant {0} has no placeholders")]
    EmptyVariant(String),
    #[error("Variant {0} is declared more than once")]
    DuplicateVariant(String),
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = match std::fs::read_to_string(path) {
            Ok(f) => f,
            Err(e) => return Err(LoadError::ReadFile(e)),
        };

        Self::parse(&file)
    }

    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let cfg = match toml::from_str::<Config>(source) {
            Ok(f) => f,
            Err(e) => return Err(LoadError::Deserialize(e)),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), LoadError> {
        let mut seen = HashSet::new();

        for variant in &self.variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(LoadError::DuplicateVariant(variant.name.clone()));
            }

            if variant.placeholders.is_empty() {
                return Err(LoadError::EmptyVariant(variant.name.clone()));
            }

            if let Some(bad) = variant
                .placeholders
                .iter()
                .find(|p| p.len() <= PLACEHOLDER_PREFIX.len() || !p.starts_with(PLACEHOLDER_PREFIX))
            {
                return Err(LoadError::InvalidPlaceholder {
                    variant: variant.name.clone(),
                    placeholder: bad.clone(),
                });
            }
        }

        Ok(())
    }

    /// Config-declared variants shadow built-ins of the same name.
    pub fn find_variant(&self, name: &str) -> Option<(Variant, Option<&Path>)> {
        if let Some(v) = self.variants.iter().find(|v| v.name == name) {
            let variant = Variant::new(v.name.clone(), v.placeholders.clone());
            return Some((variant, v.file.as_deref()));
        }

        Variant::builtin(name).map(|v| (v, None))
    }
}
