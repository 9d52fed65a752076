/*
 *  error.rs
 *  (c) 2025 Teodor Potancok
 *
 *  This Source Code Form is subject to the terms of the Mozilla Public
 *  License, v. 2.0. If a copy of the MPL was not distributed with this
 *  file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::config::LoadError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid number of arguments: {actual} (expected {expected})")]
    ArgumentCount { actual: usize, expected: usize },
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsubstituted placeholders left in template: {}", .0.join(", "))]
    Leftover(Vec<String>),
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),
    #[error("Invalid config: {0}")]
    Config(#[from] LoadError),
    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}
