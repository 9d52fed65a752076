/*
 *  inject.rs
 *  (c) 2025 Teodor Potancok
 *
 *  This Source Code Form is subject to the terms of the Mozilla Public
 *  License, v. 2.0. If a copy of the MPL was not distributed with this
 *  file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::PathBuf;

use crate::error::Error;
use crate::file;
use crate::substitute;
use crate::variant::Variant;

pub const DEFAULT_FILE: &str = "app.yaml";

#[derive(Debug, Clone)]
pub struct Options {
    pub file: PathBuf,
    pub atomic: bool,
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_FILE),
            atomic: true,
            strict: false,
        }
    }
}

#[derive(Debug)]
pub struct Report {
    pub replaced: usize,
    /// Only scanned for in strict mode or when debug logging is on.
    pub leftover: Vec<String>,
}

/// Reads the template, substitutes the variant's placeholders with `values`
/// and writes the result back to the same path.
///
/// The argument count is checked before the file is touched. In strict mode
/// leftover `##NAME` tokens abort the run before anything is written.
pub fn inject<S: AsRef<str>>(
    variant: &Variant,
    values: &[S],
    opts: &Options,
) -> Result<Report, Error> {
    let substitutions = variant.bind(values)?;

    let template = file::read_template(&opts.file)?;
    let out = substitute::apply(&template, &substitutions)?;

    let mut leftover = Vec::new();
    if opts.strict || log::log_enabled!(log::Level::Debug) {
        leftover = substitute::leftover_placeholders(&out.text)?;
        if !leftover.is_empty() {
            if opts.strict {
                return Err(Error::Leftover(leftover));
            }
            log::debug!("Placeholders left in template: {}", leftover.join(", "));
        }
    }

    if opts.atomic {
        file::write_atomic(&opts.file, &out.text)?;
    } else {
        file::write_in_place(&opts.file, &out.text)?;
    }

    let replaced: usize = out.counts.iter().map(|(_, n)| n).sum();
    log::info!(
        "Substituted {} occurrence(s) of {} placeholder(s) in {}",
        replaced,
        variant.placeholders().len(),
        opts.file.display()
    );

    Ok(Report { replaced, leftover })
}
