use clap::{Args, CommandFactory, FromArgMatches, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Config;
use crate::error::Error;
use crate::inject::{self, DEFAULT_FILE, Options};
use crate::logger;
use crate::variant::Variant;

#[derive(Args, Debug)]
pub struct SubstArgs {
    /// Template file rewritten in place [default: app.yaml]
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// TOML config with defaults and extra variants
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fail if any ##NAME placeholder is left after substitution
    #[arg(long)]
    pub strict: bool,

    /// Truncate and overwrite the file instead of replacing it atomically
    #[arg(long)]
    pub no_atomic: bool,

    /// One value per placeholder, in placeholder order
    #[arg(
        value_name = "VALUES",
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    pub values: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "envinject",
    version,
    about = "Substitute ##PLACEHOLDER tokens in a deployment template"
)]
pub struct EnvInjectCli {
    /// Built-in (project-id, mongo, app-engine) or config-declared variant
    #[arg(long, value_name = "NAME")]
    pub variant: String,

    #[command(flatten)]
    pub args: SubstArgs,
}

#[derive(Parser, Debug)]
#[command(version)]
pub struct FixedCli {
    #[command(flatten)]
    pub args: SubstArgs,
}

enum Target<'a> {
    Fixed(Variant),
    Named(&'a str),
}

fn resolve(target: Target, args: &SubstArgs) -> Result<(Variant, Options), Error> {
    let config = match &args.config {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    let (variant, variant_file) = match target {
        Target::Fixed(v) => (v, None),
        Target::Named(name) => config
            .find_variant(name)
            .ok_or_else(|| Error::UnknownVariant(name.to_string()))?,
    };

    let file = args
        .file
        .clone()
        .or_else(|| variant_file.map(Path::to_path_buf))
        .or_else(|| config.substitutor.file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE));

    let opts = Options {
        file,
        atomic: config.substitutor.atomic && !args.no_atomic,
        strict: config.substitutor.strict || args.strict,
    };

    Ok((variant, opts))
}

fn execute(target: Target, args: &SubstArgs) -> ExitCode {
    logger::init();

    let result = resolve(target, args).and_then(|(variant, opts)| {
        log::debug!(
            "Variant {} on {} (atomic: {}, strict: {})",
            variant.name(),
            opts.file.display(),
            opts.atomic,
            opts.strict
        );
        inject::inject(&variant, &args.values, &opts)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Entry point of the binaries that carry a hard-coded variant.
pub fn main_fixed(bin: &'static str, variant: Variant) -> ExitCode {
    let about = format!(
        "Substitute {} in a deployment template",
        variant.placeholders().join(", ")
    );
    let matches = FixedCli::command().name(bin).about(about).get_matches();
    let cli = match FixedCli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    execute(Target::Fixed(variant), &cli.args)
}

pub fn main_named() -> ExitCode {
    let cli = EnvInjectCli::parse();

    execute(Target::Named(&cli.variant), &cli.args)
}
