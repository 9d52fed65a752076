use envinject::Variant;
use std::process::ExitCode;

fn main() -> ExitCode {
    envinject::cli::main_fixed("set-env-mongo", Variant::mongo())
}
