use std::process::ExitCode;

fn main() -> ExitCode {
    envinject::cli::main_named()
}
