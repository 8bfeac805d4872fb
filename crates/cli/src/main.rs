use std::process::ExitCode;

fn main() -> ExitCode {
    papyra_cli::run()
}
