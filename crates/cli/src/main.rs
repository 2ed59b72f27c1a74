use std::process::ExitCode;

fn main() -> ExitCode {
    tastemap_cli::run()
}
