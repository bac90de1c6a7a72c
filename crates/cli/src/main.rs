use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    basketry_cli::run()
}
