use std::process::ExitCode;

fn main() -> ExitCode {
    cartsim_cli::run()
}
