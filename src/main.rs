use std::process::ExitCode;

fn main() -> ExitCode {
    umltex::cli::run()
}
