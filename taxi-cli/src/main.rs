//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use taxi_cli::CliError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = taxi_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        report(&err);
        std::process::exit(1);
    }
}

#[expect(clippy::print_stderr, reason = "the binary reports fatal errors on stderr")]
fn report(err: &CliError) {
    eprintln!("taxi-rank: {err}");
}
