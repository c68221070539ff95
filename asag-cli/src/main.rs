//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = asag_cli::run() {
        eprintln!("asag: {err}");
        std::process::exit(1);
    }
}
