//! Binary entrypoint for stylepath-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = stylepath_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
