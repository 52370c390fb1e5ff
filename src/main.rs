use colored::Colorize;
use otterwrap::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
