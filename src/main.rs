use anyhow::Result;
use clap::Parser;
use gutenberg2md::cli::Cli;
use gutenberg2md::converter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    converter::convert(&cli)
}
