use anyhow::Context;
use clap::Parser;
use csidp::cli::Cli;
use csidp::driver;

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    driver::run(&cli).with_context(|| format!("parsing failed, writing to {:?}", cli.out))
}

pub fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        tracing::error!(%err, "run failed");
        eprintln!("csidp: {err:#}");
        std::process::exit(1);
    }
}
