// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod cargo;
mod check;
mod test;
mod ws2812;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Peripheral driver development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the drivers build on host and for the bare-metal MCU target
    Check,
    /// Run driver test suites and print per-suite totals
    Test {
        /// Suites to run (repeatable); all when omitted
        #[arg(long = "suite", value_enum)]
        suites: Vec<test::Suite>,
        /// Limit unit tests to one driver module, e.g. `bmx280`
        #[arg(long)]
        module: Option<String>,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// Print the WS2812B SPI payload for a list of hex colors
    Ws2812 {
        /// Channel order of the strip
        #[arg(long, value_enum, default_value = "grb")]
        sequence: ws2812::Sequence,
        /// Colors as RRGGBB hex (optionally prefixed with 0x or #)
        #[arg(required = true)]
        colors: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { suites, module } => test::run(&suites, module.as_deref()),
        Commands::Doc { open } => check::doc(open),
        Commands::Ws2812 { sequence, colors } => ws2812::run(sequence, &colors),
    }
}
