// SPDX-License-Identifier: Apache-2.0

//! Command line driver for the boolean atlas core model.
//!
//! Commands are given like:
//!
//! ```text
//! atlas-driver [--config <atlas.toml>] <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - run: Runs the step-accurate core on a hex input and prints the
//!   histogram next to the brute-force reference.
//! - reference: Prints only the brute-force histogram.
//! - sweep: Runs seeded random arrays and checks each against the reference.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -p atlas-driver -- run A1F3 --k 3
//! $ cargo run -p atlas-driver -- sweep --k 2 --min-n 2 --max-n 32 --seed 7
//! ```

mod atlas_config;
mod report_cli_error;
mod run;
mod sweep;

use clap::{Parser, Subcommand};
use report_cli_error::report_cli_error_and_exit;

#[derive(Parser, Debug)]
#[command(name = "atlas-driver", version, about)]
struct Cli {
    /// Path to an atlas.toml file; defaults to ./atlas.toml if present.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the core on one input and compare with the reference.
    Run(run::RunArgs),
    /// Print the brute-force reference histogram.
    Reference(run::ReferenceArgs),
    /// Check seeded random inputs against the reference.
    Sweep(sweep::SweepArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Run(_) => "run",
            Command::Reference(_) => "reference",
            Command::Sweep(_) => "sweep",
        }
    }
}

fn main() {
    let _ = env_logger::builder().try_init();
    let cli = Cli::parse();

    let config = match atlas_config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => report_cli_error_and_exit(
            &format!("{:#}", e),
            None,
            vec![(
                "working directory",
                &std::env::current_dir()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
            )],
        ),
    };

    let result = match &cli.command {
        Command::Run(args) => run::handle_run(args, &config),
        Command::Reference(args) => run::handle_reference(args, &config),
        Command::Sweep(args) => sweep::handle_sweep(args, &config),
    };
    if let Err(e) = result {
        report_cli_error_and_exit(&format!("{:#}", e), Some(cli.command.name()), vec![]);
    }
}
