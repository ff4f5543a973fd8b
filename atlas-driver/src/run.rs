// SPDX-License-Identifier: Apache-2.0

use boolean_atlas::{
    hex_to_nibbles_le, reference_histogram, AtlasConfig, Harness, Histogram, NibbleArray,
    OverflowPolicy, RunReport, SubsetSize, BIN_COUNT,
};
use clap::Args;
use serde::Serialize;

use crate::atlas_config::{self, AtlasToolConfig};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Hex digits of the input array; the rightmost digit is nibble 0.
    pub hex: String,

    /// Subset size (2 or 3).
    #[arg(long)]
    pub k: Option<usize>,

    /// Histogram counter width in bits.
    #[arg(long)]
    pub count_width: Option<u32>,

    /// Counter overflow policy: wrap or saturate.
    #[arg(long)]
    pub overflow: Option<OverflowPolicy>,

    /// Step budget before the run is reported as hung.
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Whether to compare the result with the brute-force reference.
    #[arg(long, default_value_t = true)]
    #[arg(action = clap::ArgAction::Set)]
    pub check_reference: bool,

    /// Emit a JSON report instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ReferenceArgs {
    /// Hex digits of the input array; the rightmost digit is nibble 0.
    pub hex: String,

    /// Subset size (2 or 3).
    #[arg(long)]
    pub k: Option<usize>,

    /// Emit JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    hex: &'a str,
    n: usize,
    k: SubsetSize,
    report: &'a RunReport,
    reference: Option<&'a Histogram>,
}

/// Builds a core configuration for `n` nibbles from flags and file defaults.
pub fn build_config(
    n: usize,
    k: SubsetSize,
    count_width: Option<u32>,
    overflow: OverflowPolicy,
) -> AtlasConfig {
    let mut config = AtlasConfig::new(n, k);
    if let Some(count_width) = count_width {
        config.count_width = count_width;
    }
    config.overflow = overflow;
    config
}

pub fn make_harness(
    nibbles: &NibbleArray,
    k: SubsetSize,
    count_width: Option<u32>,
    overflow: OverflowPolicy,
    max_steps: Option<u64>,
) -> anyhow::Result<Harness> {
    let config = build_config(nibbles.len(), k, count_width, overflow);
    let mut harness = Harness::new(config)?;
    if let Some(max_steps) = max_steps {
        harness = harness.with_max_steps(max_steps);
    }
    Ok(harness)
}

fn print_table(hex: &str, n: usize, k: SubsetSize, hw: &Histogram, reference: Option<&Histogram>) {
    println!("X={}  N={}  K={}", hex, n, k);
    match reference {
        Some(reference) => {
            println!("bin : hw  ref");
            for i in 0..BIN_COUNT {
                println!("{:02}  : {}  {}", i, hw[i], reference[i]);
            }
        }
        None => {
            println!("bin : hw");
            for i in 0..BIN_COUNT {
                println!("{:02}  : {}", i, hw[i]);
            }
        }
    }
}

pub fn handle_run(args: &RunArgs, config: &Option<AtlasToolConfig>) -> anyhow::Result<()> {
    let k = atlas_config::get_k(args.k, config)?;
    let nibbles = hex_to_nibbles_le(&args.hex)?;
    let mut harness = make_harness(
        &nibbles,
        k,
        atlas_config::get_count_width(args.count_width, config),
        atlas_config::get_overflow(args.overflow, config),
        atlas_config::get_max_steps(args.max_steps, config),
    )?;

    let report = harness.run(&nibbles)?;
    let reference = if args.check_reference {
        Some(reference_histogram(&nibbles, k))
    } else {
        None
    };

    if args.json {
        let output = RunOutput {
            hex: args.hex.trim(),
            n: nibbles.len(),
            k,
            report: &report,
            reference: reference.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(
            args.hex.trim(),
            nibbles.len(),
            k,
            &report.histogram,
            reference.as_ref(),
        );
        println!(
            "steps: {}  subsets: {}  events: {}",
            report.steps, report.subsets, report.events
        );
    }

    if let Some(reference) = reference {
        if reference != report.histogram {
            anyhow::bail!(
                "histogram mismatch vs reference; expected {} got {}",
                reference,
                report.histogram
            );
        }
    }
    Ok(())
}

pub fn handle_reference(
    args: &ReferenceArgs,
    config: &Option<AtlasToolConfig>,
) -> anyhow::Result<()> {
    let k = atlas_config::get_k(args.k, config)?;
    let nibbles = hex_to_nibbles_le(&args.hex)?;
    let histogram = reference_histogram(&nibbles, k);
    if args.json {
        println!("{}", serde_json::to_string(&histogram)?);
    } else {
        print_table(args.hex.trim(), nibbles.len(), k, &histogram, None);
    }
    Ok(())
}
