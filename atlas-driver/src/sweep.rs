// SPDX-License-Identifier: Apache-2.0

use boolean_atlas::nibble_utils::{MAX_NIBBLES, MIN_NIBBLES};
use boolean_atlas::{AtlasError, NibbleArray, OverflowPolicy};
use clap::Args;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use crate::atlas_config::{self, AtlasToolConfig};
use crate::run::make_harness;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Subset size (2 or 3).
    #[arg(long)]
    pub k: Option<usize>,

    /// Smallest array length to sample.
    #[arg(long, default_value_t = 2)]
    pub min_n: usize,

    /// Largest array length to sample.
    #[arg(long, default_value_t = 8)]
    pub max_n: usize,

    /// Number of random arrays to run.
    #[arg(long, default_value_t = 32)]
    pub samples: usize,

    /// Seed for the stimulus generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Step budget per run.
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Emit a JSON summary instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SweepSummary {
    pub k: usize,
    pub seed: u64,
    pub samples: usize,
    pub total_steps: u64,
    pub total_events: u64,
}

fn random_nibbles(rng: &mut Xoshiro256PlusPlus, n: usize) -> Result<NibbleArray, AtlasError> {
    NibbleArray::new((0..n).map(|_| rng.gen_range(0..16u8)).collect())
}

pub fn handle_sweep(args: &SweepArgs, config: &Option<AtlasToolConfig>) -> anyhow::Result<()> {
    let k = atlas_config::get_k(args.k, config)?;
    let seed = atlas_config::get_seed(args.seed, config);
    if args.min_n < MIN_NIBBLES || args.max_n > MAX_NIBBLES || args.min_n > args.max_n {
        anyhow::bail!(
            "array length range must satisfy {} <= min-n <= max-n <= {}; got [{}, {}]",
            MIN_NIBBLES,
            MAX_NIBBLES,
            args.min_n,
            args.max_n
        );
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut summary = SweepSummary {
        k: k.get(),
        seed,
        samples: 0,
        total_steps: 0,
        total_events: 0,
    };
    for sample in 0..args.samples {
        let n = rng.gen_range(args.min_n..=args.max_n);
        let nibbles = random_nibbles(&mut rng, n)?;
        let mut harness = make_harness(
            &nibbles,
            k,
            None,
            OverflowPolicy::Wrap,
            atlas_config::get_max_steps(args.max_steps, config),
        )?;
        let report = harness
            .run_checked(&nibbles)
            .map_err(|e| anyhow::anyhow!("sample {} (X={}): {}", sample, nibbles, e))?;
        log::info!(
            "sample {}: X={} n={} steps={} ok",
            sample,
            nibbles,
            n,
            report.steps
        );
        summary.samples += 1;
        summary.total_steps += report.steps;
        summary.total_events += report.events;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "sweep: k={} seed={} samples={} n in [{}, {}]: all match reference ({} events, {} steps)",
            summary.k,
            summary.seed,
            summary.samples,
            args.min_n,
            args.max_n,
            summary.total_events,
            summary.total_steps
        );
    }
    Ok(())
}
