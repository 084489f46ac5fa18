// Copyright (c) 2021 10x Genomics, Inc. All rights reserved.

// hapsmash thresholds --bam F [--vcf F] [--seed N]
// hapsmash classify --bam F --vcf F --region chr:start-end
//
// Output is JSON on stdout: one object for thresholds, one line per read for classify.

use bam_store::BamStore;
use clap::{Parser, Subcommand};
use cs_tag::CsDecoder;
use hapsmash::{classify_region, parse_region, sample_thresholds};
use hapsmash_types::HapsmashResult;
use pretty_trace::PrettyTrace;
use std::io::{self, Write};
use std::path::PathBuf;
use threshold_est::SamplingConfig;

#[derive(Parser)]
#[command(name = "hapsmash")]
#[command(about = "Classify long-read mismatches against known variant calls", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate read length and depth thresholds for the sample
    Thresholds {
        /// Indexed alignment file
        #[arg(long, value_name = "BAM")]
        bam: PathBuf,

        /// Sample only the contigs having calls in this VCF
        #[arg(long, value_name = "VCF")]
        vcf: Option<PathBuf>,

        /// Random seed for window selection
        #[arg(long, value_name = "INT", default_value = "10")]
        seed: u64,

        /// Windows drawn per contig
        #[arg(long, value_name = "INT", default_value = "100")]
        samples: usize,
    },

    /// Classify the mismatches of every read in a region
    Classify {
        /// Indexed alignment file with cs tags
        #[arg(long, value_name = "BAM")]
        bam: PathBuf,

        /// Variant calls for the sample
        #[arg(long, value_name = "VCF")]
        vcf: PathBuf,

        /// Region, as chr:start-end (1-based, inclusive)
        #[arg(long, value_name = "REGION")]
        region: String,
    },
}

fn run(cli: Cli) -> HapsmashResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Thresholds {
            bam,
            vcf,
            seed,
            samples,
        } => {
            let mut store = BamStore::open(&bam)?;
            let config = SamplingConfig {
                seed,
                sample_count: samples,
                ..SamplingConfig::default()
            };
            let t = sample_thresholds(&mut store, vcf.as_deref(), &config)?;
            serde_json::to_writer_pretty(&mut out, &t).map_err(io::Error::from)?;
            writeln!(out)?;
        }
        Commands::Classify { bam, vcf, region } => {
            let region = parse_region(&region)?;
            let mut store = BamStore::open(&bam)?;
            for r in classify_region(&mut store, &CsDecoder, &vcf, &region)? {
                serde_json::to_writer(&mut out, &r).map_err(io::Error::from)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn main() {
    PrettyTrace::new().on();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("\nhapsmash failed: {}\n", e);
        std::process::exit(1);
    }
}
