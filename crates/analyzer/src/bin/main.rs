//! Skewbench hash analyzer CLI
//!
//! Scores the uniformity of the interleaved hash family (and optionally
//! the legacy cascade baseline) over distinct random samples.

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skewbench_analyzer::{analyze_family, analyze_legacy, UniformityConfig, UniformityReport};
use skewbench_bloom::HashFamily;

#[derive(Parser)]
#[command(name = "skewbench-analyze")]
#[command(about = "Uniformity analysis for skewbench hash constructions")]
#[command(version)]
struct Cli {
    /// Number of distinct 32-bit ids to hash
    #[arg(long, default_value_t = 100_000)]
    samples: usize,

    /// Number of buckets to fold hash outputs into
    #[arg(long, default_value_t = 256)]
    buckets: usize,

    /// Number of family member functions
    #[arg(long, default_value_t = 8)]
    parts: u32,

    /// Output width of each member function, in bits
    #[arg(long, default_value_t = 8)]
    index_length: u32,

    /// Seed for the sample generator
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Also score the four legacy cascade instances
    #[arg(long)]
    legacy: bool,

    /// Emit scores as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let family = HashFamily::new(cli.parts, cli.index_length)?;
    let config = UniformityConfig::new(cli.samples, cli.buckets);

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let family_reports = analyze_family(&family, &config, &mut rng);
    let legacy_reports = if cli.legacy {
        analyze_legacy(&config, &mut rng)
    } else {
        Vec::new()
    };

    if cli.json {
        let scores = Scores {
            family: family_reports.iter().map(UniformityReport::score).collect(),
            legacy: legacy_reports.iter().map(UniformityReport::score).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    println!("{family} over {} samples, {} buckets", cli.samples, cli.buckets);
    for (part, report) in family_reports.iter().enumerate() {
        println!("  part {part}: std/mean = {:.5}", report.score());
    }
    if !legacy_reports.is_empty() {
        println!("legacy cascade baseline");
        for (instance, report) in legacy_reports.iter().enumerate() {
            println!("  seed {instance}: std/mean = {:.5}", report.score());
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct Scores {
    family: Vec<f64>,
    legacy: Vec<f64>,
}
