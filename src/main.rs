//! semvec CLI: Binary Spatter Code vector toolkit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rand::SeedableRng;
use serde_json::json;

use semvec::config::VsaConfig;
use semvec::error::SemvecResult;
use semvec::vsa::encode::encode_term;
use semvec::vsa::ops::VsaOps;
use semvec::vsa::{BinaryVector, NormalizationMode};

#[derive(Parser)]
#[command(name = "semvec", version, about = "Binary Spatter Code vector toolkit")]
struct Cli {
    /// TOML config file (dimension, decimal_places, binding, normalization).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector dimension; overrides the config file.
    #[arg(long, global = true)]
    dimension: Option<usize>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active configuration and SIMD kernel.
    Info,

    /// Generate a random balanced vector.
    Random {
        /// RNG seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the elemental vector of a term.
    Term {
        /// The term to encode.
        term: String,
    },

    /// Measure the overlap of two vectors.
    Overlap {
        /// First vector as a '0'/'1' string (or a term with --terms).
        left: String,
        /// Second vector as a '0'/'1' string (or a term with --terms).
        right: String,
        /// Treat the arguments as terms instead of bit strings.
        #[arg(long)]
        terms: bool,
    },

    /// Superpose weighted vectors from a file and normalize the result.
    ///
    /// Each non-empty line is `<weight><TAB><bits>`; lines starting with `#`
    /// are ignored.
    Bundle {
        /// Path to the weights file.
        file: PathBuf,
        /// Conclude by majority rule instead of the configured normalization.
        #[arg(long)]
        majority: bool,
    },

    /// Rotate a vector's 64-bit blocks.
    Permute {
        /// The vector as a '0'/'1' string.
        vector: String,
        /// Number of blocks to rotate by (negative rotates back).
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        shift: i64,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, ops) = resolve_ops(&cli)?;

    match cli.command {
        Commands::Info => {
            if cli.json {
                let info = json!({
                    "dimension": ops.dim().get(),
                    "blocks": ops.dim().words(),
                    "decimal_places": config.decimal_places,
                    "binding": config.binding,
                    "normalization": config.normalization,
                    "isa": ops.isa_level().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info).into_diagnostic()?);
            } else {
                println!("Dimension:     {} ({} blocks)", ops.dim(), ops.dim().words());
                println!("Decimal places: {}", config.decimal_places);
                println!("Binding:       {}", config.binding);
                println!("Normalization: {}", config.normalization);
                println!("SIMD kernel:   {}", ops.isa_level());
            }
        }

        Commands::Random { seed } => {
            let mut rng = match seed {
                Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
                None => rand::rngs::StdRng::from_entropy(),
            };
            print_vector(&ops.random(&mut rng), cli.json)?;
        }

        Commands::Term { term } => {
            print_vector(&encode_term(&ops, &term), cli.json)?;
        }

        Commands::Overlap {
            left,
            right,
            terms,
        } => {
            let (a, b) = if terms {
                (encode_term(&ops, &left), encode_term(&ops, &right))
            } else {
                (parse_vector(&ops, &left)?, parse_vector(&ops, &right)?)
            };
            let overlap = ops.similarity(&a, &b)?;
            if cli.json {
                println!("{}", json!({ "overlap": overlap }));
            } else {
                println!("{overlap:.6}");
            }
        }

        Commands::Bundle { file, majority } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            let mut items: Vec<(BinaryVector, f64)> = Vec::new();
            for (n, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((weight, bits)) = line.split_once('\t') else {
                    miette::bail!(
                        "{}:{}: expected `<weight><TAB><bits>`",
                        file.display(),
                        n + 1
                    );
                };
                let weight: f64 = weight.trim().parse().into_diagnostic()?;
                items.push((parse_vector(&ops, bits.trim())?, weight));
            }

            let mut out = ops.zero();
            for (vector, weight) in &items {
                out.superpose(vector, *weight, None)?;
            }
            if majority {
                out.normalize_with(NormalizationMode::Majority);
            } else {
                ops.normalize(&mut out);
            }
            tracing::info!(inputs = items.len(), "bundled");
            print_vector(&out, cli.json)?;
        }

        Commands::Permute { vector, shift } => {
            let v = parse_vector(&ops, &vector)?;
            print_vector(&ops.permute(&v, shift)?, cli.json)?;
        }
    }

    Ok(())
}

/// Load the config file (if any), apply the `--dimension` override and
/// build the operations facade.
fn resolve_ops(cli: &Cli) -> SemvecResult<(VsaConfig, VsaOps)> {
    let mut config = match &cli.config {
        Some(path) => VsaConfig::load(path)?,
        None => VsaConfig::default(),
    };
    if let Some(dimension) = cli.dimension {
        config.dimension = dimension;
    }
    let ops = VsaOps::from_config(&config)?;
    Ok((config, ops))
}

fn parse_vector(ops: &VsaOps, text: &str) -> SemvecResult<BinaryVector> {
    Ok(BinaryVector::from_bit_string(ops.dim(), text)?.with_options(ops.options()))
}

fn print_vector(vector: &BinaryVector, json: bool) -> Result<()> {
    let bits = vector.to_bit_string();
    if json {
        let out = json!({
            "dimension": vector.dimension().get(),
            "ones": bits.matches('1').count(),
            "bits": bits,
        });
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else {
        println!("{bits}");
    }
    Ok(())
}
