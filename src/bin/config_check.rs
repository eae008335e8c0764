//! Sink Config CLI
//!
//! Describes the sink connector schema and validates configuration files
//! against it.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use redis_sink_config::{sink_schema, RawConfig, RedisSinkConfig, SchemaError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sink-config")]
#[command(about = "Describe and validate Redis sink connector configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every key the sink connector understands
    Describe {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Validate configuration and print the resolved values
    Validate {
        /// Config file (TOML or JSON); default locations and REDIS_SINK__* are always read
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show per-key values, errors and recommended values
    Recommend {
        /// Config file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Toml,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the configuration is invalid
fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Describe { format } => {
            let schema = sink_schema()?;
            let report = serde_json::json!({
                "fingerprint": schema.fingerprint()?.to_string(),
                "keys": schema.descriptors(),
            });

            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(&report)?,
                Format::Toml => toml::to_string_pretty(&report)?,
            };
            println!("{}", rendered);
            Ok(true)
        }

        Commands::Validate { config } => {
            let raw = RawConfig::load_from(config.as_deref())?;

            match RedisSinkConfig::new(&raw) {
                Ok(sink) => {
                    println!("✅ Configuration is valid");
                    print!("{}", sink.resolved().render_values());
                    for key in sink.resolved().unused_keys() {
                        println!("⚠️  Unused key: {}", key);
                    }
                    Ok(true)
                }
                Err(SchemaError::Invalid(errors)) => {
                    println!("❌ {}", errors);
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Recommend { config } => {
            let raw = RawConfig::load_from(config.as_deref())?;
            let values = sink_schema()?.validate_for_tooling(&raw);
            let valid = values.iter().all(|v| v.errors.is_empty());

            println!("{}", serde_json::to_string_pretty(&values)?);
            Ok(valid)
        }
    }
}
