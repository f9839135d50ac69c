use clap::{Parser, Subcommand};
use rollout::bucket::{Percentage, bucket_for, evaluate};
use std::error::Error;
use std::path::PathBuf;

mod config;
mod logging;
mod statsd;

#[derive(Parser)]
#[command(name = "featureflags")]
#[command(about = "Percentage rollout gate for a single feature")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the feature endpoints and admin probes
    Serve {
        #[arg(long, default_value = "featureflags.yaml")]
        config: PathBuf,
    },
    /// Print the bucket an identifier falls into
    Bucket {
        identifier: String,
        /// Also report the decision for this rollout percentage
        #[arg(long, value_parser = parse_percentage)]
        percentage: Option<Percentage>,
    },
}

fn parse_percentage(value: &str) -> Result<Percentage, String> {
    let value: u8 = value.parse().map_err(|e| format!("{e}"))?;
    Percentage::new(value).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Serve { config } => serve(config),
        CliCommand::Bucket {
            identifier,
            percentage,
        } => {
            match percentage {
                Some(percentage) => {
                    let evaluation = evaluate(&identifier, percentage);
                    println!(
                        "{identifier}: bucket {}, enabled at {percentage}: {}",
                        evaluation.bucket, evaluation.enabled
                    );
                }
                None => println!("{identifier}: bucket {}", bucket_for(&identifier)),
            }
            Ok(())
        }
    }
}

fn serve(path: PathBuf) -> Result<(), Box<dyn Error>> {
    let config = config::Config::from_file(&path)?;
    let _sentry = logging::init(&config.common.logging);

    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config)?;
    }

    tracing::info!(
        config = %path.display(),
        feature = %config.rollout.feature_name,
        "Starting featureflags"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    if let Err(e) = rt.block_on(rollout::run(config.rollout)) {
        tracing::error!(error = %e, "featureflags stopped");
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bucket_command_args() {
        let cli = Cli::try_parse_from([
            "featureflags",
            "bucket",
            "alpha@demo.com",
            "--percentage",
            "20",
        ])
        .expect("parse args");
        match cli.command {
            CliCommand::Bucket {
                identifier,
                percentage,
            } => {
                assert_eq!(identifier, "alpha@demo.com");
                assert_eq!(percentage.map(|p| p.value()), Some(20));
            }
            CliCommand::Serve { .. } => panic!("expected bucket command"),
        }

        for bad in ["101", "abc"] {
            let args = ["featureflags", "bucket", "x", "--percentage", bad];
            assert!(Cli::try_parse_from(args).is_err());
        }
    }
}
