//! Command-line interface for the stop register tileset tooling.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

mod error;
mod track;
mod transform;

pub use error::CliError;

use track::{TrackArgs, run_track};
use transform::{TransformArgs, run_transform};

pub(crate) const ARG_INPUT: &str = "input";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_API_URL: &str = "api-url";
pub(crate) const ARG_ACCESS_TOKEN: &str = "access-token";
pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_UPLOAD_ID: &str = "upload-id";
pub(crate) const ARG_POLL_DELAY_MS: &str = "poll-delay-ms";
pub(crate) const ARG_MAX_RETRIES: &str = "max-retries";
pub(crate) const ARG_WEBHOOK_URL: &str = "webhook-url";
pub(crate) const ARG_HOST_NAME: &str = "host-name";
pub(crate) const ENV_INPUT: &str = "ASAG_CMDS_TRANSFORM_INPUT";
pub(crate) const ENV_OUTPUT: &str = "ASAG_CMDS_TRANSFORM_OUTPUT";
pub(crate) const ENV_ACCESS_TOKEN: &str = "ASAG_CMDS_TRACK_ACCESS_TOKEN";
pub(crate) const ENV_UPLOAD_ID: &str = "ASAG_CMDS_TRACK_UPLOAD_ID";

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging();
    match cli.command {
        Command::Transform(args) => {
            let summary = run_transform(args)?;
            info!(
                "wrote {} features from {} to {}",
                summary.report.features(),
                summary.document,
                summary.output
            );
        }
        Command::Track(args) => {
            let outcome = run_track(args)?;
            if !outcome.state.is_success() {
                return Err(CliError::UploadNotFinished {
                    id: outcome.status.id,
                    state: outcome.state.label(),
                    attempts: outcome.state.attempts(),
                });
            }
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Parser)]
#[command(
    name = "asag",
    about = "Publish NeTEx stop registers as tileset uploads",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a NeTEx export into a GeoJSON feature collection.
    Transform(TransformArgs),
    /// Follow a tileset upload until it finishes, fails or times out.
    Track(TrackArgs),
}

#[cfg(test)]
mod tests;
