//! Track command implementation.
//!
//! Follows an already initiated tileset upload: the first status fetched
//! counts as the first attempt, then the upload is polled at a fixed delay
//! until it finishes, fails or runs out of retries.

use std::time::Duration;

use asag_data::mapbox::{
    DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_POLL_DELAY, DEFAULT_USER, HttpUploadApi,
    HttpUploadApiConfig, PollOutcome, PollSettings, TransportError, UploadApi,
    poll_until_terminal,
};
use asag_data::notify::{LogNotifier, Notifier, WebhookNotifier};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ACCESS_TOKEN, ARG_API_URL, ARG_HOST_NAME, ARG_MAX_RETRIES, ARG_POLL_DELAY_MS,
    ARG_UPLOAD_ID, ARG_USER, ARG_WEBHOOK_URL, CliError, ENV_ACCESS_TOKEN, ENV_UPLOAD_ID,
};

/// CLI arguments for the `track` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Poll the upload API for an upload until it completes, \
                 reports an error or exhausts the retry budget. The terminal \
                 state is announced through the webhook when one is set, \
                 otherwise it is logged.",
    about = "Follow a tileset upload to completion"
)]
#[ortho_config(prefix = "ASAG")]
pub(crate) struct TrackArgs {
    /// Upload id returned when the upload was initiated.
    #[arg(long = ARG_UPLOAD_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) upload_id: Option<String>,
    /// Base URL of the upload API.
    #[arg(long = ARG_API_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) api_url: Option<String>,
    /// Access token for the upload API.
    #[arg(long = ARG_ACCESS_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    /// Account owning the tileset.
    #[arg(long = ARG_USER, value_name = "name")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Delay between status checks in milliseconds.
    #[arg(long = ARG_POLL_DELAY_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) poll_delay_ms: Option<u64>,
    /// Number of incomplete statuses tolerated before giving up.
    #[arg(long = ARG_MAX_RETRIES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_retries: Option<u32>,
    /// Chat-ops webhook receiving the outcome.
    #[arg(long = ARG_WEBHOOK_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) webhook_url: Option<String>,
    /// Host name appended to notifications.
    #[arg(long = ARG_HOST_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) host_name: Option<String>,
}

impl TrackArgs {
    pub(crate) fn into_config(self) -> Result<TrackConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TrackConfig::try_from(merged)
    }
}

/// Resolved `track` command configuration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct TrackConfig {
    pub(crate) upload_id: String,
    pub(crate) api_url: String,
    pub(crate) access_token: String,
    pub(crate) user: String,
    pub(crate) poll: PollSettings,
    pub(crate) webhook_url: Option<String>,
    pub(crate) host_name: Option<String>,
}

impl std::fmt::Debug for TrackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackConfig")
            .field("upload_id", &self.upload_id)
            .field("api_url", &self.api_url)
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .field("poll", &self.poll)
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "<redacted>"))
            .field("host_name", &self.host_name)
            .finish()
    }
}

impl TrackConfig {
    pub(crate) fn api_config(&self) -> HttpUploadApiConfig {
        HttpUploadApiConfig::new(self.access_token.clone())
            .with_api_url(self.api_url.clone())
            .with_user(self.user.clone())
    }

    fn notifier(&self) -> Box<dyn Notifier> {
        match &self.webhook_url {
            Some(url) => Box::new(WebhookNotifier::new(url.clone())),
            None => Box::new(LogNotifier),
        }
    }
}

impl TryFrom<TrackArgs> for TrackConfig {
    type Error = CliError;

    fn try_from(args: TrackArgs) -> Result<Self, Self::Error> {
        let upload_id = args.upload_id.ok_or(CliError::MissingArgument {
            field: ARG_UPLOAD_ID,
            env: ENV_UPLOAD_ID,
        })?;
        let access_token = args.access_token.ok_or(CliError::MissingArgument {
            field: ARG_ACCESS_TOKEN,
            env: ENV_ACCESS_TOKEN,
        })?;
        let delay = args
            .poll_delay_ms
            .map_or(DEFAULT_POLL_DELAY, Duration::from_millis);
        Ok(Self {
            upload_id,
            api_url: args.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            access_token,
            user: args.user.unwrap_or_else(|| DEFAULT_USER.to_owned()),
            poll: PollSettings::new(delay, args.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)),
            webhook_url: args.webhook_url,
            host_name: args.host_name,
        })
    }
}

pub(crate) fn run_track(args: TrackArgs) -> Result<PollOutcome, CliError> {
    let config = args.into_config()?;
    let api = HttpUploadApi::with_config(config.api_config()).map_err(CliError::BuildUploadApi)?;
    let notifier = config.notifier();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let outcome = runtime.block_on(track_upload(&api, notifier.as_ref(), &config))?;
    Ok(outcome)
}

/// Fetch the current status of the configured upload and poll it to a
/// terminal state.
pub(crate) async fn track_upload<A, N>(
    api: &A,
    notifier: &N,
    config: &TrackConfig,
) -> Result<PollOutcome, TransportError>
where
    A: UploadApi + ?Sized,
    N: Notifier + ?Sized,
{
    let initial = api.fetch_status(&config.upload_id).await?;
    poll_until_terminal(
        api,
        notifier,
        initial,
        config.poll,
        config.host_name.as_deref(),
    )
    .await
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TrackConfig, CliError> {
    let merged = TrackArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TrackConfig::try_from(merged)
}
