//! Unit tests for the track command configuration and polling flow.

use super::*;
use crate::track::{TrackConfig, config_from_layers_for_test, track_upload};
use asag_core::{PollState, UploadStatus};
use asag_data::mapbox::test_support::{RecordingNotifier, StubUploadApi, block_on_for_tests};
use asag_data::mapbox::{DEFAULT_API_URL, DEFAULT_POLL_DELAY, PollSettings, TransportError};
use rstest::{fixture, rstest};
use std::time::Duration;

fn required_args() -> TrackArgs {
    TrackArgs {
        upload_id: Some("upload-1".to_owned()),
        access_token: Some("sk.secret".to_owned()),
        ..TrackArgs::default()
    }
}

#[fixture]
fn config() -> TrackConfig {
    let mut config = TrackConfig::try_from(required_args()).expect("config should build");
    config.poll = PollSettings::new(Duration::ZERO, 2);
    config.host_name = Some("worker-1".to_owned());
    config
}

fn pending() -> UploadStatus {
    UploadStatus {
        id: "upload-1".to_owned(),
        name: Some("entur.geojson".to_owned()),
        tileset: Some("entur.tileset".to_owned()),
        ..UploadStatus::default()
    }
}

#[rstest]
#[case(None, Some("token"), ARG_UPLOAD_ID, ENV_UPLOAD_ID)]
#[case(Some("upload-1"), None, ARG_ACCESS_TOKEN, ENV_ACCESS_TOKEN)]
fn converting_without_required_fields_errors(
    #[case] upload_id: Option<&str>,
    #[case] access_token: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = TrackArgs {
        upload_id: upload_id.map(str::to_owned),
        access_token: access_token.map(str::to_owned),
        ..TrackArgs::default()
    };
    match TrackConfig::try_from(args) {
        Err(CliError::MissingArgument {
            field: missing,
            env,
        }) => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn optional_fields_fall_back_to_defaults() {
    let config = TrackConfig::try_from(required_args()).expect("config should build");
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.user, "entur");
    assert_eq!(config.poll, PollSettings::default());
    assert_eq!(config.poll.delay, DEFAULT_POLL_DELAY);
    assert!(config.webhook_url.is_none());
}

#[rstest]
fn poll_delay_is_read_in_milliseconds() {
    let args = TrackArgs {
        poll_delay_ms: Some(1500),
        max_retries: Some(4),
        ..required_args()
    };
    let config = TrackConfig::try_from(args).expect("config should build");
    assert_eq!(config.poll, PollSettings::new(Duration::from_millis(1500), 4));
}

#[rstest]
fn debug_output_hides_secrets(config: TrackConfig) {
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("sk.secret"));
    assert!(format!("{:?}", config.api_config()).contains("<redacted>"));
}

#[rstest]
fn initial_status_counts_as_first_attempt(config: TrackConfig) {
    let done = UploadStatus {
        complete: true,
        ..pending()
    };
    let api = StubUploadApi::new(pending()).with_statuses([pending(), done]);
    let notifier = RecordingNotifier::new();

    let outcome =
        block_on_for_tests(track_upload(&api, &notifier, &config)).expect("polling succeeds");

    assert_eq!(outcome.state, PollState::Finished { attempts: 1 });
    assert_eq!(api.status_calls(), 2);
    assert_eq!(
        notifier.messages(),
        vec!["Tilset `entur.tileset` uploaded to mapbox successfully :golfer:. on worker-1 :world_map:"]
    );
}

#[rstest]
fn incomplete_upload_times_out(config: TrackConfig) {
    let api = StubUploadApi::new(pending()).with_statuses(vec![pending(); 5]);
    let notifier = RecordingNotifier::new();

    let outcome =
        block_on_for_tests(track_upload(&api, &notifier, &config)).expect("polling succeeds");

    assert_eq!(outcome.state, PollState::TimedOut { attempts: 3 });
    assert_eq!(api.status_calls(), 3);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("*TIMEOUT*: Upload `upload-1`"));
}

#[rstest]
fn failing_status_fetch_aborts_tracking(config: TrackConfig) {
    let api = StubUploadApi::new(pending()).with_status_failure(404);
    let notifier = RecordingNotifier::new();

    let result = block_on_for_tests(track_upload(&api, &notifier, &config));

    assert!(matches!(
        result,
        Err(TransportError::Http { status: 404, .. })
    ));
    assert!(notifier.messages().is_empty());
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_file(
        serde_json::json!({
            "upload_id": "from-file",
            "access_token": "file-token",
            "max_retries": 5,
            "user": "operator",
        }),
        None,
    );
    composer.push_environment(serde_json::json!({
        "upload_id": "from-env",
    }));
    composer.push_cli(serde_json::json!({
        "access_token": "cli-token",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.upload_id, "from-env");
    assert_eq!(config.access_token, "cli-token");
    assert_eq!(config.user, "operator");
    assert_eq!(config.poll.max_retries, 5);
}
