//! Upload status state machine.
//!
//! The machine only decides; fetching statuses and waiting between polls is
//! the caller's job. The upload-initiation response counts as the first
//! observed status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a tileset upload as reported by the upload service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadStatus {
    /// Upload id.
    #[serde(default)]
    pub id: String,
    /// Upload name.
    #[serde(default)]
    pub name: Option<String>,
    /// Target tileset.
    #[serde(default)]
    pub tileset: Option<String>,
    /// Whether the tileset build finished.
    #[serde(default)]
    pub complete: bool,
    /// Error reported by the service.
    #[serde(default)]
    pub error: Option<String>,
    /// Service message.
    #[serde(default)]
    pub message: Option<String>,
    /// Creation time as reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last modification time as reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Build progress between 0 and 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Owning account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl UploadStatus {
    /// Return whether the status carries a non-empty error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|error| !error.is_empty())
    }
}

/// Position of an upload in the polling state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Still waiting; `attempts` statuses observed so far.
    Polling {
        /// Observed attempts.
        attempts: u32,
    },
    /// The tileset was built.
    Finished {
        /// Observed attempts.
        attempts: u32,
    },
    /// The service reported an error.
    Error {
        /// Observed attempts.
        attempts: u32,
    },
    /// Too many incomplete statuses.
    TimedOut {
        /// Observed attempts.
        attempts: u32,
    },
}

impl Default for PollState {
    fn default() -> Self {
        Self::initial()
    }
}

impl PollState {
    /// Starting state before any status was observed.
    #[must_use]
    pub const fn initial() -> Self {
        Self::Polling { attempts: 0 }
    }

    /// Feed one observed status into the machine.
    ///
    /// An error ends polling without consuming an attempt. An incomplete
    /// status consumes one; once more than `max_retries` were consumed the
    /// upload is considered timed out. Terminal states never change.
    ///
    /// # Examples
    ///
    /// ```
    /// use asag_core::{PollState, UploadStatus};
    ///
    /// let pending = UploadStatus::default();
    /// let state = PollState::initial().advance(&pending, 1);
    /// assert_eq!(state, PollState::Polling { attempts: 1 });
    /// let state = state.advance(&pending, 1);
    /// assert_eq!(state, PollState::TimedOut { attempts: 2 });
    /// ```
    #[must_use]
    pub fn advance(self, status: &UploadStatus, max_retries: u32) -> Self {
        let Self::Polling { attempts } = self else {
            return self;
        };
        if status.has_error() {
            return Self::Error { attempts };
        }
        if status.complete {
            return Self::Finished { attempts };
        }
        let attempts = attempts.saturating_add(1);
        if attempts > max_retries {
            Self::TimedOut { attempts }
        } else {
            Self::Polling { attempts }
        }
    }

    /// Number of attempts consumed so far.
    #[must_use]
    pub const fn attempts(self) -> u32 {
        match self {
            Self::Polling { attempts }
            | Self::Finished { attempts }
            | Self::Error { attempts }
            | Self::TimedOut { attempts } => attempts,
        }
    }

    /// Return whether polling has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Polling { .. })
    }

    /// Return whether the upload succeeded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// Upper-case label used in notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Polling { .. } => "POLLING",
            Self::Finished { .. } => "FINISHED",
            Self::Error { .. } => "ERROR",
            Self::TimedOut { .. } => "TIMEOUT",
        }
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pending() -> UploadStatus {
        UploadStatus {
            id: "upload-1".to_owned(),
            ..UploadStatus::default()
        }
    }

    #[rstest]
    fn error_is_immediate_and_free(pending: UploadStatus) {
        let failed = UploadStatus {
            error: Some("invalid geojson".to_owned()),
            ..pending
        };

        let state = PollState::initial().advance(&failed, 5);

        assert_eq!(state, PollState::Error { attempts: 0 });
    }

    #[rstest]
    fn completion_finishes(pending: UploadStatus) {
        let done = UploadStatus {
            complete: true,
            ..pending.clone()
        };

        let state = PollState::initial()
            .advance(&pending, 5)
            .advance(&done, 5);

        assert_eq!(state, PollState::Finished { attempts: 1 });
        assert!(state.is_success());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(20)]
    fn times_out_after_max_retries_plus_one(pending: UploadStatus, #[case] max_retries: u32) {
        let mut state = PollState::initial();
        for _ in 0..max_retries {
            state = state.advance(&pending, max_retries);
            assert!(!state.is_terminal());
        }

        state = state.advance(&pending, max_retries);

        assert_eq!(
            state,
            PollState::TimedOut {
                attempts: max_retries + 1
            }
        );
    }

    #[rstest]
    fn terminal_states_are_sticky(pending: UploadStatus) {
        let done = UploadStatus {
            complete: true,
            ..pending.clone()
        };
        let state = PollState::initial().advance(&done, 3);

        assert_eq!(state.advance(&pending, 3), state);
    }

    #[rstest]
    fn empty_error_is_not_an_error(pending: UploadStatus) {
        let status = UploadStatus {
            error: Some(String::new()),
            ..pending
        };
        assert_eq!(
            PollState::initial().advance(&status, 3),
            PollState::Polling { attempts: 1 }
        );
    }

    #[rstest]
    fn decodes_service_payload() {
        let payload = r#"{"id":"u1","name":"entur.geojson","tileset":"entur.tileset",
            "complete":false,"error":null,"message":null,"progress":0.5,"owner":"entur",
            "created":"2024-05-17T10:00:00.000Z","modified":"2024-05-17T10:00:01.000Z"}"#;

        let status: UploadStatus = serde_json::from_str(payload).expect("decode status");

        assert_eq!(status.id, "u1");
        assert_eq!(status.tileset.as_deref(), Some("entur.tileset"));
        assert_eq!(status.progress, Some(0.5));
        assert!(!status.has_error());
    }
}
