//! Caller-side submission session
//!
//! Tracks one submission page: whether an analysis is in flight, whether a
//! result is on screen, and which code was last analyzed. The core pipeline
//! does not coordinate concurrent calls; this tracker is what keeps the
//! caller at one analysis at a time.
//!
//! ```text
//!            try_begin (new code)
//!   Idle ──────────────────────────▶ Analyzing
//!    ▲                                   │ finish
//!    │ panel_removed / new_submission    ▼
//!    └────────────────────────────── Displayed
//! ```

use std::fmt;

use tracing::debug;

use crate::types::{BigoError, Failure, ResponseEnvelope};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Analyzing,
    Displayed,
}

/// Decision for a detected submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Start an analysis now
    Start,
    /// Another analysis is in flight
    Busy,
    /// Same code as the result already shown
    Duplicate,
    /// Nothing to analyze
    Empty,
}

#[derive(Debug, Default)]
pub struct SubmissionTracker {
    state: SubmissionState,
    last_code: Option<String>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Decide whether a detected submission should be analyzed.
    ///
    /// On `Start` the tracker moves to `Analyzing` and remembers `code`.
    pub fn try_begin(&mut self, code: &str) -> Admission {
        if code.trim().is_empty() {
            return Admission::Empty;
        }

        let admission = match self.state {
            SubmissionState::Analyzing => Admission::Busy,
            _ if self.last_code.as_deref() == Some(code) => Admission::Duplicate,
            _ => Admission::Start,
        };

        if admission == Admission::Start {
            self.state = SubmissionState::Analyzing;
            self.last_code = Some(code.to_string());
        }

        debug!(?admission, state = ?self.state, "Submission detected");
        admission
    }

    /// Record that the in-flight analysis produced something to show.
    ///
    /// Returns `false` when the session was reset meanwhile and the outcome
    /// is stale.
    pub fn finish(&mut self) -> bool {
        if self.state != SubmissionState::Analyzing {
            debug!("Discarding stale analysis outcome");
            return false;
        }
        self.state = SubmissionState::Displayed;
        true
    }

    /// The result panel went away
    pub fn panel_removed(&mut self) {
        if self.state == SubmissionState::Displayed {
            self.reset();
        }
    }

    /// The user submitted again; forget everything
    pub fn new_submission(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SubmissionState::Idle;
        self.last_code = None;
    }
}

// =============================================================================
// User Notices
// =============================================================================

/// What to tell the user when an analysis did not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNotice {
    /// Server-side failure; worth another try shortly
    RetryShortly { status: u16 },
    /// The analysis context was torn down; the page must be reloaded
    ReloadPage,
    /// Anything else, shown verbatim
    Message(String),
}

impl UserNotice {
    /// Notice for a failure envelope
    pub fn from_failure(failure: &Failure) -> Self {
        match failure.status {
            Some(status @ 500..=599) => Self::RetryShortly { status },
            _ if failure.error.trim().is_empty() => {
                Self::Message("Failed to analyze complexity".to_string())
            }
            _ => Self::Message(failure.error.clone()),
        }
    }

    /// Notice for an error raised before any envelope arrived
    pub fn from_error(err: &BigoError) -> Self {
        match err {
            BigoError::ChannelClosed => Self::ReloadPage,
            other => Self::Message(other.to_string()),
        }
    }

    /// Notice for a bridge outcome; `None` when there is a result to show
    pub fn for_outcome(outcome: &Result<ResponseEnvelope, BigoError>) -> Option<Self> {
        match outcome {
            Ok(ResponseEnvelope::Success(_)) => None,
            Ok(ResponseEnvelope::Failure(failure)) => Some(Self::from_failure(failure)),
            Err(err) => Some(Self::from_error(err)),
        }
    }
}

impl fmt::Display for UserNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryShortly { status } => write!(
                f,
                "Analysis service temporarily unavailable (server {}). Please try again in a few moments.",
                status
            ),
            Self::ReloadPage => write!(
                f,
                "The analyzer was restarted. Please reload the page to continue."
            ),
            Self::Message(message) => write!(f, "{}", message),
        }
    }
}
